// src/job.rs
use serde::{Deserialize, Serialize};

use crate::utils::constants::MAX_PRIORITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of simulated work and its accumulated timing.
///
/// A job is a plain value: retries never mutate a queued job in place,
/// they push a fresh snapshot (see [`Job::retry`]).
#[derive(Debug, Clone)]
pub struct Job {
    /// Stable external id, 1..=N, never reused.
    pub ext_id: u32,
    /// 1..=10, higher dispatched sooner. Bumped on retry, capped at 10.
    pub priority: u8,
    /// Zero-based attempt counter; increments only on failure-and-retry.
    pub attempt: u32,
    /// Retry cap, copied from configuration at creation.
    pub max_retries: u32,
    /// Most recent enqueue time (ms); reset on every retry re-enqueue.
    pub enqueue_ts: i64,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    pub wait_ms: i64,
    pub service_ms: i64,
    pub turnaround_ms: i64,
    pub status: JobStatus,
    pub fail_reason: Option<String>,
}

impl Job {
    pub fn new(ext_id: u32, priority: u8, max_retries: u32, enqueue_ts: i64) -> Self {
        Self {
            ext_id,
            priority,
            attempt: 0,
            max_retries,
            enqueue_ts,
            start_ts: None,
            end_ts: None,
            wait_ms: 0,
            service_ms: 0,
            turnaround_ms: 0,
            status: JobStatus::Pending,
            fail_reason: None,
        }
    }

    /// Whether a failed attempt at the current count may still be retried.
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_retries
    }

    /// Snapshot for re-enqueueing after a failed attempt: next attempt
    /// number, priority aged up (capped), timing cleared, enqueued at `now`.
    pub fn retry(&self, now: i64) -> Self {
        Self {
            ext_id: self.ext_id,
            priority: self.priority.saturating_add(1).min(MAX_PRIORITY),
            attempt: self.attempt + 1,
            max_retries: self.max_retries,
            enqueue_ts: now,
            start_ts: None,
            end_ts: None,
            wait_ms: 0,
            service_ms: 0,
            turnaround_ms: 0,
            status: JobStatus::Pending,
            fail_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_bumps_attempt_and_priority() {
        let job = Job::new(7, 4, 2, 1_000);
        let retried = job.retry(2_000);
        assert_eq!(retried.ext_id, 7);
        assert_eq!(retried.attempt, 1);
        assert_eq!(retried.priority, 5);
        assert_eq!(retried.enqueue_ts, 2_000);
        assert_eq!(retried.status, JobStatus::Pending);
        assert!(retried.start_ts.is_none());
        assert!(retried.fail_reason.is_none());
    }

    #[test]
    fn priority_aging_caps_at_ten() {
        let mut job = Job::new(1, 9, 10, 0);
        for round in 1..=5 {
            job = job.retry(round);
        }
        assert_eq!(job.priority, MAX_PRIORITY);
        assert_eq!(job.attempt, 5);
    }

    #[test]
    fn can_retry_respects_cap() {
        let job = Job::new(1, 5, 0, 0);
        assert!(!job.can_retry());

        let job = Job::new(1, 5, 2, 0);
        assert!(job.can_retry());
        assert!(job.retry(1).can_retry());
        assert!(!job.retry(1).retry(2).can_retry());
    }

    #[test]
    fn status_renders_uppercase() {
        assert_eq!(JobStatus::Pending.as_str(), "PENDING");
        assert_eq!(JobStatus::Failed.to_string(), "FAILED");
    }
}
