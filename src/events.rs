use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::job::Job;

/// Emitted once per executed attempt, success or failure.
///
/// This is the unit the recorder persists (one row per attempt) and the
/// logger prints; field set mirrors the `attempts` table exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub run_id: String,
    pub ext_id: u32,
    pub priority: u8,
    pub attempt: u32,
    pub status: String,
    /// Empty when the attempt succeeded.
    pub fail_reason: String,
    pub enqueue_ts: i64,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    pub wait_ms: i64,
    pub service_ms: i64,
    pub turnaround_ms: i64,
}

impl AttemptRecord {
    pub fn from_job(run_id: &str, job: &Job) -> Self {
        Self {
            run_id: run_id.to_string(),
            ext_id: job.ext_id,
            priority: job.priority,
            attempt: job.attempt,
            status: job.status.as_str().to_string(),
            fail_reason: job.fail_reason.clone().unwrap_or_default(),
            enqueue_ts: job.enqueue_ts,
            start_ts: job.start_ts,
            end_ts: job.end_ts,
            wait_ms: job.wait_ms,
            service_ms: job.service_ms,
            turnaround_ms: job.turnaround_ms,
        }
    }
}

/// Emitted exactly once at run end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at_ms: i64,
    pub finished_at_ms: i64,
    pub total_jobs: u64,
    pub success_jobs: u64,
    pub failed_jobs: u64,
    pub avg_wait_ms: f64,
    pub avg_service_ms: f64,
    pub avg_turnaround_ms: f64,
    pub throughput_jobs_per_s: f64,
}

/// Consumer of dispatch events. The recorder and the console logger both
/// implement this; observers subscribe on the dispatcher before a run.
///
/// Errors returned here (recorder IO, typically) abort the run. Simulated
/// job failures never travel through this channel, they are ordinary
/// `AttemptRecord`s.
#[async_trait]
pub trait Observer: Send + Sync {
    async fn on_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()>;

    async fn on_summary(&self, summary: &RunSummary) -> anyhow::Result<()>;
}
