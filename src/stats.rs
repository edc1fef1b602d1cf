use crate::events::RunSummary;
use crate::job::{Job, JobStatus};
use crate::utils::constants::MIN_WALL_CLOCK_SECS;

/// Accumulates timing over jobs that reached a terminal state. Intermediate
/// failed attempts never land here; the dispatcher only feeds terminal
/// successes and retry-exhausted failures.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    successes: u64,
    failures: u64,
    sum_wait_ms: i64,
    sum_service_ms: i64,
    sum_turnaround_ms: i64,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_terminal(&mut self, job: &Job) {
        match job.status {
            JobStatus::Success => self.successes += 1,
            JobStatus::Failed => self.failures += 1,
            JobStatus::Pending | JobStatus::Running => {
                debug_assert!(false, "non-terminal job fed to the aggregator");
                return;
            }
        }
        self.sum_wait_ms += job.wait_ms;
        self.sum_service_ms += job.service_ms;
        self.sum_turnaround_ms += job.turnaround_ms;
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn total(&self) -> u64 {
        self.successes + self.failures
    }

    /// Fold the accumulated sums into a run summary. Averages guard the
    /// empty run; throughput divides by wall clock floored at a small
    /// epsilon so an instant run cannot divide by zero.
    pub fn summarize(
        &self,
        run_id: &str,
        started_at_ms: i64,
        finished_at_ms: i64,
        wall_clock_secs: f64,
    ) -> RunSummary {
        let total = self.total();
        let avg = |sum: i64| {
            if total == 0 {
                0.0
            } else {
                sum as f64 / total as f64
            }
        };
        let secs = wall_clock_secs.max(MIN_WALL_CLOCK_SECS);

        RunSummary {
            run_id: run_id.to_string(),
            started_at_ms,
            finished_at_ms,
            total_jobs: total,
            success_jobs: self.successes,
            failed_jobs: self.failures,
            avg_wait_ms: avg(self.sum_wait_ms),
            avg_service_ms: avg(self.sum_service_ms),
            avg_turnaround_ms: avg(self.sum_turnaround_ms),
            throughput_jobs_per_s: self.successes as f64 / secs,
        }
    }
}
