use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::events::{AttemptRecord, Observer, RunSummary};

/// Prints one human-readable line per attempt and a block at run end.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLogger;

impl ConsoleLogger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observer for ConsoleLogger {
    async fn on_attempt(&self, record: &AttemptRecord) -> Result<()> {
        if record.fail_reason.is_empty() {
            info!(
                ext_id = record.ext_id,
                priority = record.priority,
                attempt = record.attempt,
                wait_ms = record.wait_ms,
                service_ms = record.service_ms,
                turnaround_ms = record.turnaround_ms,
                status = %record.status,
                "attempt finished"
            );
        } else {
            warn!(
                ext_id = record.ext_id,
                priority = record.priority,
                attempt = record.attempt,
                wait_ms = record.wait_ms,
                service_ms = record.service_ms,
                turnaround_ms = record.turnaround_ms,
                status = %record.status,
                reason = %record.fail_reason,
                "attempt finished"
            );
        }
        Ok(())
    }

    async fn on_summary(&self, summary: &RunSummary) -> Result<()> {
        info!(
            run_id = %summary.run_id,
            total_jobs = summary.total_jobs,
            success_jobs = summary.success_jobs,
            failed_jobs = summary.failed_jobs,
            avg_wait_ms = summary.avg_wait_ms,
            avg_service_ms = summary.avg_service_ms,
            avg_turnaround_ms = summary.avg_turnaround_ms,
            throughput_jobs_per_s = summary.throughput_jobs_per_s,
            "run finished"
        );
        Ok(())
    }
}
