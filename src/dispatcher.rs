use anyhow::Result;
use chrono::Utc;
use nanoid::nanoid;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::events::{AttemptRecord, Observer, RunSummary};
use crate::job::{Job, JobStatus};
use crate::process::RandomProcess;
use crate::queue::DispatchQueue;
use crate::stats::StatsAggregator;
use crate::utils::constants::{BASE_BACKOFF_MS, FAIL_REASON_SIMULATED};

/// Sequential dispatch engine.
///
/// Pops the highest-priority pending job, applies backoff when the pop is
/// a retry, consumes service time, draws the attempt outcome, and either
/// finalizes the job or re-enqueues an aged-up snapshot. Runs to
/// completion: every seeded job ends in exactly one terminal state.
pub struct Dispatcher {
    run_id: String,
    config: SimConfig,
    process: Box<dyn RandomProcess>,
    queue: DispatchQueue,
    stats: StatsAggregator,
    completed: Vec<Job>,
    observers: Vec<Box<dyn Observer>>,
}

impl Dispatcher {
    pub fn new(config: SimConfig, process: Box<dyn RandomProcess>) -> Self {
        Self {
            run_id: nanoid!(10),
            config,
            process,
            queue: DispatchQueue::new(),
            stats: StatsAggregator::new(),
            completed: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    async fn emit_attempt(&self, job: &Job) -> Result<()> {
        let record = AttemptRecord::from_job(&self.run_id, job);
        for observer in &self.observers {
            observer.on_attempt(&record).await?;
        }
        Ok(())
    }

    async fn emit_summary(&self, summary: &RunSummary) -> Result<()> {
        for observer in &self.observers {
            observer.on_summary(summary).await?;
        }
        Ok(())
    }

    fn seed_jobs(&mut self, t0: i64) {
        for i in 1..=self.config.jobs {
            // t0 + i keeps the initial enqueue order stable within a
            // priority band even when seeding is sub-millisecond.
            let job = Job::new(i, self.process.priority(), self.config.max_retries, t0 + i as i64);
            self.queue.push(job);
        }
    }

    /// Exponential backoff before a retry attempt: 100, 200, 400, ... ms.
    /// First attempts proceed immediately.
    async fn backoff(&self, job: &Job) {
        if job.attempt == 0 {
            return;
        }
        let delay = BASE_BACKOFF_MS << (job.attempt - 1);
        debug!(ext_id = job.ext_id, attempt = job.attempt, backoff_ms = delay, "backing off retry");
        sleep(Duration::from_millis(delay)).await;
    }

    /// Runs the dispatch loop until the queue drains, then emits the run
    /// summary. Consumes the dispatcher: a run happens once.
    pub async fn run(mut self) -> Result<RunSummary> {
        // Timestamps are wall-anchored once, then advanced monotonically,
        // so a fixed seed reproduces every relative stamp exactly.
        let epoch_ms = Utc::now().timestamp_millis();
        let origin = Instant::now();
        let now_ms = move || epoch_ms + origin.elapsed().as_millis() as i64;

        info!(
            run_id = %self.run_id,
            jobs = self.config.jobs,
            max_retries = self.config.max_retries,
            mean_ms = self.config.mean_ms,
            stddev_ms = self.config.stddev_ms,
            "dispatch run starting"
        );

        let started_at_ms = now_ms();
        self.seed_jobs(started_at_ms);

        while let Some(mut job) = self.queue.pop() {
            self.backoff(&job).await;

            job.status = JobStatus::Running;
            let start = now_ms();
            job.start_ts = Some(start);
            job.wait_ms = start - job.enqueue_ts;

            let service = self.process.service_ms();
            job.service_ms = service;
            sleep(Duration::from_millis(service as u64)).await;

            let failed = self.process.should_fail(job.attempt);
            let end = now_ms();
            job.end_ts = Some(end);
            job.turnaround_ms = end - job.enqueue_ts;

            if !failed {
                job.status = JobStatus::Success;
                self.stats.record_terminal(&job);
                self.emit_attempt(&job).await?;
                self.completed.push(job);
            } else {
                job.status = JobStatus::Failed;
                job.fail_reason = Some(FAIL_REASON_SIMULATED.to_string());
                // Failed attempts are recorded whether or not a retry follows.
                self.emit_attempt(&job).await?;

                if job.can_retry() {
                    let retried = job.retry(now_ms());
                    self.queue.push(retried);
                } else {
                    self.stats.record_terminal(&job);
                    self.completed.push(job);
                }
            }
        }

        let finished_at_ms = now_ms();
        let wall_clock_secs = origin.elapsed().as_secs_f64();
        let summary =
            self.stats.summarize(&self.run_id, started_at_ms, finished_at_ms, wall_clock_secs);

        debug!(run_id = %self.run_id, completed = self.completed.len(), "queue drained");
        self.emit_summary(&summary).await?;

        Ok(summary)
    }
}
