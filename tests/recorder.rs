//! Round-trip tests for the SQLite recorder against an in-memory store.

use simq::config::SimConfig;
use simq::dispatcher::Dispatcher;
use simq::events::{AttemptRecord, Observer, RunSummary};
use simq::process::GaussianProcess;
use simq::recorder::SqliteRecorder;

fn attempt(run_id: &str, ext_id: u32, attempt: u32, status: &str, reason: &str) -> AttemptRecord {
    AttemptRecord {
        run_id: run_id.to_string(),
        ext_id,
        priority: 6,
        attempt,
        status: status.to_string(),
        fail_reason: reason.to_string(),
        enqueue_ts: 1_000,
        start_ts: Some(1_010),
        end_ts: Some(1_210),
        wait_ms: 10,
        service_ms: 200,
        turnaround_ms: 210,
    }
}

fn summary(run_id: &str) -> RunSummary {
    RunSummary {
        run_id: run_id.to_string(),
        started_at_ms: 1_000,
        finished_at_ms: 2_000,
        total_jobs: 2,
        success_jobs: 1,
        failed_jobs: 1,
        avg_wait_ms: 10.0,
        avg_service_ms: 200.0,
        avg_turnaround_ms: 210.0,
        throughput_jobs_per_s: 1.0,
    }
}

#[tokio::test]
async fn attempts_round_trip_through_the_store() {
    let recorder = SqliteRecorder::in_memory().await.unwrap();

    let failed = attempt("run-a", 1, 0, "FAILED", "SIMULATED_FAILURE");
    let succeeded = attempt("run-a", 1, 1, "SUCCESS", "");
    recorder.on_attempt(&failed).await.unwrap();
    recorder.on_attempt(&succeeded).await.unwrap();

    let rows = recorder.attempts_for_run("run-a").await.unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].ext_id, 1);
    assert_eq!(rows[0].attempt, 0);
    assert_eq!(rows[0].status, "FAILED");
    assert_eq!(rows[0].fail_reason, "SIMULATED_FAILURE");
    assert_eq!(rows[0].enqueue_ts, 1_000);
    assert_eq!(rows[0].start_ts, Some(1_010));
    assert_eq!(rows[0].end_ts, Some(1_210));
    assert_eq!(rows[0].wait_ms, 10);
    assert_eq!(rows[0].service_ms, 200);
    assert_eq!(rows[0].turnaround_ms, 210);

    assert_eq!(rows[1].attempt, 1);
    assert_eq!(rows[1].status, "SUCCESS");
    assert_eq!(rows[1].fail_reason, "");
}

#[tokio::test]
async fn attempts_for_unknown_run_are_empty() {
    let recorder = SqliteRecorder::in_memory().await.unwrap();
    recorder.on_attempt(&attempt("run-a", 1, 0, "SUCCESS", "")).await.unwrap();

    let rows = recorder.attempts_for_run("run-b").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn summaries_round_trip_newest_first() {
    let recorder = SqliteRecorder::in_memory().await.unwrap();

    let mut older = summary("run-old");
    older.started_at_ms = 1_000;
    let mut newer = summary("run-new");
    newer.started_at_ms = 5_000;
    recorder.on_summary(&older).await.unwrap();
    recorder.on_summary(&newer).await.unwrap();

    let runs = recorder.recent_runs(10).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_id, "run-new");
    assert_eq!(runs[1].run_id, "run-old");

    assert_eq!(runs[1].total_jobs, 2);
    assert_eq!(runs[1].success_jobs, 1);
    assert_eq!(runs[1].failed_jobs, 1);
    assert_eq!(runs[1].avg_wait_ms, 10.0);
    assert_eq!(runs[1].avg_service_ms, 200.0);
    assert_eq!(runs[1].avg_turnaround_ms, 210.0);
    assert_eq!(runs[1].throughput_jobs_per_s, 1.0);

    let limited = recorder.recent_runs(1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].run_id, "run-new");
}

#[tokio::test]
async fn full_run_lands_one_summary_row_and_all_attempt_rows() {
    let config = SimConfig { jobs: 6, max_retries: 2, seed: Some(77), ..Default::default() };
    let process = GaussianProcess::new(config.mean_ms, config.stddev_ms, config.seed).unwrap();
    let recorder = SqliteRecorder::in_memory().await.unwrap();

    let mut dispatcher = Dispatcher::new(config, Box::new(process));
    let run_id = dispatcher.run_id().to_string();
    dispatcher.subscribe(Box::new(recorder.clone()));

    let summary = dispatcher.run().await.unwrap();
    assert_eq!(summary.run_id, run_id);

    let runs = recorder.recent_runs(10).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, run_id);
    assert_eq!(runs[0].total_jobs, 6);
    assert_eq!(runs[0].total_jobs, runs[0].success_jobs + runs[0].failed_jobs);

    let attempts = recorder.attempts_for_run(&run_id).await.unwrap();
    assert!(attempts.len() >= 6, "at least one attempt per seeded job");
    assert!(attempts.iter().all(|a| a.run_id == run_id));
}
