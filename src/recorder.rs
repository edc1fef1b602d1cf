//! SQLite-backed run recorder.
//!
//! Persists one row per executed attempt and one row per run summary. The
//! two tables mirror the event payloads exactly, so the CLI can replay
//! history (`recent_runs`) or export a run (`attempts_for_run`) without
//! touching the dispatcher.

use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};

use crate::events::{AttemptRecord, Observer, RunSummary};

const RUNS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
    run_id                TEXT PRIMARY KEY,
    started_at            INTEGER NOT NULL,
    finished_at           INTEGER NOT NULL,
    total_jobs            INTEGER NOT NULL,
    success_jobs          INTEGER NOT NULL,
    failed_jobs           INTEGER NOT NULL,
    avg_wait_ms           REAL NOT NULL,
    avg_service_ms        REAL NOT NULL,
    avg_turnaround_ms     REAL NOT NULL,
    throughput_jobs_per_s REAL NOT NULL
)
"#;

const ATTEMPTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS attempts (
    attempt_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id        TEXT NOT NULL,
    ext_id        INTEGER NOT NULL,
    priority      INTEGER NOT NULL,
    attempt       INTEGER NOT NULL,
    status        TEXT NOT NULL,
    fail_reason   TEXT NOT NULL,
    enqueue_ts    INTEGER NOT NULL,
    start_ts      INTEGER,
    end_ts        INTEGER,
    wait_ms       INTEGER NOT NULL,
    service_ms    INTEGER NOT NULL,
    turnaround_ms INTEGER NOT NULL
)
"#;

/// Cheap to clone; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct SqliteRecorder {
    pool: SqlitePool,
}

impl SqliteRecorder {
    /// Open (or create) the store at `path` and ensure the schema exists.
    pub async fn open(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open recorder store at {path}"))?;

        Self::with_pool(pool).await
    }

    /// In-memory store. The pool is pinned to a single connection so the
    /// database outlives individual acquires.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory sqlite options")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory recorder store")?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        for schema in [RUNS_SCHEMA, ATTEMPTS_SCHEMA] {
            sqlx::query(schema)
                .execute(&pool)
                .await
                .context("failed to create recorder schema")?;
        }
        Ok(Self { pool })
    }

    /// Recorded run summaries, newest first.
    pub async fn recent_runs(&self, limit: u32) -> Result<Vec<RunSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT run_id, started_at, finished_at, total_jobs, success_jobs,
                   failed_jobs, avg_wait_ms, avg_service_ms, avg_turnaround_ms,
                   throughput_jobs_per_s
            FROM runs
            ORDER BY started_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("failed to list recorded runs")?;

        rows.into_iter().map(row_to_summary).collect()
    }

    /// Every attempt recorded for one run, in recording order.
    pub async fn attempts_for_run(&self, run_id: &str) -> Result<Vec<AttemptRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT run_id, ext_id, priority, attempt, status, fail_reason,
                   enqueue_ts, start_ts, end_ts, wait_ms, service_ms,
                   turnaround_ms
            FROM attempts
            WHERE run_id = ?1
            ORDER BY attempt_id ASC
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to list attempts for run {run_id}"))?;

        rows.into_iter().map(row_to_attempt).collect()
    }
}

#[async_trait]
impl Observer for SqliteRecorder {
    async fn on_attempt(&self, record: &AttemptRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO attempts (
                run_id, ext_id, priority, attempt, status, fail_reason,
                enqueue_ts, start_ts, end_ts, wait_ms, service_ms,
                turnaround_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&record.run_id)
        .bind(record.ext_id as i64)
        .bind(record.priority as i64)
        .bind(record.attempt as i64)
        .bind(&record.status)
        .bind(&record.fail_reason)
        .bind(record.enqueue_ts)
        .bind(record.start_ts)
        .bind(record.end_ts)
        .bind(record.wait_ms)
        .bind(record.service_ms)
        .bind(record.turnaround_ms)
        .execute(&self.pool)
        .await
        .context("failed to insert attempt row")?;

        Ok(())
    }

    async fn on_summary(&self, summary: &RunSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO runs (
                run_id, started_at, finished_at, total_jobs, success_jobs,
                failed_jobs, avg_wait_ms, avg_service_ms, avg_turnaround_ms,
                throughput_jobs_per_s
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&summary.run_id)
        .bind(summary.started_at_ms)
        .bind(summary.finished_at_ms)
        .bind(summary.total_jobs as i64)
        .bind(summary.success_jobs as i64)
        .bind(summary.failed_jobs as i64)
        .bind(summary.avg_wait_ms)
        .bind(summary.avg_service_ms)
        .bind(summary.avg_turnaround_ms)
        .bind(summary.throughput_jobs_per_s)
        .execute(&self.pool)
        .await
        .context("failed to insert run summary row")?;

        Ok(())
    }
}

fn row_to_summary(row: SqliteRow) -> Result<RunSummary> {
    Ok(RunSummary {
        run_id: row.try_get("run_id")?,
        started_at_ms: row.try_get("started_at")?,
        finished_at_ms: row.try_get("finished_at")?,
        total_jobs: row.try_get::<i64, _>("total_jobs")? as u64,
        success_jobs: row.try_get::<i64, _>("success_jobs")? as u64,
        failed_jobs: row.try_get::<i64, _>("failed_jobs")? as u64,
        avg_wait_ms: row.try_get("avg_wait_ms")?,
        avg_service_ms: row.try_get("avg_service_ms")?,
        avg_turnaround_ms: row.try_get("avg_turnaround_ms")?,
        throughput_jobs_per_s: row.try_get("throughput_jobs_per_s")?,
    })
}

fn row_to_attempt(row: SqliteRow) -> Result<AttemptRecord> {
    Ok(AttemptRecord {
        run_id: row.try_get("run_id")?,
        ext_id: row.try_get::<i64, _>("ext_id")? as u32,
        priority: row.try_get::<i64, _>("priority")? as u8,
        attempt: row.try_get::<i64, _>("attempt")? as u32,
        status: row.try_get("status")?,
        fail_reason: row.try_get("fail_reason")?,
        enqueue_ts: row.try_get("enqueue_ts")?,
        start_ts: row.try_get("start_ts")?,
        end_ts: row.try_get("end_ts")?,
        wait_ms: row.try_get("wait_ms")?,
        service_ms: row.try_get("service_ms")?,
        turnaround_ms: row.try_get("turnaround_ms")?,
    })
}
