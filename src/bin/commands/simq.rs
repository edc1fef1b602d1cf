// src/bin/commands/simq.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::ArgMatches;
use colored::*;

use simq::config::SimConfig;
use simq::dispatcher::Dispatcher;
use simq::events::RunSummary;
use simq::exporter::write_attempts_csv;
use simq::logger::ConsoleLogger;
use simq::process::GaussianProcess;
use simq::recorder::SqliteRecorder;

fn parse<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = matches.get_one::<String>(name).expect("arg has a default");
    raw.parse::<T>().with_context(|| format!("invalid --{name}: {raw}"))
}

// Run one simulation end to end
pub async fn run_command(matches: &ArgMatches) -> Result<()> {
    let config = SimConfig {
        jobs: parse(matches, "jobs")?,
        max_retries: parse(matches, "max-retries")?,
        mean_ms: parse(matches, "mean-ms")?,
        stddev_ms: parse(matches, "stddev-ms")?,
        seed: match matches.get_one::<String>("seed") {
            Some(raw) => Some(raw.parse().with_context(|| format!("invalid --seed: {raw}"))?),
            None => None,
        },
    };
    config.validate()?;

    let db_path = matches.get_one::<String>("db").expect("arg has a default");
    let no_db = matches.get_flag("no-db");

    println!("{}", "🚀 Starting dispatch simulation...".green().bold());
    println!("Jobs: {}", config.jobs);
    println!("Max retries: {}", config.max_retries);
    println!("Service time: {}ms ± {}ms", config.mean_ms, config.stddev_ms);
    if let Some(seed) = config.seed {
        println!("Seed: {seed}");
    }

    let process = GaussianProcess::new(config.mean_ms, config.stddev_ms, config.seed)?;
    let mut dispatcher = Dispatcher::new(config, Box::new(process));
    dispatcher.subscribe(Box::new(ConsoleLogger::new()));
    if !no_db {
        println!("Store: {db_path}");
        let recorder = SqliteRecorder::open(db_path).await?;
        dispatcher.subscribe(Box::new(recorder));
    }

    let summary = dispatcher.run().await?;
    print_summary(&summary);
    Ok(())
}

// Show recorded run summaries, newest first
pub async fn history_command(matches: &ArgMatches) -> Result<()> {
    let db_path = matches.get_one::<String>("db").expect("arg has a default");
    let limit: u32 = parse(matches, "limit")?;

    let recorder = SqliteRecorder::open(db_path).await?;
    let runs = recorder.recent_runs(limit).await?;

    if runs.is_empty() {
        println!("{}", "No recorded runs.".yellow());
        return Ok(());
    }

    println!("{}", format!("📋 Last {} run(s)", runs.len()).green().bold());
    for run in &runs {
        let started = Utc
            .timestamp_millis_opt(run.started_at_ms)
            .single()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| run.started_at_ms.to_string());
        println!(
            "  {}  {}  jobs={} ok={} failed={} avg_turn={:.2}ms throughput={:.2}/s",
            run.run_id.cyan(),
            started,
            run.total_jobs,
            run.success_jobs.to_string().green(),
            run.failed_jobs.to_string().red(),
            run.avg_turnaround_ms,
            run.throughput_jobs_per_s,
        );
    }
    Ok(())
}

// Export one run's attempts to CSV
pub async fn export_command(matches: &ArgMatches) -> Result<()> {
    let run_id = matches.get_one::<String>("run-id").expect("required arg");
    let db_path = matches.get_one::<String>("db").expect("arg has a default");
    let out: PathBuf = matches.get_one::<String>("out").expect("arg has a default").into();

    let recorder = SqliteRecorder::open(db_path).await?;
    let attempts = recorder.attempts_for_run(run_id).await?;
    if attempts.is_empty() {
        println!("{}", format!("No attempts recorded for run {run_id}.").yellow());
        return Ok(());
    }

    let written = write_attempts_csv(&out, &attempts)?;
    println!(
        "{}",
        format!("✅ Exported {written} attempt(s) to {}", out.display()).green()
    );
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "=== RUN SUMMARY ===".green().bold());
    println!("Run ID:      {}", summary.run_id.cyan());
    println!("Total jobs:  {}", summary.total_jobs);
    println!("Success:     {}", summary.success_jobs.to_string().green());
    println!("Failed:      {}", summary.failed_jobs.to_string().red());
    println!("Avg wait:    {:.2} ms", summary.avg_wait_ms);
    println!("Avg service: {:.2} ms", summary.avg_service_ms);
    println!("Avg turn:    {:.2} ms", summary.avg_turnaround_ms);
    println!("Throughput:  {:.2} jobs/s", summary.throughput_jobs_per_s);
}
