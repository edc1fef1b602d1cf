// src/bin/simq.rs
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::process;
use tracing_subscriber::EnvFilter;

mod commands;
use commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let app = Command::new("simq")
        .version(env!("CARGO_PKG_VERSION"))
        .about("SimQ - Priority Job Dispatch Simulator CLI")
        .subcommand(
            Command::new("run")
                .about("Run one dispatch simulation")
                .arg(Arg::new("jobs")
                    .short('j')
                    .long("jobs")
                    .value_name("NUMBER")
                    .help("Number of jobs to seed")
                    .default_value("12"))
                .arg(Arg::new("max-retries")
                    .short('r')
                    .long("max-retries")
                    .value_name("NUMBER")
                    .help("Retry cap per job")
                    .default_value("2"))
                .arg(Arg::new("mean-ms")
                    .long("mean-ms")
                    .value_name("MS")
                    .help("Mean service time in milliseconds")
                    .default_value("300"))
                .arg(Arg::new("stddev-ms")
                    .long("stddev-ms")
                    .value_name("MS")
                    .help("Service time standard deviation in milliseconds")
                    .default_value("100"))
                .arg(Arg::new("seed")
                    .short('s')
                    .long("seed")
                    .value_name("NUMBER")
                    .help("Pin the random seed for a reproducible run"))
                .arg(Arg::new("db")
                    .long("db")
                    .value_name("PATH")
                    .help("SQLite store for attempt and run rows")
                    .default_value("dispatcher.db"))
                .arg(Arg::new("no-db")
                    .long("no-db")
                    .help("Skip recording to SQLite")
                    .action(ArgAction::SetTrue))
        )
        .subcommand(
            Command::new("history")
                .about("Show recorded run summaries")
                .arg(Arg::new("db")
                    .long("db")
                    .value_name("PATH")
                    .help("SQLite store to read")
                    .default_value("dispatcher.db"))
                .arg(Arg::new("limit")
                    .short('l')
                    .long("limit")
                    .value_name("NUMBER")
                    .help("Limit number of runs shown")
                    .default_value("10"))
        )
        .subcommand(
            Command::new("export")
                .about("Export a recorded run's attempts to CSV")
                .arg(Arg::new("run-id")
                    .help("Run ID to export")
                    .required(true))
                .arg(Arg::new("db")
                    .long("db")
                    .value_name("PATH")
                    .help("SQLite store to read")
                    .default_value("dispatcher.db"))
                .arg(Arg::new("out")
                    .short('o')
                    .long("out")
                    .value_name("PATH")
                    .help("CSV output path")
                    .default_value("attempts.csv"))
        );

    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("run", sub_matches)) => run_command(sub_matches).await,
        Some(("history", sub_matches)) => history_command(sub_matches).await,
        Some(("export", sub_matches)) => export_command(sub_matches).await,
        _ => {
            println!("No command specified. Use --help for usage information.");
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
