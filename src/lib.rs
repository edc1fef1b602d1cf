// src/lib.rs
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod exporter;
pub mod job;
pub mod logger;
pub mod process;
pub mod queue;
pub mod recorder;
pub mod stats;
pub mod utils;

pub use config::SimConfig;
pub use dispatcher::Dispatcher;
pub use events::{AttemptRecord, Observer, RunSummary};
pub use job::{Job, JobStatus};
pub use logger::ConsoleLogger;
pub use process::{GaussianProcess, RandomProcess};
pub use queue::DispatchQueue;
pub use recorder::SqliteRecorder;
pub use stats::StatsAggregator;
