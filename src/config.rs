use anyhow::{ensure, Result};

use crate::utils::constants::{
    DEFAULT_JOBS, DEFAULT_MAX_RETRIES, DEFAULT_MEAN_MS, DEFAULT_STDDEV_MS,
};

/// Knobs for one simulation run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Number of jobs seeded at run start. Zero is a legal (empty) run.
    pub jobs: u32,
    /// Retry cap copied onto every job at creation.
    pub max_retries: u32,
    /// Mean of the service-time distribution (ms).
    pub mean_ms: i64,
    /// Standard deviation of the service-time distribution (ms).
    pub stddev_ms: i64,
    /// Pins the random draw sequence for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_JOBS,
            max_retries: DEFAULT_MAX_RETRIES,
            mean_ms: DEFAULT_MEAN_MS,
            stddev_ms: DEFAULT_STDDEV_MS,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Fails fast, before any job exists.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.mean_ms > 0, "mean service time must be positive (got {})", self.mean_ms);
        ensure!(
            self.stddev_ms > 0,
            "service time standard deviation must be positive (got {})",
            self.stddev_ms
        );
        Ok(())
    }
}
