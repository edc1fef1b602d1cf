pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 10;

/// Service samples are floored here before rounding (ms).
pub const MIN_SERVICE_MS: f64 = 30.0;

/// First retry waits this long; every further retry doubles it (ms).
pub const BASE_BACKOFF_MS: u64 = 100;

/// Failure model: max(MIN_FAIL_PROBABILITY, BASE - DECAY * attempt).
pub const BASE_FAIL_PROBABILITY: f64 = 0.20;
pub const FAIL_PROBABILITY_DECAY: f64 = 0.06;
pub const MIN_FAIL_PROBABILITY: f64 = 0.02;

/// Wall-clock floor for throughput on effectively-instant runs (seconds).
pub const MIN_WALL_CLOCK_SECS: f64 = 0.001;

pub const FAIL_REASON_SIMULATED: &str = "SIMULATED_FAILURE";

pub const DEFAULT_JOBS: u32 = 12;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_MEAN_MS: i64 = 300;
pub const DEFAULT_STDDEV_MS: i64 = 100;
pub const DEFAULT_DB_PATH: &str = "dispatcher.db";
