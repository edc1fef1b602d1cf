use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::utils::constants::{
    BASE_FAIL_PROBABILITY, FAIL_PROBABILITY_DECAY, MAX_PRIORITY, MIN_FAIL_PROBABILITY,
    MIN_PRIORITY, MIN_SERVICE_MS,
};

/// Source of every random draw the dispatcher consumes: service
/// durations, initial priorities, and per-attempt failure outcomes.
///
/// The dispatcher takes this by injection rather than reaching for a
/// process-wide generator, so tests can script outcomes or pin a seed.
pub trait RandomProcess: Send {
    /// Positive service duration in milliseconds.
    fn service_ms(&mut self) -> i64;

    /// Uniform initial priority in [1, 10].
    fn priority(&mut self) -> u8;

    /// Independent failure draw for the given attempt number. Later
    /// attempts fail less often, modeling a system that improves.
    fn should_fail(&mut self, attempt: u32) -> bool;
}

/// Production model: normally-distributed service times over a seedable
/// generator.
pub struct GaussianProcess {
    rng: StdRng,
    service_dist: Normal<f64>,
}

impl GaussianProcess {
    /// `mean_ms`/`stddev_ms` shape the service-time distribution. A seed
    /// pins the full draw sequence for reproducible runs; without one the
    /// generator is seeded from OS entropy.
    pub fn new(mean_ms: i64, stddev_ms: i64, seed: Option<u64>) -> Result<Self> {
        let service_dist = Normal::new(mean_ms as f64, stddev_ms as f64)
            .context("invalid service-time distribution (stddev must be positive and finite)")?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { rng, service_dist })
    }
}

impl RandomProcess for GaussianProcess {
    fn service_ms(&mut self) -> i64 {
        let sample = self.service_dist.sample(&mut self.rng);
        sample.max(MIN_SERVICE_MS).round() as i64
    }

    fn priority(&mut self) -> u8 {
        self.rng.gen_range(MIN_PRIORITY..=MAX_PRIORITY)
    }

    fn should_fail(&mut self, attempt: u32) -> bool {
        let p = (BASE_FAIL_PROBABILITY - FAIL_PROBABILITY_DECAY * attempt as f64)
            .max(MIN_FAIL_PROBABILITY);
        self.rng.gen_bool(p)
    }
}

/// The failure probability applied at a given attempt number.
pub fn fail_probability(attempt: u32) -> f64 {
    (BASE_FAIL_PROBABILITY - FAIL_PROBABILITY_DECAY * attempt as f64).max(MIN_FAIL_PROBABILITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_times_are_floored_and_positive() {
        // stddev far above the mean forces plenty of sub-floor samples
        let mut process = GaussianProcess::new(10, 500, Some(7)).unwrap();
        for _ in 0..1_000 {
            let ms = process.service_ms();
            assert!(ms >= MIN_SERVICE_MS as i64, "got {ms}");
        }
    }

    #[test]
    fn priorities_stay_in_band() {
        let mut process = GaussianProcess::new(300, 100, Some(11)).unwrap();
        for _ in 0..1_000 {
            let p = process.priority();
            assert!((MIN_PRIORITY..=MAX_PRIORITY).contains(&p));
        }
    }

    #[test]
    fn same_seed_reproduces_the_draw_sequence() {
        let mut a = GaussianProcess::new(300, 100, Some(42)).unwrap();
        let mut b = GaussianProcess::new(300, 100, Some(42)).unwrap();
        for attempt in 0..200u32 {
            assert_eq!(a.service_ms(), b.service_ms());
            assert_eq!(a.priority(), b.priority());
            assert_eq!(a.should_fail(attempt % 4), b.should_fail(attempt % 4));
        }
    }

    #[test]
    fn failure_probability_decays_to_floor() {
        assert_eq!(fail_probability(0), 0.20);
        assert!((fail_probability(1) - 0.14).abs() < 1e-12);
        assert!((fail_probability(2) - 0.08).abs() < 1e-12);
        assert!((fail_probability(3) - MIN_FAIL_PROBABILITY).abs() < 1e-12);
        assert_eq!(fail_probability(100), MIN_FAIL_PROBABILITY);
    }

    #[test]
    fn non_positive_stddev_is_rejected() {
        assert!(GaussianProcess::new(300, 0, None).is_err());
    }
}
