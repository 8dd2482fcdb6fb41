//! Statistical verification of the uniformity guarantee.
//!
//! The sampler's correctness is exact (the telescoping-product argument in
//! the `reservoir` module docs), so this harness proves nothing — it is a
//! black-box confirmation tool. It runs many independent traversals over the
//! same stream shape (the integers `0..N`), counts how often each element
//! lands in the sample, and exposes the empirical selection frequencies next
//! to the theoretical `k/N`.
//!
//! Each run gets a private `ChaCha8Rng` derived from the base seed and the
//! run index, so a whole verification is reproducible end to end and runs
//! never share generator state. The harness is layered strictly on the
//! public sampling API; the sampler knows nothing about it.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::reservoir::sample_with_rng;

const DEFAULT_RUNS: u64 = 100_000;
const DEFAULT_BASE_SEED: u64 = 42;
const PROGRESS_EVERY: u64 = 10_000;

/// Invalid verification parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// `runs` was zero; no statistics can come out of zero traversals.
    #[error("verification needs at least one run")]
    ZeroRuns,
    /// `stream_len` was zero; there are no elements to count.
    #[error("verification needs a non-empty stream")]
    EmptyStream,
}

/// Parameters for one verification: how long the stream is, how big the
/// reservoir is, how many independent traversals to run.
///
/// # Example
///
/// ```
/// use cistern::VerifyConfig;
///
/// let config = VerifyConfig::new(100, 10).with_runs(5_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Length of the integer stream `0..stream_len` each run samples.
    stream_len: u64,
    /// Reservoir capacity `k` for each run.
    capacity: usize,
    /// Number of independent traversals.
    runs: u64,
    /// Seed from which each run's private RNG is derived.
    base_seed: u64,
}

impl VerifyConfig {
    /// Creates a configuration for streams `0..stream_len` sampled with
    /// capacity `capacity`.
    ///
    /// Defaults: `runs = 100_000`, fixed base seed.
    pub fn new(stream_len: u64, capacity: usize) -> Self {
        Self {
            stream_len,
            capacity,
            runs: DEFAULT_RUNS,
            base_seed: DEFAULT_BASE_SEED,
        }
    }

    /// Sets the number of independent traversals.
    pub fn with_runs(mut self, runs: u64) -> Self {
        self.runs = runs;
        self
    }

    /// Sets the seed from which per-run RNGs are derived.
    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    /// Returns the stream length `N`.
    pub fn stream_len(&self) -> u64 {
        self.stream_len
    }

    /// Returns the reservoir capacity `k`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of runs `T`.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Returns the base seed.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), VerifyError> {
        if self.runs == 0 {
            return Err(VerifyError::ZeroRuns);
        }
        if self.stream_len == 0 {
            return Err(VerifyError::EmptyStream);
        }
        Ok(())
    }
}

/// Runs `config.runs()` independent traversals of the stream
/// `0..config.stream_len()` and counts per-element appearances.
pub fn run(config: &VerifyConfig) -> Result<VerifyReport, VerifyError> {
    config.validate()?;

    let n = config.stream_len;
    let k = config.capacity;
    let runs = config.runs;
    info!(runs, stream_len = n, capacity = k, "starting uniformity verification");

    let mut counts = vec![0u64; n as usize];
    for t in 0..runs {
        let mut rng = ChaCha8Rng::seed_from_u64(config.base_seed.wrapping_add(t));
        for element in sample_with_rng(0..n, k, &mut rng) {
            counts[element as usize] += 1;
        }
        if (t + 1) % PROGRESS_EVERY == 0 {
            debug!(completed = t + 1, total = runs, "verification progress");
        }
    }

    info!("uniformity verification finished");
    Ok(VerifyReport {
        counts,
        capacity: k,
        runs,
    })
}

/// Per-element appearance counts from a verification, plus the derived
/// statistics.
///
/// `counts[e]` is the number of runs in which stream element `e` ended up in
/// the final sample. Under the uniformity guarantee each count is a
/// Binomial(T, k/N) draw, so the empirical frequencies should sit within a
/// few standard errors of `k/N`.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    counts: Vec<u64>,
    capacity: usize,
    runs: u64,
}

impl VerifyReport {
    /// Appearance count per stream element, indexed by element value.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// The stream length `N` the verification ran over.
    pub fn stream_len(&self) -> u64 {
        self.counts.len() as u64
    }

    /// The reservoir capacity `k` each run used.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of runs `T`.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// The probability `min(k/N, 1)` with which each element should appear.
    pub fn theoretical_probability(&self) -> f64 {
        (self.capacity as f64 / self.counts.len() as f64).min(1.0)
    }

    /// The observed appearance frequency of one stream element.
    pub fn empirical_probability(&self, element: u64) -> f64 {
        self.counts[element as usize] as f64 / self.runs as f64
    }

    /// The observed appearance frequency of every stream element, in element
    /// order.
    pub fn empirical_probabilities(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|&c| c as f64 / self.runs as f64)
            .collect()
    }

    /// Mean appearance count across elements. Exactly `T * min(n, k) / N`,
    /// since every run contributes `min(n, k)` appearances.
    pub fn mean_appearances(&self) -> f64 {
        let total: u64 = self.counts.iter().sum();
        total as f64 / self.counts.len() as f64
    }

    /// Sample standard deviation (N-1) of the appearance counts.
    pub fn std_dev_appearances(&self) -> f64 {
        if self.counts.len() < 2 {
            return 0.0;
        }
        let mean = self.mean_appearances();
        let sum_sq: f64 = self
            .counts
            .iter()
            .map(|&c| {
                let d = c as f64 - mean;
                d * d
            })
            .sum();
        (sum_sq / (self.counts.len() - 1) as f64).sqrt()
    }

    /// Standard error of an empirical frequency: `sqrt(p(1-p)/T)` with
    /// `p = k/N`.
    pub fn standard_error(&self) -> f64 {
        let p = self.theoretical_probability();
        (p * (1.0 - p) / self.runs as f64).sqrt()
    }

    /// Largest absolute deviation of any element's empirical frequency from
    /// the theoretical probability.
    pub fn max_abs_deviation(&self) -> f64 {
        let p = self.theoretical_probability();
        self.counts
            .iter()
            .map(|&c| (c as f64 / self.runs as f64 - p).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn config_rejects_degenerate_parameters() {
        let err = VerifyConfig::new(100, 10)
            .with_runs(0)
            .validate()
            .expect_err("zero runs rejected");
        assert_eq!(err, VerifyError::ZeroRuns);

        let err = VerifyConfig::new(0, 10)
            .validate()
            .expect_err("empty stream rejected");
        assert_eq!(err, VerifyError::EmptyStream);

        assert!(VerifyConfig::new(100, 10).validate().is_ok());
        // k > N is legal: every run returns the whole stream.
        assert!(VerifyConfig::new(3, 10).validate().is_ok());
    }

    #[test]
    fn run_rejects_invalid_config() {
        let err = run(&VerifyConfig::new(10, 3).with_runs(0)).expect_err("invalid config");
        assert_eq!(err, VerifyError::ZeroRuns);
    }

    #[test]
    fn counts_sum_to_runs_times_sample_size() {
        let report = run(&VerifyConfig::new(10, 3).with_runs(500)).expect("valid config");
        let total: u64 = report.counts().iter().sum();
        assert_eq!(total, 500 * 3);
        assert_eq!(report.stream_len(), 10);
        assert_eq!(report.runs(), 500);
        assert_eq!(report.capacity(), 3);
        assert_abs_diff_eq!(report.mean_appearances(), 150.0, epsilon = 1e-9);
    }

    #[test]
    fn short_stream_appears_in_every_run() {
        // n < k: every run keeps the whole stream.
        let report = run(&VerifyConfig::new(2, 5).with_runs(300)).expect("valid config");
        assert_eq!(report.counts(), &[300, 300]);
        assert_abs_diff_eq!(report.theoretical_probability(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.empirical_probability(0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.max_abs_deviation(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.std_dev_appearances(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn same_seed_gives_identical_reports() {
        let config = VerifyConfig::new(20, 5).with_runs(200).with_base_seed(7);
        let a = run(&config).expect("valid config");
        let b = run(&config).expect("valid config");
        assert_eq!(a.counts(), b.counts());
    }

    #[test]
    fn different_seeds_diverge() {
        let a = run(&VerifyConfig::new(50, 5).with_runs(200).with_base_seed(1_000))
            .expect("valid config");
        let b = run(&VerifyConfig::new(50, 5).with_runs(200).with_base_seed(2_000))
            .expect("valid config");
        assert_ne!(a.counts(), b.counts());
    }

    #[test]
    fn empirical_frequencies_stay_near_theoretical() {
        let report = run(&VerifyConfig::new(20, 5).with_runs(2_000)).expect("valid config");
        assert_abs_diff_eq!(report.theoretical_probability(), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(
            report.standard_error(),
            (0.25f64 * 0.75 / 2_000.0).sqrt(),
            epsilon = 1e-12
        );
        // 5 standard errors ~ 0.048; seeded, so not flaky either way.
        assert!(
            report.max_abs_deviation() < 5.0 * report.standard_error(),
            "max deviation {} too large",
            report.max_abs_deviation()
        );
    }
}
