//! Random integer sources.
//!
//! The sampler draws exactly one integer per post-fill element: uniform over
//! the inclusive range `[1, i]` at stream position `i`. [`RandomSource`] is
//! that single operation, kept behind a trait so callers can swap in a
//! seeded generator for reproducible runs or a scripted double for
//! exact-trace tests.
//!
//! Every [`rand::Rng`] is a `RandomSource` through the blanket impl, so
//! thread-local, [`StdRng`](rand::rngs::StdRng) and
//! `ChaCha8Rng`-style generators all plug in unchanged. The blanket impl
//! delegates range reduction to [`Rng::random_range`], which is unbiased;
//! a hand-rolled modulo here would quietly skew the very distribution the
//! sampler exists to guarantee.
//!
//! Uniformity is a trust boundary: the sampler cannot detect a biased
//! source, it can only propagate one that fails outright.

use std::collections::VecDeque;
use std::convert::Infallible;

use rand::Rng;

/// Supplies uniformly distributed integers from an inclusive range.
///
/// `next_int(low, high)` must return every value in `[low, high]` with equal
/// probability. Sources that can fail (an external entropy device, a fault
/// injecting double) report through their [`Error`](RandomSource::Error)
/// type; generators backed by [`rand::Rng`] use [`Infallible`].
pub trait RandomSource {
    /// Failure type for a draw. [`Infallible`] for `rand`-backed sources.
    type Error;

    /// Draws uniformly from the inclusive range `[low, high]`.
    ///
    /// Callers must pass `low <= high`; the range is never empty in this
    /// crate (the sampler draws from `[1, i]` with `i >= 1`).
    fn next_int(&mut self, low: u64, high: u64) -> Result<u64, Self::Error>;
}

impl<R: Rng + ?Sized> RandomSource for R {
    type Error = Infallible;

    #[inline]
    fn next_int(&mut self, low: u64, high: u64) -> Result<u64, Infallible> {
        Ok(self.random_range(low..=high))
    }
}

/// A [`RandomSource`] that replays a fixed sequence of draw values.
///
/// Exists for tests that pin the sampler's behavior draw by draw, the way
/// `rand` ships `rngs::mock::StepRng` for the raw-word level. Every call is
/// recorded, so a test can also assert which ranges the algorithm requested:
///
/// ```
/// use cistern::rng::{RandomSource, ScriptedSource};
///
/// let mut source = ScriptedSource::new([2, 5]);
/// assert_eq!(source.next_int(1, 4), Ok(2));
/// assert_eq!(source.next_int(1, 5), Ok(5));
/// assert_eq!(source.calls(), &[(1, 4), (1, 5)]);
/// ```
///
/// # Panics
///
/// `next_int` panics when the script is exhausted: a scripted test that
/// draws more often than expected is a failing test, not a recoverable
/// condition.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: VecDeque<u64>,
    calls: Vec<(u64, u64)>,
}

impl ScriptedSource {
    /// Creates a source that returns `values` in order.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        Self {
            values: values.into_iter().collect(),
            calls: Vec::new(),
        }
    }

    /// The `(low, high)` range of every draw requested so far, in order.
    pub fn calls(&self) -> &[(u64, u64)] {
        &self.calls
    }

    /// Number of scripted values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedSource {
    type Error = Infallible;

    fn next_int(&mut self, low: u64, high: u64) -> Result<u64, Infallible> {
        self.calls.push((low, high));
        match self.values.pop_front() {
            Some(value) => Ok(value),
            None => panic!(
                "scripted random source exhausted after {} draws (requested [{low}, {high}])",
                self.calls.len() - 1
            ),
        }
    }
}
