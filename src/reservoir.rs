//! Reservoir sampling.
//!
//! Maintains a uniform random sample of fixed size `k` from a stream whose
//! length is unknown in advance and may be arbitrarily large, in O(k) memory
//! and a single forward pass.
//!
//! Uses **Algorithm R** (Vitter, 1985). For each element `x` at 1-based
//! stream position `i`:
//!
//! - Fill phase (`i <= k`): append `x` at slot `i - 1`.
//! - Replacement phase (`i > k`): draw `j` uniformly from the inclusive
//!   range `[1, i]`; if `j <= k`, overwrite slot `j - 1` with `x`, otherwise
//!   discard `x`.
//!
//! ## Why this is uniform
//!
//! At step `i > k` a new element is admitted with probability `k/i` (the
//! draw lands in `[1, k]` out of `i` equally likely values). An element
//! already resident in some slot is evicted at step `m` only when the draw
//! equals that slot's index, which happens with probability `1/m`
//! independent of which element occupies the slot. So an element that is
//! resident after step `i` survives through the end of an `n`-element stream
//! with probability
//!
//! ```text
//! (1 - 1/(i+1)) * (1 - 1/(i+2)) * ... * (1 - 1/n)
//!   = (i/(i+1)) * ((i+1)/(i+2)) * ... * ((n-1)/n)
//!   = i/n
//! ```
//!
//! The product telescopes. A replacement-phase element therefore ends up in
//! the final sample with probability `(k/i) * (i/n) = k/n`, and a fill-phase
//! element (admitted with probability 1) with probability `1 * (k/n)` by the
//! same product taken from step `k + 1`. Every element of the stream gets
//! exactly `k/n`, regardless of where it arrived, and conditioned on being
//! present it is equally likely to sit in any slot.
//!
//! ## Concurrency
//!
//! A traversal is strictly sequential and one sampler owns its reservoir, so
//! no concurrent mutation is possible. Sampling several independent streams
//! in parallel is fine as long as each traversal uses its own sampler and
//! either a private random source or one documented as safe for concurrent
//! use.
//!
//! ## Early termination
//!
//! If the caller stops feeding elements before the stream is exhausted, the
//! reservoir is a uniform sample of the elements seen *so far* only. It does
//! NOT satisfy the `k/n` guarantee for the full stream; resuming later with
//! the same sampler is fine, but handing off a truncated traversal's sample
//! as if it covered the whole stream is a caller bug.
//!
//! ## References
//!
//! - Vitter (1985): reservoir sampling, "Algorithm R".

use std::error::Error;

use rand::prelude::*;

use crate::error::{InvalidReservoirSize, RandomSourceError, SampleError};
use crate::rng::RandomSource;
use crate::stream::StreamSource;

/// A reservoir sampler that maintains a uniform sample of size `k` from a
/// stream.
///
/// The push API (`add*`) feeds one element at a time; the free functions
/// [`sample`], [`sample_with_rng`], [`try_sample`] and
/// [`try_sample_with_source`] drain a whole stream in one call.
#[derive(Debug, Clone)]
pub struct ReservoirSampler<T> {
    capacity: usize,
    seen: u64,
    samples: Vec<T>,
}

impl<T> ReservoirSampler<T> {
    /// Create a new sampler that keeps at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: 0,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Create a sampler from a signed capacity, for hosts whose `k` arrives
    /// as a signed integer (configs, CLIs, FFI).
    ///
    /// A negative `capacity` is rejected with [`InvalidReservoirSize`]
    /// before anything is pulled from any stream.
    pub fn with_signed_capacity(capacity: i64) -> Result<Self, InvalidReservoirSize> {
        let capacity = usize::try_from(capacity).map_err(|_| InvalidReservoirSize(capacity))?;
        Ok(Self::new(capacity))
    }

    /// Add an item from the stream, drawing from the thread-local RNG.
    ///
    /// Nondeterministic by design; use [`add_with_rng`](Self::add_with_rng)
    /// or [`add_with_source`](Self::add_with_source) for reproducible runs.
    ///
    /// If `capacity == 0`, this discards all items (but still counts them).
    #[inline]
    pub fn add(&mut self, item: T) {
        let mut rng = rand::rng();
        self.add_with_rng(item, &mut rng);
    }

    /// Add an item from the stream, using a caller-supplied RNG.
    #[inline]
    pub fn add_with_rng<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        match self.add_with_source(item, rng) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Add an item from the stream, using a caller-supplied
    /// [`RandomSource`].
    ///
    /// This is the decision rule itself; the other `add*` entry points
    /// delegate here. A draw failure aborts the step and surfaces verbatim;
    /// the element is not admitted and the position counter stays advanced.
    pub fn add_with_source<S>(&mut self, item: T, source: &mut S) -> Result<(), S::Error>
    where
        S: RandomSource + ?Sized,
    {
        self.seen += 1;

        if self.capacity == 0 {
            return Ok(());
        }

        // Fill phase: slots 0..k admit unconditionally.
        if self.samples.len() < self.capacity {
            self.samples.push(item);
            return Ok(());
        }

        // Replacement phase: admit with probability k/seen.
        let j = source.next_int(1, self.seen)?;
        if j <= self.capacity as u64 {
            self.samples[(j - 1) as usize] = item;
        }
        Ok(())
    }

    /// Get the current sample (size = min(seen, capacity)).
    ///
    /// Slot order reflects replacement history, not necessarily arrival
    /// order once the replacement phase has run.
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// Number of items observed so far (the 1-based position of the last
    /// element added).
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// The fixed capacity `k` this sampler was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consume the sampler and hand the final sample to the caller.
    pub fn into_sample(self) -> Vec<T> {
        self.samples
    }
}

/// Draw a uniform sample of up to `k` elements from `stream`, using the
/// thread-local RNG.
///
/// Nondeterministic by design; use [`sample_with_rng`] for reproducible
/// runs. If `k == 0` the stream is not pulled at all, so unbounded streams
/// are safe.
pub fn sample<I>(stream: I, k: usize) -> Vec<I::Item>
where
    I: IntoIterator,
{
    let mut rng = rand::rng();
    sample_with_rng(stream, k, &mut rng)
}

/// Draw a uniform sample of up to `k` elements from `stream`, using a
/// caller-supplied RNG.
///
/// Identical streams and identically seeded RNGs produce identical output.
/// If `k == 0` the stream is not pulled at all.
pub fn sample_with_rng<I, R>(stream: I, k: usize, rng: &mut R) -> Vec<I::Item>
where
    I: IntoIterator,
    R: Rng + ?Sized,
{
    if k == 0 {
        return Vec::new();
    }
    let mut sampler = ReservoirSampler::new(k);
    for item in stream {
        sampler.add_with_rng(item, rng);
    }
    sampler.into_sample()
}

/// Draw a uniform sample of up to `k` elements from a fallible
/// [`StreamSource`], using a caller-supplied RNG.
///
/// `k` is signed here: this is a boundary entry point, and a negative `k`
/// fails with [`SampleError::InvalidReservoirSize`] before the stream is
/// touched. A pull failure aborts the traversal immediately; the partially
/// filled reservoir is discarded, there is no partial-result contract.
pub fn try_sample<S, R>(
    mut stream: S,
    k: i64,
    rng: &mut R,
) -> Result<Vec<S::Item>, SampleError<S::Error>>
where
    S: StreamSource,
    S::Error: Error + 'static,
    R: Rng + ?Sized,
{
    let mut sampler = ReservoirSampler::with_signed_capacity(k)?;
    if sampler.capacity() == 0 {
        return Ok(sampler.into_sample());
    }
    loop {
        let pulled = stream.pull().map_err(|source| SampleError::Stream {
            position: sampler.seen() + 1,
            source,
        })?;
        match pulled {
            Some(item) => sampler.add_with_rng(item, rng),
            None => return Ok(sampler.into_sample()),
        }
    }
}

/// Draw a uniform sample of up to `k` elements from a fallible
/// [`StreamSource`], using a caller-supplied fallible [`RandomSource`].
///
/// Stream-pull and random-draw failures are treated identically: the
/// traversal aborts at once and the error carries the 1-based position at
/// which it occurred, with the original failure reachable via `source()`.
pub fn try_sample_with_source<S, Q>(
    mut stream: S,
    k: i64,
    source: &mut Q,
) -> Result<Vec<S::Item>, SampleError<S::Error>>
where
    S: StreamSource,
    S::Error: Error + 'static,
    Q: RandomSource + ?Sized,
    Q::Error: Error + Send + Sync + 'static,
{
    let mut sampler = ReservoirSampler::with_signed_capacity(k)?;
    if sampler.capacity() == 0 {
        return Ok(sampler.into_sample());
    }
    loop {
        let pulled = stream.pull().map_err(|source| SampleError::Stream {
            position: sampler.seen() + 1,
            source,
        })?;
        match pulled {
            Some(item) => {
                sampler
                    .add_with_source(item, source)
                    .map_err(|e| SampleError::RandomSource {
                        position: sampler.seen(),
                        source: RandomSourceError::new(e),
                    })?;
            }
            None => return Ok(sampler.into_sample()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::io;

    #[test]
    fn reservoir_keeps_k_items() {
        let mut s = ReservoirSampler::new(5);
        for i in 0..100 {
            s.add(i);
        }
        assert_eq!(s.samples().len(), 5);
        assert_eq!(s.seen(), 100);
        assert_eq!(s.capacity(), 5);
    }

    #[test]
    fn fill_phase_preserves_arrival_order() {
        // n < k: the whole stream, in order, no replacement ever runs.
        let mut s = ReservoirSampler::new(10);
        let mut source = ScriptedSource::new([]);
        for i in 0..4 {
            s.add_with_source(i, &mut source).expect("no draws expected");
        }
        assert_eq!(s.samples(), &[0, 1, 2, 3]);
        assert_eq!(source.calls(), &[]);
    }

    #[test]
    fn zero_capacity_discards_but_counts() {
        let mut s = ReservoirSampler::new(0);
        let mut source = ScriptedSource::new([]);
        for i in 0..25 {
            s.add_with_source(i, &mut source).expect("no draws expected");
        }
        assert!(s.samples().is_empty());
        assert_eq!(s.seen(), 25);
        assert_eq!(source.calls(), &[]);
    }

    #[test]
    fn scripted_trace_is_exact() {
        // Stream 0..10, k = 3. After the fill, reservoir = [0, 1, 2].
        // i=4: draw 2 from [1,4] -> overwrite slot 1 -> [0, 3, 2].
        // i=5: draw 5 from [1,5] -> 5 > k, discard  -> unchanged.
        // Remaining draws all land above k, so nothing else changes.
        let mut source = ScriptedSource::new([2, 5, 6, 7, 8, 9, 10]);
        let mut s = ReservoirSampler::new(3);

        for x in 0..3u64 {
            s.add_with_source(x, &mut source).expect("fill draws nothing");
        }
        assert_eq!(s.samples(), &[0, 1, 2]);

        s.add_with_source(3, &mut source).expect("scripted draw");
        assert_eq!(s.samples(), &[0, 3, 2]);

        s.add_with_source(4, &mut source).expect("scripted draw");
        assert_eq!(s.samples(), &[0, 3, 2]);

        for x in 5..10u64 {
            s.add_with_source(x, &mut source).expect("scripted draw");
        }
        assert_eq!(s.samples(), &[0, 3, 2]);
        assert_eq!(s.seen(), 10);
        assert_eq!(
            source.calls(),
            &[(1, 4), (1, 5), (1, 6), (1, 7), (1, 8), (1, 9), (1, 10)]
        );
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn scripted_draw_of_one_overwrites_slot_zero() {
        let mut source = ScriptedSource::new([1]);
        let mut s = ReservoirSampler::new(2);
        s.add_with_source('a', &mut source).expect("fill");
        s.add_with_source('b', &mut source).expect("fill");
        s.add_with_source('c', &mut source).expect("scripted draw");
        assert_eq!(s.samples(), &['c', 'b']);
    }

    #[test]
    fn with_signed_capacity_rejects_negative() {
        let err = ReservoirSampler::<u32>::with_signed_capacity(-1)
            .expect_err("negative capacity rejected");
        assert_eq!(err, InvalidReservoirSize(-1));

        let s = ReservoirSampler::<u32>::with_signed_capacity(7).expect("valid capacity");
        assert_eq!(s.capacity(), 7);
    }

    #[test]
    fn sample_short_stream_returns_it_whole() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = sample_with_rng(vec!["a", "b", "c"], 10, &mut rng);
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[test]
    fn sample_empty_stream_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out: Vec<u32> = sample_with_rng(std::iter::empty(), 5, &mut rng);
        assert!(out.is_empty());
    }

    #[test]
    fn sample_zero_capacity_never_pulls() {
        // An unbounded stream: terminates only because k == 0 short-circuits.
        let out = sample(0u64.., 0);
        assert!(out.is_empty());
    }

    #[test]
    fn sample_is_deterministic_under_a_seed() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        let a = sample_with_rng(0..1000u32, 17, &mut rng_a);
        let b = sample_with_rng(0..1000u32, 17, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn try_sample_propagates_stream_failure_with_position() {
        let stream = vec![
            Ok(1u32),
            Ok(2),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "feed cut off")),
        ]
        .into_iter();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = try_sample(stream, 2, &mut rng).expect_err("third pull fails");
        match err {
            SampleError::Stream { position, source } => {
                assert_eq!(position, 3);
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            }
            other => panic!("expected stream failure, got {other:?}"),
        }
    }

    #[test]
    fn try_sample_rejects_negative_capacity_before_pulling() {
        let mut pulled = 0usize;
        let stream = (0u32..).map(|i| {
            pulled += 1;
            Ok::<_, io::Error>(i)
        });
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = try_sample(stream, -4, &mut rng).expect_err("negative capacity rejected");
        assert!(matches!(
            err,
            SampleError::InvalidReservoirSize(InvalidReservoirSize(-4))
        ));
        assert_eq!(pulled, 0);
    }

    #[test]
    fn try_sample_zero_capacity_never_pulls_an_unbounded_stream() {
        let stream = (0u64..).map(Ok::<_, io::Error>);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = try_sample(stream, 0, &mut rng).expect("empty sample");
        assert!(out.is_empty());
    }

    #[test]
    fn try_sample_drains_a_fallible_stream() {
        let stream = (0u32..50).map(Ok::<_, io::Error>);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let out = try_sample(stream, 8, &mut rng).expect("no pull fails");
        assert_eq!(out.len(), 8);
        assert!(out.iter().all(|&x| x < 50));
    }

    #[test]
    fn try_sample_with_source_reproduces_the_trace() {
        let stream = (0u64..10).map(Ok::<_, io::Error>);
        let mut source = ScriptedSource::new([2, 5, 6, 7, 8, 9, 10]);
        let out = try_sample_with_source(stream, 3, &mut source).expect("scripted draws");
        assert_eq!(out, vec![0, 3, 2]);
    }

    #[test]
    fn try_sample_with_source_propagates_draw_failure_with_position() {
        struct FailingSource;
        impl crate::rng::RandomSource for FailingSource {
            type Error = io::Error;
            fn next_int(&mut self, _low: u64, _high: u64) -> Result<u64, io::Error> {
                Err(io::Error::other("entropy pool closed"))
            }
        }

        let stream = (0u32..10).map(Ok::<_, io::Error>);
        let mut source = FailingSource;
        let err = try_sample_with_source(stream, 3, &mut source)
            .expect_err("first post-fill draw fails");
        match err {
            SampleError::RandomSource { position, source } => {
                // The first draw happens at the first post-fill element.
                assert_eq!(position, 4);
                assert!(source.into_inner().downcast_ref::<io::Error>().is_some());
            }
            other => panic!("expected random source failure, got {other:?}"),
        }
    }

    #[test]
    fn reservoir_distribution_uniform() {
        // Deterministic chi-squared smoke test for "looks roughly uniform".
        //
        // This is not a proof, but it catches egregious bugs (e.g. biased
        // replacement index, off-by-one in stream counting) without being flaky.
        let n = 100;
        let k = 10;
        let trials = 10_000;
        let mut counts = vec![0; n];

        for t in 0..trials {
            let mut rng = ChaCha8Rng::seed_from_u64(t as u64);
            let out = sample_with_rng(0..n, k, &mut rng);
            for item in out {
                counts[item] += 1;
            }
        }

        let expected = trials as f64 * (k as f64 / n as f64); // E[count_i]
        let chi2: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                (diff * diff) / expected
            })
            .sum();

        // df = n-1 = 99; E[chi2] ~ df, Var ~ 2*df.
        // Use a conservative cutoff to avoid false positives.
        assert!(
            chi2 < 250.0,
            "chi2 too large (chi2={chi2:.2}, expected~{}). counts={counts:?}",
            n - 1
        );
    }
}
