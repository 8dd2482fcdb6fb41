//! Error types for stream sampling.
//!
//! A traversal can fail in exactly three ways, and all of them surface to the
//! caller — a silently degraded reservoir would break the uniformity
//! guarantee without any signal:
//!
//! - [`InvalidReservoirSize`]: the requested capacity cannot be used.
//!   Capacities are `usize` throughout the crate, so the typed constructors
//!   rule this out statically; it is produced by
//!   [`ReservoirSampler::with_signed_capacity`](crate::ReservoirSampler::with_signed_capacity),
//!   the boundary for hosts whose `k` arrives as a signed integer. Rejected
//!   before anything is pulled from the stream.
//! - [`SampleError::Stream`]: pulling the next element failed. The traversal
//!   aborts immediately; the partially filled reservoir is discarded and the
//!   original error is preserved via `source()`.
//! - [`SampleError::RandomSource`]: drawing a replacement index failed.
//!   Treated identically to a stream failure.
//!
//! No retries happen inside this crate. Retry policy, if wanted, belongs to
//! the caller and operates at the level of re-running the whole traversal
//! with a fresh stream.

use std::error::Error;
use std::fmt;

/// A reservoir capacity that cannot be used.
///
/// Carries the rejected value. Produced before any stream consumption.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid reservoir size {0}")]
pub struct InvalidReservoirSize(pub i64);

/// Failure reported by a fallible [`RandomSource`](crate::RandomSource).
///
/// Generators backed by [`rand::Rng`] cannot fail, so this only ever wraps
/// errors from sources with a real failure mode (an external entropy device,
/// a test double injecting faults). The wrapped error is reachable through
/// [`source()`](Error::source) and [`RandomSourceError::into_inner`].
#[derive(Debug)]
pub struct RandomSourceError(Box<dyn Error + Send + Sync>);

impl RandomSourceError {
    /// Wraps an arbitrary source failure.
    pub fn new<E>(source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Box::new(source))
    }

    /// Returns the underlying failure.
    pub fn into_inner(self) -> Box<dyn Error + Send + Sync> {
        self.0
    }
}

impl fmt::Display for RandomSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "random source failure: {}", self.0)
    }
}

impl Error for RandomSourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let inner: &(dyn Error + 'static) = &*self.0;
        Some(inner)
    }
}

/// Error type for the fallible one-shot drains.
///
/// `E` is the stream's own error type; it is propagated verbatim inside
/// [`SampleError::Stream`] together with the 1-based position of the element
/// whose pull failed. There is no partial-result contract: on any error the
/// reservoir built so far is dropped.
#[derive(Debug, thiserror::Error)]
pub enum SampleError<E>
where
    E: Error + 'static,
{
    /// The requested capacity was rejected before touching the stream.
    #[error(transparent)]
    InvalidReservoirSize(#[from] InvalidReservoirSize),

    /// Pulling element `position` from the stream failed.
    #[error("stream failure pulling element {position}")]
    Stream {
        /// 1-based stream position of the element whose pull failed.
        position: u64,
        /// The stream's error, unchanged.
        #[source]
        source: E,
    },

    /// Drawing the replacement index for element `position` failed.
    #[error("random source failure at element {position}")]
    RandomSource {
        /// 1-based stream position of the element being considered.
        position: u64,
        /// The random source's error.
        #[source]
        source: RandomSourceError,
    },
}
