//! `cistern`: single-pass uniform sampling from data streams.
//!
//! Draws a uniform random sample of fixed size `k` from a stream of unknown
//! or unbounded length `n` in O(k) memory and one forward pass, with no
//! rewinding — reservoir sampling, Algorithm R (Vitter, 1985). After a full
//! traversal every element of the stream has probability exactly `k/n` of
//! being in the sample; see the `reservoir` module docs for the proof.
//!
//! Exposed modules:
//! - `reservoir`: the sampler itself, push API plus one-shot stream drains.
//! - `stream`: the pull-based `StreamSource` trait for fallible streams.
//! - `rng`: the `RandomSource` trait (injected randomness) and a scripted
//!   test double.
//! - `error`: the error taxonomy for fallible traversals.
//! - `verify`: a many-runs statistical harness that checks the uniformity
//!   guarantee black-box; an optional confirmation tool, not part of the
//!   core contract.
//!
//! Randomness is always injected (thread-local only as an explicit
//! convenience), so seeded runs are reproducible and concurrent samplers
//! share no hidden state. Sampling independent streams in parallel is safe
//! when each traversal has its own sampler and its own random source.

#![forbid(unsafe_code)]

pub mod error;
pub mod reservoir;
pub mod rng;
pub mod stream;
pub mod verify;

pub use error::{InvalidReservoirSize, RandomSourceError, SampleError};
pub use reservoir::{
    sample, sample_with_rng, try_sample, try_sample_with_source, ReservoirSampler,
};
pub use rng::{RandomSource, ScriptedSource};
pub use stream::StreamSource;
pub use verify::{VerifyConfig, VerifyError, VerifyReport};
