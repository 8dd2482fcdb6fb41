//! Pull-based stream sources.
//!
//! A stream here is anything that can hand over its next element or signal
//! exhaustion: a counter, a file reader, a network feed. Consumption is
//! strictly forward, one pull per element, with no rewinding — restarting a
//! stream means constructing a new one.
//!
//! The trait is the explicit producer form of that contract, with pull
//! failures in the signature rather than hidden in generator sugar. Any
//! iterator of `Result`s (for example [`std::io::Lines`]) is a
//! [`StreamSource`] through the blanket impl; infallible iterators go
//! straight into the infallible drains
//! ([`sample`](crate::sample)/[`sample_with_rng`](crate::sample_with_rng))
//! without needing this trait at all.

/// A lazy sequence of elements, pulled one at a time.
///
/// `pull` returns `Ok(Some(item))` for the next element, `Ok(None)` once the
/// stream is exhausted, and `Err` when producing the next element fails. The
/// consumers in this crate stop at the first `Err` and never pull again
/// afterwards; what a failed or exhausted source returns on further pulls is
/// the source's own business (for the blanket impl it follows the underlying
/// iterator).
pub trait StreamSource {
    /// Element type produced by this stream.
    type Item;
    /// Failure produced while pulling the next element.
    type Error;

    /// Pulls the next element, or signals exhaustion with `Ok(None)`.
    fn pull(&mut self) -> Result<Option<Self::Item>, Self::Error>;
}

impl<T, E, I> StreamSource for I
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = T;
    type Error = E;

    #[inline]
    fn pull(&mut self) -> Result<Option<T>, E> {
        self.next().transpose()
    }
}
