//! Request pacing.
//!
//! PubChem allows a fixed number of requests per second. [`Throttled`] wraps any
//! [`CompoundDatabase`] and keeps at least `1 / requests_per_second` between the start of
//! consecutive requests. Searches and fetches are paced alike, and failed requests count
//! against the budget the same as successful ones.

use drugchem_pubchem::{CompoundDatabase, PubChemResult, Record};
use drugchem_types::{ExternalId, LookupTerm, RecordKind};
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Minimum-interval pacer.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Cell<Option<Instant>>,
}

impl RateLimiter {
    /// Pacer allowing `requests_per_second` requests per second.
    ///
    /// Non-finite or non-positive rates disable pacing. A rate so small that its interval
    /// overflows `Duration` saturates to `Duration::MAX`. Configuration validation rejects
    /// both before a limiter is built.
    pub fn per_second(requests_per_second: f64) -> Self {
        let interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            interval_for_rate(requests_per_second).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self::with_interval(interval)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Cell::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the next request may start.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_request.get() {
            Some(last) => self.interval.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Block until the next request may start, then mark it started.
    pub fn wait(&self) {
        let pause = self.remaining(Instant::now());
        if !pause.is_zero() {
            tracing::trace!("throttling for {:?}", pause);
            std::thread::sleep(pause);
        }
        self.last_request.set(Some(Instant::now()));
    }
}

/// Spacing between request starts for `requests_per_second`, or `None` when the rate is not
/// positive and finite or the spacing does not fit in a `Duration`.
pub fn interval_for_rate(requests_per_second: f64) -> Option<Duration> {
    if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / requests_per_second).ok()
}

/// A [`CompoundDatabase`] whose requests are paced by a [`RateLimiter`].
#[derive(Debug)]
pub struct Throttled<D> {
    inner: D,
    limiter: RateLimiter,
}

impl<D: CompoundDatabase> Throttled<D> {
    pub fn new(inner: D, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: CompoundDatabase> CompoundDatabase for Throttled<D> {
    fn search(&self, kind: RecordKind, term: &LookupTerm) -> PubChemResult<Vec<ExternalId>> {
        self.limiter.wait();
        self.inner.search(kind, term)
    }

    fn fetch(&self, kind: RecordKind, id: ExternalId) -> PubChemResult<Record> {
        self.limiter.wait();
        self.inner.fetch(kind, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_rate() {
        assert_eq!(
            RateLimiter::per_second(5.0).interval(),
            Duration::from_millis(200)
        );
        assert_eq!(RateLimiter::per_second(0.0).interval(), Duration::ZERO);
        assert_eq!(RateLimiter::per_second(f64::NAN).interval(), Duration::ZERO);
    }

    #[test]
    fn test_tiny_rate_does_not_overflow() {
        assert_eq!(interval_for_rate(1e-20), None);
        assert_eq!(RateLimiter::per_second(1e-20).interval(), Duration::MAX);
        assert_eq!(interval_for_rate(0.5), Some(Duration::from_secs(2)));
        assert_eq!(interval_for_rate(0.0), None);
    }

    #[test]
    fn test_first_request_is_not_delayed() {
        let limiter = RateLimiter::with_interval(Duration::from_secs(60));
        assert_eq!(limiter.remaining(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_remaining_counts_down_from_last_request() {
        let limiter = RateLimiter::with_interval(Duration::from_secs(60));
        limiter.wait();
        let now = Instant::now();
        let remaining = limiter.remaining(now);
        assert!(remaining > Duration::from_secs(59));
        assert!(remaining <= Duration::from_secs(60));
        assert_eq!(
            limiter.remaining(now + Duration::from_secs(61)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_wait_spaces_consecutive_requests() {
        let limiter = RateLimiter::with_interval(Duration::from_millis(30));
        let start = Instant::now();
        limiter.wait();
        limiter.wait();
        limiter.wait();
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
