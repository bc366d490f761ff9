//! # Negotiator
//!
//! Host-side driver for the two-phase size discovery.
//!
//! ```text
//! attempt(capacity) ──► Complete ─────────────► Ok(len)
//!        │
//!        ├─► Fatal ───────────────────────────► Err(Fatal)
//!        │
//!        └─► Grow / GrowOnSuccess(required)
//!               │
//!               ├─ already retried? ──────────► Err(RepeatedGrowth)
//!               ├─ required > limit? ─────────► Err(CapacityLimit)
//!               └─ grow buffer, attempt again (identical inputs)
//! ```
//!
//! The retry is the identical logical call: the closure captures the
//! inputs and only the output buffer changes between attempts.

use crate::buffer::ByteBuffer;
use crate::error::{ProtocolError, ProtocolResult};
use crate::outcome::Outcome;

/// Default capacity offered on a fresh buffer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Default upper bound on any single payload (64 MiB).
pub const DEFAULT_MAX_CAPACITY: usize = 64 * 1024 * 1024;

/// Bounds applied to every negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NegotiationLimits {
    /// Capacity a freshly created buffer offers.
    pub initial_capacity: usize,
    /// Largest capacity the caller agrees to allocate.
    pub max_capacity: usize,
}

impl Default for NegotiationLimits {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

/// Counters accumulated across negotiations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NegotiationStats {
    /// Negotiations started.
    pub calls: u64,
    /// Sized retries performed.
    pub growth_retries: u64,
    /// Negotiations that ended in an error.
    pub failures: u64,
    /// Payload bytes delivered by successful negotiations.
    pub bytes_delivered: u64,
}

/// Runs boundary calls under the negotiation protocol.
#[derive(Clone, Debug, Default)]
pub struct Negotiator {
    limits: NegotiationLimits,
    stats: NegotiationStats,
}

impl Negotiator {
    /// Creates a negotiator with the given limits.
    #[must_use]
    pub fn new(limits: NegotiationLimits) -> Self {
        Self {
            limits,
            stats: NegotiationStats::default(),
        }
    }

    /// Returns the configured limits.
    #[inline]
    #[must_use]
    pub const fn limits(&self) -> NegotiationLimits {
        self.limits
    }

    /// Returns the accumulated statistics.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> NegotiationStats {
        self.stats
    }

    /// Creates a buffer offering the configured initial capacity.
    #[must_use]
    pub fn buffer(&self) -> ByteBuffer {
        ByteBuffer::with_capacity(self.limits.initial_capacity.min(self.limits.max_capacity))
    }

    /// Runs `call` against `buf` until it completes or fails for good.
    ///
    /// `call` receives the full capacity of `buf` and must behave as the
    /// same logical call every time it is invoked. On success the payload
    /// is committed in `buf` and its length returned.
    ///
    /// # Errors
    ///
    /// Any [`ProtocolError`]; the buffer holds no payload afterwards.
    pub fn negotiate<F>(&mut self, buf: &mut ByteBuffer, call: F) -> ProtocolResult<usize>
    where
        F: FnMut(&mut [u8]) -> Outcome,
    {
        self.stats.calls += 1;
        match self.run(buf, call) {
            Ok(len) => {
                self.stats.bytes_delivered += len as u64;
                Ok(len)
            }
            Err(err) => {
                self.stats.failures += 1;
                buf.clear();
                Err(err)
            }
        }
    }

    fn run<F>(&mut self, buf: &mut ByteBuffer, mut call: F) -> ProtocolResult<usize>
    where
        F: FnMut(&mut [u8]) -> Outcome,
    {
        let mut retried = false;
        loop {
            let offered = buf.capacity() as u64;
            let outcome = call(buf.writable()).checked(offered)?;

            let required = match outcome {
                Outcome::Complete { len } => {
                    let len = len as usize;
                    buf.commit(len)?;
                    return Ok(len);
                }
                Outcome::Fatal => return Err(ProtocolError::Fatal),
                Outcome::Grow { required } | Outcome::GrowOnSuccess { required } => required,
            };

            if retried {
                tracing::warn!(required, offered, "callee requested growth twice");
                return Err(ProtocolError::RepeatedGrowth { required, offered });
            }

            let limit = self.limits.max_capacity;
            let needed = usize::try_from(required)
                .ok()
                .filter(|&n| n <= limit)
                .ok_or(ProtocolError::CapacityLimit {
                    required,
                    limit: limit as u64,
                })?;

            tracing::debug!(
                required,
                offered,
                on_success = outcome.reports_success(),
                "growing buffer for retry"
            );
            buf.ensure_capacity(needed);
            retried = true;
            self.stats.growth_retries += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{deliver, Delivery};

    fn limits(initial: usize, max: usize) -> NegotiationLimits {
        NegotiationLimits {
            initial_capacity: initial,
            max_capacity: max,
        }
    }

    #[test]
    fn test_fits_first_time() {
        let mut neg = Negotiator::default();
        let mut buf = neg.buffer();
        let len = neg
            .negotiate(&mut buf, |out| deliver(b"hello", out, Delivery::Strict))
            .unwrap();
        assert_eq!(len, 5);
        assert_eq!(buf.payload(), b"hello");
        assert_eq!(neg.stats().growth_retries, 0);
    }

    #[test]
    fn test_grows_once_for_both_growth_flavours() {
        for delivery in [Delivery::Strict, Delivery::Announce] {
            let mut neg = Negotiator::new(limits(0, 1024));
            let mut buf = neg.buffer();
            let payload = [3u8; 100];
            let len = neg
                .negotiate(&mut buf, |out| deliver(&payload, out, delivery))
                .unwrap();
            assert_eq!(len, 100);
            assert_eq!(buf.capacity(), 100);
            assert_eq!(neg.stats().growth_retries, 1);
        }
    }

    #[test]
    fn test_fatal_is_not_retried() {
        let mut neg = Negotiator::default();
        let mut buf = neg.buffer();
        let mut attempts = 0;
        let err = neg
            .negotiate(&mut buf, |_| {
                attempts += 1;
                Outcome::Fatal
            })
            .unwrap_err();
        assert_eq!(err, ProtocolError::Fatal);
        assert_eq!(attempts, 1);
        assert_eq!(neg.stats().failures, 1);
    }

    #[test]
    fn test_second_growth_request_is_fatal() {
        let mut neg = Negotiator::new(limits(4, 1024));
        let mut buf = neg.buffer();
        let err = neg
            .negotiate(&mut buf, |out| Outcome::Grow {
                required: out.len() as u64 * 2,
            })
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::RepeatedGrowth {
                required: 16,
                offered: 8
            }
        );
    }

    #[test]
    fn test_capacity_limit() {
        let mut neg = Negotiator::new(limits(4, 64));
        let mut buf = neg.buffer();
        let err = neg
            .negotiate(&mut buf, |_| Outcome::Grow { required: 65 })
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::CapacityLimit {
                required: 65,
                limit: 64
            }
        );
        assert_eq!(buf.capacity(), 4);
    }

    #[test]
    fn test_overrun_and_bogus_growth_are_rejected() {
        let mut neg = Negotiator::new(limits(8, 64));
        let mut buf = neg.buffer();
        assert!(matches!(
            neg.negotiate(&mut buf, |_| Outcome::Complete { len: 9 }),
            Err(ProtocolError::Overrun { .. })
        ));
        assert!(matches!(
            neg.negotiate(&mut buf, |_| Outcome::GrowOnSuccess { required: 8 }),
            Err(ProtocolError::BogusGrowth { .. })
        ));
    }

    #[test]
    fn test_failure_clears_previous_payload() {
        let mut neg = Negotiator::default();
        let mut buf = neg.buffer();
        neg.negotiate(&mut buf, |out| deliver(b"abc", out, Delivery::Strict))
            .unwrap();
        let _ = neg.negotiate(&mut buf, |_| Outcome::Fatal);
        assert!(buf.payload().is_empty());
    }
}
