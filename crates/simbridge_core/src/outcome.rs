//! # Call Outcomes
//!
//! Every boundary call answers with one boolean and one overloaded length
//! cell. That pair encodes four outcomes:
//!
//! ```text
//!                    returned <= offered        returned > offered
//!                 ┌─────────────────────────┬─────────────────────────┐
//!   ok == true    │ Complete { len }        │ GrowOnSuccess { req }   │
//!                 ├─────────────────────────┼─────────────────────────┤
//!   ok == false   │ Fatal                   │ Grow { req }            │
//!                 └─────────────────────────┴─────────────────────────┘
//! ```
//!
//! Internal code only ever works with [`Outcome`]. The flat pair exists at
//! the C boundary and nowhere else.

use crate::error::{ProtocolError, ProtocolResult};

/// Tagged result of a single boundary call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The payload fits; the first `len` bytes of the buffer hold it.
    Complete {
        /// Payload length in bytes.
        len: u64,
    },
    /// The call "succeeded" but wants a bigger buffer. Nothing was written.
    GrowOnSuccess {
        /// Capacity needed for the retry.
        required: u64,
    },
    /// Unrecoverable failure, independent of capacity.
    Fatal,
    /// Not enough room. Nothing was written.
    Grow {
        /// Capacity needed for the retry.
        required: u64,
    },
}

impl Outcome {
    /// Classifies the flat `(ok, *len)` convention.
    ///
    /// `offered` is the value of the length cell on entry, `returned` the
    /// value on exit.
    #[inline]
    #[must_use]
    pub const fn from_raw(ok: bool, offered: u64, returned: u64) -> Self {
        let oversize = returned > offered;
        match (ok, oversize) {
            (true, false) => Self::Complete { len: returned },
            (true, true) => Self::GrowOnSuccess { required: returned },
            (false, false) => Self::Fatal,
            (false, true) => Self::Grow { required: returned },
        }
    }

    /// Flattens to the `(ok, *len)` convention.
    ///
    /// `Fatal` writes a zero length, which is never larger than any offer.
    #[inline]
    #[must_use]
    pub const fn into_raw(self) -> (bool, u64) {
        match self {
            Self::Complete { len } => (true, len),
            Self::GrowOnSuccess { required } => (true, required),
            Self::Fatal => (false, 0),
            Self::Grow { required } => (false, required),
        }
    }

    /// Capacity the callee asked for, if this is a growth request.
    #[inline]
    #[must_use]
    pub const fn required_capacity(self) -> Option<u64> {
        match self {
            Self::GrowOnSuccess { required } | Self::Grow { required } => Some(required),
            Self::Complete { .. } | Self::Fatal => None,
        }
    }

    /// Returns true for either growth request.
    #[inline]
    #[must_use]
    pub const fn is_growth(self) -> bool {
        self.required_capacity().is_some()
    }

    /// Value of the boolean flag this outcome flattens to.
    #[inline]
    #[must_use]
    pub const fn reports_success(self) -> bool {
        matches!(self, Self::Complete { .. } | Self::GrowOnSuccess { .. })
    }

    /// Checks the outcome against the capacity that was offered.
    ///
    /// A tagged outcome can express things the flat form cannot: a
    /// completed payload larger than the buffer, or a growth request that
    /// does not actually grow. Both are callee bugs.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Overrun`] or [`ProtocolError::BogusGrowth`].
    pub const fn checked(self, offered: u64) -> ProtocolResult<Self> {
        match self {
            Self::Complete { len } if len > offered => Err(ProtocolError::Overrun {
                len,
                capacity: offered,
            }),
            Self::GrowOnSuccess { required } | Self::Grow { required } if required <= offered => {
                Err(ProtocolError::BogusGrowth { required, offered })
            }
            other => Ok(other),
        }
    }
}

/// How a callee reports a payload that does not fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// Failure flag plus the required size.
    #[default]
    Strict,
    /// Success flag plus the required size.
    Announce,
}

impl Delivery {
    /// Outcome used when `required` bytes do not fit.
    #[inline]
    #[must_use]
    pub const fn shortfall(self, required: u64) -> Outcome {
        match self {
            Self::Strict => Outcome::Grow { required },
            Self::Announce => Outcome::GrowOnSuccess { required },
        }
    }
}

/// Copies `payload` into `out` when it fits.
///
/// When it does not fit, `out` is left untouched and a growth request for
/// `payload.len()` bytes is returned.
#[inline]
pub fn deliver(payload: &[u8], out: &mut [u8], delivery: Delivery) -> Outcome {
    deliver_with(payload.len(), out, delivery, |dst| dst.copy_from_slice(payload))
}

/// Lets `fill` write exactly `required` bytes into `out` when they fit.
///
/// `fill` receives a slice of length `required` and is not called at all
/// on a shortfall.
#[inline]
pub fn deliver_with<F>(required: usize, out: &mut [u8], delivery: Delivery, fill: F) -> Outcome
where
    F: FnOnce(&mut [u8]),
{
    let wire_len = required as u64;
    if required > out.len() {
        return delivery.shortfall(wire_len);
    }
    fill(&mut out[..required]);
    Outcome::Complete { len: wire_len }
}
