//! # Protocol Error Types
//!
//! Everything that can end a negotiation. None of these are retryable:
//! the only recoverable condition (a single growth request) is handled
//! inside the [`Negotiator`](crate::Negotiator) and never surfaces.

use thiserror::Error;

/// Errors that terminate a buffer negotiation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The callee failed without asking for more room.
    #[error("callee reported an unrecoverable failure")]
    Fatal,

    /// The callee asked for more room again after a sized retry.
    #[error("callee requested growth again after a sized retry: wanted {required} bytes, offered {offered}")]
    RepeatedGrowth {
        /// Capacity requested by the second growth request.
        required: u64,
        /// Capacity offered on the retry.
        offered: u64,
    },

    /// The requested capacity is larger than the caller is willing to allocate.
    #[error("requested capacity {required} exceeds the limit of {limit} bytes")]
    CapacityLimit {
        /// Capacity requested by the callee.
        required: u64,
        /// Configured upper bound.
        limit: u64,
    },

    /// The callee claimed success with more bytes than the buffer holds.
    #[error("callee reported {len} bytes written into a {capacity}-byte buffer")]
    Overrun {
        /// Reported payload length.
        len: u64,
        /// Capacity that was offered.
        capacity: u64,
    },

    /// The callee requested growth to a size that was already offered.
    #[error("callee requested {required} bytes while {offered} were already offered")]
    BogusGrowth {
        /// Capacity requested.
        required: u64,
        /// Capacity that was offered.
        offered: u64,
    },
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
