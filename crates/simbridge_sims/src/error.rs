//! Errors raised while decoding simulation bytes.
//!
//! Engines collapse every one of these into [`Outcome::Fatal`] at the
//! protocol boundary; interpreters hand them to the host unchanged.
//!
//! [`Outcome::Fatal`]: simbridge_core::Outcome::Fatal

use thiserror::Error;

/// Result alias for decoding and drawing.
pub type InterpretResult<T> = Result<T, InterpretError>;

/// Configuration or state bytes that cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    /// Configuration has the wrong size, magic, or a value out of range.
    #[error("{engine} configuration is invalid: {reason}")]
    InvalidConfig {
        /// Engine that rejected it.
        engine: &'static str,
        /// What was wrong.
        reason: &'static str,
    },

    /// State bytes are truncated or structurally wrong.
    #[error("{engine} state is invalid: {reason}")]
    InvalidState {
        /// Engine that rejected it.
        engine: &'static str,
        /// What was wrong.
        reason: &'static str,
    },

    /// State was produced under a different configuration.
    #[error("{engine} state does not belong to this configuration")]
    LineageMismatch {
        /// Engine that detected it.
        engine: &'static str,
    },

    /// Step input has a shape the engine does not accept.
    #[error("{engine} input of {len} bytes is invalid")]
    InvalidInput {
        /// Engine that rejected it.
        engine: &'static str,
        /// Input length.
        len: usize,
    },
}
