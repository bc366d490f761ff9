//! # SIMBRIDGE Core
//!
//! The buffer negotiation protocol: how a callee hands a variable-length
//! opaque payload back through a buffer whose capacity the caller picked
//! without knowing the size in advance.
//!
//! ## Protocol Rules
//!
//! 1. **Caller owns memory** - the callee never keeps a reference past return
//! 2. **No partial writes** - a growth request means the buffer is untouched
//! 3. **Grow once** - a second growth request for the same call is fatal
//! 4. **Fatal means abort** - never retry a failure that did not ask for room
//!
//! ## Example
//!
//! ```rust
//! use simbridge_core::{deliver, Delivery, Negotiator, NegotiationLimits};
//!
//! let mut negotiator = Negotiator::new(NegotiationLimits {
//!     initial_capacity: 0,
//!     max_capacity: 1024,
//! });
//! let mut buf = negotiator.buffer();
//!
//! // First attempt offers 0 bytes, the callee asks for 5, the retry fits.
//! let len = negotiator
//!     .negotiate(&mut buf, |out| deliver(b"state", out, Delivery::Strict))
//!     .unwrap();
//! assert_eq!(&buf.payload()[..len], b"state");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod buffer;
pub mod error;
pub mod negotiator;
pub mod outcome;

pub use buffer::ByteBuffer;
pub use error::{ProtocolError, ProtocolResult};
pub use negotiator::{
    NegotiationLimits, NegotiationStats, Negotiator, DEFAULT_INITIAL_CAPACITY,
    DEFAULT_MAX_CAPACITY,
};
pub use outcome::{deliver, deliver_with, Delivery, Outcome};
