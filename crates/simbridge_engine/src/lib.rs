//! # SIMBRIDGE Engine
//!
//! The contract between a host and an interchangeable simulation:
//!
//! - [`SimulationEngine`]: default config, initial state, one step
//! - [`Lifecycle`]: the state machine a host drives an engine through
//! - [`ffi`]: the same contract as three C symbols, in both directions
//!
//! ## Example
//!
//! ```rust
//! use simbridge_core::NegotiationLimits;
//! use simbridge_engine::{mock::MockEngine, Lifecycle, Phase};
//!
//! let mut lifecycle = Lifecycle::new(MockEngine::default(), NegotiationLimits::default());
//! lifecycle.configure().unwrap();
//! lifecycle.start().unwrap();
//! lifecycle.step(&[1, 2, 3]).unwrap();
//! assert_eq!(lifecycle.phase(), Phase::Running { step: 1 });
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod engine;
pub mod error;
pub mod ffi;
pub mod lifecycle;
pub mod mock;
pub mod payload;

pub use engine::SimulationEngine;
pub use error::{LifecycleError, LifecycleResult, Operation, Phase};
pub use ffi::{ForeignEngine, SimulationSymbols};
pub use lifecycle::Lifecycle;
pub use payload::{Configuration, State};
