//! # SIMBRIDGE Sims
//!
//! Two reference simulations that speak the engine contract, and the
//! interpreters that draw them.
//!
//! | Engine   | Delivery   | State                              |
//! |----------|------------|------------------------------------|
//! | `bounce` | `Strict`   | header + fixed-point particles     |
//! | `life`   | `Announce` | header + one byte per torus cell   |
//!
//! Both engines are deterministic: configurations carry the RNG seed, and
//! a step is integer arithmetic over the previous state.
//!
//! ## Example
//!
//! ```rust
//! use simbridge_core::NegotiationLimits;
//! use simbridge_engine::Lifecycle;
//! use simbridge_render::Canvas;
//! use simbridge_sims::EngineKind;
//!
//! let plugin = EngineKind::Life.build();
//! let mut lifecycle = Lifecycle::new(plugin.engine, NegotiationLimits::default());
//! lifecycle.configure().unwrap();
//! lifecycle.start().unwrap();
//! lifecycle.step(&[]).unwrap();
//!
//! let mut canvas = Canvas::new(384, 256);
//! let summary = plugin
//!     .interpreter
//!     .draw(
//!         lifecycle.config().unwrap().as_bytes(),
//!         lifecycle.state().unwrap().as_bytes(),
//!         &mut canvas,
//!     )
//!     .unwrap();
//! assert_eq!(summary.step, 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bounce;
pub mod error;
pub mod layout;
pub mod life;
pub mod registry;
pub mod view;

pub use bounce::{BounceConfig, BounceEngine};
pub use error::{InterpretError, InterpretResult};
pub use life::{LifeConfig, LifeEngine};
pub use registry::{EngineKind, SimulationPlugin, UnknownEngine};
pub use view::{BounceView, FrameSummary, LifeView, StateInterpreter};
