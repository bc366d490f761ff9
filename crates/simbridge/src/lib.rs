//! # SIMBRIDGE Host
//!
//! Everything a host needs to run an interchangeable simulation:
//!
//! - [`HostConfig`]: which engine, how many steps, what input, where to
//!   write the replay
//! - [`Session`]: boot, advance, draw, recover
//! - [`Replay`]: a compact, checksummed record of a lineage that can be
//!   verified by re-running it
//!
//! ## Example
//!
//! ```rust
//! use simbridge::{HostConfig, Session};
//! use simbridge_render::Canvas;
//!
//! let config = HostConfig::from_toml_str("engine = \"bounce\"\nsteps = 5").unwrap();
//! let mut session = Session::from_config(&config).unwrap();
//! let mut canvas = Canvas::new(config.viewport.width, config.viewport.height);
//!
//! session.boot().unwrap();
//! let summary = session.run(config.steps, &mut canvas).unwrap();
//! assert_eq!(summary.last_frame.step, 5);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod replay;
pub mod session;

pub use config::{HostConfig, InputConfig, NegotiationConfig, ViewportConfig};
pub use error::{ConfigError, HostError, HostResult, ReplayError, ReplayResult};
pub use history::StateHistory;
pub use input::{InputSource, ScriptedInput, SilentInput};
pub use replay::Replay;
pub use session::{RunSummary, Session};
