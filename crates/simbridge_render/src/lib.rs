//! # SIMBRIDGE Render
//!
//! The drawing side of the bridge. A simulation never renders on its own:
//! it is handed a sink and issues six primitives against it.
//!
//! - [`RenderSink`]: the contract, as a Rust trait
//! - [`RendererTable`]: the same contract as a C function-pointer table
//! - [`Canvas`]: software RGBA8 target used by headless hosts and tests
//! - [`CommandRecorder`]: records calls for inspection and replay
//!
//! ## Example
//!
//! ```rust
//! use simbridge_render::{Canvas, Color, RenderSink};
//!
//! let mut canvas = Canvas::new(16, 16);
//! canvas.clear_background(Color::MIDNIGHT);
//! canvas.set_clip(0, 0, 8, 8);
//! canvas.draw_rect(0, 0, 16, 16, Color::WHITE);
//! assert_eq!(canvas.count(Color::WHITE), 64);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod canvas;
pub mod color;
pub mod geometry;
pub mod recorder;
pub mod sink;
pub mod table;

pub use canvas::Canvas;
pub use color::Color;
pub use geometry::ClipRect;
pub use recorder::{CommandRecorder, DrawCommand};
pub use sink::RenderSink;
pub use table::{BoundTable, ForeignSink, RendererTable};
