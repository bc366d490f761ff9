//! # Render Sink Contract
//!
//! Six primitives bound to an execution context. Calls apply in
//! invocation order; `set_clip` / `reset_clip` change the target for later
//! calls only. There is no clip stack: callers that need to restore a
//! previous clip set it again themselves.

use crate::color::Color;

/// A drawing target.
///
/// Nothing here can fail from the caller's point of view. An
/// implementation that hits an internal problem absorbs it.
pub trait RenderSink {
    /// Fills the entire surface with `color`.
    fn clear_background(&mut self, color: Color);

    /// Restricts later drawing to `[x, x + w) × [y, y + h)`.
    fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32);

    /// Removes any clip restriction.
    fn reset_clip(&mut self);

    /// Draws a filled rectangle.
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color);

    /// Draws a filled circle centred on `(x, y)`.
    fn draw_circ(&mut self, x: i32, y: i32, r: f32, color: Color);

    /// Draws a one-pixel line from `(x0, y0)` to `(x1, y1)`, both inclusive.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color);
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn clear_background(&mut self, color: Color) {
        (**self).clear_background(color);
    }

    fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        (**self).set_clip(x, y, w, h);
    }

    fn reset_clip(&mut self) {
        (**self).reset_clip();
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        (**self).draw_rect(x, y, w, h, color);
    }

    fn draw_circ(&mut self, x: i32, y: i32, r: f32, color: Color) {
        (**self).draw_circ(x, y, r, color);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        (**self).draw_line(x0, y0, x1, y1, color);
    }
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn clear_background(&mut self, color: Color) {
        (**self).clear_background(color);
    }

    fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        (**self).set_clip(x, y, w, h);
    }

    fn reset_clip(&mut self) {
        (**self).reset_clip();
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        (**self).draw_rect(x, y, w, h, color);
    }

    fn draw_circ(&mut self, x: i32, y: i32, r: f32, color: Color) {
        (**self).draw_circ(x, y, r, color);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        (**self).draw_line(x0, y0, x1, y1, color);
    }
}
