//! # Renderer Capability Table
//!
//! The C view of a [`RenderSink`]: an opaque context pointer plus six
//! function pointers that take it as their first argument.
//!
//! ```text
//!   Rust sink ──bind()──► BoundTable ──as_ptr()──► C simulation
//!                                                      │
//!   Rust code ◄──RenderSink── ForeignSink ◄── table ───┘
//! ```
//!
//! A bound table borrows its sink mutably, so the context pointer stays
//! valid and unique for as long as the table can be reached.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};

use crate::color::Color;
use crate::sink::RenderSink;

/// `void clear_background(void *ctx, Color color)`
pub type ClearBackgroundFn = unsafe extern "C" fn(ctx: *mut c_void, color: Color);
/// `void set_clip(void *ctx, int32_t x, int32_t y, int32_t w, int32_t h)`
pub type SetClipFn = unsafe extern "C" fn(ctx: *mut c_void, x: i32, y: i32, w: i32, h: i32);
/// `void reset_clip(void *ctx)`
pub type ResetClipFn = unsafe extern "C" fn(ctx: *mut c_void);
/// `void draw_rect(void *ctx, int32_t x, int32_t y, int32_t w, int32_t h, Color color)`
pub type DrawRectFn =
    unsafe extern "C" fn(ctx: *mut c_void, x: i32, y: i32, w: i32, h: i32, color: Color);
/// `void draw_circ(void *ctx, int32_t x, int32_t y, float r, Color color)`
pub type DrawCircFn = unsafe extern "C" fn(ctx: *mut c_void, x: i32, y: i32, r: f32, color: Color);
/// `void draw_line(void *ctx, int32_t x0, int32_t y0, int32_t x1, int32_t y1, Color color)`
pub type DrawLineFn =
    unsafe extern "C" fn(ctx: *mut c_void, x0: i32, y0: i32, x1: i32, y1: i32, color: Color);

/// Layout-compatible with the C `Renderer` struct.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RendererTable {
    /// Opaque execution context handed back to every entry.
    pub ctx: *mut c_void,
    /// Fills the surface.
    pub clear_background: ClearBackgroundFn,
    /// Sets the clip rectangle.
    pub set_clip: SetClipFn,
    /// Clears the clip rectangle.
    pub reset_clip: ResetClipFn,
    /// Filled rectangle.
    pub draw_rect: DrawRectFn,
    /// Filled circle.
    pub draw_circ: DrawCircFn,
    /// One-pixel line.
    pub draw_line: DrawLineFn,
}

impl fmt::Debug for RendererTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererTable")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl RendererTable {
    /// Exposes `sink` through a C table for the duration of the borrow.
    #[must_use]
    pub fn bind<S: RenderSink>(sink: &mut S) -> BoundTable<'_> {
        BoundTable {
            table: Self {
                ctx: (sink as *mut S).cast::<c_void>(),
                clear_background: clear_background_trampoline::<S>,
                set_clip: set_clip_trampoline::<S>,
                reset_clip: reset_clip_trampoline::<S>,
                draw_rect: draw_rect_trampoline::<S>,
                draw_circ: draw_circ_trampoline::<S>,
                draw_line: draw_line_trampoline::<S>,
            },
            _sink: PhantomData,
        }
    }
}

/// A [`RendererTable`] tied to the lifetime of the sink it points at.
#[derive(Debug)]
pub struct BoundTable<'a> {
    table: RendererTable,
    _sink: PhantomData<&'a mut ()>,
}

impl BoundTable<'_> {
    /// The table itself.
    #[must_use]
    pub fn table(&self) -> &RendererTable {
        &self.table
    }

    /// Pointer suitable for `const Renderer *` parameters.
    ///
    /// Valid while `self` is alive and not moved.
    #[must_use]
    pub fn as_ptr(&self) -> *const RendererTable {
        &self.table
    }

    /// Drives the bound sink through the table, as foreign code would.
    #[must_use]
    pub fn as_sink(&mut self) -> ForeignSink<'_> {
        ForeignSink {
            table: self.table,
            _ctx: PhantomData,
        }
    }
}

/// Runs `f` against the sink behind `ctx`, absorbing panics.
///
/// # Safety
///
/// `ctx` must be the pointer stored by [`RendererTable::bind::<S>`] and the
/// binding must still be alive.
unsafe fn with_sink<S: RenderSink>(ctx: *mut c_void, f: impl FnOnce(&mut S)) {
    if ctx.is_null() {
        return;
    }
    // SAFETY: `ctx` came from `&mut S` in `bind` and the borrow is live.
    let sink = unsafe { &mut *ctx.cast::<S>() };
    if panic::catch_unwind(AssertUnwindSafe(|| f(sink))).is_err() {
        tracing::warn!("render sink panicked; call dropped");
    }
}

unsafe extern "C" fn clear_background_trampoline<S: RenderSink>(ctx: *mut c_void, color: Color) {
    // SAFETY: forwarded from the table built by `bind::<S>`.
    unsafe { with_sink::<S>(ctx, |s| s.clear_background(color)) }
}

unsafe extern "C" fn set_clip_trampoline<S: RenderSink>(
    ctx: *mut c_void,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
) {
    // SAFETY: forwarded from the table built by `bind::<S>`.
    unsafe { with_sink::<S>(ctx, |s| s.set_clip(x, y, w, h)) }
}

unsafe extern "C" fn reset_clip_trampoline<S: RenderSink>(ctx: *mut c_void) {
    // SAFETY: forwarded from the table built by `bind::<S>`.
    unsafe { with_sink::<S>(ctx, RenderSink::reset_clip) }
}

unsafe extern "C" fn draw_rect_trampoline<S: RenderSink>(
    ctx: *mut c_void,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: Color,
) {
    // SAFETY: forwarded from the table built by `bind::<S>`.
    unsafe { with_sink::<S>(ctx, |s| s.draw_rect(x, y, w, h, color)) }
}

unsafe extern "C" fn draw_circ_trampoline<S: RenderSink>(
    ctx: *mut c_void,
    x: i32,
    y: i32,
    r: f32,
    color: Color,
) {
    // SAFETY: forwarded from the table built by `bind::<S>`.
    unsafe { with_sink::<S>(ctx, |s| s.draw_circ(x, y, r, color)) }
}

unsafe extern "C" fn draw_line_trampoline<S: RenderSink>(
    ctx: *mut c_void,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Color,
) {
    // SAFETY: forwarded from the table built by `bind::<S>`.
    unsafe { with_sink::<S>(ctx, |s| s.draw_line(x0, y0, x1, y1, color)) }
}

/// A [`RenderSink`] that forwards every call through a C table.
#[derive(Debug)]
pub struct ForeignSink<'a> {
    table: RendererTable,
    _ctx: PhantomData<&'a mut ()>,
}

impl ForeignSink<'_> {
    /// Wraps a table received from foreign code.
    ///
    /// # Safety
    ///
    /// Every function pointer must be callable with `table.ctx` for as long
    /// as the returned sink is used, and must not unwind.
    #[must_use]
    pub unsafe fn new(table: RendererTable) -> Self {
        Self {
            table,
            _ctx: PhantomData,
        }
    }
}

impl RenderSink for ForeignSink<'_> {
    fn clear_background(&mut self, color: Color) {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { (self.table.clear_background)(self.table.ctx, color) }
    }

    fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { (self.table.set_clip)(self.table.ctx, x, y, w, h) }
    }

    fn reset_clip(&mut self) {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { (self.table.reset_clip)(self.table.ctx) }
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { (self.table.draw_rect)(self.table.ctx, x, y, w, h, color) }
    }

    fn draw_circ(&mut self, x: i32, y: i32, r: f32, color: Color) {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { (self.table.draw_circ)(self.table.ctx, x, y, r, color) }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { (self.table.draw_line)(self.table.ctx, x0, y0, x1, y1, color) }
    }
}
