//! # Software Canvas
//!
//! An in-memory RGBA8 surface implementing [`RenderSink`].
//!
//! Every primitive is rasterised against the *drawable region*, the
//! intersection of the surface bounds and the active clip. Nothing outside
//! that region is ever written.
//!
//! ```text
//!  (0,0) ┌────────────────────────┐
//!        │   surface              │
//!        │     ┌──────────┐       │
//!        │     │ drawable │       │
//!        │     └──────────┘ clip  │
//!        └────────────────────────┘ (width, height)
//! ```
//!
//! `clear_background` is the exception: it overwrites the whole surface.

use crate::color::Color;
use crate::geometry::ClipRect;
use crate::sink::RenderSink;

/// A software render target.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    clip: Option<ClipRect>,
}

impl Canvas {
    /// Creates a transparent canvas.
    ///
    /// Dimensions are capped at `i32::MAX` so every pixel is addressable
    /// with sink coordinates.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.min(i32::MAX as u32);
        let height = height.min(i32::MAX as u32);
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
            clip: None,
        }
    }

    /// Surface width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Active clip rectangle, if any.
    #[inline]
    #[must_use]
    pub const fn clip(&self) -> Option<ClipRect> {
        self.clip
    }

    /// Row-major pixel storage.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Pixel storage as raw RGBA bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(i64::from(x), i64::from(y))
            .map(|i| self.pixels[i])
    }

    /// Number of pixels equal to `color`.
    #[must_use]
    pub fn count(&self, color: Color) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    fn surface(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width as i32, self.height as i32)
    }

    fn drawable(&self) -> Option<ClipRect> {
        match self.clip {
            Some(clip) => self.surface().intersect(&clip),
            None => Some(self.surface()).filter(|r| !r.is_empty()),
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn blend(&mut self, x: i64, y: i64, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.over(self.pixels[i]);
        }
    }

    fn fill_span(&mut self, region: &ClipRect, y: i64, x_start: i64, x_end: i64, color: Color) {
        let left = x_start.max(i64::from(region.x));
        let right = x_end.min(region.right());
        if y < i64::from(region.y) || y >= region.bottom() {
            return;
        }
        for x in left..right {
            self.blend(x, y, color);
        }
    }
}

impl RenderSink for Canvas {
    fn clear_background(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        tracing::trace!(x, y, w, h, "canvas clip set");
        self.clip = Some(ClipRect::new(x, y, w, h));
    }

    fn reset_clip(&mut self) {
        self.clip = None;
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let Some(region) = self.drawable() else {
            return;
        };
        let Some(area) = region.intersect(&ClipRect::new(x, y, w, h)) else {
            return;
        };
        for row in i64::from(area.y)..area.bottom() {
            self.fill_span(&area, row, i64::from(area.x), area.right(), color);
        }
    }

    fn draw_circ(&mut self, x: i32, y: i32, r: f32, color: Color) {
        // NaN fails this comparison too.
        if !(r >= 0.0) {
            return;
        }
        let Some(region) = self.drawable() else {
            return;
        };
        let r = f64::from(r);
        let r2 = r * r;
        let (cx, cy) = (i64::from(x), i64::from(y));
        let reach = r.floor() as i64;
        let top = cy.saturating_sub(reach).max(i64::from(region.y));
        let bottom = cy.saturating_add(reach).saturating_add(1).min(region.bottom());
        for row in top..bottom {
            let dy = (row - cy) as f64;
            let half = (r2 - dy * dy).sqrt().floor() as i64;
            self.fill_span(
                &region,
                row,
                cx.saturating_sub(half),
                cx.saturating_add(half).saturating_add(1),
                color,
            );
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let Some(region) = self.drawable() else {
            return;
        };
        let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
        if x0.max(x1) < i64::from(region.x)
            || y0.max(y1) < i64::from(region.y)
            || x0.min(x1) >= region.right()
            || y0.min(y1) >= region.bottom()
        {
            return;
        }

        // One pixel per step along the major axis; the minor offset at step
        // `i` is `i * rise / run` rounded half up.
        let x_major = (x1 - x0).abs() >= (y1 - y0).abs();
        let (major0, major1, minor0, minor1, lo, hi) = if x_major {
            (x0, x1, y0, y1, i64::from(region.x), region.right())
        } else {
            (y0, y1, x0, x1, i64::from(region.y), region.bottom())
        };
        let run = (major1 - major0).abs();
        let rise = i128::from((minor1 - minor0).abs());
        let major_step = if major1 < major0 { -1 } else { 1 };
        let minor_step = if minor1 < minor0 { -1 } else { 1 };

        // Only steps whose major coordinate lands inside the region.
        let (first, last) = if major_step > 0 {
            (lo - major0, hi - 1 - major0)
        } else {
            (major0 - (hi - 1), major0 - lo)
        };
        for i in first.max(0)..=last.min(run) {
            let offset = if run == 0 {
                0
            } else {
                ((2 * i128::from(i) * rise + i128::from(run)) / (2 * i128::from(run))) as i64
            };
            let major = major0 + major_step * i;
            let minor = minor0 + minor_step * offset;
            let (x, y) = if x_major { (major, minor) } else { (minor, major) };
            if region.contains(x, y) {
                self.blend(x, y, color);
            }
        }
    }
}
