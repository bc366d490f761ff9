//! Integer rectangles for clipping.

/// Axis-aligned rectangle covering `[x, x + width) × [y, y + height)`.
///
/// Extents are kept as `i64` internally so that `x + width` never
/// overflows for any `i32` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipRect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width; zero or negative means empty.
    pub width: i32,
    /// Height; zero or negative means empty.
    pub height: i32,
}

impl ClipRect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the rectangle covers no pixel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Returns true if the pixel `(x, y)` lies inside.
    #[must_use]
    pub const fn contains(&self, x: i64, y: i64) -> bool {
        !self.is_empty()
            && x >= self.x as i64
            && y >= self.y as i64
            && x < self.right()
            && y < self.bottom()
    }

    /// Intersection of two rectangles; `None` when they do not overlap.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let left = i64::from(self.x).max(i64::from(other.x));
        let top = i64::from(self.y).max(i64::from(other.y));
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if self.is_empty() || other.is_empty() || right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(
            left as i32,
            top as i32,
            (right - left) as i32,
            (bottom - top) as i32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let r = ClipRect::new(2, 3, 4, 5);
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 7));
        assert!(!r.contains(6, 7));
        assert!(!r.contains(5, 8));
    }

    #[test]
    fn test_intersect() {
        let a = ClipRect::new(0, 0, 10, 10);
        let b = ClipRect::new(5, -5, 10, 10);
        assert_eq!(a.intersect(&b), Some(ClipRect::new(5, 0, 5, 5)));
        assert_eq!(a.intersect(&ClipRect::new(10, 0, 3, 3)), None);
        assert_eq!(a.intersect(&ClipRect::new(1, 1, 0, 3)), None);
    }

    #[test]
    fn test_extreme_extents_do_not_overflow() {
        let r = ClipRect::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX);
        assert!(r.contains(i64::from(i32::MAX), i64::from(i32::MAX)));
    }
}
