//! RGBA8 color, laid out exactly like the C `Color` struct.

use bytemuck::{Pod, Zeroable};

/// Four independent 8-bit channels.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Solid black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Solid white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Deep background blue.
    pub const MIDNIGHT: Self = Self::rgb(12, 14, 28);
    /// Neon green.
    pub const NEON_GREEN: Self = Self::rgb(51, 255, 77);
    /// Neon cyan.
    pub const NEON_CYAN: Self = Self::rgb(51, 230, 255);
    /// Neon pink.
    pub const NEON_PINK: Self = Self::rgb(255, 51, 153);

    /// Creates a color from all four channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Creates a color from `0xRRGGBBAA`.
    #[must_use]
    pub const fn hex(hex: u32) -> Self {
        let [r, g, b, a] = hex.to_be_bytes();
        Self::rgba(r, g, b, a)
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Composites `self` over `dst` (source-over, straight alpha).
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let sa = u32::from(a);
                let inv = 255 - sa;
                let mix = |s: u8, d: u8| ((u32::from(s) * sa + u32::from(d) * inv + 127) / 255) as u8;
                let out_a = sa + (u32::from(dst.a) * inv + 127) / 255;
                Self::rgba(
                    mix(self.r, dst.r),
                    mix(self.g, dst.g),
                    mix(self.b, dst.b),
                    out_a.min(255) as u8,
                )
            }
        }
    }

    /// Converts to `[r, g, b, a]`.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Color::hex(0x1122_33FF), Color::rgb(0x11, 0x22, 0x33));
    }

    #[test]
    fn test_over_extremes() {
        let dst = Color::rgb(10, 20, 30);
        assert_eq!(Color::WHITE.over(dst), Color::WHITE);
        assert_eq!(Color::TRANSPARENT.over(dst), dst);
    }

    #[test]
    fn test_over_half() {
        let out = Color::rgba(255, 0, 0, 128).over(Color::BLACK);
        assert_eq!(out.a, 255);
        assert!((127..=129).contains(&out.r));
        assert_eq!(out.g, 0);
    }

    #[test]
    fn test_layout_matches_c_struct() {
        assert_eq!(std::mem::size_of::<Color>(), 4);
        assert_eq!(bytemuck::bytes_of(&Color::rgba(1, 2, 3, 4)), &[1, 2, 3, 4]);
    }
}
