// src/color.rs

//! Defines the 8-bit `Color` type and the two pixel blending routines used by
//! the rasterizer.
//!
//! Both blends divide by 256 (a shift) rather than 255. The result is slightly
//! darker than exact alpha compositing; output stays bit-compatible with the
//! shift-based formulas below.

use serde::{Deserialize, Serialize};

/// RGBA color with 8 bits per channel.
///
/// `a == 255` is opaque, `a == 0` is fully transparent (drawing with it is a no-op).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::opaque(255, 255, 255);
    pub const BLACK: Color = Color::opaque(0, 0, 0);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to RGBA byte array
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns the same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Unspecified colors default to opaque white.
impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Blends `src` over `dst` using `src.a` as coverage.
///
/// `dst' = (src * a + dst * (255 - a)) >> 8` per channel. The destination alpha is kept.
#[inline]
pub fn blend_pixel(dst: Color, src: Color) -> Color {
    let a = src.a as u32;
    let ia = 0xff - a;
    Color {
        r: ((src.r as u32 * a + dst.r as u32 * ia) >> 8) as u8,
        g: ((src.g as u32 * a + dst.g as u32 * ia) >> 8) as u8,
        b: ((src.b as u32 * a + dst.b as u32 * ia) >> 8) as u8,
        a: dst.a,
    }
}

/// Blends an image pixel `src` over `dst`, tinted by `tint`.
///
/// The source alpha is first scaled by the tint alpha (`a' = src.a * tint.a >> 8`),
/// then each channel is `(src * tint * a' >> 16) + (dst * (255 - a') >> 8)`.
/// A white-coverage glyph atlas blitted through this becomes `tint`-colored.
#[inline]
pub fn blend_pixel_tinted(dst: Color, src: Color, tint: Color) -> Color {
    let a = (src.a as u32 * tint.a as u32) >> 8;
    let ia = 0xff - a;
    let channel = |s: u8, t: u8, d: u8| -> u8 {
        let lit = (s as u32 * t as u32 * a) >> 16;
        let kept = (d as u32 * ia) >> 8;
        (lit + kept).min(255) as u8
    };
    Color {
        r: channel(src.r, tint.r, dst.r),
        g: channel(src.g, tint.g, dst.g),
        b: channel(src.b, tint.b, dst.b),
        a: dst.a,
    }
}
