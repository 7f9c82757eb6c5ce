//! Software rasterizer.
//!
//! Draws straight into a `PixelSurface`:
//!
//! ```text
//! draw_rect   solid fill, or /256 alpha blend
//! draw_image  tinted blit of a sub-rectangle of an Image
//! draw_text   UTF-8 decode -> glyph lookup -> draw_image per glyph
//! ```
//!
//! Every primitive honours the current clip rectangle, which is additionally
//! clamped to the surface bounds at draw time.

pub mod font;
pub mod font_driver;
pub mod glyph_atlas;
pub mod headless_font_driver;
pub mod utf8;

use crate::color::{blend_pixel, blend_pixel_tinted, Color};
use crate::display::PixelSurface;
use crate::geometry::{ClipBounds, Rect};
use crate::rasterizer::font::Font;
use crate::rasterizer::glyph_atlas::Image;
use crate::rasterizer::utf8::codepoints;
use log::trace;

/// Pixel-level drawing state: only the clip rectangle.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    clip: ClipBounds,
}

impl Rasterizer {
    /// Creates a rasterizer whose clip covers a `width x height` surface.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            clip: ClipBounds::from(Rect::new(0, 0, width, height)),
        }
    }

    pub fn set_clip_rect(&mut self, rect: Rect) {
        self.clip = ClipBounds::from(rect);
    }

    pub fn clip_rect(&self) -> Rect {
        self.clip.to_rect()
    }

    /// Clip bounds intersected with the surface.
    fn effective_clip(&self, surface_size: (i32, i32)) -> ClipBounds {
        let (width, height) = surface_size;
        ClipBounds {
            left: self.clip.left.max(0),
            top: self.clip.top.max(0),
            right: self.clip.right.min(width),
            bottom: self.clip.bottom.min(height),
        }
    }

    /// Fills `rect` with `color`. Opaque colors overwrite; translucent ones blend.
    pub fn draw_rect<S: PixelSurface + ?Sized>(&self, surface: &mut S, rect: Rect, color: Color) {
        if color.a == 0 {
            return;
        }
        let size = surface.size();
        let clip = self.effective_clip(size);
        let area = rect.intersect(&clip.to_rect());
        if !area.has_area() {
            return;
        }

        let stride = size.0 as usize;
        let pixels = surface.pixels_mut();
        for y in area.y..area.bottom() {
            let start = y as usize * stride + area.x as usize;
            let row = &mut pixels[start..start + area.width as usize];
            if color.a == 0xff {
                row.fill(color);
            } else {
                for px in row {
                    *px = blend_pixel(*px, color);
                }
            }
        }
    }

    /// Blits `sub` of `image` with its top-left corner at `(x, y)`, tinted by `color`.
    ///
    /// Each edge of `sub` that falls outside the clip is shrunk and the destination
    /// shifted to match, so only visible pixels are touched.
    pub fn draw_image<S: PixelSurface + ?Sized>(
        &self,
        surface: &mut S,
        image: &Image,
        sub: Rect,
        x: i32,
        y: i32,
        color: Color,
    ) {
        if color.a == 0 {
            return;
        }
        let size = surface.size();
        let clip = self.effective_clip(size);

        let mut sub = sub;
        let (mut x, mut y) = (x, y);

        // Source rectangle must lie inside the image.
        let inside = sub.intersect(&image.bounds());
        x += inside.x - sub.x;
        y += inside.y - sub.y;
        sub = inside;

        let n = clip.left.saturating_sub(x);
        if n > 0 {
            sub.width -= n;
            sub.x = sub.x.saturating_add(n);
            x = x.saturating_add(n);
        }
        let n = clip.top.saturating_sub(y);
        if n > 0 {
            sub.height -= n;
            sub.y = sub.y.saturating_add(n);
            y = y.saturating_add(n);
        }
        let n = x.saturating_add(sub.width).saturating_sub(clip.right);
        if n > 0 {
            sub.width -= n;
        }
        let n = y.saturating_add(sub.height).saturating_sub(clip.bottom);
        if n > 0 {
            sub.height -= n;
        }
        if !sub.has_area() {
            return;
        }

        let stride = size.0 as usize;
        let src_stride = image.width() as usize;
        let src = image.pixels();
        let dst = surface.pixels_mut();
        for row in 0..sub.height as usize {
            let s = (sub.y as usize + row) * src_stride + sub.x as usize;
            let d = (y as usize + row) * stride + x as usize;
            let src_row = &src[s..s + sub.width as usize];
            let dst_row = &mut dst[d..d + sub.width as usize];
            for (out, px) in dst_row.iter_mut().zip(src_row) {
                *out = blend_pixel_tinted(*out, *px, color);
            }
        }
    }

    /// Draws `text` starting at `(x, y)` (top of the line) and returns the pen x
    /// after the last glyph.
    pub fn draw_text<S: PixelSurface + ?Sized>(
        &self,
        surface: &mut S,
        font: &mut Font,
        text: &[u8],
        x: i32,
        y: i32,
        color: Color,
    ) -> i32 {
        let mut pen = x as f32;
        for cp in codepoints(text) {
            let set = font.glyph_set(cp);
            let glyph = set.glyph(cp);
            let dx = (pen + glyph.x_offset) as i32;
            let dy = (y as f32 + glyph.y_offset) as i32;
            self.draw_image(surface, set.image(), glyph.atlas_rect(), dx, dy, color);
            pen += glyph.advance;
        }
        trace!(
            "Rasterizer: Drew {} bytes of text at ({}, {}) ending at x={}",
            text.len(),
            x,
            y,
            pen as i32
        );
        pen as i32
    }
}
