//! Glyph atlas baking.
//!
//! A `GlyphSet` holds one atlas image for 256 contiguous codepoints (one
//! high-byte block) plus per-glyph placement metrics. Glyphs are packed in rows
//! with one pixel of padding; if a block does not fit, the atlas doubles in both
//! dimensions and packing starts over.

use crate::color::Color;
use crate::config::FontConfig;
use crate::geometry::Rect;
use crate::rasterizer::font_driver::{GlyphSource, RasterizedGlyph};
use log::{debug, warn};

/// Codepoints covered by one `GlyphSet`.
pub const GLYPHS_PER_SET: usize = 256;

/// An owned RGBA image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: i32,
    height: i32,
    pixels: Vec<Color>,
}

impl Image {
    /// Wraps existing row-major pixels. Returns `None` if the length does not match.
    pub fn from_pixels(width: i32, height: i32, pixels: Vec<Color>) -> Option<Self> {
        if width < 0 || height < 0 || pixels.len() != (width * height) as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// Placement of one glyph inside its atlas.
///
/// `x0..x1` / `y0..y1` bound the bitmap in the atlas. `x_offset` / `y_offset`
/// move it relative to the pen position at the top of the line, and
/// `advance` moves the pen afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BakedGlyph {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub advance: f32,
}

impl BakedGlyph {
    /// The glyph's bitmap within the atlas.
    pub fn atlas_rect(&self) -> Rect {
        Rect::new(self.x0, self.y0, self.x1 - self.x0, self.y1 - self.y0)
    }

    /// Hide the glyph's bitmap while keeping its advance.
    pub fn make_invisible(&mut self) {
        self.x1 = self.x0;
    }
}

/// A baked block of 256 glyphs.
#[derive(Debug, Clone)]
pub struct GlyphSet {
    image: Image,
    glyphs: Vec<BakedGlyph>,
}

impl GlyphSet {
    /// Rasterize and pack codepoints `block * 256 .. block * 256 + 256`.
    ///
    /// Starts at `config.initial_atlas_size` and doubles until everything fits.
    /// At `config.max_atlas_size` the glyphs that still do not fit keep their
    /// advance but get no bitmap.
    pub fn bake(
        source: &dyn GlyphSource,
        block: usize,
        size_px: f32,
        config: &FontConfig,
    ) -> GlyphSet {
        let first = (block * GLYPHS_PER_SET) as u32;
        let rasterized: Vec<RasterizedGlyph> = (0..GLYPHS_PER_SET as u32)
            .map(|i| source.rasterize(first + i, size_px))
            .collect();

        let mut atlas_size = config.initial_atlas_size.max(1);
        let (coverage, mut glyphs) = loop {
            let at_limit = atlas_size >= config.max_atlas_size;
            match pack(&rasterized, atlas_size, at_limit) {
                Some(packed) => break packed,
                None => {
                    debug!(
                        "GlyphSet: Block {} does not fit {}x{} atlas, retrying at {}x{}",
                        block,
                        atlas_size,
                        atlas_size,
                        atlas_size * 2,
                        atlas_size * 2
                    );
                    atlas_size *= 2;
                }
            }
        };

        let ascent = source.line_metrics(size_px).ascent + 0.5;
        for glyph in &mut glyphs {
            glyph.y_offset += ascent;
            glyph.advance = glyph.advance.floor();
        }

        let side = atlas_size as i32;
        let pixels = coverage
            .into_iter()
            .map(|c| Color::new(255, 255, 255, c))
            .collect();
        let image = Image {
            width: side,
            height: side,
            pixels,
        };

        debug!(
            "GlyphSet: Baked block {} (U+{:04X}..U+{:04X}) into {}x{} atlas",
            block,
            first,
            first + GLYPHS_PER_SET as u32 - 1,
            side,
            side
        );

        GlyphSet { image, glyphs }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Metrics for `codepoint`; only its low byte is used.
    pub fn glyph(&self, codepoint: u32) -> &BakedGlyph {
        &self.glyphs[(codepoint & 0xff) as usize]
    }

    pub fn glyph_mut(&mut self, codepoint: u32) -> &mut BakedGlyph {
        &mut self.glyphs[(codepoint & 0xff) as usize]
    }
}

/// Row-packs `glyphs` into a `size x size` coverage buffer.
///
/// Returns `None` when a glyph does not fit, unless `truncate` is set, in which
/// case such glyphs are recorded with an empty bitmap.
fn pack(
    glyphs: &[RasterizedGlyph],
    size: usize,
    truncate: bool,
) -> Option<(Vec<u8>, Vec<BakedGlyph>)> {
    let side = size as i32;
    let mut coverage = vec![0u8; size * size];
    let mut baked = Vec::with_capacity(glyphs.len());
    let (mut x, mut y, mut bottom_y) = (1i32, 1i32, 1i32);
    let mut dropped = 0usize;

    for glyph in glyphs {
        let (gw, gh) = (glyph.width as i32, glyph.height as i32);
        if x + gw + 1 >= side {
            y = bottom_y;
            x = 1;
        }
        if y + gh + 1 >= side || x + gw + 1 >= side {
            if !truncate {
                return None;
            }
            dropped += 1;
            baked.push(BakedGlyph {
                advance: glyph.advance,
                ..BakedGlyph::default()
            });
            continue;
        }

        if glyph.width > 0 {
            for (row, src) in glyph
                .coverage
                .chunks_exact(glyph.width)
                .take(glyph.height)
                .enumerate()
            {
                let start = (y as usize + row) * size + x as usize;
                coverage[start..start + glyph.width].copy_from_slice(src);
            }
        }

        baked.push(BakedGlyph {
            x0: x,
            y0: y,
            x1: x + gw,
            y1: y + gh,
            x_offset: glyph.xmin as f32,
            y_offset: -(glyph.ymin + gh) as f32,
            advance: glyph.advance,
        });

        x += gw + 1;
        bottom_y = bottom_y.max(y + gh + 1);
    }

    if dropped > 0 {
        warn!(
            "GlyphSet: {} glyph(s) did not fit the maximum {}x{} atlas and will not be drawn",
            dropped, size, size
        );
    }

    Some((coverage, baked))
}
