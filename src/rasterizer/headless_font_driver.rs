//! Headless glyph source: deterministic box glyphs with no font file.

use crate::rasterizer::font_driver::{GlyphSource, LineMetrics, RasterizedGlyph};

/// A `GlyphSource` whose every printable glyph is a solid box.
///
/// Glyph boxes are `glyph_width x (size_px / 2)` pixels sitting on the baseline
/// and every codepoint advances by `advance`. Control codepoints (below 0x20)
/// rasterize to nothing but still advance. Useful for exercising layout and
/// dirty tracking without shipping a font.
#[derive(Debug, Clone)]
pub struct HeadlessGlyphSource {
    pub glyph_width: usize,
    pub advance: f32,
}

impl HeadlessGlyphSource {
    pub fn new(glyph_width: usize, advance: f32) -> Self {
        Self {
            glyph_width,
            advance,
        }
    }
}

impl Default for HeadlessGlyphSource {
    fn default() -> Self {
        Self::new(6, 8.0)
    }
}

impl GlyphSource for HeadlessGlyphSource {
    fn line_metrics(&self, size_px: f32) -> LineMetrics {
        LineMetrics {
            ascent: size_px * 0.75,
            descent: -size_px * 0.25,
            line_gap: 0.0,
        }
    }

    fn rasterize(&self, codepoint: u32, size_px: f32) -> RasterizedGlyph {
        if codepoint < 0x20 {
            return RasterizedGlyph {
                advance: self.advance,
                ..RasterizedGlyph::default()
            };
        }
        let width = self.glyph_width;
        let height = ((size_px / 2.0) as usize).max(1);
        RasterizedGlyph {
            width,
            height,
            xmin: 0,
            ymin: 0,
            advance: self.advance,
            coverage: vec![255; width * height],
        }
    }
}
