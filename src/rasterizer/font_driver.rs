//! Font parsing and single-glyph rasterization primitives.
//!
//! This module defines the `GlyphSource` trait, a thin wrapper around whatever
//! parses font data and turns one codepoint into a coverage bitmap. `Font` and
//! the atlas baker build all caching on top of it.

use log::trace;

/// Vertical font metrics already scaled to pixels.
///
/// `descent` is negative for fonts that extend below the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

impl LineMetrics {
    /// Line height rounded to whole pixels.
    pub fn line_height(&self) -> i32 {
        (self.ascent - self.descent + self.line_gap + 0.5) as i32
    }
}

/// One rasterized glyph.
///
/// `coverage` holds `width * height` bytes, row-major, 0 = empty and 255 = fully
/// covered. `xmin`/`ymin` place the bitmap's bottom-left corner relative to the
/// pen position on the baseline, y pointing up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterizedGlyph {
    pub width: usize,
    pub height: usize,
    pub xmin: i32,
    pub ymin: i32,
    pub advance: f32,
    pub coverage: Vec<u8>,
}

/// Font backend trait.
///
/// Implementors provide:
/// - Vertical metrics at a pixel size
/// - Coverage rasterization of a single codepoint at a pixel size
///
/// Codepoints that are not valid Unicode scalar values must produce an empty
/// glyph rather than fail.
pub trait GlyphSource {
    /// Vertical metrics for `size_px` (the em size in pixels).
    fn line_metrics(&self, size_px: f32) -> LineMetrics;

    /// Rasterize `codepoint` at `size_px`.
    fn rasterize(&self, codepoint: u32, size_px: f32) -> RasterizedGlyph;
}

/// `GlyphSource` backed by a parsed TrueType/OpenType face.
pub struct FontdueSource {
    face: fontdue::Font,
}

impl FontdueSource {
    /// Parses font file bytes. `size_px` tunes the parser's internal scale.
    pub fn from_bytes(data: &[u8], size_px: f32) -> Result<Self, String> {
        let settings = fontdue::FontSettings {
            scale: size_px,
            ..fontdue::FontSettings::default()
        };
        let face = fontdue::Font::from_bytes(data, settings).map_err(|e| e.to_string())?;
        Ok(Self { face })
    }

    /// Number of glyphs in the face.
    pub fn glyph_count(&self) -> u16 {
        self.face.glyph_count()
    }
}

impl GlyphSource for FontdueSource {
    fn line_metrics(&self, size_px: f32) -> LineMetrics {
        match self.face.horizontal_line_metrics(size_px) {
            Some(m) => LineMetrics {
                ascent: m.ascent,
                descent: m.descent,
                line_gap: m.line_gap,
            },
            None => {
                trace!("FontdueSource: No horizontal metrics, using em box");
                LineMetrics {
                    ascent: size_px,
                    descent: 0.0,
                    line_gap: 0.0,
                }
            }
        }
    }

    fn rasterize(&self, codepoint: u32, size_px: f32) -> RasterizedGlyph {
        let Some(ch) = char::from_u32(codepoint) else {
            trace!("FontdueSource: U+{:X} is not a scalar value", codepoint);
            return RasterizedGlyph::default();
        };
        let (metrics, coverage) = self.face.rasterize(ch, size_px);
        RasterizedGlyph {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance: metrics.advance_width,
            coverage,
        }
    }
}
