//! Fonts with lazily baked glyph blocks, and the registry that hands out handles.
//!
//! A `Font` owns its parsed face and up to 256 `GlyphSet`s, one per codepoint
//! high-byte block. Blocks are baked on first use. Dropping the font drops every
//! atlas it baked.

use crate::config::FontConfig;
use crate::error::{RenderError, Result};
use crate::rasterizer::font_driver::{FontdueSource, GlyphSource};
use crate::rasterizer::glyph_atlas::{BakedGlyph, GlyphSet};
use crate::rasterizer::utf8::codepoints;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Number of 256-codepoint blocks a font can cache.
pub const MAX_GLYPH_SETS: usize = 256;

/// Which glyph block holds `codepoint`. Masked so garbage codepoints stay in range.
#[inline]
pub fn block_index(codepoint: u32) -> usize {
    ((codepoint >> 8) & 0xff) as usize
}

pub struct Font {
    source: Box<dyn GlyphSource>,
    size: f32,
    height: i32,
    atlas: FontConfig,
    sets: Vec<Option<GlyphSet>>,
}

impl Font {
    /// Reads a TrueType/OpenType file and prepares it for drawing at `size` px.
    pub fn load(path: impl AsRef<Path>, size: f32, atlas: &FontConfig) -> Result<Font> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| RenderError::FontIo {
            path: path.to_path_buf(),
            source,
        })?;
        let source =
            FontdueSource::from_bytes(&data, size).map_err(|reason| RenderError::FontParse {
                path: path.to_path_buf(),
                reason,
            })?;
        info!(
            "Font: Loaded '{}' ({} bytes, {} glyphs) at {} px",
            path.display(),
            data.len(),
            source.glyph_count(),
            size
        );
        Ok(Self::from_source(Box::new(source), size, atlas))
    }

    /// Builds a font over any glyph source.
    ///
    /// The block holding the newline is baked immediately and the tab and
    /// newline glyphs are made invisible.
    pub fn from_source(source: Box<dyn GlyphSource>, size: f32, atlas: &FontConfig) -> Font {
        let height = source.line_metrics(size).line_height();
        let mut font = Font {
            source,
            size,
            height,
            atlas: atlas.clone(),
            sets: (0..MAX_GLYPH_SETS).map(|_| None).collect(),
        };

        let set = font.glyph_set_mut('\n' as u32);
        set.glyph_mut('\t' as u32).make_invisible();
        set.glyph_mut('\n' as u32).make_invisible();

        font
    }

    /// The cached block for `codepoint`, baking it on first access.
    pub fn glyph_set(&mut self, codepoint: u32) -> &GlyphSet {
        self.glyph_set_mut(codepoint)
    }

    fn glyph_set_mut(&mut self, codepoint: u32) -> &mut GlyphSet {
        let block = block_index(codepoint);
        let source = self.source.as_ref();
        let (size, atlas) = (self.size, &self.atlas);
        self.sets[block].get_or_insert_with(|| GlyphSet::bake(source, block, size, atlas))
    }

    /// Metrics of a single glyph.
    pub fn glyph(&mut self, codepoint: u32) -> BakedGlyph {
        *self.glyph_set(codepoint).glyph(codepoint)
    }

    /// Overrides the tab advance, in pixels.
    pub fn set_tab_width(&mut self, width: i32) {
        debug!("Font: Tab width set to {} px", width);
        self.glyph_set_mut('\t' as u32).glyph_mut('\t' as u32).advance = width as f32;
    }

    /// Sum of the advances of every codepoint in `text`.
    pub fn text_width(&mut self, text: &[u8]) -> i32 {
        codepoints(text)
            .map(|cp| self.glyph(cp).advance as i32)
            .sum()
    }

    /// Line height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Number of glyph blocks baked so far.
    pub fn loaded_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.is_some()).count()
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("size", &self.size)
            .field("height", &self.height)
            .field("loaded_sets", &self.loaded_sets())
            .finish()
    }
}

/// Opaque reference to a loaded font.
///
/// Ids are never reused, so a command recorded against a freed font can never
/// alias a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontHandle(u32);

impl FontHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Owns every live font, keyed by handle.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: HashMap<FontHandle, Font>,
    next_id: u32,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, font: Font) -> FontHandle {
        let handle = FontHandle(self.next_id);
        self.next_id += 1;
        self.fonts.insert(handle, font);
        handle
    }

    pub fn contains(&self, handle: FontHandle) -> bool {
        self.fonts.contains_key(&handle)
    }

    pub fn get(&self, handle: FontHandle) -> Result<&Font> {
        self.fonts
            .get(&handle)
            .ok_or(RenderError::UnknownFont(handle))
    }

    pub fn get_mut(&mut self, handle: FontHandle) -> Result<&mut Font> {
        self.fonts
            .get_mut(&handle)
            .ok_or(RenderError::UnknownFont(handle))
    }

    /// Removes and returns the font. Dropping it releases its atlases.
    pub fn remove(&mut self, handle: FontHandle) -> Result<Font> {
        self.fonts
            .remove(&handle)
            .ok_or(RenderError::UnknownFont(handle))
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
