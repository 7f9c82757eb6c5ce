// src/renderer.rs

//! This module defines the `Renderer`, the context object every drawing call goes
//! through.
//!
//! The `Renderer` owns the pixel surface, the rasterizer, the loaded fonts and the
//! render cache. Between `begin_frame` and `end_frame` the drawing methods only
//! record; pixels are written by `end_frame`, and only inside regions whose
//! content changed since the previous frame.

use crate::color::Color;
use crate::config::{Config, FontConfig};
use crate::display::PixelSurface;
use crate::error::Result;
use crate::geometry::Rect;
use crate::rasterizer::font::{Font, FontHandle, FontRegistry};
use crate::rasterizer::font_driver::GlyphSource;
use crate::rasterizer::Rasterizer;
use crate::render_cache::{FrameReport, RenderCache};
use log::{debug, info};
use std::path::Path;

#[cfg(test)]
mod tests;

/// Deferred renderer over a host surface `S`.
pub struct Renderer<S: PixelSurface> {
    surface: S,
    raster: Rasterizer,
    fonts: FontRegistry,
    cache: RenderCache,
    font_config: FontConfig,
}

impl<S: PixelSurface> Renderer<S> {
    /// Creates a renderer drawing into `surface`. The config is validated first.
    pub fn new(surface: S, config: &Config) -> Result<Self> {
        config.validate()?;
        let (width, height) = surface.size();
        info!("Renderer: Created for {}x{} px surface", width, height);
        Ok(Self {
            surface,
            raster: Rasterizer::new(width, height),
            fonts: FontRegistry::new(),
            cache: RenderCache::new(&config.cache, &config.debug),
            font_config: config.fonts.clone(),
        })
    }

    /// Starts recording a frame. A changed surface size forces a full repaint.
    pub fn begin_frame(&mut self) {
        self.cache.begin_frame(self.surface.size());
    }

    /// Resolves the recorded frame into pixels and presents what changed.
    pub fn end_frame(&mut self) -> Result<FrameReport> {
        self.cache
            .end_frame(&mut self.raster, &mut self.surface, &mut self.fonts)
    }

    /// Toggles the translucent overlay drawn over every repainted rectangle.
    pub fn show_debug(&mut self, enable: bool) {
        self.cache.show_debug(enable);
    }

    pub fn set_clip_rect(&mut self, rect: Rect) -> Result<()> {
        self.cache.set_clip_rect(rect)
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.cache.draw_rect(rect, color)
    }

    /// Records `text` at `(x, y)` and returns the x just past the text.
    ///
    /// `text` is UTF-8; malformed bytes are decoded leniently, never rejected.
    pub fn draw_text(
        &mut self,
        font: FontHandle,
        text: impl AsRef<[u8]>,
        x: i32,
        y: i32,
        color: Color,
    ) -> Result<i32> {
        let f = self.fonts.get_mut(font)?;
        self.cache.draw_text(font, f, text.as_ref(), x, y, color)
    }

    /// Loads a TrueType/OpenType font file at `size` pixels.
    pub fn load_font(&mut self, path: impl AsRef<Path>, size: f32) -> Result<FontHandle> {
        let font = Font::load(path, size, &self.font_config)?;
        let handle = self.fonts.insert(font);
        debug!("Renderer: Font {} registered", handle.id());
        Ok(handle)
    }

    /// Registers a font backed by any glyph source.
    pub fn add_font(&mut self, source: Box<dyn GlyphSource>, size: f32) -> FontHandle {
        let handle = self
            .fonts
            .insert(Font::from_source(source, size, &self.font_config));
        debug!("Renderer: Font {} registered", handle.id());
        handle
    }

    /// Queues `font` for release at the end of the current frame.
    pub fn free_font(&mut self, font: FontHandle) -> Result<()> {
        self.fonts.get(font)?;
        self.cache.free_font(font)
    }

    pub fn set_tab_width(&mut self, font: FontHandle, width: i32) -> Result<()> {
        self.fonts.get_mut(font)?.set_tab_width(width);
        Ok(())
    }

    pub fn text_width(&mut self, font: FontHandle, text: impl AsRef<[u8]>) -> Result<i32> {
        Ok(self.fonts.get_mut(font)?.text_width(text.as_ref()))
    }

    pub fn text_height(&self, font: FontHandle) -> Result<i32> {
        Ok(self.fonts.get(font)?.height())
    }

    /// Current surface size in pixels.
    pub fn size(&self) -> (i32, i32) {
        self.surface.size()
    }

    /// Forces the next frame to repaint the whole screen.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access to the surface, e.g. to resize it between frames.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
