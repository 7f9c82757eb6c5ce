// src/config.rs

//! Defines the configuration structures for the render cache, the font atlas and
//! the debug overlay.
//!
//! Every struct deserializes from JSON with `#[serde(default)]`, so a config file
//! only needs to name the values it overrides. The config is handed to
//! `Renderer::new` explicitly.

use crate::error::{RenderError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Dirty-region tracking and command recording.
    pub cache: CacheConfig,
    /// Glyph atlas baking.
    pub fonts: FontConfig,
    /// Debug overlay.
    pub debug: DebugConfig,
}

/// Settings for the `RenderCache`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Edge length of one hash cell in pixels.
    pub cell_size: i32,
    /// Grid columns allocated up front. Screens wider than
    /// `max_cells_x * cell_size` are tracked only up to that width.
    pub max_cells_x: usize,
    /// Grid rows allocated up front.
    pub max_cells_y: usize,
    /// Hard ceiling on the bytes of commands one frame may record.
    pub command_buffer_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            cell_size: 96,
            max_cells_x: 80,
            max_cells_y: 50,
            command_buffer_bytes: 1024 * 512,
        }
    }
}

/// Settings for glyph atlas generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// Width and height of the first atlas tried for a 256-glyph block.
    pub initial_atlas_size: usize,
    /// The atlas doubles until the block fits or this size is reached.
    pub max_atlas_size: usize,
}

impl Default for FontConfig {
    fn default() -> Self {
        FontConfig {
            initial_atlas_size: 128,
            max_atlas_size: 8192,
        }
    }
}

/// Debug overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Tint every repainted rectangle so partial redraws are visible.
    pub show_dirty_rects: bool,
    /// Alpha of the overlay tint.
    pub overlay_alpha: u8,
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            show_dirty_rects: false,
            overlay_alpha: 50,
        }
    }
}

impl Config {
    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| RenderError::Config(format!("malformed JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RenderError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&text)?;
        info!("Config: Loaded from '{}'", path.display());
        Ok(config)
    }

    /// Rejects values the render cache and atlas baker cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.cache.cell_size <= 0 {
            return Err(RenderError::Config(format!(
                "cache.cell_size must be positive, got {}",
                self.cache.cell_size
            )));
        }
        if self.cache.max_cells_x == 0 || self.cache.max_cells_y == 0 {
            return Err(RenderError::Config(
                "cache.max_cells_x and cache.max_cells_y must be non-zero".to_string(),
            ));
        }
        if self.cache.command_buffer_bytes == 0 {
            return Err(RenderError::Config(
                "cache.command_buffer_bytes must be non-zero".to_string(),
            ));
        }
        let fonts = &self.fonts;
        if !fonts.initial_atlas_size.is_power_of_two() || !fonts.max_atlas_size.is_power_of_two()
        {
            return Err(RenderError::Config(format!(
                "atlas sizes must be powers of two, got {} and {}",
                fonts.initial_atlas_size, fonts.max_atlas_size
            )));
        }
        if fonts.initial_atlas_size > fonts.max_atlas_size {
            return Err(RenderError::Config(format!(
                "fonts.initial_atlas_size ({}) exceeds fonts.max_atlas_size ({})",
                fonts.initial_atlas_size, fonts.max_atlas_size
            )));
        }
        if self.debug.show_dirty_rects && self.debug.overlay_alpha == 0 {
            warn!("Config: debug.show_dirty_rects is set but overlay_alpha is 0; overlay will be invisible");
        }
        Ok(())
    }
}
