// src/lib.rs

//! Deferred, diff-based 2D software rendering.
//!
//! Draw calls are recorded per frame, hashed into a coarse cell grid and diffed
//! against the previous frame; only the rectangles whose content changed are
//! rasterized and presented. Text is drawn from lazily baked glyph atlases.
//!
//! ```no_run
//! use deferred_render::{Color, Config, HeadlessSurface, Rect, Renderer};
//!
//! let mut renderer = Renderer::new(HeadlessSurface::new(640, 480), &Config::default())?;
//! let font = renderer.load_font("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", 14.0)?;
//!
//! renderer.begin_frame();
//! renderer.draw_rect(Rect::new(0, 0, 640, 480), Color::opaque(30, 30, 40))?;
//! renderer.draw_text(font, "hello", 8, 8, Color::WHITE)?;
//! let report = renderer.end_frame()?;
//! println!("repainted {:?}", report.dirty_rects);
//! # Ok::<(), deferred_render::RenderError>(())
//! ```

pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod rasterizer;
pub mod render_cache;
pub mod renderer;

pub use color::Color;
pub use config::Config;
pub use display::{HeadlessSurface, PixelSurface};
pub use error::{RenderError, Result};
pub use geometry::Rect;
pub use rasterizer::font::FontHandle;
pub use rasterizer::font_driver::GlyphSource;
pub use rasterizer::headless_font_driver::HeadlessGlyphSource;
pub use render_cache::FrameReport;
pub use renderer::Renderer;
