// src/render_cache/mod.rs

//! Deferred, diff-based frame rendering.
//!
//! Draw calls made between `begin_frame` and `end_frame` are only recorded.
//! `end_frame` then:
//!
//! 1. Hashes every command into the cells its clipped rect covers.
//! 2. Diffs the cell hashes against the previous frame.
//! 3. Merges changed cells into dirty rectangles (pixel space, screen-clipped).
//! 4. Replays, per dirty rectangle, the commands that touch it.
//! 5. Presents the dirty rectangles, frees fonts queued for release, swaps grids.
//!
//! Identical frames therefore cost one hash walk and touch no pixels.

pub mod command;
pub mod dirty;
pub mod grid;

use crate::color::Color;
use crate::config::{CacheConfig, DebugConfig};
use crate::display::PixelSurface;
use crate::error::{RenderError, Result};
use crate::geometry::Rect;
use crate::rasterizer::font::{Font, FontHandle, FontRegistry};
use crate::rasterizer::Rasterizer;
use command::{Command, CommandBuffer};
use dirty::DirtyRects;
use grid::CellGrid;
use log::{debug, info, trace, warn};

/// Tints cycled through by the dirty-rect overlay.
const OVERLAY_PALETTE: [Color; 6] = [
    Color::opaque(255, 0, 0),
    Color::opaque(0, 255, 0),
    Color::opaque(0, 0, 255),
    Color::opaque(255, 255, 0),
    Color::opaque(0, 255, 255),
    Color::opaque(255, 0, 255),
];

/// What one `end_frame` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Commands recorded during the frame.
    pub commands: usize,
    /// Command buffer bytes the frame used.
    pub bytes_used: usize,
    /// Pixel rectangles repainted and presented, in presentation order.
    pub dirty_rects: Vec<Rect>,
    /// Fonts released after replay.
    pub fonts_freed: usize,
}

/// Records one frame of commands and repaints only what changed.
#[derive(Debug)]
pub struct RenderCache {
    cell_size: i32,
    screen: Rect,
    buffer: CommandBuffer,
    grid: CellGrid,
    dirty: DirtyRects,
    /// Each command's rect after the running clip, filled by the hash walk.
    clipped: Vec<Rect>,
    pending_free: Vec<FontHandle>,
    show_debug: bool,
    overlay_alpha: u8,
    overlay_counter: usize,
}

impl RenderCache {
    /// Expects a configuration that already passed `Config::validate`.
    pub(crate) fn new(cache: &CacheConfig, debug: &DebugConfig) -> Self {
        let cells = cache.max_cells_x * cache.max_cells_y;
        info!(
            "RenderCache: {}x{} cells of {} px, {} byte command buffer",
            cache.max_cells_x, cache.max_cells_y, cache.cell_size, cache.command_buffer_bytes
        );
        Self {
            cell_size: cache.cell_size,
            screen: Rect::default(),
            buffer: CommandBuffer::new(cache.command_buffer_bytes),
            grid: CellGrid::new(cache.max_cells_x, cache.max_cells_y),
            dirty: DirtyRects::with_capacity(cells / 2),
            clipped: Vec::with_capacity(cache.command_buffer_bytes / command::HEADER_LEN),
            pending_free: Vec::new(),
            show_debug: debug.show_dirty_rects,
            overlay_alpha: debug.overlay_alpha,
            overlay_counter: 0,
        }
    }

    /// The screen rectangle seen by the last `begin_frame`.
    pub fn screen_rect(&self) -> Rect {
        self.screen
    }

    pub fn show_debug(&mut self, enable: bool) {
        debug!("RenderCache: Dirty rect overlay {}", if enable { "on" } else { "off" });
        self.show_debug = enable;
    }

    /// Forces the next `end_frame` to repaint the whole screen.
    pub fn invalidate(&mut self) {
        self.grid.invalidate();
    }

    /// Starts a frame for a surface of `size`. A size change invalidates the cache.
    pub fn begin_frame(&mut self, size: (i32, i32)) {
        let (width, height) = size;
        if width == self.screen.width && height == self.screen.height {
            return;
        }
        info!(
            "RenderCache: Screen {}x{} -> {}x{}, repainting everything",
            self.screen.width, self.screen.height, width, height
        );
        self.screen = Rect::new(0, 0, width, height);
        if self.grid.set_extent(width, height, self.cell_size) {
            let (cols, rows) = self.grid.active_size();
            warn!(
                "RenderCache: Screen exceeds the {}x{} cell grid; changes beyond {}x{} px are not tracked",
                cols,
                rows,
                cols as i32 * self.cell_size,
                rows as i32 * self.cell_size
            );
        }
        self.grid.invalidate();
    }

    /// Records a clip change. The rect is clipped to the screen first.
    pub fn set_clip_rect(&mut self, rect: Rect) -> Result<()> {
        self.buffer.push_set_clip(rect.intersect(&self.screen))
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.buffer.push_draw_rect(rect, color)
    }

    /// Measures and records a text run, returning the x just past it.
    pub fn draw_text(
        &mut self,
        handle: FontHandle,
        font: &mut Font,
        text: &[u8],
        x: i32,
        y: i32,
        color: Color,
    ) -> Result<i32> {
        let width = font.text_width(text);
        let rect = Rect::new(x, y, width, font.height());
        self.buffer.push_draw_text(handle, rect, color, text)?;
        Ok(x.saturating_add(width))
    }

    /// Records a font release; the font stays usable until the frame is replayed.
    pub fn free_font(&mut self, handle: FontHandle) -> Result<()> {
        self.buffer.push_free_font(handle)
    }

    /// Commands recorded so far this frame.
    pub fn recorded(&self) -> usize {
        self.buffer.len()
    }

    /// Resolves the frame: hash, diff, replay dirty regions, present, release fonts.
    ///
    /// Returns `FrameAborted` without touching pixels if recording overflowed the
    /// command buffer; the whole screen is repainted on the next complete frame.
    /// Font releases recorded before the overflow are still carried out.
    pub fn end_frame<S: PixelSurface + ?Sized>(
        &mut self,
        raster: &mut Rasterizer,
        surface: &mut S,
        fonts: &mut FontRegistry,
    ) -> Result<FrameReport> {
        if self.buffer.is_exhausted() {
            let capacity = self.buffer.capacity();
            warn!(
                "RenderCache: Dropping frame of {} commands, command buffer ({} bytes) overflowed",
                self.buffer.len(),
                capacity
            );
            self.pending_free
                .extend(self.buffer.commands().iter().filter_map(|cmd| match cmd {
                    Command::FreeFont { font } => Some(*font),
                    _ => None,
                }));
            self.release_fonts(fonts);
            self.buffer.reset();
            self.grid.reset_current();
            self.grid.invalidate();
            return Err(RenderError::FrameAborted { capacity });
        }

        self.hash_commands();

        self.dirty.clear();
        let dirty = &mut self.dirty;
        self.grid.diff(|x, y| dirty.push(Rect::new(x, y, 1, 1)));
        self.dirty.scale_and_clip(self.cell_size, self.screen);

        for i in 0..self.dirty.len() {
            let rect = self.dirty.as_slice()[i];
            trace!("RenderCache: Replaying dirty rect {:?}", rect);
            self.replay(rect, raster, surface, fonts);
            if self.show_debug {
                let tint = OVERLAY_PALETTE[self.overlay_counter % OVERLAY_PALETTE.len()];
                self.overlay_counter = self.overlay_counter.wrapping_add(1);
                raster.set_clip_rect(rect);
                raster.draw_rect(surface, rect, tint.with_alpha(self.overlay_alpha));
            }
        }

        if !self.dirty.is_empty() {
            surface.present_rects(self.dirty.as_slice());
        }

        let fonts_freed = self.release_fonts(fonts);

        let report = FrameReport {
            commands: self.buffer.len(),
            bytes_used: self.buffer.used(),
            dirty_rects: self.dirty.as_slice().to_vec(),
            fonts_freed,
        };
        debug!(
            "RenderCache: Frame done: {} commands ({} bytes), {} dirty rects, {} fonts freed",
            report.commands,
            report.bytes_used,
            report.dirty_rects.len(),
            report.fonts_freed
        );

        self.grid.swap();
        self.buffer.reset();
        Ok(report)
    }

    /// Drops every font queued for release and returns how many were removed.
    fn release_fonts(&mut self, fonts: &mut FontRegistry) -> usize {
        let mut freed = 0;
        for handle in self.pending_free.drain(..) {
            match fonts.remove(handle) {
                Ok(font) => {
                    info!("RenderCache: Freed font {} ({:?})", handle.id(), font);
                    freed += 1;
                }
                Err(e) => warn!("RenderCache: Ignoring deferred free: {}", e),
            }
        }
        freed
    }

    /// Folds every command's hash into the current grid and queues font releases.
    fn hash_commands(&mut self) {
        let mut clip = self.screen;
        self.clipped.clear();
        for cmd in self.buffer.commands() {
            match cmd {
                Command::SetClip { rect } => clip = *rect,
                Command::FreeFont { font } => self.pending_free.push(*font),
                _ => {}
            }
            let rect = cmd.rect().intersect(&clip);
            self.clipped.push(rect);
            if !rect.has_area() {
                continue;
            }
            let hash = self.buffer.hash(cmd);
            self.grid.fold(rect, self.cell_size, hash);
        }
    }

    /// Re-executes the frame's commands inside `dirty`.
    fn replay<S: PixelSurface + ?Sized>(
        &self,
        dirty: Rect,
        raster: &mut Rasterizer,
        surface: &mut S,
        fonts: &mut FontRegistry,
    ) {
        raster.set_clip_rect(dirty);
        for (cmd, clipped) in self.buffer.commands().iter().zip(&self.clipped) {
            match cmd {
                Command::FreeFont { .. } => {}
                Command::SetClip { rect } => raster.set_clip_rect(rect.intersect(&dirty)),
                Command::DrawRect { rect, color } => {
                    if clipped.overlaps(&dirty) {
                        raster.draw_rect(surface, *rect, *color);
                    }
                }
                Command::DrawText {
                    font,
                    rect,
                    color,
                    text,
                } => {
                    if !clipped.overlaps(&dirty) {
                        continue;
                    }
                    match fonts.get_mut(*font) {
                        Ok(f) => {
                            raster.draw_text(surface, f, self.buffer.text(text), rect.x, rect.y, *color);
                        }
                        Err(e) => warn!("RenderCache: Skipping text: {}", e),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontConfig;
    use crate::display::HeadlessSurface;
    use crate::rasterizer::headless_font_driver::HeadlessGlyphSource;
    use test_log::test;

    struct Harness {
        cache: RenderCache,
        raster: Rasterizer,
        surface: HeadlessSurface,
        fonts: FontRegistry,
    }

    impl Harness {
        fn new(width: i32, height: i32) -> Self {
            Self::with_config(width, height, CacheConfig::default())
        }

        fn with_config(width: i32, height: i32, cache: CacheConfig) -> Self {
            Self {
                cache: RenderCache::new(&cache, &DebugConfig::default()),
                raster: Rasterizer::new(width, height),
                surface: HeadlessSurface::new(width, height),
                fonts: FontRegistry::new(),
            }
        }

        fn frame(&mut self, record: impl FnOnce(&mut RenderCache, &mut FontRegistry)) -> FrameReport {
            self.cache.begin_frame(self.surface.size());
            record(&mut self.cache, &mut self.fonts);
            self.cache
                .end_frame(&mut self.raster, &mut self.surface, &mut self.fonts)
                .unwrap()
        }

        fn add_font(&mut self) -> FontHandle {
            self.fonts.insert(Font::from_source(
                Box::new(HeadlessGlyphSource::default()),
                16.0,
                &FontConfig::default(),
            ))
        }
    }

    fn scene(cache: &mut RenderCache, _: &mut FontRegistry) {
        cache.draw_rect(Rect::new(0, 0, 400, 300), Color::BLACK).unwrap();
        cache
            .draw_rect(Rect::new(10, 10, 50, 50), Color::opaque(200, 0, 0))
            .unwrap();
    }

    #[test]
    fn test_first_frame_repaints_whole_screen() {
        let mut h = Harness::new(400, 300);
        let report = h.frame(scene);
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 400, 300)]);
        assert_eq!(h.surface.presented().len(), 1);
        assert_eq!(h.surface.pixel(20, 20), Some(Color::opaque(200, 0, 0)));
    }

    #[test]
    fn test_empty_frame_presents_nothing() {
        let mut h = Harness::new(400, 300);
        h.frame(|_, _| {});
        h.surface.clear_presented();

        let report = h.frame(|_, _| {});
        assert!(report.dirty_rects.is_empty());
        assert_eq!(report.commands, 0);
        assert!(h.surface.presented().is_empty());
    }

    #[test]
    fn test_identical_frames_are_free() {
        let mut h = Harness::new(400, 300);
        h.frame(scene);
        h.surface.clear_presented();

        let report = h.frame(scene);
        assert_eq!(report.commands, 2);
        assert!(report.dirty_rects.is_empty());
        assert!(h.surface.presented().is_empty());
    }

    #[test]
    fn test_color_change_dirties_only_covered_cells() {
        let mut h = Harness::new(400, 300);
        let draw = |color: Color| {
            move |cache: &mut RenderCache, _: &mut FontRegistry| {
                cache.draw_rect(Rect::new(0, 0, 400, 300), Color::BLACK).unwrap();
                cache.draw_rect(Rect::new(100, 100, 50, 50), color).unwrap();
            }
        };
        h.frame(draw(Color::WHITE));
        let report = h.frame(draw(Color::opaque(0, 0, 255)));

        // 100..150 lies within cell (1, 1) of the 96 px grid.
        assert_eq!(report.dirty_rects, vec![Rect::new(96, 96, 96, 96)]);
        assert_eq!(h.surface.pixel(120, 120), Some(Color::opaque(0, 0, 255)));
    }

    #[test]
    fn test_rect_spanning_cells_dirties_each() {
        let mut h = Harness::new(400, 300);
        let draw = |color: Color| {
            move |cache: &mut RenderCache, _: &mut FontRegistry| {
                cache.draw_rect(Rect::new(90, 10, 10, 10), color).unwrap();
            }
        };
        h.frame(draw(Color::WHITE));
        let report = h.frame(draw(Color::BLACK));
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 192, 96)]);
    }

    #[test]
    fn test_resize_forces_full_repaint() {
        let mut h = Harness::new(400, 300);
        h.frame(scene);
        h.frame(scene);

        h.surface.resize(500, 200);
        let report = h.frame(scene);
        assert_eq!(h.cache.screen_rect(), Rect::new(0, 0, 500, 200));
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 500, 200)]);
    }

    #[test]
    fn test_growing_after_one_frame_repaints_new_area() {
        let mut h = Harness::new(100, 100);
        h.frame(scene);

        h.surface.resize(400, 300);
        let report = h.frame(scene);
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 400, 300)]);
        let report = h.frame(scene);
        assert!(report.dirty_rects.is_empty());
    }

    #[test]
    fn test_height_only_resize_is_detected() {
        let mut h = Harness::new(400, 300);
        h.frame(scene);
        h.surface.resize(400, 100);
        let report = h.frame(scene);
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 400, 100)]);
    }

    #[test]
    fn test_invalidate_forces_full_repaint() {
        let mut h = Harness::new(400, 300);
        h.frame(scene);
        h.cache.invalidate();
        let report = h.frame(scene);
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 400, 300)]);
    }

    #[test]
    fn test_set_clip_is_clamped_to_screen() {
        let mut h = Harness::new(100, 100);
        h.frame(|cache, _| {
            cache.set_clip_rect(Rect::new(-50, 50, 1000, 1000)).unwrap();
        });
        h.cache.begin_frame((100, 100));
        h.cache.set_clip_rect(Rect::new(-50, 50, 1000, 1000)).unwrap();
        assert_eq!(
            h.cache.buffer.commands()[0],
            Command::SetClip {
                rect: Rect::new(0, 50, 100, 50)
            }
        );
    }

    #[test]
    fn test_clip_limits_replay() {
        let mut h = Harness::new(200, 200);
        h.frame(|cache, _| {
            cache.set_clip_rect(Rect::new(0, 0, 10, 10)).unwrap();
            cache.draw_rect(Rect::new(0, 0, 200, 200), Color::WHITE).unwrap();
        });
        assert_eq!(h.surface.pixel(5, 5), Some(Color::WHITE));
        assert_eq!(h.surface.pixel(10, 10), Some(Color::BLACK));
    }

    #[test]
    fn test_fully_clipped_command_is_not_hashed() {
        let mut h = Harness::new(200, 200);
        let draw = |color: Color| {
            move |cache: &mut RenderCache, _: &mut FontRegistry| {
                cache.draw_rect(Rect::new(300, 300, 10, 10), color).unwrap();
            }
        };
        h.frame(draw(Color::WHITE));
        let report = h.frame(draw(Color::BLACK));
        assert!(report.dirty_rects.is_empty());
    }

    #[test]
    fn test_transparent_rect_is_hashed_but_not_drawn() {
        let mut h = Harness::new(200, 200);
        h.frame(|_, _| {});
        let report = h.frame(|cache, _| {
            cache
                .draw_rect(Rect::new(0, 0, 10, 10), Color::new(255, 255, 255, 0))
                .unwrap();
        });
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 96, 96)]);
        assert!(h.surface.pixels().iter().all(|&p| p == Color::BLACK));
    }

    #[test]
    fn test_draw_text_returns_end_x() {
        let mut h = Harness::new(200, 200);
        let font = h.add_font();
        h.cache.begin_frame((200, 200));
        let f = h.fonts.get_mut(font).unwrap();
        assert_eq!(h.cache.draw_text(font, f, b"abc", 10, 0, Color::WHITE).unwrap(), 34);
        assert_eq!(h.cache.draw_text(font, f, b"", 10, 0, Color::WHITE).unwrap(), 10);
        let end = h
            .cache
            .draw_text(font, f, b"abc", i32::MAX - 5, 0, Color::WHITE)
            .unwrap();
        assert_eq!(end, i32::MAX);
        assert_eq!(h.cache.recorded(), 3);
    }

    #[test]
    fn test_rects_near_i32_limits_do_not_overflow() {
        let mut h = Harness::new(200, 200);
        let font = h.add_font();
        let report = h.frame(|cache, fonts| {
            cache.draw_rect(Rect::new(0, 0, 200, 200), Color::BLACK).unwrap();
            cache
                .draw_rect(Rect::new(i32::MAX - 10, 0, 100, 10), Color::WHITE)
                .unwrap();
            cache
                .draw_rect(Rect::new(i32::MIN, i32::MIN, 10, 10), Color::WHITE)
                .unwrap();
            cache
                .set_clip_rect(Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX))
                .unwrap();
            let f = fonts.get_mut(font).unwrap();
            cache
                .draw_text(font, f, b"far", i32::MAX - 5, i32::MAX - 5, Color::WHITE)
                .unwrap();
        });
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 200, 200)]);
        assert!(h.surface.pixels().iter().all(|&p| p == Color::BLACK));
    }

    #[test]
    fn test_free_font_is_deferred_until_after_replay() {
        let mut h = Harness::new(200, 200);
        let font = h.add_font();
        let report = h.frame(|cache, fonts| {
            let f = fonts.get_mut(font).unwrap();
            cache.draw_text(font, f, b"hi", 0, 0, Color::WHITE).unwrap();
            cache.free_font(font).unwrap();
            let f = fonts.get_mut(font).unwrap();
            cache.draw_text(font, f, b"hi", 0, 20, Color::WHITE).unwrap();
        });
        assert_eq!(report.fonts_freed, 1);
        assert!(!h.fonts.contains(font));
        // Both runs were drawn before the font went away.
        assert!(h.surface.pixel(1, 5).unwrap().r > 0);
        assert!(h.surface.pixel(1, 25).unwrap().r > 0);
    }

    #[test]
    fn test_double_free_is_ignored() {
        let mut h = Harness::new(200, 200);
        let font = h.add_font();
        let report = h.frame(|cache, _| {
            cache.free_font(font).unwrap();
            cache.free_font(font).unwrap();
        });
        assert_eq!(report.fonts_freed, 1);
    }

    #[test]
    fn test_overflow_aborts_frame_and_recovers() {
        let cache = CacheConfig {
            command_buffer_bytes: command::HEADER_LEN * 2,
            ..CacheConfig::default()
        };
        let mut h = Harness::with_config(200, 200, cache);
        h.frame(|c, _| {
            c.draw_rect(Rect::new(0, 0, 10, 10), Color::WHITE).unwrap();
        });
        h.surface.clear_presented();
        let before = h.surface.pixels().to_vec();

        h.cache.begin_frame((200, 200));
        h.cache.draw_rect(Rect::new(0, 0, 200, 200), Color::BLACK).unwrap();
        h.cache.draw_rect(Rect::new(0, 0, 200, 200), Color::WHITE).unwrap();
        let err = h
            .cache
            .draw_rect(Rect::new(0, 0, 200, 200), Color::WHITE)
            .unwrap_err();
        assert!(matches!(err, RenderError::CommandBufferExhausted { .. }));
        let err = h
            .cache
            .end_frame(&mut h.raster, &mut h.surface, &mut h.fonts)
            .unwrap_err();
        assert!(matches!(err, RenderError::FrameAborted { .. }));
        assert_eq!(h.surface.pixels(), &before[..]);
        assert!(h.surface.presented().is_empty());

        // Next complete frame repaints everything even though its content matches.
        let report = h.frame(|c, _| {
            c.draw_rect(Rect::new(0, 0, 10, 10), Color::WHITE).unwrap();
        });
        assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 200, 200)]);
    }

    #[test]
    fn test_aborted_frame_still_releases_fonts() {
        let cache = CacheConfig {
            command_buffer_bytes: command::HEADER_LEN * 2,
            ..CacheConfig::default()
        };
        let mut h = Harness::with_config(200, 200, cache);
        let font = h.add_font();

        h.cache.begin_frame((200, 200));
        h.cache.free_font(font).unwrap();
        h.cache.draw_rect(Rect::new(0, 0, 200, 200), Color::WHITE).unwrap();
        assert!(h.cache.draw_rect(Rect::new(0, 0, 10, 10), Color::WHITE).is_err());
        let err = h
            .cache
            .end_frame(&mut h.raster, &mut h.surface, &mut h.fonts)
            .unwrap_err();
        assert!(matches!(err, RenderError::FrameAborted { .. }));
        assert!(!h.fonts.contains(font));
        assert!(h.surface.presented().is_empty());

        let report = h.frame(|_, _| {});
        assert_eq!(report.fonts_freed, 0);
    }

    #[test]
    fn test_debug_overlay_tints_dirty_rects() {
        let mut h = Harness::new(100, 100);
        h.cache.show_debug(true);
        h.frame(|c, _| {
            c.draw_rect(Rect::new(0, 0, 100, 100), Color::BLACK).unwrap();
        });
        // Red at alpha 50 over black: (255 * 50) >> 8 = 49
        assert_eq!(h.surface.pixel(50, 50), Some(Color::opaque(49, 0, 0)));
    }
}
