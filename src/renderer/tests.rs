// src/renderer/tests.rs

use super::*;
use crate::display::HeadlessSurface;
use crate::error::RenderError;
use crate::rasterizer::headless_font_driver::HeadlessGlyphSource;
use test_log::test; // For logging within tests

const BG: Color = Color::opaque(30, 30, 40);
const FG: Color = Color::opaque(220, 220, 220);

fn renderer(width: i32, height: i32) -> Renderer<HeadlessSurface> {
    Renderer::new(HeadlessSurface::new(width, height), &Config::default()).unwrap()
}

fn box_font(r: &mut Renderer<HeadlessSurface>) -> FontHandle {
    r.add_font(Box::new(HeadlessGlyphSource::default()), 16.0)
}

/// An editor-like frame: background, one line of text and an optional cursor.
fn editor_frame(
    r: &mut Renderer<HeadlessSurface>,
    font: FontHandle,
    cursor: bool,
) -> FrameReport {
    r.begin_frame();
    let (w, h) = r.size();
    r.draw_rect(Rect::new(0, 0, w, h), BG).unwrap();
    let end = r.draw_text(font, "fn main() {}", 4, 4, FG).unwrap();
    if cursor {
        r.draw_rect(Rect::new(end, 4, 2, 16), FG).unwrap();
    }
    r.end_frame().unwrap()
}

#[test]
fn test_new_rejects_invalid_config() {
    for cell_size in [-1, 0] {
        let mut config = Config::default();
        config.cache.cell_size = cell_size;
        let result = Renderer::new(HeadlessSurface::new(10, 10), &config);
        assert!(matches!(result, Err(RenderError::Config(_))));
    }
}

#[test]
fn test_first_frame_covers_surface() {
    let mut r = renderer(320, 200);
    let font = box_font(&mut r);
    let report = editor_frame(&mut r, font, true);

    assert_eq!(report.commands, 3);
    assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 320, 200)]);
    assert_eq!(r.surface().last_presented(), Some(&report.dirty_rects[..]));
    assert_eq!(r.surface().pixel(300, 190), Some(BG));
}

#[test]
fn test_cursor_blink_repaints_one_cell() {
    let mut r = renderer(320, 200);
    let font = box_font(&mut r);
    editor_frame(&mut r, font, true);

    let report = editor_frame(&mut r, font, false);
    // Text ends at 4 + 12 * 8 = 100, so the cursor sits in cell (1, 0).
    assert_eq!(report.dirty_rects, vec![Rect::new(96, 0, 96, 96)]);
    assert_eq!(r.surface().pixel(100, 10), Some(BG));

    let report = editor_frame(&mut r, font, true);
    assert_eq!(report.dirty_rects, vec![Rect::new(96, 0, 96, 96)]);
    assert_eq!(r.surface().pixel(100, 10), Some(FG));
}

#[test]
fn test_unchanged_frame_touches_nothing() {
    let mut r = renderer(320, 200);
    let font = box_font(&mut r);
    editor_frame(&mut r, font, true);
    r.surface_mut().clear_presented();

    let report = editor_frame(&mut r, font, true);
    assert!(report.dirty_rects.is_empty());
    assert!(r.surface().presented().is_empty());
}

#[test]
fn test_resize_repaints_everything() {
    let mut r = renderer(320, 200);
    let font = box_font(&mut r);
    editor_frame(&mut r, font, true);

    r.surface_mut().resize(640, 100);
    let report = editor_frame(&mut r, font, true);
    assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 640, 100)]);
    assert_eq!(r.surface().pixel(639, 99), Some(BG));
}

#[test]
fn test_draw_text_returns_pen_position() {
    let mut r = renderer(100, 100);
    let font = box_font(&mut r);
    r.begin_frame();
    assert_eq!(r.draw_text(font, "", 13, 0, FG).unwrap(), 13);
    assert_eq!(r.draw_text(font, "ab", 13, 0, FG).unwrap(), 29);
    assert_eq!(r.draw_text(font, &[0xe2, 0x82, 0xac][..], 0, 0, FG).unwrap(), 8);
}

#[test]
fn test_text_metrics() {
    let mut r = renderer(100, 100);
    let font = box_font(&mut r);
    assert_eq!(r.text_width(font, "").unwrap(), 0);
    assert_eq!(r.text_width(font, "four").unwrap(), 32);
    assert_eq!(r.text_height(font).unwrap(), 16);

    r.set_tab_width(font, 40).unwrap();
    assert_eq!(r.text_width(font, "\t").unwrap(), 40);
}

#[test]
fn test_load_missing_font_fails_cleanly() {
    let mut r = renderer(100, 100);
    let err = r.load_font("/nonexistent/font.ttf", 14.0).unwrap_err();
    assert!(matches!(err, RenderError::FontIo { .. }));

    // The renderer is still usable.
    r.begin_frame();
    r.draw_rect(Rect::new(0, 0, 10, 10), FG).unwrap();
    assert!(r.end_frame().is_ok());
}

#[test]
fn test_freed_font_is_unknown_after_frame() {
    let mut r = renderer(100, 100);
    let font = box_font(&mut r);

    r.begin_frame();
    r.draw_text(font, "x", 0, 0, FG).unwrap();
    r.free_font(font).unwrap();
    // Still valid until the frame is resolved.
    assert!(r.text_width(font, "x").is_ok());
    let report = r.end_frame().unwrap();
    assert_eq!(report.fonts_freed, 1);

    r.begin_frame();
    assert!(matches!(
        r.draw_text(font, "x", 0, 0, FG),
        Err(RenderError::UnknownFont(h)) if h == font
    ));
    assert!(matches!(r.free_font(font), Err(RenderError::UnknownFont(_))));
    assert!(matches!(r.text_height(font), Err(RenderError::UnknownFont(_))));
}

#[test]
fn test_font_handle_is_part_of_the_hash() {
    let mut r = renderer(100, 100);
    let first = box_font(&mut r);
    editor_frame(&mut r, first, false);

    // Same text and identical glyphs, but another handle: only the text cells repaint.
    let second = box_font(&mut r);
    assert_ne!(first, second);
    let report = editor_frame(&mut r, second, false);
    assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 100, 96)]);
}

#[test]
fn test_debug_overlay_only_over_repainted_area() {
    let mut r = renderer(300, 100);
    let font = box_font(&mut r);
    editor_frame(&mut r, font, true);

    r.show_debug(true);
    editor_frame(&mut r, font, false);
    // Cell (1, 0) was repainted and tinted; cell (0, 0) was left alone.
    assert_ne!(r.surface().pixel(150, 50), Some(BG));
    assert_eq!(r.surface().pixel(50, 50), Some(BG));
}

#[test]
fn test_invalidate_repaints_everything() {
    let mut r = renderer(200, 100);
    let font = box_font(&mut r);
    editor_frame(&mut r, font, false);
    r.invalidate();
    let report = editor_frame(&mut r, font, false);
    assert_eq!(report.dirty_rects, vec![Rect::new(0, 0, 200, 100)]);
}

#[test]
fn test_into_surface_keeps_pixels() {
    let mut r = renderer(50, 50);
    r.begin_frame();
    r.draw_rect(Rect::new(0, 0, 50, 50), FG).unwrap();
    r.end_frame().unwrap();
    let surface = r.into_surface();
    assert!(surface.pixels().iter().all(|&p| p == FG));
}
