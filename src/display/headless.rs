//! Headless in-memory surface implementation.

use crate::color::Color;
use crate::display::surface::PixelSurface;
use crate::geometry::Rect;
use log::{info, trace};

/// A `PixelSurface` backed by an owned `Vec<Color>`.
///
/// Every `present_rects` call is recorded so callers can inspect what a real
/// window would have been asked to flush.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width_px: i32,
    height_px: i32,
    pixels: Vec<Color>,
    presented: Vec<Vec<Rect>>,
}

impl HeadlessSurface {
    /// Creates a surface cleared to `Color::BLACK`.
    pub fn new(width_px: i32, height_px: i32) -> Self {
        let (width_px, height_px) = (width_px.max(0), height_px.max(0));
        info!("HeadlessSurface: Created {}x{} px", width_px, height_px);
        Self {
            width_px,
            height_px,
            pixels: vec![Color::BLACK; (width_px * height_px) as usize],
            presented: Vec::new(),
        }
    }

    /// Changes the surface size. Contents are cleared to black.
    pub fn resize(&mut self, width_px: i32, height_px: i32) {
        let (width_px, height_px) = (width_px.max(0), height_px.max(0));
        info!(
            "HeadlessSurface: Resize {}x{} -> {}x{}",
            self.width_px, self.height_px, width_px, height_px
        );
        self.width_px = width_px;
        self.height_px = height_px;
        self.pixels.clear();
        self.pixels
            .resize((width_px * height_px) as usize, Color::BLACK);
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x >= self.width_px || y >= self.height_px {
            return None;
        }
        self.pixels.get((y * self.width_px + x) as usize).copied()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Fills the whole surface, bypassing the renderer.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Every `present_rects` call so far, oldest first.
    pub fn presented(&self) -> &[Vec<Rect>] {
        &self.presented
    }

    /// The rectangles of the most recent `present_rects` call.
    pub fn last_presented(&self) -> Option<&[Rect]> {
        self.presented.last().map(Vec::as_slice)
    }

    pub fn clear_presented(&mut self) {
        self.presented.clear();
    }
}

impl PixelSurface for HeadlessSurface {
    fn size(&self) -> (i32, i32) {
        (self.width_px, self.height_px)
    }

    fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    fn present_rects(&mut self, rects: &[Rect]) {
        trace!("HeadlessSurface: Present {} rect(s)", rects.len());
        self.presented.push(rects.to_vec());
    }
}
