// src/display/surface.rs
//! PixelSurface trait - the boundary between the renderer and whatever owns the
//! window's pixels.
//!
//! The renderer only needs three things from a host surface: its current size,
//! mutable access to its pixels, and a way to say which rectangles changed.
//! Window creation, event handling and DPI live on the other side of this trait.

use crate::color::Color;
use crate::geometry::Rect;

/// Host-provided pixel buffer.
///
/// ## Pixel layout
/// `pixels_mut()` returns a contiguous row-major slice of `width * height` colors
/// with a stride of `width`. Implementations that resize must keep that
/// invariant for the size they report from `size()`.
pub trait PixelSurface {
    /// Current surface dimensions in pixels, `(width, height)`.
    fn size(&self) -> (i32, i32);

    /// Row-major pixel storage, `width * height` entries.
    fn pixels_mut(&mut self) -> &mut [Color];

    /// Flush exactly these rectangles to the display.
    ///
    /// Called at most once per frame, and only when at least one rectangle changed.
    fn present_rects(&mut self, rects: &[Rect]);
}
