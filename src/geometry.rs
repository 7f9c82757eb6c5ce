// src/geometry.rs

//! Integer pixel-space rectangles and the clip bounds used by the rasterizer.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel (or cell) space.
///
/// `intersect` never produces a negative width or height; an empty result has
/// zero area and is discarded by callers. Edge and size arithmetic saturates at
/// the `i32` limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// True when the rectangle covers at least one pixel.
    #[inline]
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Overlapping region of `self` and `other`, clamped to zero size.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rect::new(
            x1,
            y1,
            x2.saturating_sub(x1).max(0),
            y2.saturating_sub(y1).max(0),
        )
    }

    /// Bounding box of `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1))
    }

    /// True when the rectangles intersect or share an edge or corner.
    pub fn overlaps_or_touches(&self, other: &Rect) -> bool {
        other.right() >= self.x
            && other.x <= self.right()
            && other.bottom() >= self.y
            && other.y <= self.bottom()
    }

    /// True when the rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.intersect(other).has_area()
    }

    /// Multiplies every component by `factor` (cell space to pixel space).
    pub fn scaled(&self, factor: i32) -> Rect {
        Rect::new(
            self.x.saturating_mul(factor),
            self.y.saturating_mul(factor),
            self.width.saturating_mul(factor),
            self.height.saturating_mul(factor),
        )
    }
}

/// Clip rectangle stored as edges so clipping is a handful of min/max calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl From<Rect> for ClipBounds {
    fn from(rect: Rect) -> Self {
        Self {
            left: rect.x,
            top: rect.y,
            right: rect.right(),
            bottom: rect.bottom(),
        }
    }
}

impl ClipBounds {
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.right.saturating_sub(self.left).max(0),
            self.bottom.saturating_sub(self.top).max(0),
        )
    }
}
