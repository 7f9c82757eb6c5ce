// src/render_cache/dirty.rs

//! Dirty rectangle accumulation.

use crate::geometry::Rect;

/// List of dirty rectangles built with a linear merge rule.
///
/// A new rectangle is merged into the most recently added entry it overlaps or
/// touches; otherwise it is appended. This is not an optimal packing.
#[derive(Debug, Default, Clone)]
pub struct DirtyRects {
    rects: Vec<Rect>,
}

impl DirtyRects {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rects: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, rect: Rect) {
        if let Some(existing) = self
            .rects
            .iter_mut()
            .rev()
            .find(|r| r.overlaps_or_touches(&rect))
        {
            *existing = existing.union(&rect);
            return;
        }
        self.rects.push(rect);
    }

    /// Converts cell-space rects to pixel space and clips them to `screen`.
    /// Rects left without area are dropped.
    pub fn scale_and_clip(&mut self, cell_size: i32, screen: Rect) {
        for rect in &mut self.rects {
            *rect = rect.scaled(cell_size).intersect(&screen);
        }
        self.rects.retain(Rect::has_area);
    }

    pub fn as_slice(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}
