// src/render_cache/grid.rs

//! Double-buffered grid of per-cell content hashes.

use crate::geometry::Rect;
use crate::render_cache::command::Fnv1a;
use std::hash::Hasher;

/// Written into every previous cell by `invalidate`; no accumulated hash is
/// expected to land on it.
pub const INVALID_HASH: u32 = 0xffff_ffff;

/// Two hash grids selected by a toggling index.
///
/// Both are allocated once at the maximum size. Only the top-left
/// `active_cols x active_rows` region, derived from the screen size, is used.
#[derive(Debug)]
pub struct CellGrid {
    cols: usize,
    rows: usize,
    active_cols: usize,
    active_rows: usize,
    buffers: [Vec<u32>; 2],
    current: usize,
}

impl CellGrid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            active_cols: 0,
            active_rows: 0,
            buffers: [vec![Fnv1a::OFFSET; cols * rows], vec![Fnv1a::OFFSET; cols * rows]],
            current: 0,
        }
    }

    /// Sizes the active region for a `width x height` screen. Screens larger
    /// than the allocation are tracked only up to it.
    pub fn set_extent(&mut self, width: i32, height: i32, cell_size: i32) -> bool {
        let wanted_cols = (width.max(0) / cell_size + 1) as usize;
        let wanted_rows = (height.max(0) / cell_size + 1) as usize;
        self.active_cols = wanted_cols.min(self.cols);
        self.active_rows = wanted_rows.min(self.rows);
        wanted_cols > self.cols || wanted_rows > self.rows
    }

    pub fn active_size(&self) -> (usize, usize) {
        (self.active_cols, self.active_rows)
    }

    /// Folds `hash` into every current cell covered by the pixel rect `rect`.
    /// The right and bottom edges are exclusive.
    pub fn fold(&mut self, rect: Rect, cell_size: i32, hash: u32) {
        if !rect.has_area() || self.active_cols == 0 || self.active_rows == 0 {
            return;
        }
        let max_x = self.active_cols as i32 - 1;
        let max_y = self.active_rows as i32 - 1;
        let x1 = (rect.x / cell_size).clamp(0, max_x) as usize;
        let y1 = (rect.y / cell_size).clamp(0, max_y) as usize;
        let x2 = ((rect.right() - 1) / cell_size).clamp(0, max_x) as usize;
        let y2 = ((rect.bottom() - 1) / cell_size).clamp(0, max_y) as usize;

        let bytes = hash.to_le_bytes();
        let cols = self.cols;
        let cells = &mut self.buffers[self.current];
        for y in y1..=y2 {
            for x in x1..=x2 {
                let cell = &mut cells[x + y * cols];
                let mut hasher = Fnv1a::with_state(*cell);
                hasher.write(&bytes);
                *cell = hasher.value();
            }
        }
    }

    /// Calls `on_dirty(x, y)` for every active cell whose hash changed since the
    /// previous frame, then resets the whole previous grid, inactive cells included.
    pub fn diff(&mut self, mut on_dirty: impl FnMut(i32, i32)) {
        let [a, b] = &mut self.buffers;
        let (cur, prev) = if self.current == 0 { (a, b) } else { (b, a) };
        for y in 0..self.active_rows {
            for x in 0..self.active_cols {
                let idx = x + y * self.cols;
                if cur[idx] != prev[idx] {
                    on_dirty(x as i32, y as i32);
                }
            }
        }
        prev.fill(Fnv1a::OFFSET);
    }

    /// Makes this frame's grid the previous one. The old previous grid, already
    /// reset by `diff`, becomes current. Cells outside the active region are
    /// therefore `OFFSET` in the current grid and never match `INVALID_HASH`.
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Marks every previous cell as changed so the next diff reports the whole screen.
    pub fn invalidate(&mut self) {
        self.buffers[self.current ^ 1].fill(INVALID_HASH);
    }

    /// Drops whatever was folded into the current grid this frame.
    pub fn reset_current(&mut self) {
        self.buffers[self.current].fill(Fnv1a::OFFSET);
    }
}
