// src/render_cache/command.rs

//! Recorded draw commands and the fixed-capacity buffer that holds one frame of them.
//!
//! Every command has a canonical byte encoding (tag, encoded length, bounding rect,
//! color, font id, then the text bytes). The encoded length is what the buffer's
//! capacity is charged with, and the encoding is what gets hashed into the cell grid.

use crate::color::Color;
use crate::error::{RenderError, Result};
use crate::geometry::Rect;
use crate::rasterizer::font::FontHandle;
use std::hash::Hasher;
use std::ops::Range;

/// Fixed part of every encoded command: tag, length, rect, color, font id.
pub const HEADER_LEN: usize = 1 + 4 + 16 + 4 + 4;

/// 32-bit FNV-1a.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a(u32);

impl Fnv1a {
    pub const OFFSET: u32 = 2166136261;
    const PRIME: u32 = 16777619;

    pub fn new() -> Self {
        Fnv1a(Self::OFFSET)
    }

    /// Continues hashing from an existing value.
    pub fn with_state(state: u32) -> Self {
        Fnv1a(state)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1a {
    #[inline]
    fn finish(&self) -> u64 {
        self.0 as u64
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u32;
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }
}

/// Byte range of a `DrawText` command's text inside the buffer's text arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan(Range<usize>);

impl TextSpan {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One deferred operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Release a font once the frame has been replayed.
    FreeFont { font: FontHandle },
    /// Replace the clip rectangle. `rect` is already clipped to the screen.
    SetClip { rect: Rect },
    DrawRect { rect: Rect, color: Color },
    /// `rect` spans the measured text: pen origin, text width and line height.
    DrawText {
        font: FontHandle,
        rect: Rect,
        color: Color,
        text: TextSpan,
    },
}

impl Command {
    fn tag(&self) -> u8 {
        match self {
            Command::FreeFont { .. } => 0,
            Command::SetClip { .. } => 1,
            Command::DrawText { .. } => 2,
            Command::DrawRect { .. } => 3,
        }
    }

    /// Bounding rectangle used for spatial hashing. `FreeFont` covers nothing.
    pub fn rect(&self) -> Rect {
        match self {
            Command::FreeFont { .. } => Rect::default(),
            Command::SetClip { rect }
            | Command::DrawRect { rect, .. }
            | Command::DrawText { rect, .. } => *rect,
        }
    }

    fn color(&self) -> Color {
        match self {
            Command::DrawRect { color, .. } | Command::DrawText { color, .. } => *color,
            _ => Color::TRANSPARENT,
        }
    }

    fn font_id(&self) -> u32 {
        match self {
            Command::FreeFont { font } | Command::DrawText { font, .. } => font.id(),
            _ => 0,
        }
    }

    fn text_len(&self) -> usize {
        match self {
            Command::DrawText { text, .. } => text.len(),
            _ => 0,
        }
    }

    /// Bytes this command occupies in the buffer.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.text_len()
    }
}

/// One frame's worth of commands, bounded by a byte capacity.
///
/// Storage for both the commands and their text is reserved up front, so
/// recording never reallocates.
#[derive(Debug)]
pub struct CommandBuffer {
    capacity: usize,
    used: usize,
    exhausted: bool,
    commands: Vec<Command>,
    text: Vec<u8>,
}

impl CommandBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: 0,
            exhausted: false,
            commands: Vec::with_capacity(capacity / HEADER_LEN),
            text: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes charged so far this frame.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// True once a record has overflowed; cleared by `reset`.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn reserve(&mut self, len: usize) -> Result<()> {
        let requested = self.used + len;
        if self.exhausted || requested > self.capacity {
            self.exhausted = true;
            return Err(RenderError::CommandBufferExhausted {
                capacity: self.capacity,
                requested,
            });
        }
        self.used = requested;
        Ok(())
    }

    pub fn push_free_font(&mut self, font: FontHandle) -> Result<()> {
        self.push(Command::FreeFont { font })
    }

    pub fn push_set_clip(&mut self, rect: Rect) -> Result<()> {
        self.push(Command::SetClip { rect })
    }

    pub fn push_draw_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.push(Command::DrawRect { rect, color })
    }

    /// Copies `text` into the arena and records a `DrawText` referring to it.
    pub fn push_draw_text(
        &mut self,
        font: FontHandle,
        rect: Rect,
        color: Color,
        text: &[u8],
    ) -> Result<()> {
        self.reserve(HEADER_LEN + text.len())?;
        let start = self.text.len();
        self.text.extend_from_slice(text);
        self.commands.push(Command::DrawText {
            font,
            rect,
            color,
            text: TextSpan(start..self.text.len()),
        });
        Ok(())
    }

    fn push(&mut self, command: Command) -> Result<()> {
        self.reserve(command.encoded_len())?;
        self.commands.push(command);
        Ok(())
    }

    /// Commands in recording order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The bytes a `DrawText` span refers to.
    pub fn text(&self, span: &TextSpan) -> &[u8] {
        &self.text[span.0.clone()]
    }

    /// FNV-1a of the command's full encoding, seeded fresh per command.
    pub fn hash(&self, command: &Command) -> u32 {
        let mut hasher = Fnv1a::new();
        let rect = command.rect();
        hasher.write_u8(command.tag());
        hasher.write(&(command.encoded_len() as u32).to_le_bytes());
        for v in [rect.x, rect.y, rect.width, rect.height] {
            hasher.write(&v.to_le_bytes());
        }
        hasher.write(&command.color().to_bytes());
        hasher.write(&command.font_id().to_le_bytes());
        if let Command::DrawText { text, .. } = command {
            hasher.write(self.text(text));
        }
        hasher.value()
    }

    /// Empties the buffer and clears the exhausted flag. Keeps the allocation.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.text.clear();
        self.used = 0;
        self.exhausted = false;
    }
}
