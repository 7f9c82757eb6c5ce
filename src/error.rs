// src/error.rs

//! Error type shared by every fallible operation in the crate.

use crate::rasterizer::font::FontHandle;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Recording a command would exceed the command buffer's fixed capacity.
    /// The current frame is lost; see `RenderCache::end_frame`.
    #[error("command buffer exhausted: {requested} bytes requested, capacity is {capacity} bytes")]
    CommandBufferExhausted { capacity: usize, requested: usize },

    /// `end_frame` was called for a frame whose recording overflowed.
    #[error("frame aborted: command buffer of {capacity} bytes overflowed while recording")]
    FrameAborted { capacity: usize },

    #[error("failed to read font file '{}'", path.display())]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font file '{}': {reason}", path.display())]
    FontParse { path: PathBuf, reason: String },

    #[error("unknown or freed font handle {0:?}")]
    UnknownFont(FontHandle),

    #[error("invalid configuration: {0}")]
    Config(String),
}
