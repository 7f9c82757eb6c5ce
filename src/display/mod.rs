// src/display/mod.rs
//! The pixel surface boundary.
//!
//! - PixelSurface: what the renderer needs from a host window
//! - HeadlessSurface: in-memory implementation for tests and offscreen use

pub mod headless;
pub mod surface;

pub use headless::HeadlessSurface;
pub use surface::PixelSurface;
