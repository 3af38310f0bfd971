//! Raster rendering of projected flight paths
//!
//! A render walks a fixed sequence of states, enforced by the types:
//!
//! ```text
//! Canvas ──fill_background──► PaintedCanvas ──clip_to_ellipse?──► stroke_paths ──finish──► RenderedImage
//! ```
//!
//! The background is always drawn unclipped. An ellipse clip only masks
//! the paths stroked after it.

mod background;
mod canvas;
mod color;

pub use background::Background;
pub use canvas::{Canvas, PaintedCanvas, RenderedImage, StrokeStyle};
pub use color::{parse_color, parse_rgba};

use thiserror::Error;

/// Default stroke width in pixels.
pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// Default canvas fill.
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

/// Default path color.
pub const DEFAULT_FOREGROUND: &str = "#000000";

/// Errors that can occur while drawing or encoding an image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The pixel buffer could not be allocated
    #[error("Cannot allocate a {width}x{height} canvas")]
    CanvasAllocation { width: u32, height: u32 },

    /// The mosaic crop does not describe a drawable rectangle
    #[error("Invalid background crop: {0}")]
    InvalidCrop(String),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}
