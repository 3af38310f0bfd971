//! FlightMap - Flight path rendering over web map tiles
//!
//! This library turns recorded flight-path samples into raster images. It
//! projects latitude/longitude sequences into pixel space (linear or Web
//! Mercator), optionally stitches a background mosaic from square map tiles
//! addressed by quadkeys, and strokes the projected paths on top.
//!
//! # Pipeline
//!
//! ```text
//! coordinates ─► segment ─► project ─┐
//!                                    ├─► render ─► RGBA buffer / PNG
//! bbox + size ─► tiles ─► mosaic ────┘
//! ```
//!
//! The entry point for a complete render is [`generate::ImageGenerator`] (or
//! [`generate::generate_flat`] when no tile source is needed).

pub mod compositor;
pub mod config;
pub mod coord;
pub mod error;
pub mod flight;
pub mod generate;
pub mod logging;
pub mod projection;
pub mod provider;
pub mod render;
pub mod resolution;
pub mod segment;
pub mod tile;

pub use coord::{BoundingBox, GeoCoordinate, Pixel, Resolution};
pub use error::ConfigurationError;
