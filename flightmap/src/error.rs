//! Configuration errors shared by every stage of a render.
//!
//! These are fatal and never retried: they describe inputs that cannot be
//! rendered no matter how often the request is repeated.

use std::fmt;

use thiserror::Error;

/// Axis of a bounding box or projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// East-west axis (maps to pixel x).
    Longitude,
    /// North-south axis (maps to pixel y).
    Latitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Longitude => write!(f, "longitude"),
            Axis::Latitude => write!(f, "latitude"),
        }
    }
}

/// Invalid render configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The input range of an axis mapping is empty (`start == end`).
    #[error("Degenerate {axis} range: start and end are both {value}")]
    DegenerateAxis { axis: Axis, value: f64 },

    /// A bound of a Mercator projection sits on the south pole.
    #[error("Latitude -90 cannot be projected with Web Mercator")]
    PoleLatitude,

    /// The bounding box violates an invariant.
    #[error("Invalid bounding box: {reason}")]
    InvalidBoundingBox { reason: String },

    /// The requested resolution has a zero edge.
    #[error("Invalid resolution {width}x{height}: both edges must be positive")]
    InvalidResolution { width: u32, height: u32 },

    /// Unknown projection discriminator.
    #[error("Unknown projection '{0}' (expected LINEAR or MERCATOR)")]
    UnknownProjection(String),

    /// Color string that cannot be parsed.
    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    /// Line width must be finite and positive.
    #[error("Invalid line width {0}")]
    InvalidLineWidth(f32),

    /// Gap threshold must be finite and positive.
    #[error("Invalid split distance {0} km: must be a positive number")]
    InvalidSplitDistance(f64),

    /// A map style background was requested without a tile source.
    #[error("Background style '{0}' requires a tile source")]
    TileSourceRequired(String),
}
