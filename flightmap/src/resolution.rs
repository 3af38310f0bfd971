//! Aspect-correct output resolution.
//!
//! Derives a pixel width and height from a requested longest edge so that the
//! output image roughly keeps the geographic aspect ratio of a bounding box.

use crate::coord::{distance_km, BoundingBox, GeoCoordinate, Resolution};
use crate::error::ConfigurationError;

/// Computes the output resolution for `bbox` with `longest_edge` pixels on
/// the longer side.
///
/// The vertical extent is measured along the prime meridian. The horizontal
/// extent is measured along the equator when the box straddles it, otherwise
/// along the box latitude closest to the equator, where the box is widest.
///
/// A box with no extent on either axis maps to a square image. The shorter
/// edge never drops below one pixel, however thin the box.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidResolution` when `longest_edge` is zero.
pub fn calculate_resolution(
    longest_edge: u32,
    bbox: &BoundingBox,
) -> Result<Resolution, ConfigurationError> {
    if longest_edge == 0 {
        return Err(ConfigurationError::InvalidResolution {
            width: 0,
            height: 0,
        });
    }

    let vertical = distance_km(
        GeoCoordinate::new(bbox.south(), 0.0),
        GeoCoordinate::new(bbox.north(), 0.0),
    );

    let reference_lat = if bbox.straddles_equator() {
        0.0
    } else {
        bbox.south().abs().min(bbox.north().abs())
    };
    let horizontal = distance_km(
        GeoCoordinate::new(reference_lat, bbox.west()),
        GeoCoordinate::new(reference_lat, bbox.east()),
    );

    if vertical == 0.0 && horizontal == 0.0 {
        return Ok(Resolution::new(longest_edge, longest_edge));
    }

    let scaled = |ratio: f64| ((ratio * f64::from(longest_edge)).round() as u32).max(1);

    let resolution = if horizontal > vertical {
        Resolution::new(longest_edge, scaled(vertical / horizontal))
    } else {
        Resolution::new(scaled(horizontal / vertical), longest_edge)
    };

    Ok(resolution)
}
