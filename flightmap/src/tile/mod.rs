//! Spherical Mercator tile pyramid math (EPSG:3857)
//!
//! Pure arithmetic between four coordinate systems:
//!
//! - geographic positions (latitude/longitude in degrees)
//! - global pixels in the full-world raster at a zoom level
//! - tile indices `(x, y, zoom)`, origin at the north-west corner
//! - quadkeys, one base-4 digit per zoom level
//!
//! Tile size is a parameter everywhere; map styles served at 512 px use
//! 512, classic slippy maps use 256.

mod math;
mod quadkey;
mod view;

pub use math::{
    global_pixel_to_position, map_size, position_to_global_pixel, position_to_tile,
    tile_to_bounding_box, MAX_MERCATOR_LAT, MIN_MERCATOR_LAT,
};
pub use quadkey::{quadkey_to_tile, tile_to_quadkey};
pub use view::{best_map_view, quadkeys_in_bounding_box, quadkeys_in_view, MapView};

use std::fmt;

use thiserror::Error;

/// Highest zoom level a quadkey or tile may address.
pub const MAX_ZOOM: u8 = 30;

/// Errors from tile index arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileMathError {
    #[error("Invalid zoom level {0} (maximum is 30)")]
    InvalidZoom(u8),

    #[error("Tile {x}/{y} is outside the tile grid at zoom {zoom}")]
    InvalidTile { x: u32, y: u32, zoom: u8 },

    #[error("Invalid quadkey '{0}': digits must be 0-3")]
    InvalidQuadkey(String),
}

/// A tile in the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column, counted eastwards from the antimeridian
    pub x: u32,
    /// Row, counted southwards from the north edge
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    /// Creates a tile, checking the indices against the grid size at `zoom`.
    pub fn new(x: u32, y: u32, zoom: u8) -> Result<Self, TileMathError> {
        if zoom > MAX_ZOOM {
            return Err(TileMathError::InvalidZoom(zoom));
        }
        let tiles = tiles_per_side(zoom);
        if u64::from(x) >= tiles || u64::from(y) >= tiles {
            return Err(TileMathError::InvalidTile { x, y, zoom });
        }
        Ok(Self { x, y, zoom })
    }

    /// Quadkey of this tile.
    pub fn quadkey(&self) -> String {
        tile_to_quadkey(self)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Number of tiles along one side of the grid at `zoom` (clamped to
/// [`MAX_ZOOM`]).
#[inline]
pub fn tiles_per_side(zoom: u8) -> u64 {
    1u64 << zoom.min(MAX_ZOOM)
}
