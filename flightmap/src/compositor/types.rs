//! Compositor types and errors

use image::RgbaImage;
use thiserror::Error;

use crate::coord::BoundingBox;
use crate::error::ConfigurationError;
use crate::provider::ProviderError;
use crate::tile::{tile_to_bounding_box, TileCoord};

/// Errors that can occur while composing a background mosaic.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// A tile could not be fetched; the whole mosaic is abandoned
    #[error("Failed to fetch tile {tile}: {source}")]
    TileFetch {
        tile: TileCoord,
        #[source]
        source: ProviderError,
    },

    /// Map backgrounds cannot be composed for boxes crossing the antimeridian
    #[error("Map backgrounds are not supported for boxes crossing the antimeridian")]
    AntimeridianUnsupported,

    /// The viewport enumerated no tiles
    #[error("No tiles cover the requested area")]
    NoTiles,

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Inclusive rectangle of tile indices at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub zoom: u8,
}

impl TileRange {
    /// Smallest range holding every tile, or `None` for an empty list.
    ///
    /// The range uses the highest zoom found among the tiles.
    pub fn from_tiles(tiles: &[TileCoord]) -> Option<Self> {
        let first = tiles.first()?;
        let mut range = TileRange {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
            zoom: first.zoom,
        };
        for tile in &tiles[1..] {
            range.min_x = range.min_x.min(tile.x);
            range.min_y = range.min_y.min(tile.y);
            range.max_x = range.max_x.max(tile.x);
            range.max_y = range.max_y.max(tile.y);
            range.zoom = range.zoom.max(tile.zoom);
        }
        Some(range)
    }

    /// Number of tile columns.
    pub fn columns(&self) -> u32 {
        self.max_x + 1 - self.min_x
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        self.max_y + 1 - self.min_y
    }

    /// Mosaic size in pixels for square tiles of `tile_size`.
    pub fn pixel_size(&self, tile_size: u32) -> (u32, u32) {
        (self.columns() * tile_size, self.rows() * tile_size)
    }

    /// Pixel offset of `tile` inside the mosaic.
    pub fn offset_of(&self, tile: &TileCoord, tile_size: u32) -> (u32, u32) {
        (
            (tile.x - self.min_x) * tile_size,
            (tile.y - self.min_y) * tile_size,
        )
    }

    /// Geographic area covered by the whole range.
    ///
    /// West and north come from the north-west tile, east and south from
    /// the south-east tile.
    pub fn bounding_box(&self, tile_size: u32) -> BoundingBox {
        let nw = tile_to_bounding_box(
            &TileCoord {
                x: self.min_x,
                y: self.min_y,
                zoom: self.zoom,
            },
            tile_size,
        );
        let se = tile_to_bounding_box(
            &TileCoord {
                x: self.max_x,
                y: self.max_y,
                zoom: self.zoom,
            },
            tile_size,
        );
        BoundingBox::from_edges(nw.west(), se.south(), se.east(), nw.north())
    }
}

/// Source rectangle of a mosaic that lines up with a foreground box.
///
/// Drawing `(padding_x, padding_y, width, height)` of the mosaic scaled onto
/// the whole canvas aligns background and foreground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crop {
    pub padding_x: f64,
    pub padding_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Crop {
    /// Computes the crop of a `mosaic_width` x `mosaic_height` mosaic
    /// covering `mosaic_box` that corresponds to `foreground`.
    ///
    /// Uses a constant degrees-per-pixel resolution on each axis.
    pub fn compute(
        foreground: &BoundingBox,
        mosaic_width: u32,
        mosaic_height: u32,
        mosaic_box: &BoundingBox,
    ) -> Self {
        let resolution_lon = mosaic_box.longitude_span() / f64::from(mosaic_width);
        let resolution_lat = mosaic_box.latitude_span() / f64::from(mosaic_height);

        Self {
            padding_x: (foreground.west() - mosaic_box.west()) / resolution_lon,
            padding_y: (mosaic_box.north() - foreground.north()) / resolution_lat,
            width: foreground.longitude_span() / resolution_lon,
            height: foreground.latitude_span() / resolution_lat,
        }
    }
}

/// Stitched background tiles plus the area they cover.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub image: RgbaImage,
    /// Area of the mosaic's outer corners; at least the requested area
    pub bounding_box: BoundingBox,
    pub range: TileRange,
}

impl Mosaic {
    /// Crop aligning this mosaic with `foreground`.
    pub fn crop_for(&self, foreground: &BoundingBox) -> Crop {
        Crop::compute(
            foreground,
            self.image.width(),
            self.image.height(),
            &self.bounding_box,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: u32, y: u32, zoom: u8) -> TileCoord {
        TileCoord { x, y, zoom }
    }

    #[test]
    fn test_range_from_tiles() {
        let range = TileRange::from_tiles(&[tile(3, 5, 4), tile(1, 6, 4), tile(2, 2, 4)]).unwrap();
        assert_eq!(
            range,
            TileRange {
                min_x: 1,
                min_y: 2,
                max_x: 3,
                max_y: 6,
                zoom: 4
            }
        );
        assert_eq!(range.columns(), 3);
        assert_eq!(range.rows(), 5);
        assert_eq!(range.pixel_size(512), (1536, 2560));
    }

    #[test]
    fn test_range_from_no_tiles() {
        assert_eq!(TileRange::from_tiles(&[]), None);
    }

    #[test]
    fn test_range_dimensions() {
        let cases = [((1, 2, 2, 3), (2, 2)), ((2, 2, 2, 2), (1, 1)), ((0, 0, 0, 0), (1, 1))];
        for ((min_x, min_y, max_x, max_y), (cols, rows)) in cases {
            let range = TileRange {
                min_x,
                min_y,
                max_x,
                max_y,
                zoom: 5,
            };
            assert_eq!((range.columns(), range.rows()), (cols, rows));
        }
    }

    #[test]
    fn test_offset_of() {
        let range = TileRange {
            min_x: 10,
            min_y: 20,
            max_x: 12,
            max_y: 21,
            zoom: 6,
        };
        assert_eq!(range.offset_of(&tile(10, 20, 6), 512), (0, 0));
        assert_eq!(range.offset_of(&tile(12, 21, 6), 512), (1024, 512));
    }

    #[test]
    fn test_single_tile_range_bounding_box() {
        let range = TileRange {
            min_x: 537,
            min_y: 346,
            max_x: 537,
            max_y: 346,
            zoom: 10,
        };
        let bbox = range.bounding_box(512);
        assert!((bbox.west() - 8.78867).abs() < 0.002);
        assert!((bbox.south() - 50.06539).abs() < 0.002);
        assert!((bbox.east() - 9.14092).abs() < 0.002);
        assert!((bbox.north() - 50.28966).abs() < 0.002);
    }

    #[test]
    fn test_multi_tile_range_bounding_box_spans_corners() {
        let range = TileRange {
            min_x: 536,
            min_y: 345,
            max_x: 538,
            max_y: 347,
            zoom: 10,
        };
        let bbox = range.bounding_box(512);
        let nw = tile_to_bounding_box(&tile(536, 345, 10), 512);
        let se = tile_to_bounding_box(&tile(538, 347, 10), 512);
        assert_eq!(bbox.west(), nw.west());
        assert_eq!(bbox.north(), nw.north());
        assert_eq!(bbox.east(), se.east());
        assert_eq!(bbox.south(), se.south());
    }

    #[test]
    fn test_crop_centered_foreground() {
        let foreground = BoundingBox::from_edges(-1.0, -1.0, 1.0, 1.0);
        let background = BoundingBox::from_edges(-2.0, -2.0, 2.0, 2.0);
        let crop = Crop::compute(&foreground, 2048, 2048, &background);
        assert_eq!(
            crop,
            Crop {
                padding_x: 512.0,
                padding_y: 512.0,
                width: 1024.0,
                height: 1024.0
            }
        );
    }

    #[test]
    fn test_crop_identical_boxes_is_whole_mosaic() {
        let bbox = BoundingBox::from_edges(7.0, 49.0, 10.0, 51.5);
        let crop = Crop::compute(&bbox, 1536, 1024, &bbox);
        assert_eq!(crop.padding_x, 0.0);
        assert_eq!(crop.padding_y, 0.0);
        assert!((crop.width - 1536.0).abs() < 1e-9);
        assert!((crop.height - 1024.0).abs() < 1e-9);
    }

    #[test]
    fn test_tile_fetch_error_names_tile() {
        let err = CompositorError::TileFetch {
            tile: tile(1, 2, 3),
            source: ProviderError::HttpError("HTTP 500".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("3/1/2"));
        assert!(msg.contains("HTTP 500"));
    }
}
