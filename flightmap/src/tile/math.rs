//! Conversions between positions, global pixels and tiles.

use std::f64::consts::PI;

use super::{TileCoord, MAX_ZOOM};
use crate::coord::{BoundingBox, GeoCoordinate, Pixel};

/// Southern latitude limit of the square Mercator world.
pub const MIN_MERCATOR_LAT: f64 = -85.05112878;
/// Northern latitude limit of the square Mercator world.
pub const MAX_MERCATOR_LAT: f64 = 85.05112878;

#[inline]
fn clip(n: f64, min: f64, max: f64) -> f64 {
    n.max(min).min(max)
}

/// Width and height of the full-world raster in pixels.
///
/// # Arguments
///
/// * `zoom` - Zoom level, clamped to [`MAX_ZOOM`]
/// * `tile_size` - Side length of one tile in pixels
#[inline]
pub fn map_size(zoom: u8, tile_size: u32) -> u64 {
    u64::from(tile_size) << zoom.min(MAX_ZOOM)
}

/// Converts a global pixel into a geographic position.
///
/// Global pixels are counted from the north-west corner of the world
/// raster. Pixels outside the raster are clipped to its edge.
pub fn global_pixel_to_position(pixel: Pixel, zoom: u8, tile_size: u32) -> GeoCoordinate {
    let size = map_size(zoom, tile_size) as f64;
    let x = clip(pixel.x, 0.0, size - 1.0) / size - 0.5;
    let y = 0.5 - clip(pixel.y, 0.0, size - 1.0) / size;

    GeoCoordinate::new(
        90.0 - 360.0 * (-y * 2.0 * PI).exp().atan() / PI,
        360.0 * x,
    )
}

/// Converts a geographic position into a global pixel.
///
/// Latitude is clipped to the Mercator limits (±85.05112878°), longitude to
/// ±180°. The pixel is the one whose area contains the position.
pub fn position_to_global_pixel(position: &GeoCoordinate, zoom: u8, tile_size: u32) -> Pixel {
    let latitude = clip(position.latitude, MIN_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let longitude = clip(position.longitude, -180.0, 180.0);

    let x = (longitude + 180.0) / 360.0;
    let sin_lat = latitude.to_radians().sin();
    let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);

    let size = map_size(zoom, tile_size) as f64;
    Pixel::new(
        clip(x * size + 0.5, 0.0, size - 1.0),
        clip(y * size + 0.5, 0.0, size - 1.0),
    )
}

/// Calculates the tile containing a position at a zoom level.
pub fn position_to_tile(position: &GeoCoordinate, zoom: u8, tile_size: u32) -> TileCoord {
    let pixel = position_to_global_pixel(position, zoom, tile_size);
    let ts = f64::from(tile_size);
    TileCoord {
        x: (pixel.x / ts).floor() as u32,
        y: (pixel.y / ts).floor() as u32,
        zoom,
    }
}

/// Geographic area covered by a tile.
///
/// Converts the tile's north-west and south-east pixel corners back to
/// positions. The south-east corner is clipped to the last pixel of the
/// world raster, so the easternmost tiles end just short of 180°.
pub fn tile_to_bounding_box(tile: &TileCoord, tile_size: u32) -> BoundingBox {
    let ts = f64::from(tile_size);
    let x1 = f64::from(tile.x) * ts;
    let y1 = f64::from(tile.y) * ts;

    let nw = global_pixel_to_position(Pixel::new(x1, y1), tile.zoom, tile_size);
    let se = global_pixel_to_position(Pixel::new(x1 + ts, y1 + ts), tile.zoom, tile_size);

    BoundingBox::from_edges(nw.longitude, se.latitude, se.longitude, nw.latitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_size() {
        assert_eq!(map_size(0, 512), 512);
        assert_eq!(map_size(1, 512), 1024);
        assert_eq!(map_size(10, 256), 262_144);
    }

    #[test]
    fn test_map_size_clamps_zoom() {
        assert_eq!(map_size(u8::MAX, 512), map_size(MAX_ZOOM, 512));
        assert_eq!(map_size(64, 256), 256u64 << 30);
    }

    #[test]
    fn test_origin_maps_to_raster_center() {
        let pixel = position_to_global_pixel(&GeoCoordinate::new(0.0, 0.0), 1, 256);
        assert_eq!(pixel, Pixel::new(256.5, 256.5));
    }

    #[test]
    fn test_position_is_clipped_to_mercator_limits() {
        let north = position_to_global_pixel(&GeoCoordinate::new(89.0, 0.0), 2, 256);
        assert!(north.y < 1.0);

        let south = position_to_global_pixel(&GeoCoordinate::new(-89.0, 0.0), 2, 256);
        assert_eq!(south.y, 1023.0);
    }

    #[test]
    fn test_global_pixel_to_position_corners() {
        let nw = global_pixel_to_position(Pixel::new(0.0, 0.0), 0, 512);
        assert!((nw.longitude + 180.0).abs() < 1e-9);
        assert!((nw.latitude - 85.0511287798).abs() < 1e-6);

        let center = global_pixel_to_position(Pixel::new(256.0, 256.0), 0, 512);
        assert!(center.latitude.abs() < 1e-9);
        assert!(center.longitude.abs() < 1e-9);
    }

    #[test]
    fn test_position_to_tile_frankfurt() {
        let tile = position_to_tile(&GeoCoordinate::new(50.1109, 8.6821), 10, 512);
        assert_eq!((tile.x, tile.y), (536, 346));
    }

    #[test]
    fn test_position_to_tile_world_edges() {
        let se = position_to_tile(&GeoCoordinate::new(-90.0, 180.0), 3, 256);
        assert_eq!((se.x, se.y), (7, 7));

        let nw = position_to_tile(&GeoCoordinate::new(90.0, -180.0), 3, 256);
        assert_eq!((nw.x, nw.y), (0, 0));
    }

    #[test]
    fn test_tile_to_bounding_box_known_tile() {
        let tile = TileCoord::new(537, 346, 10).unwrap();
        let bbox = tile_to_bounding_box(&tile, 512);

        assert!((bbox.west() - 8.78867).abs() < 0.002);
        assert!((bbox.south() - 50.06539).abs() < 0.002);
        assert!((bbox.east() - 9.14092).abs() < 0.002);
        assert!((bbox.north() - 50.28966).abs() < 0.002);
    }

    #[test]
    fn test_tile_to_bounding_box_root_tile() {
        let bbox = tile_to_bounding_box(&TileCoord::new(0, 0, 0).unwrap(), 256);
        assert!((bbox.west() + 180.0).abs() < 1e-9);
        assert!(bbox.east() < 180.0 && bbox.east() > 178.0);
        assert!(bbox.north() > 85.0);
        assert!(bbox.south() < -84.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_position_pixel_roundtrip(
                lat in -85.0..85.0_f64,
                lon in -179.9..179.9_f64,
                zoom in 2u8..=18
            ) {
                let position = GeoCoordinate::new(lat, lon);
                let pixel = position_to_global_pixel(&position, zoom, 256);
                let back = global_pixel_to_position(pixel, zoom, 256);

                // One pixel of slack from the +0.5 rounding offset
                let pixel_deg = 360.0 / map_size(zoom, 256) as f64;
                prop_assert!((back.longitude - lon).abs() <= pixel_deg);
                prop_assert!((back.latitude - lat).abs() <= pixel_deg);
            }

            #[test]
            fn test_position_to_tile_is_in_grid(
                lat in -90.0..=90.0_f64,
                lon in -180.0..=180.0_f64,
                zoom in 0u8..=20
            ) {
                let tile = position_to_tile(&GeoCoordinate::new(lat, lon), zoom, 512);
                prop_assert!(TileCoord::new(tile.x, tile.y, tile.zoom).is_ok());
            }

            #[test]
            fn test_tile_contains_its_own_center(
                x in 0u32..1024,
                y in 0u32..1024
            ) {
                let tile = TileCoord::new(x, y, 10).unwrap();
                let bbox = tile_to_bounding_box(&tile, 256);
                let found = position_to_tile(&bbox.center(), 10, 256);
                prop_assert_eq!(found, tile);
            }
        }
    }
}
