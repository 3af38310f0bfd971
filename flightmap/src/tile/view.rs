//! Viewport fitting and tile enumeration.

use std::f64::consts::PI;

use super::math::{global_pixel_to_position, position_to_global_pixel, position_to_tile};
use super::quadkey::tile_to_quadkey;
use super::TileCoord;
use crate::coord::{BoundingBox, GeoCoordinate, Pixel};

/// Map center and fractional zoom that frame a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: GeoCoordinate,
    pub zoom: f64,
}

impl MapView {
    /// View returned for bounds that cannot be fitted.
    pub const FALLBACK: MapView = MapView {
        center: GeoCoordinate::new(0.0, 0.0),
        zoom: 1.0,
    };
}

/// Lists the quadkeys of every tile inside `bounds` at `zoom`, row by row
/// from north-west to south-east.
///
/// The tile range spans from the tile holding the north-west corner to the
/// tile holding the south-east corner. A box whose west edge lies east of
/// its east edge yields no tiles.
pub fn quadkeys_in_bounding_box(bounds: &BoundingBox, zoom: u8, tile_size: u32) -> Vec<String> {
    let tl = position_to_tile(
        &GeoCoordinate::new(bounds.north(), bounds.west()),
        zoom,
        tile_size,
    );
    let br = position_to_tile(
        &GeoCoordinate::new(bounds.south(), bounds.east()),
        zoom,
        tile_size,
    );

    let mut keys = Vec::new();
    for y in tl.y..=br.y {
        for x in tl.x..=br.x {
            keys.push(tile_to_quadkey(&TileCoord { x, y, zoom }));
        }
    }
    keys
}

/// Lists the quadkeys covering a `width` x `height` pixel viewport centred
/// on `center` at `zoom`.
pub fn quadkeys_in_view(
    center: &GeoCoordinate,
    zoom: u8,
    width: u32,
    height: u32,
    tile_size: u32,
) -> Vec<String> {
    let p = position_to_global_pixel(center, zoom, tile_size);
    let half_w = f64::from(width) * 0.5;
    let half_h = f64::from(height) * 0.5;

    let tl = global_pixel_to_position(Pixel::new(p.x - half_w, p.y - half_h), zoom, tile_size);
    let br = global_pixel_to_position(Pixel::new(p.x + half_w, p.y + half_h), zoom, tile_size);

    let bounds = BoundingBox::from_edges(tl.longitude, br.latitude, br.longitude, tl.latitude);
    quadkeys_in_bounding_box(&bounds, zoom, tile_size)
}

/// Calculates the center and zoom that fit `bounds` into a map viewport.
///
/// # Arguments
///
/// * `bounds` - `[west, south, east, north]` in degrees; `east < west`
///   marks a box crossing the antimeridian
/// * `map_width`, `map_height` - Viewport size in pixels
/// * `padding` - Pixels to keep free on every side
/// * `tile_size` - Tile size of the pyramid
///
/// # Returns
///
/// The fitted view. The zoom is fractional; callers floor it to pick a tile
/// level. Fewer than four bounds, or inputs that produce a non-finite result
/// such as a zero-sized viewport, return [`MapView::FALLBACK`].
pub fn best_map_view(
    bounds: &[f64],
    map_width: u32,
    map_height: u32,
    padding: f64,
    tile_size: u32,
) -> MapView {
    let [west, south, east, north] = match bounds {
        [w, s, e, n, ..] => [*w, *s, *e, *n],
        _ => return MapView::FALLBACK,
    };

    let (delta_x, center_lon) = if east > west {
        (east - west, (east + west) / 2.0)
    } else {
        (
            360.0 - (west - east),
            ((east + west) / 2.0 + 360.0).rem_euclid(360.0) - 180.0,
        )
    };

    let mercator_y = |lat: f64| {
        let rad = lat.to_radians();
        ((rad.sin() + 1.0) / rad.cos()).ln()
    };
    let ry_center = (mercator_y(south) + mercator_y(north)) / 2.0;
    let center_lat = ry_center.sinh().atan().to_degrees();

    let resolution_horizontal = delta_x / (f64::from(map_width) - padding * 2.0);

    let vy0 = (PI * (0.25 + center_lat / 360.0)).tan().ln();
    let vy1 = (PI * (0.25 + north / 360.0)).tan().ln();
    // Pixels per unit of Mercator y at zoom 0 (40.7436654315252 for 256 px tiles)
    let vertical_scale = f64::from(tile_size) / (2.0 * PI);
    let zoom_factor = (f64::from(map_height) * 0.5 - padding) / (vertical_scale * (vy1 - vy0));
    let resolution_vertical = 360.0 / (zoom_factor * f64::from(tile_size));

    let resolution = resolution_horizontal.max(resolution_vertical);
    let zoom = (360.0 / (resolution * f64::from(tile_size))).log2();

    if !zoom.is_finite() || !center_lat.is_finite() || !center_lon.is_finite() {
        return MapView::FALLBACK;
    }

    MapView {
        center: GeoCoordinate::new(center_lat, center_lon),
        zoom,
    }
}
