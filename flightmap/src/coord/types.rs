//! Geographic and pixel value types

use serde::{Deserialize, Serialize};

use super::geodesy::{destination, normalize_longitude};
use crate::error::ConfigurationError;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A point on the earth's surface in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Degrees north of the equator (-90 to 90)
    pub latitude: f64,
    /// Degrees east of the prime meridian (-180 to 180)
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A position in pixel space.
///
/// Pixels may lie outside the canvas; drawing clips them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true when neither edge is zero.
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Geographic rectangle spanned by a south-west and a north-east corner.
///
/// Latitude ordering is an invariant (`min.latitude <= max.latitude`).
/// Longitude ordering is not: a box whose `min.longitude` is east of its
/// `max.longitude` crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Smallest latitude and (usually) smallest longitude
    pub min_coordinate: GeoCoordinate,
    /// Largest latitude and (usually) largest longitude
    pub max_coordinate: GeoCoordinate,
}

impl BoundingBox {
    /// Creates a box from its south-west and north-east corners.
    pub const fn new(min_coordinate: GeoCoordinate, max_coordinate: GeoCoordinate) -> Self {
        Self {
            min_coordinate,
            max_coordinate,
        }
    }

    /// Creates a box from `[west, south, east, north]` edges.
    pub const fn from_edges(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(
            GeoCoordinate::new(south, west),
            GeoCoordinate::new(north, east),
        )
    }

    /// Computes the box spanning `radius_km` around `center`.
    ///
    /// The edges are the destination points due north, east, south and west.
    /// Near the antimeridian the west edge ends up east of the east edge, see
    /// [`crosses_antimeridian`](Self::crosses_antimeridian).
    pub fn around(center: GeoCoordinate, radius_km: f64) -> Self {
        let [north, east, south, west] =
            [0.0, 90.0, 180.0, 270.0].map(|bearing| destination(center, radius_km, bearing));

        let lats = [north.latitude, east.latitude, south.latitude, west.latitude];
        let min_lat = lats.iter().copied().fold(f64::INFINITY, f64::min);
        let max_lat = lats.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self::from_edges(west.longitude, min_lat, east.longitude, max_lat)
    }

    /// West edge in degrees.
    #[inline]
    pub fn west(&self) -> f64 {
        self.min_coordinate.longitude
    }

    /// South edge in degrees.
    #[inline]
    pub fn south(&self) -> f64 {
        self.min_coordinate.latitude
    }

    /// East edge in degrees.
    #[inline]
    pub fn east(&self) -> f64 {
        self.max_coordinate.longitude
    }

    /// North edge in degrees.
    #[inline]
    pub fn north(&self) -> f64 {
        self.max_coordinate.latitude
    }

    /// Edges in `[west, south, east, north]` order.
    pub fn to_edges(&self) -> [f64; 4] {
        [self.west(), self.south(), self.east(), self.north()]
    }

    /// Latitude extent in degrees.
    pub fn latitude_span(&self) -> f64 {
        self.north() - self.south()
    }

    /// Longitude extent in degrees (negative for antimeridian-crossing boxes).
    pub fn longitude_span(&self) -> f64 {
        self.east() - self.west()
    }

    /// Returns true if the box touches or contains the equator.
    pub fn straddles_equator(&self) -> bool {
        self.south() <= 0.0 && self.north() >= 0.0
    }

    /// Returns true if the box crosses the antimeridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.west() > self.east()
    }

    /// Midpoint of both spans.
    pub fn center(&self) -> GeoCoordinate {
        GeoCoordinate::new(
            (self.south() + self.north()) / 2.0,
            (self.west() + self.east()) / 2.0,
        )
    }

    /// Returns true if `coordinate` lies inside the box (edges inclusive).
    pub fn contains(&self, coordinate: &GeoCoordinate) -> bool {
        let lat_ok = (self.south()..=self.north()).contains(&coordinate.latitude);
        let lon_ok = if self.crosses_antimeridian() {
            coordinate.longitude >= self.west() || coordinate.longitude <= self.east()
        } else {
            (self.west()..=self.east()).contains(&coordinate.longitude)
        };
        lat_ok && lon_ok
    }

    /// Grows the box by `fraction` of its span on every side.
    ///
    /// Latitudes stop at the poles. Longitudes wrap across the antimeridian,
    /// and a box grown past a full turn spans every longitude.
    pub fn expanded(&self, fraction: f64) -> Self {
        let lon_span = if self.crosses_antimeridian() {
            self.longitude_span() + 360.0
        } else {
            self.longitude_span()
        };
        let d_lon = lon_span * fraction;
        let d_lat = self.latitude_span() * fraction;

        let south = (self.south() - d_lat).max(MIN_LAT);
        let north = (self.north() + d_lat).min(MAX_LAT);
        if lon_span + 2.0 * d_lon >= 360.0 {
            return Self::from_edges(MIN_LON, south, MAX_LON, north);
        }

        Self::from_edges(
            normalize_longitude(self.west() - d_lon),
            south,
            normalize_longitude(self.east() + d_lon),
            north,
        )
    }

    /// Checks the box before it is used by any render stage.
    ///
    /// Rejects non-finite values, out-of-range latitudes or longitudes,
    /// inverted latitudes and zero-sized spans on either axis. Longitude
    /// order is left unchecked so antimeridian boxes pass through.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| Err(ConfigurationError::InvalidBoundingBox { reason });

        if self.to_edges().iter().any(|v| !v.is_finite()) {
            return invalid("coordinates must be finite".to_string());
        }
        for lat in [self.south(), self.north()] {
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return invalid(format!("latitude {} outside [-90, 90]", lat));
            }
        }
        for lon in [self.west(), self.east()] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return invalid(format!("longitude {} outside [-180, 180]", lon));
            }
        }
        if self.south() > self.north() {
            return invalid(format!(
                "min latitude {} is north of max latitude {}",
                self.south(),
                self.north()
            ));
        }
        if self.south() == self.north() {
            return invalid("latitude span is zero".to_string());
        }
        if self.west() == self.east() {
            return invalid("longitude span is zero".to_string());
        }
        Ok(())
    }
}
