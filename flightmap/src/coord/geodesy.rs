//! Great-circle math on a spherical earth.
//!
//! Distances are in kilometres, bearings in degrees clockwise from true
//! north (0 = north, 90 = east).

use super::GeoCoordinate;

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the great-circle distance between two positions.
///
/// Uses the haversine formula, which stays accurate for short distances.
///
/// # Example
///
/// ```
/// use flightmap::coord::{distance_km, GeoCoordinate};
///
/// // One degree of latitude is roughly 111 km
/// let d = distance_km(GeoCoordinate::new(0.0, 0.0), GeoCoordinate::new(1.0, 0.0));
/// assert!((d - 111.19).abs() < 0.01);
/// ```
pub fn distance_km(from: GeoCoordinate, to: GeoCoordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Project a position along a bearing for a given distance.
///
/// Solves the direct geodesic problem on a sphere. The resulting longitude
/// is normalized to -180..180.
///
/// # Example
///
/// ```
/// use flightmap::coord::{destination, GeoCoordinate};
///
/// let p = destination(GeoCoordinate::new(0.0, 0.0), 111.19, 90.0);
/// assert!(p.latitude.abs() < 1e-9);
/// assert!((p.longitude - 1.0).abs() < 0.001);
/// ```
pub fn destination(origin: GeoCoordinate, distance_km: f64, bearing_deg: f64) -> GeoCoordinate {
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoCoordinate::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

/// Wraps a longitude into -180..=180.
pub fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
