//! Coordinate types and spherical geodesy
//!
//! Provides the value types shared by every render stage (geographic
//! coordinates, pixels, resolutions, bounding boxes) and great-circle
//! helpers on a spherical earth of radius 6371 km.

mod geodesy;
mod types;

pub use geodesy::{destination, distance_km, normalize_longitude, EARTH_RADIUS_KM};
pub use types::{
    BoundingBox, GeoCoordinate, Pixel, Resolution, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON,
};

use serde::{Deserialize, Serialize};

/// Geographic area selected for a render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Cutout {
    /// Everything within `radius_km` of `center`.
    #[serde(rename_all = "camelCase")]
    Radius {
        center: GeoCoordinate,
        radius_km: f64,
    },
    /// An explicit rectangle.
    Rectangle(BoundingBox),
}

impl Cutout {
    /// Bounding box covering the cutout.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Cutout::Radius { center, radius_km } => BoundingBox::around(*center, *radius_km),
            Cutout::Rectangle(bbox) => *bbox,
        }
    }

    /// Returns true for radius cutouts, which are usually drawn clipped to an ellipse.
    pub fn is_radius(&self) -> bool {
        matches!(self, Cutout::Radius { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;

    fn sample_box() -> BoundingBox {
        BoundingBox::new(GeoCoordinate::new(49.0, 7.0), GeoCoordinate::new(51.5, 10.0))
    }

    #[test]
    fn test_from_edges_maps_to_corners() {
        let bbox = BoundingBox::from_edges(7.0, 49.0, 10.0, 51.5);
        assert_eq!(bbox, sample_box());
        assert_eq!(bbox.to_edges(), [7.0, 49.0, 10.0, 51.5]);
    }

    #[test]
    fn test_spans_and_center() {
        let bbox = sample_box();
        assert_eq!(bbox.latitude_span(), 2.5);
        assert_eq!(bbox.longitude_span(), 3.0);
        assert_eq!(bbox.center(), GeoCoordinate::new(50.25, 8.5));
    }

    #[test]
    fn test_straddles_equator() {
        assert!(!sample_box().straddles_equator());
        assert!(BoundingBox::from_edges(0.0, -1.0, 1.0, 1.0).straddles_equator());
        assert!(BoundingBox::from_edges(0.0, 0.0, 1.0, 1.0).straddles_equator());
    }

    #[test]
    fn test_contains_regular_box() {
        let bbox = sample_box();
        assert!(bbox.contains(&GeoCoordinate::new(50.0, 8.0)));
        assert!(bbox.contains(&GeoCoordinate::new(49.0, 7.0)));
        assert!(!bbox.contains(&GeoCoordinate::new(52.0, 8.0)));
        assert!(!bbox.contains(&GeoCoordinate::new(50.0, 6.9)));
    }

    #[test]
    fn test_contains_antimeridian_box() {
        let bbox = BoundingBox::from_edges(170.0, -10.0, -170.0, 10.0);
        assert!(bbox.crosses_antimeridian());
        assert!(bbox.contains(&GeoCoordinate::new(0.0, 175.0)));
        assert!(bbox.contains(&GeoCoordinate::new(0.0, -175.0)));
        assert!(!bbox.contains(&GeoCoordinate::new(0.0, 0.0)));
    }

    #[test]
    fn test_expanded_grows_every_side() {
        let bbox = BoundingBox::from_edges(0.0, 0.0, 10.0, 20.0).expanded(0.1);
        assert_eq!(bbox.to_edges(), [-1.0, -2.0, 11.0, 22.0]);
    }

    #[test]
    fn test_expanded_antimeridian_box_keeps_crossing() {
        let bbox = BoundingBox::from_edges(170.0, -10.0, -170.0, 10.0).expanded(0.1);
        let [west, south, east, north] = bbox.to_edges();
        assert!((west - 168.0).abs() < 1e-9);
        assert!((east + 168.0).abs() < 1e-9);
        assert_eq!((south, north), (-12.0, 12.0));
        assert!(bbox.contains(&GeoCoordinate::new(0.0, 179.0)));
    }

    #[test]
    fn test_expanded_wraps_and_clamps() {
        let wrapped = BoundingBox::from_edges(-179.5, 80.0, -170.0, 89.0).expanded(0.1);
        assert!(wrapped.crosses_antimeridian());
        assert!(wrapped.contains(&GeoCoordinate::new(85.0, 179.9)));
        assert!((wrapped.north() - 89.9).abs() < 1e-9);

        let world = BoundingBox::from_edges(-170.0, 0.0, 170.0, 10.0).expanded(0.1);
        assert_eq!((world.west(), world.east()), (-180.0, 180.0));
        assert!(world.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_regular_box() {
        assert!(sample_box().validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_antimeridian_box() {
        assert!(BoundingBox::from_edges(170.0, -10.0, -170.0, 10.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_latitudes() {
        let bbox = BoundingBox::from_edges(7.0, 51.5, 10.0, 49.0);
        assert!(matches!(
            bbox.validate(),
            Err(ConfigurationError::InvalidBoundingBox { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_span() {
        let point = GeoCoordinate::new(50.0, 8.0);
        assert!(BoundingBox::new(point, point).validate().is_err());
        assert!(BoundingBox::from_edges(8.0, 49.0, 8.0, 51.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_and_nan() {
        assert!(BoundingBox::from_edges(7.0, -91.0, 10.0, 0.0)
            .validate()
            .is_err());
        assert!(BoundingBox::from_edges(7.0, 0.0, 181.0, 1.0)
            .validate()
            .is_err());
        assert!(BoundingBox::from_edges(f64::NAN, 0.0, 1.0, 1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_around_spans_radius_in_every_direction() {
        let center = GeoCoordinate::new(50.0, 8.0);
        let bbox = BoundingBox::around(center, 100.0);

        assert!((distance_km(center, GeoCoordinate::new(bbox.north(), 8.0)) - 100.0).abs() < 1e-6);
        assert!((distance_km(center, GeoCoordinate::new(bbox.south(), 8.0)) - 100.0).abs() < 1e-6);
        assert!(bbox.west() < 8.0 && bbox.east() > 8.0);
        assert!(bbox.contains(&center));
    }

    #[test]
    fn test_around_near_antimeridian_crosses_it() {
        let center = GeoCoordinate::new(0.0, 179.9);
        let bbox = BoundingBox::around(center, 100.0);

        assert!(bbox.crosses_antimeridian());
        assert!(bbox.validate().is_ok());
        // 100 km is ~0.9 degrees at the equator
        assert!((bbox.west() - 179.0).abs() < 0.01, "west {}", bbox.west());
        assert!((bbox.east() + 179.2).abs() < 0.01, "east {}", bbox.east());
        assert!(bbox.longitude_span() + 360.0 < 2.0);
        assert!(bbox.contains(&center));
        assert!(bbox.contains(&GeoCoordinate::new(0.0, -179.5)));
        assert!(!bbox.contains(&GeoCoordinate::new(0.0, 0.0)));
    }

    #[test]
    fn test_cutout_bounding_box() {
        let rect = Cutout::Rectangle(sample_box());
        assert_eq!(rect.bounding_box(), sample_box());
        assert!(!rect.is_radius());

        let radius = Cutout::Radius {
            center: GeoCoordinate::new(0.0, 0.0),
            radius_km: 111.19,
        };
        let bbox = radius.bounding_box();
        assert!(radius.is_radius());
        assert!((bbox.north() - 1.0).abs() < 0.001);
        assert!((bbox.east() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cutout_serde_tagged() {
        let json = r#"{"type":"radius","center":{"latitude":50.0,"longitude":8.0},"radiusKm":25.0}"#;
        let cutout: Cutout = serde_json::from_str(json).unwrap();
        assert_eq!(
            cutout,
            Cutout::Radius {
                center: GeoCoordinate::new(50.0, 8.0),
                radius_km: 25.0
            }
        );
    }

    #[test]
    fn test_resolution_is_drawable() {
        assert!(Resolution::new(1, 1).is_drawable());
        assert!(!Resolution::new(0, 10).is_drawable());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_around_contains_center(
                lat in -60.0..60.0_f64,
                lon in -180.0..=180.0_f64,
                radius in 1.0..500.0_f64
            ) {
                let center = GeoCoordinate::new(lat, lon);
                let bbox = BoundingBox::around(center, radius);
                prop_assert!(bbox.contains(&center));
                prop_assert!(bbox.validate().is_ok());

                // Never wider than the diameter at the equator allows
                let span = if bbox.crosses_antimeridian() {
                    bbox.longitude_span() + 360.0
                } else {
                    bbox.longitude_span()
                };
                prop_assert!(span < 20.0, "span {}", span);
            }
        }
    }
}
