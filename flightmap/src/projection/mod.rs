//! Geographic to pixel projections
//!
//! A [`Projection`] is built once per render from a bounding box and an
//! output resolution, then applied to every coordinate of every path. Two
//! models are supported:
//!
//! - **Linear**: longitude and latitude map straight onto x and y.
//! - **Mercator**: coordinates are first taken through the Web Mercator
//!   forward formula, then mapped linearly.
//!
//! In both models the box's north edge maps to pixel row 0. A box whose west
//! edge lies east of its east edge spans the antimeridian; its longitudes are
//! unwrapped past 180° so the box maps onto one continuous x range.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::{normalize_longitude, BoundingBox, GeoCoordinate, Pixel, Resolution};
use crate::error::{Axis, ConfigurationError};

/// Projection model selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectionKind {
    #[default]
    Linear,
    Mercator,
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionKind::Linear => write!(f, "LINEAR"),
            ProjectionKind::Mercator => write!(f, "MERCATOR"),
        }
    }
}

impl FromStr for ProjectionKind {
    type Err = ConfigurationError;

    /// Parses a projection name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LINEAR" => Ok(ProjectionKind::Linear),
            "MERCATOR" => Ok(ProjectionKind::Mercator),
            _ => Err(ConfigurationError::UnknownProjection(s.to_string())),
        }
    }
}

/// One-dimensional affine map from `[in0, in1]` onto `[out0, out1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap {
    in0: f64,
    in_span: f64,
    out0: f64,
    out_span: f64,
}

impl AffineMap {
    /// Creates the map.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DegenerateAxis` when `in0 == in1`.
    pub fn new(
        axis: Axis,
        in0: f64,
        in1: f64,
        out0: f64,
        out1: f64,
    ) -> Result<Self, ConfigurationError> {
        if in0 == in1 {
            return Err(ConfigurationError::DegenerateAxis { axis, value: in0 });
        }
        Ok(Self {
            in0,
            in_span: in1 - in0,
            out0,
            out_span: out1 - out0,
        })
    }

    #[inline]
    pub fn apply(&self, input: f64) -> f64 {
        (input - self.in0) / self.in_span * self.out_span + self.out0
    }
}

/// Web Mercator forward formula onto the unit square.
///
/// `x = (lon + 180) / 360`, `y = 0.5 - ln(tan(pi/4 + lat/2)) / (2 pi)`.
/// Latitude -90 maps to `y = +inf`.
#[inline]
pub fn mercator_plane(coordinate: &GeoCoordinate) -> Pixel {
    let lat_rad = coordinate.latitude.to_radians();
    let n = (PI / 4.0 + lat_rad / 2.0).tan().ln();
    Pixel::new(
        (coordinate.longitude + 180.0) / 360.0,
        0.5 - n / (2.0 * PI),
    )
}

/// Geographic to pixel mapping for one render.
///
/// Stateless after construction; `project` is a pure function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    kind: ProjectionKind,
    x: AffineMap,
    y: AffineMap,
    /// Central longitude of an antimeridian box, already unwrapped
    wrap_center: Option<f64>,
}

/// West and east edges of `bbox`, with the east edge moved past 180° when
/// the box crosses the antimeridian, plus the unwrapped center longitude.
fn unwrapped_longitudes(bbox: &BoundingBox) -> (f64, f64, Option<f64>) {
    if bbox.crosses_antimeridian() {
        let east = bbox.east() + 360.0;
        (bbox.west(), east, Some((bbox.west() + east) / 2.0))
    } else {
        (bbox.west(), bbox.east(), None)
    }
}

impl Projection {
    /// Builds a projection of `bbox` onto a canvas of `resolution`.
    ///
    /// # Errors
    ///
    /// - `DegenerateAxis` if the box has no extent on an axis
    /// - `PoleLatitude` for Mercator when a bound latitude is exactly -90
    pub fn new(
        kind: ProjectionKind,
        bbox: &BoundingBox,
        resolution: Resolution,
    ) -> Result<Self, ConfigurationError> {
        match kind {
            ProjectionKind::Linear => Self::linear(bbox, resolution),
            ProjectionKind::Mercator => Self::mercator(bbox, resolution),
        }
    }

    /// Plain equirectangular mapping.
    pub fn linear(bbox: &BoundingBox, resolution: Resolution) -> Result<Self, ConfigurationError> {
        let min = bbox.min_coordinate;
        let max = bbox.max_coordinate;
        let (west, east, wrap_center) = unwrapped_longitudes(bbox);
        Ok(Self {
            kind: ProjectionKind::Linear,
            x: AffineMap::new(Axis::Longitude, west, east, 0.0, f64::from(resolution.width))?,
            y: AffineMap::new(
                Axis::Latitude,
                max.latitude,
                min.latitude,
                0.0,
                f64::from(resolution.height),
            )?,
            wrap_center,
        })
    }

    /// Web Mercator mapping.
    pub fn mercator(
        bbox: &BoundingBox,
        resolution: Resolution,
    ) -> Result<Self, ConfigurationError> {
        if bbox.south() == -90.0 || bbox.north() == -90.0 {
            return Err(ConfigurationError::PoleLatitude);
        }

        let (west, east, wrap_center) = unwrapped_longitudes(bbox);
        let min = mercator_plane(&GeoCoordinate::new(bbox.south(), west));
        let max = mercator_plane(&GeoCoordinate::new(bbox.north(), east));
        Ok(Self {
            kind: ProjectionKind::Mercator,
            x: AffineMap::new(
                Axis::Longitude,
                min.x,
                max.x,
                0.0,
                f64::from(resolution.width),
            )?,
            y: AffineMap::new(
                Axis::Latitude,
                max.y,
                min.y,
                0.0,
                f64::from(resolution.height),
            )?,
            wrap_center,
        })
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    /// Maps one coordinate to pixel space.
    #[inline]
    pub fn project(&self, coordinate: &GeoCoordinate) -> Pixel {
        let coordinate = match self.wrap_center {
            // Nearest copy of the longitude to the box center
            Some(center) => GeoCoordinate::new(
                coordinate.latitude,
                center + normalize_longitude(coordinate.longitude - center),
            ),
            None => *coordinate,
        };
        let plane = match self.kind {
            ProjectionKind::Linear => Pixel::new(coordinate.longitude, coordinate.latitude),
            ProjectionKind::Mercator => mercator_plane(&coordinate),
        };
        Pixel::new(self.x.apply(plane.x), self.y.apply(plane.y))
    }

    /// Maps a path, keeping order and length.
    pub fn project_path(&self, path: &[GeoCoordinate]) -> Vec<Pixel> {
        path.iter().map(|c| self.project(c)).collect()
    }

    /// Maps every path independently, keeping structure.
    pub fn project_paths<P: AsRef<[GeoCoordinate]>>(&self, paths: &[P]) -> Vec<Vec<Pixel>> {
        paths.iter().map(|p| self.project_path(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box() -> BoundingBox {
        BoundingBox::new(GeoCoordinate::new(49.0, 7.0), GeoCoordinate::new(51.5, 10.0))
    }

    fn assert_pixel_near(actual: Pixel, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
            "expected ({}, {}), got ({}, {})",
            x,
            y,
            actual.x,
            actual.y
        );
    }

    #[test]
    fn test_projection_kind_parses_case_insensitively() {
        assert_eq!("linear".parse::<ProjectionKind>().unwrap(), ProjectionKind::Linear);
        assert_eq!("Mercator".parse::<ProjectionKind>().unwrap(), ProjectionKind::Mercator);
        assert!(matches!(
            "polar".parse::<ProjectionKind>(),
            Err(ConfigurationError::UnknownProjection(_))
        ));
    }

    #[test]
    fn test_projection_kind_serde_uppercase() {
        assert_eq!(
            serde_json::to_string(&ProjectionKind::Mercator).unwrap(),
            "\"MERCATOR\""
        );
        let kind: ProjectionKind = serde_json::from_str("\"LINEAR\"").unwrap();
        assert_eq!(kind, ProjectionKind::Linear);
    }

    #[test]
    fn test_affine_map_endpoints() {
        let map = AffineMap::new(Axis::Longitude, 10.0, 20.0, 0.0, 100.0).unwrap();
        assert_eq!(map.apply(10.0), 0.0);
        assert_eq!(map.apply(20.0), 100.0);
        assert_eq!(map.apply(15.0), 50.0);
        assert_eq!(map.apply(25.0), 150.0);
    }

    #[test]
    fn test_affine_map_rejects_empty_range() {
        let err = AffineMap::new(Axis::Latitude, 5.0, 5.0, 0.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DegenerateAxis {
                axis: Axis::Latitude,
                value: 5.0
            }
        );
    }

    #[test]
    fn test_linear_corners_and_center() {
        let res = Resolution::new(800, 600);
        let projection = Projection::linear(&sample_box(), res).unwrap();

        assert_pixel_near(projection.project(&GeoCoordinate::new(49.0, 7.0)), 0.0, 600.0);
        assert_pixel_near(projection.project(&GeoCoordinate::new(51.5, 10.0)), 800.0, 0.0);
        assert_pixel_near(projection.project(&sample_box().center()), 400.0, 300.0);
    }

    #[test]
    fn test_linear_rejects_degenerate_longitude() {
        let bbox = BoundingBox::from_edges(8.0, 49.0, 8.0, 51.0);
        let err = Projection::linear(&bbox, Resolution::new(10, 10)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::DegenerateAxis {
                axis: Axis::Longitude,
                ..
            }
        ));
    }

    #[test]
    fn test_mercator_corners() {
        let res = Resolution::new(1000, 1000);
        let projection = Projection::mercator(&sample_box(), res).unwrap();

        assert_pixel_near(projection.project(&GeoCoordinate::new(49.0, 7.0)), 0.0, 1000.0);
        assert_pixel_near(projection.project(&GeoCoordinate::new(51.5, 10.0)), 1000.0, 0.0);
    }

    #[test]
    fn test_mercator_center_latitude_sits_below_middle_row() {
        // Mercator stretches towards the pole, so the mid latitude lies in the
        // lower half of the image
        let projection = Projection::mercator(&sample_box(), Resolution::new(100, 100)).unwrap();
        let center = projection.project(&sample_box().center());
        assert!((center.x - 50.0).abs() < 1e-9);
        assert!(center.y > 50.0);
    }

    #[test]
    fn test_mercator_rejects_south_pole_bounds() {
        let south = BoundingBox::from_edges(0.0, -90.0, 10.0, 10.0);
        let north = BoundingBox::new(
            GeoCoordinate::new(10.0, 0.0),
            GeoCoordinate::new(-90.0, 10.0),
        );
        for bbox in [south, north] {
            assert_eq!(
                Projection::mercator(&bbox, Resolution::new(10, 10)),
                Err(ConfigurationError::PoleLatitude)
            );
        }
    }

    #[test]
    fn test_mercator_accepts_near_pole_bounds() {
        let bbox = BoundingBox::from_edges(0.0, -89.999, 10.0, 10.0);
        assert!(Projection::mercator(&bbox, Resolution::new(10, 10)).is_ok());
    }

    #[test]
    fn test_linear_does_not_reject_pole() {
        let bbox = BoundingBox::from_edges(0.0, -90.0, 10.0, 10.0);
        assert!(Projection::new(ProjectionKind::Linear, &bbox, Resolution::new(10, 10)).is_ok());
    }

    #[test]
    fn test_mercator_plane_reference_points() {
        let origin = mercator_plane(&GeoCoordinate::new(0.0, 0.0));
        assert_pixel_near(origin, 0.5, 0.5);

        let west = mercator_plane(&GeoCoordinate::new(0.0, -180.0));
        assert_pixel_near(west, 0.0, 0.5);

        let top = mercator_plane(&GeoCoordinate::new(85.0511287798066, 180.0));
        assert!((top.x - 1.0).abs() < 1e-12);
        assert!(top.y.abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_box_projects_inside_canvas() {
        let bbox = BoundingBox::from_edges(170.0, -10.0, -170.0, 10.0);
        let res = Resolution::new(200, 200);

        for kind in [ProjectionKind::Linear, ProjectionKind::Mercator] {
            let projection = Projection::new(kind, &bbox, res).unwrap();

            let west = projection.project(&GeoCoordinate::new(-10.0, 170.0));
            let east = projection.project(&GeoCoordinate::new(10.0, -170.0));
            assert_pixel_near(west, 0.0, 200.0);
            assert_pixel_near(east, 200.0, 0.0);

            let mut previous = -1.0;
            for lon in [172.0, 175.0, 178.0, 179.0, -179.0, -175.0] {
                let p = projection.project(&GeoCoordinate::new(0.0, lon));
                assert!((0.0..=200.0).contains(&p.x), "{kind} lon {lon}: {p:?}");
                assert!(p.x > previous, "{kind} lon {lon} not east of previous");
                previous = p.x;
            }
        }
    }

    #[test]
    fn test_antimeridian_linear_center_and_dateline() {
        let bbox = BoundingBox::from_edges(170.0, -10.0, -170.0, 10.0);
        let projection = Projection::linear(&bbox, Resolution::new(200, 200)).unwrap();
        assert_pixel_near(projection.project(&GeoCoordinate::new(0.0, 180.0)), 100.0, 100.0);
        assert_pixel_near(projection.project(&GeoCoordinate::new(0.0, -180.0)), 100.0, 100.0);
        assert_pixel_near(projection.project(&GeoCoordinate::new(0.0, 172.0)), 20.0, 100.0);
    }

    #[test]
    fn test_project_paths_preserves_structure() {
        let projection = Projection::linear(&sample_box(), Resolution::new(10, 10)).unwrap();
        let paths = vec![
            vec![GeoCoordinate::new(50.0, 8.0), GeoCoordinate::new(50.5, 9.0)],
            vec![],
            vec![GeoCoordinate::new(60.0, 0.0)],
        ];
        let projected = projection.project_paths(&paths);
        assert_eq!(projected.len(), 3);
        assert_eq!(projected[0].len(), 2);
        assert!(projected[1].is_empty());
        assert_eq!(projected[2].len(), 1);
        // Outside the box still projects, clipping happens when drawing
        assert!(projected[2][0].y < 0.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn kind_strategy() -> impl Strategy<Value = ProjectionKind> {
            prop_oneof![Just(ProjectionKind::Linear), Just(ProjectionKind::Mercator)]
        }

        proptest! {
            #[test]
            fn test_corners_map_to_canvas_corners(
                kind in kind_strategy(),
                south in -80.0..70.0_f64,
                west in -170.0..160.0_f64,
                d_lat in 0.01..10.0_f64,
                d_lon in 0.01..10.0_f64,
                width in 1u32..4000,
                height in 1u32..4000
            ) {
                let bbox = BoundingBox::from_edges(west, south, west + d_lon, south + d_lat);
                let projection = Projection::new(kind, &bbox, Resolution::new(width, height)).unwrap();

                let min = projection.project(&bbox.min_coordinate);
                let max = projection.project(&bbox.max_coordinate);
                let tolerance = 1e-6 * f64::from(width.max(height));

                prop_assert!(min.x.abs() < tolerance);
                prop_assert!((min.y - f64::from(height)).abs() < tolerance);
                prop_assert!((max.x - f64::from(width)).abs() < tolerance);
                prop_assert!(max.y.abs() < tolerance);
            }

            #[test]
            fn test_projection_is_monotonic(
                kind in kind_strategy(),
                a in -60.0..60.0_f64,
                b in -60.0..60.0_f64
            ) {
                let bbox = BoundingBox::from_edges(-10.0, -70.0, 10.0, 70.0);
                let projection = Projection::new(kind, &bbox, Resolution::new(100, 100)).unwrap();
                let pa = projection.project(&GeoCoordinate::new(a, a / 10.0));
                let pb = projection.project(&GeoCoordinate::new(b, b / 10.0));
                if a < b {
                    // North is up
                    prop_assert!(pa.y >= pb.y);
                    prop_assert!(pa.x <= pb.x);
                }
            }
        }
    }
}
