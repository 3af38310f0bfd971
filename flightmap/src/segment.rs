//! Splitting flight paths at gaps.
//!
//! Recorded tracks have holes (receiver coverage, aircraft parked overnight).
//! Drawing a straight line across such a hole would be misleading, so a path
//! is cut wherever two consecutive samples are further apart than a
//! threshold.

use serde::{Deserialize, Serialize};

use crate::coord::{distance_km, GeoCoordinate};

/// Default gap threshold in kilometres.
pub const DEFAULT_SPLIT_DISTANCE_KM: f64 = 50.0;

/// Treatment of the last sample of a path.
///
/// Historically the final sample of every path was dropped from the last
/// segment. `Excluded` keeps that output bit-for-bit; `Included` keeps every
/// sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalSample {
    #[default]
    Excluded,
    Included,
}

/// Splits `path` into segments wherever consecutive samples are more than
/// `threshold_km` apart.
///
/// A segment closes at the sample before the gap and the next one starts at
/// the sample after it. Every segment is non-empty; an empty path yields no
/// segments. With [`FinalSample::Excluded`] the final segment stops one short
/// of the last sample unless that sample would be the segment's only member.
///
/// # Example
///
/// ```
/// use flightmap::coord::GeoCoordinate;
/// use flightmap::segment::{split_at_gaps, FinalSample};
///
/// let path = [
///     GeoCoordinate::new(50.0, 8.0),
///     GeoCoordinate::new(50.01, 8.01),
///     GeoCoordinate::new(52.0, 8.0), // ~220 km jump
///     GeoCoordinate::new(52.01, 8.01),
/// ];
/// let segments = split_at_gaps(&path, 50.0, FinalSample::Included);
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].len(), 2);
/// ```
pub fn split_at_gaps(
    path: &[GeoCoordinate],
    threshold_km: f64,
    final_sample: FinalSample,
) -> Vec<Vec<GeoCoordinate>> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut start = 0;

    for (i, pair) in path.windows(2).enumerate() {
        if distance_km(pair[0], pair[1]) > threshold_km {
            segments.push(path[start..=i].to_vec());
            start = i + 1;
        }
    }

    let last = path.len() - 1;
    let end = match final_sample {
        FinalSample::Excluded if start < last => last,
        _ => path.len(),
    };
    segments.push(path[start..end].to_vec());

    segments
}
