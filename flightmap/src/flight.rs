//! Flight sample ingestion
//!
//! Reads recorded aircraft positions from CSV exports with at least the
//! columns `time`, `icao24`, `lat` and `lon` (any order, extra columns
//! ignored), filters them and groups them into one path per aircraft.
//!
//! Fields may be quoted; a quoted field can hold commas and doubled `""`
//! quotes. Records spanning several lines are not supported. Rows with an
//! empty aircraft id or unparsable numbers are skipped rather than failing
//! the whole file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::coord::{BoundingBox, GeoCoordinate};

/// Errors that can occur while reading flight samples.
#[derive(Debug, Error)]
pub enum FlightError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read flight samples: {0}")]
    Read(#[from] std::io::Error),

    #[error("Flight data has no header row")]
    MissingHeader,

    #[error("Flight data header has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("Timespan starts at {from} but ends earlier at {until}")]
    InvalidTimespan { from: i64, until: i64 },
}

/// One recorded position of one aircraft.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSample {
    /// Unix time in seconds
    pub time: i64,
    /// ICAO 24-bit transponder address
    pub icao24: String,
    pub position: GeoCoordinate,
}

/// Inclusive time window; a missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespan {
    pub from: Option<i64>,
    pub until: Option<i64>,
}

impl Timespan {
    /// Creates a window, rejecting `from > until`.
    pub fn new(from: Option<i64>, until: Option<i64>) -> Result<Self, FlightError> {
        if let (Some(from), Some(until)) = (from, until) {
            if from > until {
                return Err(FlightError::InvalidTimespan { from, until });
            }
        }
        Ok(Self { from, until })
    }

    /// Window without bounds.
    pub const fn unbounded() -> Self {
        Self {
            from: None,
            until: None,
        }
    }

    #[inline]
    pub fn contains(&self, time: i64) -> bool {
        self.from.map_or(true, |from| time >= from) && self.until.map_or(true, |until| time <= until)
    }
}

/// Chronologically ordered positions of one aircraft.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPath {
    pub icao24: String,
    pub positions: Vec<GeoCoordinate>,
}

/// Splits one CSV record into trimmed fields, honoring double quotes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Column positions resolved from the header row.
struct Columns {
    time: usize,
    icao24: usize,
    lat: usize,
    lon: usize,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, FlightError> {
        let names = split_fields(header);
        let find = |column: &'static str| {
            names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(column))
                .ok_or(FlightError::MissingColumn(column))
        };
        Ok(Self {
            time: find("time")?,
            icao24: find("icao24")?,
            lat: find("lat")?,
            lon: find("lon")?,
        })
    }

    fn parse_row(&self, line: &str) -> Option<FlightSample> {
        let fields = split_fields(line);
        let field = |index: usize| fields.get(index).map(String::as_str);

        let icao24 = field(self.icao24).filter(|id| !id.is_empty())?;
        let time = parse_time(field(self.time)?)?;
        let latitude = parse_finite(field(self.lat)?)?;
        let longitude = parse_finite(field(self.lon)?)?;

        Some(FlightSample {
            time,
            icao24: icao24.to_string(),
            position: GeoCoordinate::new(latitude, longitude),
        })
    }
}

/// Whole seconds; fractional timestamps are truncated.
fn parse_time(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .map(|t| t.trunc() as i64)
    })
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses CSV flight samples from `reader`.
///
/// # Errors
///
/// Fails on I/O errors, an empty input or a header lacking a required column.
pub fn parse_samples<R: BufRead>(reader: R) -> Result<Vec<FlightSample>, FlightError> {
    let mut lines = reader.lines();
    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(FlightError::MissingHeader),
        }
    };
    let columns = Columns::from_header(&header)?;

    let mut samples = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match columns.parse_row(&line) {
            Some(sample) => samples.push(sample),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, parsed = samples.len(), "Skipped invalid flight rows");
    }
    Ok(samples)
}

/// Reads CSV flight samples from the file at `path`.
pub fn read_samples(path: &Path) -> Result<Vec<FlightSample>, FlightError> {
    let file = File::open(path).map_err(|source| FlightError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let samples = parse_samples(BufReader::new(file))?;
    debug!(path = %path.display(), samples = samples.len(), "Read flight samples");
    Ok(samples)
}

/// Groups samples into one time-ordered path per aircraft.
///
/// Only samples inside `area` (when given) and `timespan` are kept. Paths are
/// ordered by aircraft id.
pub fn group_flights<I>(samples: I, area: Option<&BoundingBox>, timespan: &Timespan) -> Vec<FlightPath>
where
    I: IntoIterator<Item = FlightSample>,
{
    let mut by_aircraft: BTreeMap<String, Vec<(i64, GeoCoordinate)>> = BTreeMap::new();
    for sample in samples {
        if !timespan.contains(sample.time) {
            continue;
        }
        if area.is_some_and(|bbox| !bbox.contains(&sample.position)) {
            continue;
        }
        by_aircraft
            .entry(sample.icao24)
            .or_default()
            .push((sample.time, sample.position));
    }

    by_aircraft
        .into_iter()
        .map(|(icao24, mut timed)| {
            timed.sort_by_key(|(time, _)| *time);
            FlightPath {
                icao24,
                positions: timed.into_iter().map(|(_, position)| position).collect(),
            }
        })
        .collect()
}

/// Strips aircraft ids, leaving the coordinate sequences to render.
pub fn coordinate_sequences(paths: Vec<FlightPath>) -> Vec<Vec<GeoCoordinate>> {
    paths.into_iter().map(|path| path.positions).collect()
}
