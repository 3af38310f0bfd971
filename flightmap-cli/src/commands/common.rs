//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use flightmap::config::ConfigFile;
use flightmap::flight::{coordinate_sequences, group_flights, read_samples, Timespan};
use flightmap::generate::{BackgroundSpec, ImageRequest};
use flightmap::projection::ProjectionKind;
use flightmap::BoundingBox;
use tracing::info;

use crate::error::CliError;

/// Share of the box span added on each side when selecting samples, so
/// paths leaving and re-entering the image stay connected.
const QUERY_PADDING: f64 = 0.1;

/// Projection selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ProjectionArg {
    /// Longitude and latitude map straight onto x and y
    Linear,
    /// Web Mercator, matching web map tiles
    Mercator,
}

impl From<ProjectionArg> for ProjectionKind {
    fn from(arg: ProjectionArg) -> Self {
        match arg {
            ProjectionArg::Linear => ProjectionKind::Linear,
            ProjectionArg::Mercator => ProjectionKind::Mercator,
        }
    }
}

/// Rendering options shared by the area-based commands.
#[derive(Debug, Clone, Default, Args)]
pub struct RenderOptions {
    /// CSV files with flight samples (columns: time, icao24, lat, lon)
    #[arg(long = "input", short = 'i', required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Longest edge of the image in pixels
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Projection used to place coordinates
    #[arg(long, value_enum, ignore_case = true)]
    pub projection: Option<ProjectionArg>,

    /// Path color (#rgb, #rrggbb, #rrggbbaa or a color name)
    #[arg(long)]
    pub foreground: Option<String>,

    /// Flat background color
    #[arg(long, conflicts_with_all = ["mapbox_style", "mapbox"])]
    pub background: Option<String>,

    /// Draw a Mapbox style (e.g. streets-v12) as background
    #[arg(long)]
    pub mapbox_style: Option<String>,

    /// Draw the Mapbox style from the config file as background
    #[arg(long, conflicts_with = "mapbox_style")]
    pub mapbox: bool,

    /// Only use samples recorded at or after this unix time
    #[arg(long)]
    pub from: Option<i64>,

    /// Only use samples recorded at or before this unix time
    #[arg(long)]
    pub until: Option<i64>,

    /// Stroke width in pixels
    #[arg(long)]
    pub line_width: Option<f32>,

    /// Split paths where consecutive samples are further apart (km)
    #[arg(long = "split-distance")]
    pub split_distance_km: Option<f64>,

    /// Clip paths to the ellipse inscribed in the image
    #[arg(long, overrides_with = "no_ellipse")]
    pub ellipse: bool,

    /// Do not clip paths
    #[arg(long, overrides_with = "ellipse")]
    pub no_ellipse: bool,
}

impl RenderOptions {
    /// Ellipse clipping, falling back to the command's default.
    pub fn clip_to_ellipse(&self, default: bool) -> bool {
        match (self.ellipse, self.no_ellipse) {
            (true, _) => true,
            (_, true) => false,
            _ => default,
        }
    }

    /// Background from the command line, else the configured color.
    pub fn background(&self, config: &ConfigFile) -> Result<BackgroundSpec, CliError> {
        if let Some(style) = &self.mapbox_style {
            return Ok(BackgroundSpec::Style(style.clone()));
        }
        if self.mapbox {
            return config
                .mapbox
                .style
                .clone()
                .map(BackgroundSpec::Style)
                .ok_or_else(|| {
                    CliError::Config(
                        "--mapbox needs a style in the [mapbox] section of config.ini".to_string(),
                    )
                });
        }
        let color = self
            .background
            .clone()
            .unwrap_or_else(|| config.render.background.clone());
        Ok(BackgroundSpec::Flat(color))
    }

    /// Builds the request for `bbox`, reading and filtering the input files.
    pub fn to_request(
        &self,
        bbox: BoundingBox,
        default_ellipse: bool,
        config: &ConfigFile,
    ) -> Result<ImageRequest, CliError> {
        let timespan = Timespan::new(self.from, self.until)?;
        let coordinate_sequences = load_flights(&self.inputs, &bbox, &timespan)?;

        let settings = &config.render;
        let mut request = ImageRequest::new(
            bbox,
            self.resolution.unwrap_or(settings.resolution),
            coordinate_sequences,
        );
        request.projection = self
            .projection
            .map(ProjectionKind::from)
            .unwrap_or(settings.projection);
        request.background = self.background(config)?;
        request.foreground_color = self
            .foreground
            .clone()
            .unwrap_or_else(|| settings.foreground.clone());
        request.line_width = self.line_width.unwrap_or(settings.line_width);
        request.split_distance_km = self.split_distance_km.unwrap_or(settings.split_distance_km);
        request.clip_to_ellipse = self.clip_to_ellipse(default_ellipse);
        Ok(request)
    }
}

/// Reads every input file and returns one coordinate sequence per aircraft.
///
/// Samples are kept within `bbox` padded by a tenth of its span.
pub fn load_flights(
    inputs: &[PathBuf],
    bbox: &BoundingBox,
    timespan: &Timespan,
) -> Result<Vec<Vec<flightmap::GeoCoordinate>>, CliError> {
    let mut samples = Vec::new();
    for input in inputs {
        samples.extend(read_samples(input)?);
    }

    let area = bbox.expanded(QUERY_PADDING);
    let flights = group_flights(samples, Some(&area), timespan);
    info!(
        files = inputs.len(),
        aircraft = flights.len(),
        "Loaded flight paths"
    );
    Ok(coordinate_sequences(flights))
}

/// Loads the config file from `path` or the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "config file '{}' does not exist",
                    path.display()
                )));
            }
            ConfigFile::load_from(path)?
        }
        None => ConfigFile::load()?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options() -> RenderOptions {
        RenderOptions {
            inputs: vec![PathBuf::from("flights.csv")],
            ..Default::default()
        }
    }

    #[test]
    fn test_projection_arg_conversion() {
        assert_eq!(ProjectionKind::from(ProjectionArg::Linear), ProjectionKind::Linear);
        assert_eq!(ProjectionKind::from(ProjectionArg::Mercator), ProjectionKind::Mercator);
    }

    #[test]
    fn test_clip_to_ellipse_defaults() {
        let mut opts = options();
        assert!(opts.clip_to_ellipse(true));
        assert!(!opts.clip_to_ellipse(false));

        opts.no_ellipse = true;
        assert!(!opts.clip_to_ellipse(true));

        opts.no_ellipse = false;
        opts.ellipse = true;
        assert!(opts.clip_to_ellipse(false));
    }

    #[test]
    fn test_background_precedence() {
        let config = ConfigFile::default();
        let mut opts = options();
        assert_eq!(
            opts.background(&config).unwrap(),
            BackgroundSpec::Flat("#FFFFFF".to_string())
        );

        opts.background = Some("#000".to_string());
        assert_eq!(
            opts.background(&config).unwrap(),
            BackgroundSpec::Flat("#000".to_string())
        );

        opts.mapbox_style = Some("dark-v11".to_string());
        assert_eq!(
            opts.background(&config).unwrap(),
            BackgroundSpec::Style("dark-v11".to_string())
        );
    }

    #[test]
    fn test_mapbox_flag_uses_configured_style() {
        let mut config = ConfigFile::default();
        let opts = RenderOptions {
            mapbox: true,
            ..options()
        };
        assert!(matches!(opts.background(&config), Err(CliError::Config(_))));

        config.mapbox.style = Some("outdoors-v12".to_string());
        assert_eq!(
            opts.background(&config).unwrap(),
            BackgroundSpec::Style("outdoors-v12".to_string())
        );
    }

    #[test]
    fn test_to_request_reads_and_filters_inputs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time,icao24,lat,lon").unwrap();
        writeln!(file, "10,aaa111,50.0,8.0").unwrap();
        writeln!(file, "20,aaa111,50.1,8.1").unwrap();
        writeln!(file, "15,bbb222,50.05,8.05").unwrap();
        writeln!(file, "12,ccc333,10.0,10.0").unwrap();

        let opts = RenderOptions {
            inputs: vec![file.path().to_path_buf()],
            projection: Some(ProjectionArg::Mercator),
            until: Some(15),
            ..Default::default()
        };
        let bbox = BoundingBox::from_edges(7.5, 49.5, 8.5, 50.5);
        let request = opts.to_request(bbox, true, &ConfigFile::default()).unwrap();

        assert_eq!(request.projection, ProjectionKind::Mercator);
        assert_eq!(request.resolution_longest_edge, 2000);
        assert!(request.clip_to_ellipse);
        assert_eq!(request.coordinate_sequences.len(), 2);
    }

    #[test]
    fn test_to_request_rejects_inverted_timespan() {
        let opts = RenderOptions {
            from: Some(20),
            until: Some(10),
            ..options()
        };
        let bbox = BoundingBox::from_edges(7.5, 49.5, 8.5, 50.5);
        assert!(matches!(
            opts.to_request(bbox, false, &ConfigFile::default()),
            Err(CliError::Input(_))
        ));
    }

    #[test]
    fn test_load_config_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("nope.ini")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
