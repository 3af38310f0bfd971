//! Generate commands - render flight paths to a PNG file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use flightmap::config::ConfigFile;
use flightmap::generate::{generate_flat, BackgroundSpec, ImageGenerator, ImageRequest};
use flightmap::provider::{AsyncReqwestClient, MapboxStyleProvider};
use flightmap::render::RenderedImage;
use flightmap::{BoundingBox, GeoCoordinate};
use tracing::info;

use super::common::RenderOptions;
use crate::error::CliError;

/// Arguments for the by-area command.
pub struct ByAreaArgs {
    pub output: PathBuf,
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
    pub render: RenderOptions,
}

/// Arguments for the by-coordinate command.
pub struct ByCoordinateArgs {
    pub output: PathBuf,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub render: RenderOptions,
}

/// Arguments for the request command.
pub struct RequestArgs {
    pub request: PathBuf,
    pub output: PathBuf,
}

/// Builds the box of the by-area command, rejecting inverted corners.
pub fn area_bounding_box(
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
) -> Result<BoundingBox, CliError> {
    if min_lat > max_lat {
        return Err(CliError::Config(format!(
            "min latitude {} must not be bigger than max latitude {}",
            min_lat, max_lat
        )));
    }
    if min_lon > max_lon {
        return Err(CliError::Config(format!(
            "min longitude {} must not be bigger than max longitude {}",
            min_lon, max_lon
        )));
    }
    Ok(BoundingBox::new(
        GeoCoordinate::new(min_lat, min_lon),
        GeoCoordinate::new(max_lat, max_lon),
    ))
}

/// Builds the box of the by-coordinate command.
pub fn radius_bounding_box(lat: f64, lon: f64, radius_km: f64) -> Result<BoundingBox, CliError> {
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Err(CliError::Config(format!(
            "radius must be a positive number of kilometres, got {}",
            radius_km
        )));
    }
    Ok(BoundingBox::around(GeoCoordinate::new(lat, lon), radius_km))
}

/// Run the by-area command.
pub fn run_by_area(args: ByAreaArgs, config: &ConfigFile) -> Result<(), CliError> {
    let bbox = area_bounding_box(args.min_lat, args.min_lon, args.max_lat, args.max_lon)?;
    let request = args.render.to_request(bbox, false, config)?;
    render_to_file(&request, &args.output, config)
}

/// Run the by-coordinate command.
pub fn run_by_coordinate(args: ByCoordinateArgs, config: &ConfigFile) -> Result<(), CliError> {
    let bbox = radius_bounding_box(args.lat, args.lon, args.radius_km)?;
    let request = args.render.to_request(bbox, true, config)?;
    render_to_file(&request, &args.output, config)
}

/// Run the request command.
pub fn run_request(args: RequestArgs, config: &ConfigFile) -> Result<(), CliError> {
    let request = load_request(&args.request)?;
    render_to_file(&request, &args.output, config)
}

/// Parses a JSON image request file.
pub fn load_request(path: &Path) -> Result<ImageRequest, CliError> {
    let request_error = |reason: String| CliError::Request {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| request_error(e.to_string()))?;
    ImageRequest::from_json(&content).map_err(|e| request_error(e.to_string()))
}

/// Renders `request` and writes the PNG to `output`.
fn render_to_file(request: &ImageRequest, output: &Path, config: &ConfigFile) -> Result<(), CliError> {
    let start = Instant::now();

    let image = match &request.background {
        BackgroundSpec::Flat(_) => generate_flat(request)?,
        BackgroundSpec::Style(style) => {
            println!("Fetching Mapbox style '{}' as background...", style);
            generate_with_mapbox(request, config)?
        }
    };

    println!(
        "Rendered {}x{} image in {:.2}s",
        image.width(),
        image.height(),
        start.elapsed().as_secs_f64()
    );

    image.save_png(output).map_err(|error| CliError::FileWrite {
        path: output.display().to_string(),
        error,
    })?;
    info!(path = %output.display(), "Image written");
    println!("Saved to {}", output.display());
    Ok(())
}

/// Renders over Mapbox tiles on a Tokio runtime.
fn generate_with_mapbox(request: &ImageRequest, config: &ConfigFile) -> Result<RenderedImage, CliError> {
    let token = config.mapbox_token().ok_or_else(|| {
        CliError::Config(
            "Mapbox backgrounds require an access token. \
             Set access_token in the [mapbox] section of config.ini or MAPBOX_TOKEN"
                .to_string(),
        )
    })?;

    let client = AsyncReqwestClient::with_timeout(config.mapbox.timeout_secs)?;
    let generator = ImageGenerator::new(MapboxStyleProvider::new(client, token));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Setup(format!("failed to start async runtime: {}", e)))?;

    Ok(runtime.block_on(generator.generate(request))?)
}
