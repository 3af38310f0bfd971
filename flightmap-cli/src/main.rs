//! FlightMap CLI - Command-line interface
//!
//! Renders recorded flight paths from CSV files into PNG images, over a flat
//! color or a Mapbox map style.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flightmap::logging::{default_log_file, init_logging};

use commands::common::{load_config, RenderOptions};
use commands::generate::{ByAreaArgs, ByCoordinateArgs, RequestArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "flightmap")]
#[command(version, about = "Render flight paths as raster images", long_about = None)]
struct Cli {
    /// Config file (default: ~/.flightmap/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the flights inside a rectangular area
    #[command(
        allow_negative_numbers = true,
        after_help = "Example:\n  flightmap by-area img.png 49 7 51.5 10 -i flights.csv --resolution 4000"
    )]
    ByArea {
        /// Output PNG file
        output: PathBuf,
        /// Southern edge in decimal degrees
        min_lat: f64,
        /// Western edge in decimal degrees
        min_lon: f64,
        /// Northern edge in decimal degrees
        max_lat: f64,
        /// Eastern edge in decimal degrees
        max_lon: f64,
        #[command(flatten)]
        render: RenderOptions,
    },

    /// Render the flights within a radius around a coordinate
    #[command(
        allow_negative_numbers = true,
        after_help = "Example:\n  flightmap by-coordinate img.png -11.78 48.4 50 -i flights.csv"
    )]
    ByCoordinate {
        /// Output PNG file
        output: PathBuf,
        /// Latitude of the center in decimal degrees
        lat: f64,
        /// Longitude of the center in decimal degrees
        lon: f64,
        /// Radius in kilometres
        radius_km: f64,
        #[command(flatten)]
        render: RenderOptions,
    },

    /// Render a JSON image request
    Request {
        /// Request file (JSON)
        request: PathBuf,
        /// Output PNG file
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _logging = init_logging(cli.log_dir.as_deref(), default_log_file())
        .map_err(CliError::LoggingInit)?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::ByArea {
            output,
            min_lat,
            min_lon,
            max_lat,
            max_lon,
            render,
        } => commands::generate::run_by_area(
            ByAreaArgs {
                output,
                min_lat,
                min_lon,
                max_lat,
                max_lon,
                render,
            },
            &config,
        ),
        Commands::ByCoordinate {
            output,
            lat,
            lon,
            radius_km,
            render,
        } => commands::generate::run_by_coordinate(
            ByCoordinateArgs {
                output,
                lat,
                lon,
                radius_km,
                render,
            },
            &config,
        ),
        Commands::Request { request, output } => {
            commands::generate::run_request(RequestArgs { request, output }, &config)
        }
    }
}
