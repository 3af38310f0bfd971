//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use flightmap::compositor::CompositorError;
use flightmap::config::ConfigFileError;
use flightmap::flight::FlightError;
use flightmap::generate::GenerateError;
use flightmap::provider::ProviderError;
use flightmap::render::RenderError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Invalid arguments or settings
    Config(String),
    /// Config file could not be loaded
    ConfigFile(ConfigFileError),
    /// Flight samples could not be read
    Input(FlightError),
    /// Request file could not be read or parsed
    Request { path: String, reason: String },
    /// Failed to set up the tile source or runtime
    Setup(String),
    /// Rendering failed
    Generate(GenerateError),
    /// Failed to write output file
    FileWrite { path: String, error: RenderError },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Generate(GenerateError::Compositor(CompositorError::TileFetch {
                source: ProviderError::HttpError(_),
                ..
            })) => {
                eprintln!();
                eprintln!("Fetching map tiles failed. Make sure:");
                eprintln!("  1. The Mapbox access token is valid");
                eprintln!("  2. The style id exists (e.g. streets-v12, dark-v11)");
                eprintln!("  3. Or render with a flat --background color instead");
            }
            CliError::Input(FlightError::MissingColumn(_)) => {
                eprintln!();
                eprintln!("Input CSV files need a header with: time,icao24,lat,lon");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Input(e) => write!(f, "Failed to read flight data: {}", e),
            CliError::Request { path, reason } => {
                write!(f, "Failed to read request '{}': {}", path, reason)
            }
            CliError::Setup(msg) => write!(f, "Setup failed: {}", msg),
            CliError::Generate(e) => write!(f, "Failed to generate image: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::ConfigFile(e) => Some(e),
            CliError::Input(e) => Some(e),
            CliError::Generate(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<FlightError> for CliError {
    fn from(e: FlightError) -> Self {
        CliError::Input(e)
    }
}

impl From<GenerateError> for CliError {
    fn from(e: GenerateError) -> Self {
        CliError::Generate(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Setup(e.to_string())
    }
}
