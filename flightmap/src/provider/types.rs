//! Tile source types and traits

use std::fmt;
use std::future::Future;
use std::io::Cursor;

use image::{ImageReader, RgbaImage};

use crate::tile::TileCoord;

/// Errors that can occur while fetching a tile image.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed or returned a non-success status
    HttpError(String),
    /// Zoom level not supported by this source
    UnsupportedZoom(u8),
    /// Response body was not usable
    InvalidResponse(String),
    /// Response body could not be decoded as an image
    DecodeError(String),
    /// Decoded tile is not `expected` x `expected` pixels
    InvalidTileSize {
        expected: u32,
        width: u32,
        height: u32,
    },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::UnsupportedZoom(zoom) => {
                write!(f, "Zoom level {} not supported by tile source", zoom)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::DecodeError(msg) => write!(f, "Failed to decode tile image: {}", msg),
            ProviderError::InvalidTileSize {
                expected,
                width,
                height,
            } => write!(
                f,
                "Tile image is {}x{}, expected {}x{}",
                width, height, expected, expected
            ),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Source of square raster map tiles.
///
/// Implementors fetch one decoded tile per call. Timeouts and retries are
/// the implementor's concern; a returned error is final for this render.
pub trait TileSource: Send + Sync {
    /// Fetches one tile rendered in `style`.
    ///
    /// # Returns
    ///
    /// The decoded tile, exactly `tile_size()` pixels square, or an error.
    fn fetch_tile(
        &self,
        tile: TileCoord,
        style: &str,
    ) -> impl Future<Output = Result<RgbaImage, ProviderError>> + Send;

    /// Returns the source's name for logging and identification.
    fn name(&self) -> &str;

    /// Side length of a tile in pixels.
    fn tile_size(&self) -> u32;

    /// Returns the minimum supported zoom level.
    fn min_zoom(&self) -> u8;

    /// Returns the maximum supported zoom level.
    fn max_zoom(&self) -> u8;

    /// Checks if this source supports the given zoom level.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom() && zoom <= self.max_zoom()
    }
}

/// Decodes an encoded tile and checks that it is `tile_size` pixels square.
pub fn decode_tile(bytes: &[u8], tile_size: u32) -> Result<RgbaImage, ProviderError> {
    if bytes.is_empty() {
        return Err(ProviderError::InvalidResponse("empty body".to_string()));
    }

    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ProviderError::DecodeError(e.to_string()))?
        .decode()
        .map_err(|e| ProviderError::DecodeError(e.to_string()))?
        .to_rgba8();

    if image.width() != tile_size || image.height() != tile_size {
        return Err(ProviderError::InvalidTileSize {
            expected: tile_size,
            width: image.width(),
            height: image.height(),
        });
    }

    Ok(image)
}
