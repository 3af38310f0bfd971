//! Mapbox style tile source.
//!
//! Fetches raster renderings of Mapbox map styles through the Static Tiles
//! API. Requires a Mapbox access token.
//!
//! # URL Pattern
//!
//! `https://api.mapbox.com/styles/v1/mapbox/{style}/tiles/512/{z}/{x}/{y}?access_token={token}`
//!
//! - `style` is a Mapbox style id such as `streets-v12` or `dark-v11`
//! - Tiles are requested at 512 px, the largest size the API serves
//! - Standard XYZ tile coordinates (x west to east, y north to south)

use image::RgbaImage;
use tracing::debug;

use super::types::decode_tile;
use crate::provider::{AsyncHttpClient, ProviderError, TileSource};
use crate::tile::TileCoord;

/// Base URL for Mapbox styles.
const MAPBOX_STYLES_URL: &str = "https://api.mapbox.com/styles/v1/mapbox";

/// Tile size requested from the API.
pub const MAPBOX_TILE_SIZE: u32 = 512;

const MIN_ZOOM: u8 = 0;
const MAX_ZOOM: u8 = 22;

/// Mapbox style tile source.
///
/// # Example
///
/// ```no_run
/// use flightmap::provider::{AsyncReqwestClient, MapboxStyleProvider};
///
/// let client = AsyncReqwestClient::new().unwrap();
/// let provider = MapboxStyleProvider::new(client, "your_access_token");
/// // Hand the provider to a BackgroundCompositor...
/// ```
pub struct MapboxStyleProvider<C: AsyncHttpClient> {
    http_client: C,
    access_token: String,
}

impl<C: AsyncHttpClient> MapboxStyleProvider<C> {
    /// Creates a new Mapbox provider with the given access token.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `access_token` - Mapbox access token
    pub fn new(http_client: C, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            access_token: access_token.into(),
        }
    }

    /// Builds the tile URL for a style and tile.
    fn build_url(&self, style: &str, tile: &TileCoord) -> String {
        format!(
            "{}/{}/tiles/{}/{}/{}/{}?access_token={}",
            MAPBOX_STYLES_URL,
            style,
            MAPBOX_TILE_SIZE,
            tile.zoom,
            tile.x,
            tile.y,
            self.access_token
        )
    }
}

impl<C: AsyncHttpClient> TileSource for MapboxStyleProvider<C> {
    async fn fetch_tile(&self, tile: TileCoord, style: &str) -> Result<RgbaImage, ProviderError> {
        if !self.supports_zoom(tile.zoom) {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }
        if style.is_empty() || style.contains(['/', '?', '#']) {
            return Err(ProviderError::InvalidResponse(format!(
                "invalid style id '{}'",
                style
            )));
        }

        let url = self.build_url(style, &tile);
        let bytes = self.http_client.get(&url).await?;
        debug!(tile = %tile, style, bytes = bytes.len(), "Fetched Mapbox tile");

        decode_tile(&bytes, MAPBOX_TILE_SIZE)
    }

    fn name(&self) -> &str {
        "Mapbox"
    }

    fn tile_size(&self) -> u32 {
        MAPBOX_TILE_SIZE
    }

    fn min_zoom(&self) -> u8 {
        MIN_ZOOM
    }

    fn max_zoom(&self) -> u8 {
        MAX_ZOOM
    }
}
