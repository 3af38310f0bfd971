//! Map tile image sources
//!
//! The background compositor only needs "give me the decoded tile at
//! `zoom/x/y` in this style". This module provides that contract
//! ([`TileSource`]) and an HTTP implementation for Mapbox styles.

mod http;
mod mapbox;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use mapbox::{MapboxStyleProvider, MAPBOX_TILE_SIZE};
pub use types::{decode_tile, ProviderError, TileSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
