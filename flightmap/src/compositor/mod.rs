//! Background mosaic composition
//!
//! Builds the map background for a render:
//!
//! 1. fit the foreground box into the canvas with [`best_map_view`]
//! 2. enumerate the tiles in view at the floor of the fitted zoom
//! 3. fetch all tiles concurrently and place them edge to edge
//! 4. compute the mosaic's real bounding box from its corner tiles
//! 5. derive the [`Crop`] aligning the mosaic with the foreground box
//!
//! A single failed tile fails the whole composition; partial mosaics are
//! never produced.

mod types;

pub use types::{CompositorError, Crop, Mosaic, TileRange};

use futures::future::try_join_all;
use image::{imageops, RgbaImage};
use tracing::{debug, info};

use crate::coord::{BoundingBox, Resolution};
use crate::provider::TileSource;
use crate::tile::{best_map_view, quadkey_to_tile, quadkeys_in_view, MapView, TileCoord};

/// Tiles selected to cover a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlan {
    /// Fitted view before the zoom was floored and clamped
    pub view: MapView,
    pub zoom: u8,
    pub tiles: Vec<TileCoord>,
    pub range: TileRange,
}

/// Picks the tiles that cover `bbox` drawn onto a `canvas` sized image.
///
/// The fitted zoom is floored, then clamped to `min_zoom..=max_zoom`.
///
/// # Errors
///
/// - `AntimeridianUnsupported` when the box crosses the antimeridian
/// - `NoTiles` when the viewport enumerates nothing
pub fn plan_tiles(
    bbox: &BoundingBox,
    canvas: Resolution,
    tile_size: u32,
    min_zoom: u8,
    max_zoom: u8,
) -> Result<TilePlan, CompositorError> {
    if bbox.crosses_antimeridian() {
        return Err(CompositorError::AntimeridianUnsupported);
    }

    let view = best_map_view(&bbox.to_edges(), canvas.width, canvas.height, 0.0, tile_size);
    let zoom = view
        .zoom
        .floor()
        .clamp(f64::from(min_zoom), f64::from(max_zoom)) as u8;

    let tiles = quadkeys_in_view(&view.center, zoom, canvas.width, canvas.height, tile_size)
        .iter()
        .map(|key| quadkey_to_tile(key))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CompositorError::NoTiles)?;

    let range = TileRange::from_tiles(&tiles).ok_or(CompositorError::NoTiles)?;

    debug!(
        fitted_zoom = view.zoom,
        zoom,
        tiles = tiles.len(),
        columns = range.columns(),
        rows = range.rows(),
        "Planned background tiles"
    );

    Ok(TilePlan {
        view,
        zoom,
        tiles,
        range,
    })
}

/// Places fetched tiles on a mosaic canvas sized for `range`.
///
/// Tiles are positioned by index, so their order does not matter.
pub fn stitch(range: &TileRange, tile_size: u32, tiles: &[(TileCoord, RgbaImage)]) -> RgbaImage {
    let (width, height) = range.pixel_size(tile_size);
    let mut canvas = RgbaImage::new(width, height);
    for (tile, image) in tiles {
        let (x, y) = range.offset_of(tile, tile_size);
        imageops::replace(&mut canvas, image, i64::from(x), i64::from(y));
    }
    canvas
}

/// Composes background mosaics from a [`TileSource`].
pub struct BackgroundCompositor<S: TileSource> {
    source: S,
}

impl<S: TileSource> BackgroundCompositor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the underlying tile source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Builds the mosaic covering `bbox` for a canvas of `canvas` pixels.
    ///
    /// All tile fetches are issued at once and joined; the first failure
    /// cancels the rest and is returned as `CompositorError::TileFetch`.
    pub async fn compose(
        &self,
        bbox: &BoundingBox,
        canvas: Resolution,
        style: &str,
    ) -> Result<Mosaic, CompositorError> {
        bbox.validate()?;

        let tile_size = self.source.tile_size();
        let plan = plan_tiles(
            bbox,
            canvas,
            tile_size,
            self.source.min_zoom(),
            self.source.max_zoom(),
        )?;

        info!(
            source = self.source.name(),
            style,
            zoom = plan.zoom,
            tiles = plan.tiles.len(),
            "Fetching background tiles"
        );

        let fetches = plan.tiles.iter().map(|&tile| async move {
            self.source
                .fetch_tile(tile, style)
                .await
                .map(|image| (tile, image))
                .map_err(|source| CompositorError::TileFetch { tile, source })
        });
        let fetched = try_join_all(fetches).await?;

        let image = stitch(&plan.range, tile_size, &fetched);
        let bounding_box = plan.range.bounding_box(tile_size);

        debug!(
            width = image.width(),
            height = image.height(),
            west = bounding_box.west(),
            south = bounding_box.south(),
            east = bounding_box.east(),
            north = bounding_box.north(),
            "Background mosaic assembled"
        );

        Ok(Mosaic {
            image,
            bounding_box,
            range: plan.range,
        })
    }
}
