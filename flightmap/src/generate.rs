//! Image generation
//!
//! Runs one render request through every stage:
//!
//! 1. validate the bounding box, derive the output resolution
//! 2. split each coordinate sequence at gaps, project the segments
//! 3. resolve the background (flat color, or a mosaic from a [`TileSource`])
//! 4. draw the background, clip, stroke and finish the canvas
//!
//! Configuration problems are reported before any tile is fetched. The first
//! fatal error is returned as is and no partial image is produced.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiny_skia::Color;
use tracing::{debug, info};

use crate::compositor::{BackgroundCompositor, CompositorError};
use crate::coord::{BoundingBox, GeoCoordinate, Pixel, Resolution};
use crate::error::ConfigurationError;
use crate::projection::{Projection, ProjectionKind};
use crate::provider::TileSource;
use crate::render::{
    parse_color, Background, Canvas, RenderError, RenderedImage, StrokeStyle, DEFAULT_BACKGROUND,
    DEFAULT_FOREGROUND, DEFAULT_LINE_WIDTH,
};
use crate::resolution::calculate_resolution;
use crate::segment::{split_at_gaps, FinalSample, DEFAULT_SPLIT_DISTANCE_KM};

/// Errors surfaced by a render request.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Compositor(#[from] CompositorError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Background requested for an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSpec {
    /// Color string, see [`parse_color`]
    Flat(String),
    /// Map style id for the tile source
    Style(String),
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        BackgroundSpec::Flat(DEFAULT_BACKGROUND.to_string())
    }
}

fn default_foreground() -> String {
    DEFAULT_FOREGROUND.to_string()
}

fn default_line_width() -> f32 {
    DEFAULT_LINE_WIDTH
}

fn default_split_distance() -> f64 {
    DEFAULT_SPLIT_DISTANCE_KM
}

/// Everything needed to render one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    /// One chronologically ordered sequence per flight
    pub coordinate_sequences: Vec<Vec<GeoCoordinate>>,
    #[serde(default)]
    pub projection: ProjectionKind,
    pub resolution_longest_edge: u32,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub background: BackgroundSpec,
    #[serde(default = "default_foreground")]
    pub foreground_color: String,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    #[serde(default)]
    pub clip_to_ellipse: bool,
    #[serde(default = "default_split_distance")]
    pub split_distance_km: f64,
    #[serde(default)]
    pub final_sample: FinalSample,
}

impl ImageRequest {
    /// Parses a request from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Request with default styling for `bounding_box`.
    pub fn new(
        bounding_box: BoundingBox,
        resolution_longest_edge: u32,
        coordinate_sequences: Vec<Vec<GeoCoordinate>>,
    ) -> Self {
        Self {
            coordinate_sequences,
            projection: ProjectionKind::default(),
            resolution_longest_edge,
            bounding_box,
            background: BackgroundSpec::default(),
            foreground_color: default_foreground(),
            line_width: DEFAULT_LINE_WIDTH,
            clip_to_ellipse: false,
            split_distance_km: DEFAULT_SPLIT_DISTANCE_KM,
            final_sample: FinalSample::default(),
        }
    }
}

/// Background after validation.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedBackground {
    Flat(Color),
    Style(String),
}

/// A validated request with its paths already in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub bounding_box: BoundingBox,
    pub resolution: Resolution,
    pub projection: ProjectionKind,
    pub paths: Vec<Vec<Pixel>>,
    pub stroke: StrokeStyle,
    pub clip_to_ellipse: bool,
    pub background: PlannedBackground,
}

impl RenderPlan {
    /// Validates `request` and projects its paths.
    ///
    /// # Errors
    ///
    /// Any [`ConfigurationError`]: invalid box, resolution, colors, line
    /// width, split distance or projection.
    pub fn prepare(request: &ImageRequest) -> Result<Self, ConfigurationError> {
        let bbox = request.bounding_box;
        bbox.validate()?;

        let resolution = calculate_resolution(request.resolution_longest_edge, &bbox)?;
        if !resolution.is_drawable() {
            return Err(ConfigurationError::InvalidResolution {
                width: resolution.width,
                height: resolution.height,
            });
        }

        if !(request.line_width.is_finite() && request.line_width > 0.0) {
            return Err(ConfigurationError::InvalidLineWidth(request.line_width));
        }
        let split_distance = request.split_distance_km;
        if !(split_distance.is_finite() && split_distance > 0.0) {
            return Err(ConfigurationError::InvalidSplitDistance(split_distance));
        }

        let stroke = StrokeStyle {
            color: parse_color(&request.foreground_color)?,
            width: request.line_width,
        };

        let background = match &request.background {
            BackgroundSpec::Flat(color) => PlannedBackground::Flat(parse_color(color)?),
            BackgroundSpec::Style(style) => PlannedBackground::Style(style.clone()),
        };

        let projection = Projection::new(request.projection, &bbox, resolution)?;

        let segments: Vec<Vec<GeoCoordinate>> = request
            .coordinate_sequences
            .iter()
            .flat_map(|sequence| {
                split_at_gaps(sequence, request.split_distance_km, request.final_sample)
            })
            .collect();
        let paths = projection.project_paths(&segments);

        debug!(
            width = resolution.width,
            height = resolution.height,
            projection = %request.projection,
            flights = request.coordinate_sequences.len(),
            segments = paths.len(),
            "Prepared render"
        );

        Ok(Self {
            bounding_box: bbox,
            resolution,
            projection: request.projection,
            paths,
            stroke,
            clip_to_ellipse: request.clip_to_ellipse,
            background,
        })
    }

    /// Draws the plan over `background`.
    pub fn render(&self, background: &Background) -> Result<RenderedImage, RenderError> {
        let mut canvas = Canvas::new(self.resolution)?.fill_background(background)?;
        if self.clip_to_ellipse {
            canvas = canvas.clip_to_ellipse()?;
        }
        Ok(canvas.stroke_paths(&self.paths, &self.stroke).finish())
    }
}

/// Renders requests whose background may come from a tile source.
pub struct ImageGenerator<S: TileSource> {
    compositor: BackgroundCompositor<S>,
}

impl<S: TileSource> ImageGenerator<S> {
    pub fn new(source: S) -> Self {
        Self {
            compositor: BackgroundCompositor::new(source),
        }
    }

    pub fn compositor(&self) -> &BackgroundCompositor<S> {
        &self.compositor
    }

    /// Renders `request` to an RGBA image.
    pub async fn generate(&self, request: &ImageRequest) -> Result<RenderedImage, GenerateError> {
        let plan = RenderPlan::prepare(request)?;

        let background = match &plan.background {
            PlannedBackground::Flat(color) => Background::Flat(*color),
            PlannedBackground::Style(style) => {
                let mosaic = self
                    .compositor
                    .compose(&plan.bounding_box, plan.resolution, style)
                    .await?;
                let crop = mosaic.crop_for(&plan.bounding_box);
                debug!(
                    padding_x = crop.padding_x,
                    padding_y = crop.padding_y,
                    crop_width = crop.width,
                    crop_height = crop.height,
                    "Aligned background mosaic"
                );
                Background::Mosaic { mosaic, crop }
            }
        };

        let image = plan.render(&background)?;
        info!(
            width = image.width(),
            height = image.height(),
            segments = plan.paths.len(),
            "Generated image"
        );
        Ok(image)
    }
}

/// Renders a request that only needs a flat background.
///
/// # Errors
///
/// `ConfigurationError::TileSourceRequired` when the request names a map style.
pub fn generate_flat(request: &ImageRequest) -> Result<RenderedImage, GenerateError> {
    let plan = RenderPlan::prepare(request)?;
    let color = match &plan.background {
        PlannedBackground::Flat(color) => *color,
        PlannedBackground::Style(style) => {
            return Err(ConfigurationError::TileSourceRequired(style.clone()).into())
        }
    };

    let image = plan.render(&Background::Flat(color))?;
    info!(
        width = image.width(),
        height = image.height(),
        segments = plan.paths.len(),
        "Generated image"
    );
    Ok(image)
}
