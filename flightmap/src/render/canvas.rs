//! Canvas state machine

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use tiny_skia::{Color, FillRule, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::debug;

use super::{Background, RenderError, DEFAULT_LINE_WIDTH};
use crate::coord::{Pixel, Resolution};

/// Offset moving path vertices onto pixel centers.
const PIXEL_CENTER: f32 = 0.5;

/// Color and width used to stroke paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// Blank canvas; the only way forward is filling its background.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Allocates a transparent canvas.
    ///
    /// # Errors
    ///
    /// `RenderError::CanvasAllocation` for a zero-sized or oversized resolution.
    pub fn new(resolution: Resolution) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(resolution.width, resolution.height).ok_or(
            RenderError::CanvasAllocation {
                width: resolution.width,
                height: resolution.height,
            },
        )?;
        Ok(Self { pixmap })
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.pixmap.width(), self.pixmap.height())
    }

    /// Draws `background` over the whole canvas.
    pub fn fill_background(mut self, background: &Background) -> Result<PaintedCanvas, RenderError> {
        background.paint(&mut self.pixmap)?;
        Ok(PaintedCanvas {
            pixmap: self.pixmap,
            clip: None,
        })
    }
}

/// Canvas with its background drawn, ready for paths.
pub struct PaintedCanvas {
    pixmap: Pixmap,
    clip: Option<Mask>,
}

impl PaintedCanvas {
    /// Restricts every later stroke to the ellipse inscribed in the canvas.
    ///
    /// The background already drawn is left untouched. Clipping twice has
    /// no further effect.
    pub fn clip_to_ellipse(mut self) -> Result<Self, RenderError> {
        if self.clip.is_some() {
            return Ok(self);
        }

        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let allocation = || RenderError::CanvasAllocation { width, height };

        let oval = Rect::from_xywh(0.0, 0.0, width as f32, height as f32)
            .and_then(PathBuilder::from_oval)
            .ok_or_else(allocation)?;
        let mut mask = Mask::new(width, height).ok_or_else(allocation)?;
        mask.fill_path(&oval, FillRule::Winding, true, Transform::identity());

        self.clip = Some(mask);
        Ok(self)
    }

    /// Returns true once an ellipse clip is active.
    pub fn is_clipped(&self) -> bool {
        self.clip.is_some()
    }

    /// Strokes every path as an open polyline.
    ///
    /// Paths with fewer than two points cannot be drawn and are skipped.
    pub fn stroke_paths<P: AsRef<[Pixel]>>(mut self, paths: &[P], style: &StrokeStyle) -> Self {
        let mut paint = Paint::default();
        paint.set_color(style.color);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: style.width,
            ..Default::default()
        };

        let mut stroked = 0usize;
        let mut skipped = 0usize;
        for (index, path) in paths.iter().enumerate() {
            let points = path.as_ref();
            let Some(polyline) = build_polyline(points) else {
                debug!(segment = index, points = points.len(), "Skipping undrawable segment");
                skipped += 1;
                continue;
            };
            self.pixmap.stroke_path(
                &polyline,
                &paint,
                &stroke,
                Transform::identity(),
                self.clip.as_ref(),
            );
            stroked += 1;
        }

        debug!(stroked, skipped, clipped = self.clip.is_some(), "Stroked paths");
        self
    }

    /// Ends drawing and converts the canvas to straight RGBA.
    pub fn finish(self) -> RenderedImage {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut image = RgbaImage::new(width, height);
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RenderedImage { image }
    }
}

/// Polyline through `points` on pixel centers, or `None` below two points.
fn build_polyline(points: &[Pixel]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut builder = PathBuilder::new();
    builder.move_to(first.x as f32 + PIXEL_CENTER, first.y as f32 + PIXEL_CENTER);
    for point in rest {
        builder.line_to(point.x as f32 + PIXEL_CENTER, point.y as f32 + PIXEL_CENTER);
    }
    builder.finish()
}

/// Finished render as straight (non-premultiplied) RGBA.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    image: RgbaImage,
}

impl RenderedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Borrows the pixel buffer.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consumes the render, returning its pixel buffer.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encodes the image as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut out = Cursor::new(Vec::new());
        self.image.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Writes the image to `path` as PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let bytes = self.to_png()?;
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), width = self.width(), height = self.height(), "Saved PNG");
        Ok(())
    }
}
