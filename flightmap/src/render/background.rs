//! Canvas backgrounds

use image::RgbaImage;
use tiny_skia::{
    Color, ColorU8, FilterQuality, Paint, Pattern, Pixmap, Rect, SpreadMode, Transform,
};

use super::RenderError;
use crate::compositor::{Crop, Mosaic};

/// What is drawn before any path.
#[derive(Debug, Clone)]
pub enum Background {
    /// Uniform fill
    Flat(Color),
    /// Stitched map tiles, cropped to the foreground box
    Mosaic { mosaic: Mosaic, crop: Crop },
}

impl Background {
    /// Paints the background over the whole pixmap.
    pub(crate) fn paint(&self, pixmap: &mut Pixmap) -> Result<(), RenderError> {
        match self {
            Background::Flat(color) => {
                pixmap.fill(*color);
                Ok(())
            }
            Background::Mosaic { mosaic, crop } => draw_mosaic(pixmap, &mosaic.image, crop),
        }
    }
}

/// Draws the `crop` rectangle of `image` scaled onto the whole pixmap.
fn draw_mosaic(pixmap: &mut Pixmap, image: &RgbaImage, crop: &Crop) -> Result<(), RenderError> {
    if !(crop.width > 0.0 && crop.height > 0.0) {
        return Err(RenderError::InvalidCrop(format!(
            "{}x{} at ({}, {})",
            crop.width, crop.height, crop.padding_x, crop.padding_y
        )));
    }

    let source = to_pixmap(image)?;

    let sx = f64::from(pixmap.width()) / crop.width;
    let sy = f64::from(pixmap.height()) / crop.height;
    let transform = Transform::from_row(
        sx as f32,
        0.0,
        0.0,
        sy as f32,
        (-crop.padding_x * sx) as f32,
        (-crop.padding_y * sy) as f32,
    );
    if !transform.is_finite() {
        return Err(RenderError::InvalidCrop(format!(
            "scale {}x{} is not finite",
            sx, sy
        )));
    }

    let paint = Paint {
        shader: Pattern::new(
            source.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            transform,
        ),
        anti_alias: false,
        ..Default::default()
    };

    let area = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32).ok_or(
        RenderError::CanvasAllocation {
            width: pixmap.width(),
            height: pixmap.height(),
        },
    )?;
    pixmap.fill_rect(area, &paint, Transform::identity(), None);
    Ok(())
}

/// Copies straight RGBA pixels into a premultiplied pixmap.
fn to_pixmap(image: &RgbaImage) -> Result<Pixmap, RenderError> {
    let mut pixmap =
        Pixmap::new(image.width(), image.height()).ok_or(RenderError::CanvasAllocation {
            width: image.width(),
            height: image.height(),
        })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}
