//! Raster compositing of a finished card.
//!
//! [`Compositor`] turns a base photo plus the layout output into the final
//! image. Elements are drawn in a fixed order:
//!
//! 1. the base photo, cover-resized and center-cropped to the canvas,
//! 2. the scrim,
//! 3. the badge box, its label and the optional underline,
//! 4. the headline words, each an outline pass per configured offset and
//!    then a fill in the word's color,
//! 5. the watermark.
//!
//! An optional unsharp mask runs over the finished canvas.

mod layer;

pub use layer::{CardLayer, DrawOp, LayeredOutput};

use image::{RgbaImage, imageops, imageops::FilterType};
use log::{debug, info, trace};

use newscard_core::{
    color::Color,
    geometry::{Point, Size},
    text::{FontHandle, GlyphRasterizer},
};

use crate::{
    config::{CanvasSpec, Corner, Palette, StyleConfig, WatermarkStyle},
    error::NewscardError,
    layout::{Badge, PositionedWord},
    scrim::AlphaRamp,
};

/// Draws card elements onto a canvas described by a [`CanvasSpec`].
pub struct Compositor<'a> {
    rasterizer: &'a dyn GlyphRasterizer,
    canvas: &'a CanvasSpec,
    style: &'a StyleConfig,
    palette: &'a Palette,
}

impl<'a> Compositor<'a> {
    pub fn new(
        rasterizer: &'a dyn GlyphRasterizer,
        canvas: &'a CanvasSpec,
        style: &'a StyleConfig,
        palette: &'a Palette,
    ) -> Self {
        Self {
            rasterizer,
            canvas,
            style,
            palette,
        }
    }

    /// Composites every layer and returns the finished card.
    ///
    /// `font` selects the family for the headline and the badge label; the
    /// sizes come from the words and the badge.
    ///
    /// # Errors
    ///
    /// Returns [`NewscardError::MissingBaseImage`] if `base` has no pixels.
    pub fn composite(
        &self,
        base: &RgbaImage,
        scrim: &AlphaRamp,
        badge: Option<&Badge>,
        words: &[PositionedWord],
        font: &FontHandle,
        watermark: Option<&RgbaImage>,
    ) -> Result<RgbaImage, NewscardError> {
        if base.width() == 0 || base.height() == 0 {
            return Err(NewscardError::MissingBaseImage {
                width: base.width(),
                height: base.height(),
            });
        }

        let (width, height) = (self.canvas.width(), self.canvas.height());
        let mut output = LayeredOutput::new();

        output.add_to_layer(
            CardLayer::Photo,
            DrawOp::Image {
                image: fit_to_canvas(base, width, height),
                x: 0,
                y: 0,
            },
        );
        output.add_to_layer(
            CardLayer::Scrim,
            DrawOp::Scrim {
                ramp: scrim,
                color: Color::default(),
            },
        );
        if let Some(badge) = badge {
            output.merge(self.badge_ops(badge, font));
        }
        for word in words {
            output.merge(self.word_ops(word, font));
        }
        match watermark {
            Some(mark) => {
                if let Some(op) = watermark_op(mark, width, height, self.style.watermark()) {
                    output.add_to_layer(CardLayer::Watermark, op);
                }
            }
            None => info!("Compositing without watermark"),
        }

        debug!(operations = output.len(), width, height; "Rendering card layers");

        let mut canvas = RgbaImage::new(width, height);
        output.render(&mut canvas, self.rasterizer);

        if let Some(sharpen) = self.style.sharpen().filter(|sharpen| sharpen.sigma > 0.0) {
            canvas = imageops::unsharpen(&canvas, sharpen.sigma, sharpen.threshold);
        }
        Ok(canvas)
    }

    fn badge_ops<'b>(&self, badge: &'b Badge, font: &FontHandle) -> LayeredOutput<'b> {
        let mut output = LayeredOutput::new();
        output.add_to_layer(
            CardLayer::Badge,
            DrawOp::Fill {
                bounds: badge.bounds(),
                color: self.palette.badge_fill,
            },
        );
        output.add_to_layer(
            CardLayer::Badge,
            DrawOp::Text {
                text: badge.text(),
                font: font.with_size(badge.label_font_size()),
                origin: badge.label_position(),
                color: self.palette.badge_text,
            },
        );
        if let Some(rule) = badge.underline() {
            output.add_to_layer(
                CardLayer::Badge,
                DrawOp::Fill {
                    bounds: rule,
                    color: self.palette.badge_text,
                },
            );
        }
        output
    }

    fn word_ops<'b>(&self, word: &'b PositionedWord, font: &FontHandle) -> LayeredOutput<'b> {
        let mut output = LayeredOutput::new();
        let font = font.with_size(word.font_size());

        for &[dx, dy] in self.style.outline_offsets() {
            output.add_to_layer(
                CardLayer::Headline,
                DrawOp::Text {
                    text: word.text(),
                    font: font.clone(),
                    origin: word.position().add_point(Point::new(dx as f32, dy as f32)),
                    color: self.palette.outline,
                },
            );
        }
        output.add_to_layer(
            CardLayer::Headline,
            DrawOp::Text {
                text: word.text(),
                font,
                origin: word.position(),
                color: self.palette.word_color(word.is_emphasized()),
            },
        );
        output
    }
}

/// Covers a `width` x `height` canvas with `base`, preserving its aspect
/// ratio.
///
/// The centered region of `base` with the canvas aspect ratio is cropped
/// first and then resized to exactly the canvas size, so no intermediate
/// buffer is larger than the photo or the canvas. An empty `base` yields a
/// transparent canvas.
pub fn fit_to_canvas(base: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (base_width, base_height) = base.dimensions();
    if (base_width, base_height) == (width, height) {
        return base.clone();
    }
    if base_width == 0 || base_height == 0 || width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }

    let aspect = f64::from(width) / f64::from(height);
    let crop_width = ((f64::from(base_height) * aspect).round() as u32).clamp(1, base_width);
    let crop_height = ((f64::from(base_width) / aspect).round() as u32).clamp(1, base_height);
    let left = (base_width - crop_width) / 2;
    let top = (base_height - crop_height) / 2;
    trace!(left, top, crop_width, crop_height; "Cropping base photo to canvas aspect");

    let cropped = imageops::crop_imm(base, left, top, crop_width, crop_height).to_image();
    imageops::resize(&cropped, width, height, FilterType::Lanczos3)
}

/// Resizes the watermark so its longer side is `relative_size` of the
/// canvas width and anchors it to the configured corner.
fn watermark_op(
    mark: &RgbaImage,
    canvas_width: u32,
    canvas_height: u32,
    style: &WatermarkStyle,
) -> Option<DrawOp<'static>> {
    let target = canvas_width as f32 * style.relative_size();
    let mark_size = Size::new(mark.width() as f32, mark.height() as f32);
    if mark_size.is_empty() || target < 1.0 {
        return None;
    }

    let scaled = mark_size.scale(target / mark_size.width().max(mark_size.height()));
    let width = (scaled.width().round() as u32).max(1);
    let height = (scaled.height().round() as u32).max(1);
    let image = imageops::resize(mark, width, height, FilterType::Lanczos3);

    let margin = style.margin().round() as i64;
    let right = i64::from(canvas_width) - i64::from(width) - margin;
    let bottom = i64::from(canvas_height) - i64::from(height) - margin;
    let (x, y) = match style.corner() {
        Corner::TopLeft => (margin, margin),
        Corner::TopRight => (right, margin),
        Corner::BottomLeft => (margin, bottom),
        Corner::BottomRight => (right, bottom),
    };

    Some(DrawOp::Image { image, x, y })
}
