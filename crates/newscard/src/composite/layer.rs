//! Layer-based raster drawing.
//!
//! Card elements are collected as [`DrawOp`]s tagged with a [`CardLayer`]
//! and applied to the canvas in layer order, so callers may add elements in
//! any order without affecting z-ordering.
//!
//! # Example
//!
//! ```
//! # use image::{Rgba, RgbaImage};
//! # use newscard::composite::{CardLayer, DrawOp, LayeredOutput};
//! # use newscard_core::{color::Color, geometry::{Point, Size}, text::FixedAdvanceTypesetter};
//! let mut output = LayeredOutput::new();
//! let red = Color::new("red").unwrap();
//! let blue = Color::new("blue").unwrap();
//!
//! let bounds = Point::new(0.0, 0.0).to_bounds(Size::new(4.0, 4.0));
//! output.add_to_layer(CardLayer::Headline, DrawOp::Fill { bounds, color: red });
//! output.add_to_layer(CardLayer::Badge, DrawOp::Fill { bounds, color: blue });
//!
//! let mut canvas = RgbaImage::new(4, 4);
//! output.render(&mut canvas, &FixedAdvanceTypesetter::default());
//! assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
//! ```

use image::{Rgba, RgbaImage, imageops};
use log::trace;

use newscard_core::{
    color::Color,
    geometry::{Bounds, Point},
    text::{FontHandle, GlyphRasterizer},
};

use crate::scrim::AlphaRamp;

/// Defines the card layers.
///
/// Layers are drawn from bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardLayer {
    /// The fitted base photo
    Photo,
    /// Readability gradient
    Scrim,
    /// Label box, label text and underline
    Badge,
    /// Outlined headline words
    Headline,
    /// Logo in a canvas corner
    Watermark,
}

impl CardLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Scrim => "scrim",
            Self::Badge => "badge",
            Self::Headline => "headline",
            Self::Watermark => "watermark",
        }
    }
}

/// A single drawing operation.
#[derive(Debug, Clone)]
pub enum DrawOp<'a> {
    /// Alpha-composite an image with its top-left corner at `(x, y)`.
    Image { image: RgbaImage, x: i64, y: i64 },
    /// Fill a rectangle.
    Fill { bounds: Bounds, color: Color },
    /// Blend `color` into every row with the ramp's alpha.
    Scrim { ramp: &'a AlphaRamp, color: Color },
    /// Rasterize `text` with its line box's top-left corner at `origin`.
    Text {
        text: &'a str,
        font: FontHandle,
        origin: Point,
        color: Color,
    },
}

/// Draw operations grouped by layer.
#[derive(Debug, Default)]
pub struct LayeredOutput<'a> {
    items: Vec<(CardLayer, DrawOp<'a>)>,
}

impl<'a> LayeredOutput<'a> {
    /// Creates a new empty `LayeredOutput`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation to `layer`. Operations within a layer keep their
    /// insertion order.
    pub fn add_to_layer(&mut self, layer: CardLayer, op: DrawOp<'a>) {
        self.items.push((layer, op));
    }

    /// Appends every operation of `other`.
    pub fn merge(&mut self, other: LayeredOutput<'a>) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Applies all operations to `canvas`, bottom layer first, consuming the
    /// output.
    pub fn render(mut self, canvas: &mut RgbaImage, rasterizer: &dyn GlyphRasterizer) {
        // Stable sort keeps insertion order within a layer.
        self.items.sort_by_key(|(layer, _)| *layer);

        for (layer, op) in self.items {
            trace!(layer = layer.name(); "Drawing operation");
            match op {
                DrawOp::Image { image, x, y } => imageops::overlay(canvas, &image, x, y),
                DrawOp::Fill { bounds, color } => fill(canvas, bounds, color),
                DrawOp::Scrim { ramp, color } => draw_scrim(canvas, ramp, color),
                DrawOp::Text {
                    text,
                    font,
                    origin,
                    color,
                } => draw_text(canvas, rasterizer, text, &font, origin, color),
            }
        }
    }
}

fn fill(canvas: &mut RgbaImage, bounds: Bounds, color: Color) {
    let Some(rect) = bounds.to_pixel_rect(canvas.width(), canvas.height()) else {
        return;
    };
    let rgba = color.to_rgba8();
    for (x, y) in rect.pixels() {
        blend(canvas.get_pixel_mut(x, y), rgba, u8::MAX);
    }
}

fn draw_scrim(canvas: &mut RgbaImage, ramp: &AlphaRamp, color: Color) {
    let [r, g, b, _] = color.to_rgba8();
    for y in ramp.top()..canvas.height() {
        let alpha = ramp.alpha_at(y);
        if alpha == 0 {
            continue;
        }
        for x in 0..canvas.width() {
            blend(canvas.get_pixel_mut(x, y), [r, g, b, alpha], u8::MAX);
        }
    }
}

fn draw_text(
    canvas: &mut RgbaImage,
    rasterizer: &dyn GlyphRasterizer,
    text: &str,
    font: &FontHandle,
    origin: Point,
    color: Color,
) {
    let rgba = color.to_rgba8();
    let (left, top) = (origin.x().round() as i64, origin.y().round() as i64);
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));

    rasterizer.rasterize(text, font, &mut |x, y, coverage| {
        let (px, py) = (left + i64::from(x), top + i64::from(y));
        if (0..width).contains(&px) && (0..height).contains(&py) {
            blend(canvas.get_pixel_mut(px as u32, py as u32), rgba, coverage);
        }
    });
}

/// Source-over blend of `color` at `coverage` onto `pixel`.
fn blend(pixel: &mut Rgba<u8>, color: [u8; 4], coverage: u8) {
    let alpha = (u32::from(color[3]) * u32::from(coverage) + 127) / 255;
    if alpha == 0 {
        return;
    }
    let inverse = 255 - alpha;
    for channel in 0..3 {
        let src = u32::from(color[channel]) * alpha;
        let dst = u32::from(pixel[channel]) * inverse;
        pixel[channel] = ((src + dst + 127) / 255) as u8;
    }
    pixel[3] = (alpha + (u32::from(pixel[3]) * inverse + 127) / 255) as u8;
}

#[cfg(test)]
mod tests {
    use newscard_core::{geometry::Size, text::FixedAdvanceTypesetter};

    use super::*;

    fn color(name: &str) -> Color {
        Color::new(name).unwrap()
    }

    #[test]
    fn test_layer_order() {
        assert!(CardLayer::Photo < CardLayer::Scrim);
        assert!(CardLayer::Scrim < CardLayer::Badge);
        assert!(CardLayer::Badge < CardLayer::Headline);
        assert!(CardLayer::Headline < CardLayer::Watermark);
        assert_eq!(CardLayer::Headline.name(), "headline");
    }

    #[test]
    fn test_render_sorts_by_layer() {
        let bounds = Point::new(0.0, 0.0).to_bounds(Size::new(2.0, 2.0));
        let mut output = LayeredOutput::new();
        output.add_to_layer(
            CardLayer::Watermark,
            DrawOp::Fill {
                bounds,
                color: color("lime"),
            },
        );
        output.add_to_layer(
            CardLayer::Photo,
            DrawOp::Image {
                image: RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])),
                x: 0,
                y: 0,
            },
        );
        assert_eq!(output.len(), 2);

        let mut canvas = RgbaImage::new(2, 2);
        output.render(&mut canvas, &FixedAdvanceTypesetter::default());
        assert_eq!(canvas.get_pixel(1, 1), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_same_layer_keeps_insertion_order() {
        let bounds = Point::new(0.0, 0.0).to_bounds(Size::new(1.0, 1.0));
        let mut first = LayeredOutput::new();
        first.add_to_layer(
            CardLayer::Headline,
            DrawOp::Fill {
                bounds,
                color: color("black"),
            },
        );
        let mut second = LayeredOutput::new();
        second.add_to_layer(
            CardLayer::Headline,
            DrawOp::Fill {
                bounds,
                color: color("white"),
            },
        );
        first.merge(second);

        let mut canvas = RgbaImage::new(1, 1);
        first.render(&mut canvas, &FixedAdvanceTypesetter::default());
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_fill_clips_to_canvas() {
        let bounds = Point::new(-5.0, 2.0).to_bounds(Size::new(7.0, 100.0));
        let mut canvas = RgbaImage::new(4, 4);
        fill(&mut canvas, bounds, color("red"));

        assert_eq!(canvas.get_pixel(1, 3), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(2, 3), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(0, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_blend_half_coverage() {
        let mut pixel = Rgba([0, 0, 0, 255]);
        blend(&mut pixel, [255, 255, 255, 255], 128);
        assert_eq!(pixel, Rgba([128, 128, 128, 255]));

        let mut untouched = Rgba([10, 20, 30, 255]);
        blend(&mut untouched, [255, 255, 255, 0], 255);
        assert_eq!(untouched, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_draw_text_clips_outside_canvas() {
        let mut canvas = RgbaImage::new(10, 10);
        let font = FontHandle::new("block", 10.0);
        draw_text(
            &mut canvas,
            &FixedAdvanceTypesetter::default(),
            "AB",
            &font,
            Point::new(6.0, -3.0),
            color("white"),
        );

        // The first glyph covers canvas columns 7..11 and rows -2..5.
        assert_eq!(canvas.get_pixel(7, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(7, 6), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(5, 0), &Rgba([0, 0, 0, 0]));
    }
}
