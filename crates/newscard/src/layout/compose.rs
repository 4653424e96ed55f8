//! Line composition: absolute positions for every headline word and the
//! label badge.

use log::debug;

use newscard_core::{
    geometry::{Bounds, Point, Size},
    text::{FontHandle, TextMeasurer},
};

use super::{LayoutResult, Line};
use crate::config::{Alignment, BadgeStyle, CanvasSpec};

/// A headline word placed on the canvas.
///
/// The position is the top-left corner of the word's line box. Quoted words
/// carry their enlarged font size.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedWord {
    text: String,
    emphasized: bool,
    position: Point,
    width: f32,
    font_size: f32,
}

impl PositionedWord {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_emphasized(&self) -> bool {
        self.emphasized
    }

    pub fn x(&self) -> f32 {
        self.position.x()
    }

    pub fn y(&self) -> f32 {
        self.position.y()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }
}

/// The label box drawn above the first headline line.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    text: String,
    bounds: Bounds,
    label_font_size: f32,
    label_position: Point,
    label_width: f32,
    underline: Option<Bounds>,
}

impl Badge {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn x(&self) -> f32 {
        self.bounds.min_x()
    }

    pub fn y(&self) -> f32 {
        self.bounds.min_y()
    }

    pub fn box_width(&self) -> f32 {
        self.bounds.width()
    }

    pub fn box_height(&self) -> f32 {
        self.bounds.height()
    }

    /// The filled box.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn label_font_size(&self) -> f32 {
        self.label_font_size
    }

    pub fn label_x(&self) -> f32 {
        self.label_position.x()
    }

    pub fn label_y(&self) -> f32 {
        self.label_position.y()
    }

    pub fn label_position(&self) -> Point {
        self.label_position
    }

    pub fn label_width(&self) -> f32 {
        self.label_width
    }

    /// Rule under the label, kept inside the box.
    pub fn underline(&self) -> Option<Bounds> {
        self.underline
    }
}

/// Everything the compositor needs to draw the headline block.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    words: Vec<PositionedWord>,
    badge: Option<Badge>,
    text_top: f32,
}

impl Composition {
    /// Words in reading order.
    pub fn words(&self) -> &[PositionedWord] {
        &self.words
    }

    pub fn badge(&self) -> Option<&Badge> {
        self.badge.as_ref()
    }

    /// Top edge of the first line.
    pub fn text_top(&self) -> f32 {
        self.text_top
    }
}

/// Top edge of the headline block, which sits `bottom_margin` above the
/// canvas bottom.
pub fn text_top(layout: &LayoutResult, spec: &CanvasSpec) -> f32 {
    spec.height() as f32 - spec.bottom_margin() - layout.block_height()
}

/// Positions the words of `layout` and the badge carrying `badge_label`.
///
/// An empty `badge_label` produces no badge.
pub fn compose(
    layout: &LayoutResult,
    badge_label: &str,
    measurer: &dyn TextMeasurer,
    font: &FontHandle,
    spec: &CanvasSpec,
    badge_style: &BadgeStyle,
) -> Composition {
    let top = text_top(layout, spec);
    let last_index = layout.lines().len().saturating_sub(1);

    let mut words = Vec::new();
    for (index, line) in layout.lines().iter().enumerate() {
        let y = top + index as f32 * layout.line_height();
        let justify = spec.alignment() == Alignment::Justified && index != last_index;
        place_line(line, y, justify, spec, &mut words);
    }

    let badge = place_badge(badge_label, layout, top, measurer, font, spec, badge_style);

    debug!(
        words = words.len(),
        text_top = top,
        badge = badge.is_some();
        "Composed headline"
    );

    Composition {
        words,
        badge,
        text_top: top,
    }
}

fn place_line(
    line: &Line,
    y: f32,
    justify: bool,
    spec: &CanvasSpec,
    out: &mut Vec<PositionedWord>,
) {
    let available = spec.available_width();
    let (mut x, gap) = if justify && line.len() > 1 && line.width() <= available {
        let gap = (available - line.words_width()) / line.gap_count() as f32;
        (spec.side_margin(), gap)
    } else {
        ((spec.width() as f32 - line.width()) / 2.0, line.space_width())
    };

    for word in line.words() {
        out.push(PositionedWord {
            text: word.text().to_string(),
            emphasized: word.is_emphasized(),
            position: Point::new(x, y),
            width: word.width(),
            font_size: word.font_size(),
        });
        x += word.width() + gap;
    }
}

fn place_badge(
    label: &str,
    layout: &LayoutResult,
    text_top: f32,
    measurer: &dyn TextMeasurer,
    font: &FontHandle,
    spec: &CanvasSpec,
    style: &BadgeStyle,
) -> Option<Badge> {
    if label.is_empty() {
        return None;
    }

    let box_height = layout.font_size() * style.height_ratio();
    let label_font = font.with_size(box_height * style.label_scale());
    let metrics = measurer.measure(label, &label_font);

    let top_left = Point::new(spec.side_margin(), text_top - style.gap() - box_height);
    let bounds = top_left.to_bounds(Size::new(
        metrics.width + 2.0 * style.padding_x(),
        box_height,
    ));
    let label_position = Point::new(
        bounds.min_x() + style.padding_x(),
        bounds.min_y() + (box_height - metrics.height()) / 2.0,
    );

    let underline = style.underline().map(|thickness| {
        let rule_top = (label_position.y() + metrics.ascent + thickness)
            .min(bounds.max_y() - thickness);
        Point::new(label_position.x(), rule_top)
            .to_bounds(Size::new(metrics.width, thickness))
    });

    Some(Badge {
        text: label.to_string(),
        bounds,
        label_font_size: label_font.size(),
        label_position,
        label_width: metrics.width,
        underline,
    })
}
