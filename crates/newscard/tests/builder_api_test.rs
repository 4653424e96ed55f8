//! Integration tests for the CardBuilder API
//!
//! These tests run the whole pipeline with the fixed-advance typesetter, so
//! they do not depend on installed fonts.

use std::path::PathBuf;

use float_cmp::assert_approx_eq;
use image::{Rgba, RgbaImage};

use newscard::{
    CardBuilder, CardLayout, NewscardError,
    config::{AppConfig, AssetConfig, CanvasSpec, OutputConfig, ScrimAnchor, ScrimConfig, StyleConfig},
    geometry::{Bounds, Point, Size},
    text::FixedAdvanceTypesetter,
};

fn builder(canvas: CanvasSpec) -> CardBuilder<FixedAdvanceTypesetter> {
    styled_builder(canvas, StyleConfig::default())
}

fn styled_builder(canvas: CanvasSpec, style: StyleConfig) -> CardBuilder<FixedAdvanceTypesetter> {
    let config = AppConfig::new(canvas, style, AssetConfig::default(), OutputConfig::default());
    CardBuilder::with_typesetter(config, FixedAdvanceTypesetter::default())
        .expect("Failed to create builder")
}

/// Canvas region the scrim darkens.
fn scrim_bounds(card: &CardLayout, canvas: &CanvasSpec) -> Bounds {
    let top = card.scrim().top() as f32;
    Point::new(0.0, top).to_bounds(Size::new(canvas.width() as f32, canvas.height() as f32 - top))
}

fn small_canvas() -> CanvasSpec {
    CanvasSpec::new(540, 675).with_side_margin(30.0).with_bottom_margin(40.0)
}

fn photo() -> RgbaImage {
    RgbaImage::from_fn(320, 240, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 96, 255]))
}

#[test]
fn test_builder_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CardBuilder<FixedAdvanceTypesetter>>();
    assert_send_sync::<CardBuilder>();
}

#[test]
fn test_breaking_news_layout() {
    let builder = builder(CanvasSpec::new(1080, 1080).with_side_margin(60.0));
    let card = builder
        .layout("BREAKING **NEWS** TODAY", "NEWS")
        .expect("Failed to lay out");

    let layout = card.layout();
    assert!(layout.fitted());
    assert_eq!(layout.lines().len(), 1);
    assert_eq!(layout.lines()[0].text(), "BREAKING NEWS TODAY");
    assert_approx_eq!(f32, layout.font_size(), 68.0);

    let words = card.composition().words();
    assert_eq!(words.len(), 3);
    assert!(!words[0].is_emphasized());
    assert!(words[1].is_emphasized());
    assert!(!words[2].is_emphasized());
    assert_approx_eq!(f32, card.font().size(), layout.font_size());

    let badge = card.composition().badge().expect("badge");
    assert_eq!(badge.text(), "NEWS");
    assert!(badge.bounds().max_y() <= card.composition().text_top());
}

#[test]
fn test_headline_is_uppercased() {
    let builder = builder(small_canvas());
    let card = builder.layout("breaking **news**", "").expect("Failed to lay out");

    let words: Vec<&str> = card.composition().words().iter().map(|w| w.text()).collect();
    assert_eq!(words, vec!["BREAKING", "NEWS"]);
    assert!(card.composition().badge().is_none());
}

#[test]
fn test_over_wide_word_uses_minimum_size() {
    let builder = builder(CanvasSpec::new(1080, 1080).with_side_margin(60.0));
    let headline = "W".repeat(200);
    let card = builder.layout(&headline, "NEWS").expect("Failed to lay out");

    assert!(!card.layout().fitted());
    assert_approx_eq!(f32, card.layout().font_size(), 24.0);
    assert_eq!(card.layout().lines().len(), 1);
}

#[test]
fn test_empty_headline() {
    let builder = builder(small_canvas());
    let card = builder.layout("", "NEWS").expect("Failed to lay out");

    let layout = card.layout();
    assert_eq!(layout.lines().len(), 1);
    assert!(layout.lines()[0].is_empty());
    assert_approx_eq!(f32, layout.block_height(), layout.line_height());
    assert!(card.composition().words().is_empty());

    let image = builder
        .layout_and_composite("", &photo(), "NEWS")
        .expect("Failed to composite");
    assert_eq!(image.dimensions(), (540, 675));
}

#[test]
fn test_layout_and_composite_dimensions() {
    let builder = builder(small_canvas());
    let image = builder
        .layout_and_composite("STORM **HITS** THE COAST AS THOUSANDS EVACUATE", &photo(), "LIVE")
        .expect("Failed to composite");

    assert_eq!(image.dimensions(), (540, 675));
}

#[test]
fn test_layout_and_composite_is_deterministic() {
    let builder = builder(small_canvas());
    let base = photo();

    let first = builder
        .layout_and_composite("MARKETS **RALLY** ON RATE CUT", &base, "NEWS")
        .expect("Failed to composite");
    let second = builder
        .layout_and_composite("MARKETS **RALLY** ON RATE CUT", &base, "NEWS")
        .expect("Failed to composite");

    assert_eq!(first, second);
}

#[test]
fn test_concurrent_cards_match_sequential() {
    let builder = builder(small_canvas());
    let base = photo();
    let headlines = ["FIRST **STORY**", "SECOND STORY IS LONGER THAN THE FIRST", "**THIRD**"];

    let sequential: Vec<RgbaImage> = headlines
        .iter()
        .map(|headline| builder.layout_and_composite(headline, &base, "NEWS").unwrap())
        .collect();

    let concurrent: Vec<RgbaImage> = std::thread::scope(|scope| {
        let handles: Vec<_> = headlines
            .iter()
            .map(|headline| {
                let builder = &builder;
                let base = &base;
                scope.spawn(move || builder.layout_and_composite(headline, base, "NEWS").unwrap())
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

#[test]
fn test_empty_base_image_is_an_error() {
    let builder = builder(small_canvas());
    let result = builder.layout_and_composite("HEADLINE", &RgbaImage::new(0, 0), "NEWS");

    assert!(matches!(
        result,
        Err(NewscardError::MissingBaseImage { width: 0, height: 0 })
    ));
}

#[test]
fn test_missing_font_is_an_error() {
    let mut config = AppConfig::default();
    config
        .assets_mut()
        .set_font(Some(PathBuf::from("/nonexistent/Anton-Regular.ttf")));
    let builder = CardBuilder::with_typesetter(config, FixedAdvanceTypesetter::default())
        .expect("Failed to create builder");

    let result = builder.layout("HEADLINE", "NEWS");
    assert!(matches!(result, Err(NewscardError::Font(_))));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = AppConfig::new(
        CanvasSpec::default().with_font_size_step(0.0),
        StyleConfig::default(),
        AssetConfig::default(),
        OutputConfig::default(),
    );
    let result = CardBuilder::with_typesetter(config, FixedAdvanceTypesetter::default());
    assert!(matches!(result, Err(NewscardError::Config(_))));
}

#[test]
fn test_watermark_is_composited() {
    let mark = RgbaImage::from_pixel(16, 16, Rgba([0, 255, 0, 255]));
    let builder = builder(small_canvas()).with_watermark(Some(mark));

    let image = builder
        .layout_and_composite("HEADLINE", &photo(), "NEWS")
        .expect("Failed to composite");

    // Top-right corner, 23% of the canvas width.
    let pixel = image.get_pixel(520, 20);
    assert!(pixel[1] > 200 && pixel[0] < 60 && pixel[2] < 60, "{pixel:?}");
}

#[test]
fn test_scrim_anchors_to_badge_bottom_by_default() {
    let canvas = small_canvas();
    let builder = builder(canvas.clone());
    let card = builder
        .layout("MARKETS **RALLY** ON RATE CUT", "NEWS")
        .expect("Failed to lay out");

    let badge = card.composition().badge().expect("badge");
    let top = card.scrim().top() as f32;
    assert_approx_eq!(f32, top, badge.bounds().max_y().ceil());
    assert!(top >= badge.bounds().max_y());
    assert!(top <= card.composition().text_top().ceil());
    assert!(!scrim_bounds(&card, &canvas).intersects(&badge.bounds()));
}

#[test]
fn test_scrim_anchors_to_text_top() {
    let canvas = small_canvas();
    let style = StyleConfig::default().with_scrim(ScrimConfig::new(ScrimAnchor::TextTop, 0, 255, 1.5));
    let builder = styled_builder(canvas.clone(), style);
    let card = builder
        .layout("MARKETS **RALLY** ON RATE CUT", "NEWS")
        .expect("Failed to lay out");

    let text_top = card.composition().text_top();
    assert_approx_eq!(f32, card.scrim().top() as f32, text_top.ceil());
    let badge = card.composition().badge().expect("badge");
    assert!(!scrim_bounds(&card, &canvas).intersects(&badge.bounds()));
}

#[test]
fn test_scrim_without_badge_starts_at_text_top() {
    let builder = builder(small_canvas());
    let card = builder.layout("MARKETS **RALLY**", "").expect("Failed to lay out");

    assert!(card.composition().badge().is_none());
    assert_approx_eq!(
        f32,
        card.scrim().top() as f32,
        card.composition().text_top().ceil()
    );
    assert!(card.scrim().alphas().windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_inverted_scrim_alphas_are_rejected() {
    let style = StyleConfig::default().with_scrim(ScrimConfig::new(ScrimAnchor::TextTop, 200, 50, 1.5));
    let config = AppConfig::new(small_canvas(), style, AssetConfig::default(), OutputConfig::default());

    let result = CardBuilder::with_typesetter(config, FixedAdvanceTypesetter::default());
    assert!(matches!(result, Err(NewscardError::Config(message)) if message.contains("start_alpha")));
}

#[test]
fn test_extreme_aspect_photo_is_fitted() {
    let builder = builder(small_canvas());
    let strip = RgbaImage::from_pixel(1, 2000, Rgba([40, 80, 120, 255]));

    let image = builder
        .layout_and_composite("HEADLINE", &strip, "NEWS")
        .expect("Failed to composite");
    assert_eq!(image.dimensions(), (540, 675));
}

#[test]
fn test_quoted_words_are_enlarged() {
    let builder = builder(small_canvas().with_quote_scale(2.1));
    let card = builder
        .layout("SHE SAID \u{201C}NEVER\u{201D}", "")
        .expect("Failed to lay out");

    let size = card.layout().font_size();
    let words = card.composition().words();
    assert_approx_eq!(f32, words[0].font_size(), size);
    assert_approx_eq!(f32, words[2].font_size(), size * 2.1);
}
