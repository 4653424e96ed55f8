//! Configuration types for Newscard rendering.
//!
//! This module provides the configuration structures that control how a
//! card is laid out and styled. All types implement [`serde::Deserialize`]
//! for loading from external sources, and every field has a default, so a
//! configuration file only needs to name what it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`CanvasSpec`] - Canvas geometry and the autofit constraints.
//! - [`StyleConfig`] - Colors, outline, badge, scrim, watermark and sharpening.
//! - [`AssetConfig`] - Font and watermark sources.
//! - [`OutputConfig`] - Encoding options for the finished card.
//!
//! # Example
//!
//! ```
//! # use newscard::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.canvas().validate().is_ok());
//! assert!(config.style().palette().is_ok());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use newscard_core::{color::Color, geometry::Size, text::FontSource};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Canvas geometry and autofit constraints.
    #[serde(default)]
    canvas: CanvasSpec,

    /// Visual styling.
    #[serde(default)]
    style: StyleConfig,

    /// Font and watermark assets.
    #[serde(default)]
    assets: AssetConfig,

    /// Output encoding.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        canvas: CanvasSpec,
        style: StyleConfig,
        assets: AssetConfig,
        output: OutputConfig,
    ) -> Self {
        Self {
            canvas,
            style,
            assets,
            output,
        }
    }

    /// Returns the canvas constraints.
    pub fn canvas(&self) -> &CanvasSpec {
        &self.canvas
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the asset configuration.
    pub fn assets(&self) -> &AssetConfig {
        &self.assets
    }

    /// Returns the asset configuration for modification.
    pub fn assets_mut(&mut self) -> &mut AssetConfig {
        &mut self.assets
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// How the autofit search picks its first candidate font size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSizeBasis {
    /// A fixed size in pixels.
    Fixed(f32),
    /// A fraction of the canvas height, rounded down to whole pixels.
    CanvasHeightRatio(f32),
}

/// How line height derives from the font size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineHeight {
    /// `font_size * multiplier`
    Multiplier(f32),
    /// `font_size + padding`
    Padding(f32),
}

/// Horizontal placement policy for headline lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Each line centered on the canvas with natural word spacing.
    #[default]
    Centered,
    /// Inner lines stretched between the side margins; single-word lines
    /// and the final line are centered.
    Justified,
}

/// Immutable description of the canvas and the constraints the autofit
/// search must satisfy.
///
/// Defaults reproduce a 2160x2700 portrait card with at most three lines
/// occupying at most 30% of the canvas height.
///
/// # Examples
///
/// ```
/// # use newscard::config::{Alignment, CanvasSpec};
/// let spec = CanvasSpec::new(1080, 1080)
///     .with_side_margin(60.0)
///     .with_alignment(Alignment::Justified);
///
/// assert_eq!(spec.max_line_width(), 1080.0 * 0.85);
/// assert_eq!(spec.available_width(), 960.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasSpec {
    width: u32,
    height: u32,
    side_margin: f32,
    bottom_margin: f32,
    max_line_width_ratio: f32,
    max_block_height_ratio: f32,
    max_line_count: usize,
    initial_font_size: FontSizeBasis,
    min_font_size: f32,
    font_size_step: f32,
    line_height: LineHeight,
    alignment: Alignment,
    /// Widow control: the last line is refilled from the previous one until
    /// it holds at least this many words. `1` disables it.
    min_last_line_words: usize,
    /// Size multiplier for words containing curly quotes (`“` or `”`). Quote
    /// cards use 2.1; `1.0` sets quotes like any other word.
    quote_scale: f32,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: 2160,
            height: 2700,
            side_margin: 120.0,
            bottom_margin: 160.0,
            max_line_width_ratio: 0.85,
            max_block_height_ratio: 0.3,
            max_line_count: 3,
            initial_font_size: FontSizeBasis::CanvasHeightRatio(0.063),
            min_font_size: 24.0,
            font_size_step: 2.0,
            line_height: LineHeight::Padding(15.0),
            alignment: Alignment::Centered,
            min_last_line_words: 1,
            quote_scale: 1.0,
        }
    }
}

impl CanvasSpec {
    /// Creates constraints for a `width` x `height` canvas with default limits.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_side_margin(mut self, margin: f32) -> Self {
        self.side_margin = margin;
        self
    }

    pub fn with_bottom_margin(mut self, margin: f32) -> Self {
        self.bottom_margin = margin;
        self
    }

    pub fn with_max_line_width_ratio(mut self, ratio: f32) -> Self {
        self.max_line_width_ratio = ratio;
        self
    }

    pub fn with_max_block_height_ratio(mut self, ratio: f32) -> Self {
        self.max_block_height_ratio = ratio;
        self
    }

    pub fn with_max_line_count(mut self, count: usize) -> Self {
        self.max_line_count = count;
        self
    }

    pub fn with_initial_font_size(mut self, basis: FontSizeBasis) -> Self {
        self.initial_font_size = basis;
        self
    }

    pub fn with_min_font_size(mut self, size: f32) -> Self {
        self.min_font_size = size;
        self
    }

    pub fn with_font_size_step(mut self, step: f32) -> Self {
        self.font_size_step = step;
        self
    }

    pub fn with_line_height(mut self, line_height: LineHeight) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_min_last_line_words(mut self, words: usize) -> Self {
        self.min_last_line_words = words;
        self
    }

    pub fn with_quote_scale(mut self, scale: f32) -> Self {
        self.quote_scale = scale;
        self
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Canvas dimensions as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn side_margin(&self) -> f32 {
        self.side_margin
    }

    pub fn bottom_margin(&self) -> f32 {
        self.bottom_margin
    }

    /// Widest a line may be before the breaker wraps.
    pub fn max_line_width(&self) -> f32 {
        self.width as f32 * self.max_line_width_ratio
    }

    /// Tallest the text block may be before the font shrinks.
    pub fn max_block_height(&self) -> f32 {
        self.height as f32 * self.max_block_height_ratio
    }

    pub fn max_line_count(&self) -> usize {
        self.max_line_count
    }

    /// Width between the side margins, used by justified lines.
    pub fn available_width(&self) -> f32 {
        self.width as f32 - 2.0 * self.side_margin
    }

    /// First candidate font size of the autofit search, in pixels.
    pub fn initial_font_size(&self) -> f32 {
        match self.initial_font_size {
            FontSizeBasis::Fixed(size) => size,
            FontSizeBasis::CanvasHeightRatio(ratio) => (self.height as f32 * ratio).floor(),
        }
    }

    /// Floor of the autofit search.
    pub fn min_font_size(&self) -> f32 {
        self.min_font_size
    }

    pub fn font_size_step(&self) -> f32 {
        self.font_size_step
    }

    /// Line height for a given font size.
    pub fn line_height(&self, font_size: f32) -> f32 {
        match self.line_height {
            LineHeight::Multiplier(multiplier) => font_size * multiplier,
            LineHeight::Padding(padding) => font_size + padding,
        }
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn min_last_line_words(&self) -> usize {
        self.min_last_line_words
    }

    pub fn quote_scale(&self) -> f32 {
        self.quote_scale
    }

    /// Checks that the constraints describe a usable canvas and a terminating search.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "canvas must not be empty, got {}x{}",
                self.width, self.height
            ));
        }
        if !(self.font_size_step > 0.0) {
            return Err(format!(
                "font_size_step must be positive, got {}",
                self.font_size_step
            ));
        }
        if !(self.min_font_size > 0.0) {
            return Err(format!(
                "min_font_size must be positive, got {}",
                self.min_font_size
            ));
        }
        if !(self.initial_font_size() > 0.0) {
            return Err(format!(
                "initial font size must be positive, got {}",
                self.initial_font_size()
            ));
        }
        if !(self.max_line_width_ratio > 0.0) || !(self.max_block_height_ratio > 0.0) {
            return Err("max_line_width_ratio and max_block_height_ratio must be positive".into());
        }
        if !(self.quote_scale > 0.0) {
            return Err(format!(
                "quote_scale must be positive, got {}",
                self.quote_scale
            ));
        }
        if self.max_line_count == 0 {
            return Err("max_line_count must be at least 1".into());
        }
        if !(self.line_height(self.min_font_size) > 0.0) {
            return Err("line height must be positive at the minimum font size".into());
        }
        if self.side_margin < 0.0 || self.available_width() <= 0.0 {
            return Err(format!(
                "side_margin {} leaves no room on a {} wide canvas",
                self.side_margin, self.width
            ));
        }
        Ok(())
    }
}

/// Which edge the scrim gradient starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrimAnchor {
    /// Top edge of the first headline line.
    TextTop,
    /// Bottom edge of the badge, or the text top when there is no badge.
    #[default]
    BadgeBottom,
}

/// Readability gradient settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrimConfig {
    anchor: ScrimAnchor,
    start_alpha: u8,
    max_alpha: u8,
    /// Values above 1 reach `max_alpha` before the canvas bottom.
    steepness: f32,
}

impl Default for ScrimConfig {
    fn default() -> Self {
        Self {
            anchor: ScrimAnchor::BadgeBottom,
            start_alpha: 0,
            max_alpha: 255,
            steepness: 1.5,
        }
    }
}

impl ScrimConfig {
    pub fn new(anchor: ScrimAnchor, start_alpha: u8, max_alpha: u8, steepness: f32) -> Self {
        Self {
            anchor,
            start_alpha,
            max_alpha,
            steepness,
        }
    }

    pub fn anchor(&self) -> ScrimAnchor {
        self.anchor
    }

    pub fn start_alpha(&self) -> u8 {
        self.start_alpha
    }

    pub fn max_alpha(&self) -> u8 {
        self.max_alpha
    }

    pub fn steepness(&self) -> f32 {
        self.steepness
    }

    /// Checks that the ramp darkens toward the canvas bottom.
    ///
    /// # Errors
    ///
    /// Returns a message when `start_alpha` exceeds `max_alpha` or the
    /// steepness is negative or not finite.
    pub fn validate(&self) -> Result<(), String> {
        if self.start_alpha > self.max_alpha {
            return Err(format!(
                "scrim start_alpha {} exceeds max_alpha {}",
                self.start_alpha, self.max_alpha
            ));
        }
        if !(self.steepness.is_finite() && self.steepness >= 0.0) {
            return Err(format!(
                "scrim steepness must be finite and non-negative, got {}",
                self.steepness
            ));
        }
        Ok(())
    }
}

/// Label badge geometry and colors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BadgeStyle {
    /// Box height as a fraction of the headline font size.
    height_ratio: f32,
    /// Label font size as a fraction of the box height.
    label_scale: f32,
    /// Horizontal padding on each side of the label.
    padding_x: f32,
    /// Vertical space between the badge and the first headline line.
    gap: f32,
    fill_color: String,
    text_color: String,
    /// Thickness of the rule under the label; no rule when unset.
    underline: Option<f32>,
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            height_ratio: 0.8,
            label_scale: 0.75,
            padding_x: 24.0,
            gap: 12.0,
            fill_color: "#FF3C3C".to_string(),
            text_color: "white".to_string(),
            underline: None,
        }
    }
}

impl BadgeStyle {
    pub fn with_underline(mut self, thickness: Option<f32>) -> Self {
        self.underline = thickness;
        self
    }

    pub fn with_padding_x(mut self, padding: f32) -> Self {
        self.padding_x = padding;
        self
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn height_ratio(&self) -> f32 {
        self.height_ratio
    }

    pub fn label_scale(&self) -> f32 {
        self.label_scale
    }

    pub fn padding_x(&self) -> f32 {
        self.padding_x
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn underline(&self) -> Option<f32> {
        self.underline
    }
}

/// Canvas corner for the watermark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Watermark placement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    corner: Corner,
    /// Longest watermark side as a fraction of the canvas width.
    relative_size: f32,
    margin: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            corner: Corner::TopRight,
            relative_size: 0.23,
            margin: 0.0,
        }
    }
}

impl WatermarkStyle {
    pub fn new(corner: Corner, relative_size: f32, margin: f32) -> Self {
        Self {
            corner,
            relative_size,
            margin,
        }
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn relative_size(&self) -> f32 {
        self.relative_size
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }
}

/// Unsharp mask applied to the finished card. A `sigma` of zero disables it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SharpenConfig {
    pub sigma: f32,
    pub threshold: i32,
}

/// Visual styling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Upper-case the headline before parsing.
    uppercase: bool,
    base_color: String,
    accent_color: String,
    outline_color: String,
    /// Pixel offsets of the outline pass drawn under every word.
    outline_offsets: Vec<[i32; 2]>,
    badge: BadgeStyle,
    scrim: ScrimConfig,
    watermark: WatermarkStyle,
    sharpen: Option<SharpenConfig>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            uppercase: true,
            base_color: "white".to_string(),
            accent_color: "#FF3C3C".to_string(),
            outline_color: "black".to_string(),
            outline_offsets: vec![[0, 0], [2, 2], [-2, -2], [-2, 2], [2, -2]],
            badge: BadgeStyle::default(),
            scrim: ScrimConfig::default(),
            watermark: WatermarkStyle::default(),
            sharpen: Some(SharpenConfig {
                sigma: 1.0,
                threshold: 2,
            }),
        }
    }
}

impl StyleConfig {
    pub fn with_badge(mut self, badge: BadgeStyle) -> Self {
        self.badge = badge;
        self
    }

    pub fn with_scrim(mut self, scrim: ScrimConfig) -> Self {
        self.scrim = scrim;
        self
    }

    pub fn with_watermark(mut self, watermark: WatermarkStyle) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn with_sharpen(mut self, sharpen: Option<SharpenConfig>) -> Self {
        self.sharpen = sharpen;
        self
    }

    pub fn with_outline_offsets(mut self, offsets: Vec<[i32; 2]>) -> Self {
        self.outline_offsets = offsets;
        self
    }

    pub fn uppercase(&self) -> bool {
        self.uppercase
    }

    pub fn outline_offsets(&self) -> &[[i32; 2]] {
        &self.outline_offsets
    }

    pub fn badge(&self) -> &BadgeStyle {
        &self.badge
    }

    pub fn scrim(&self) -> &ScrimConfig {
        &self.scrim
    }

    pub fn watermark(&self) -> &WatermarkStyle {
        &self.watermark
    }

    pub fn sharpen(&self) -> Option<SharpenConfig> {
        self.sharpen
    }

    /// Parses every configured color into a [`Palette`].
    ///
    /// # Errors
    ///
    /// Returns an error if any configured color string cannot be parsed.
    pub fn palette(&self) -> Result<Palette, String> {
        let parse = |name: &str, value: &str| {
            Color::new(value).map_err(|err| format!("Invalid {name} in config: {err}"))
        };
        Ok(Palette {
            base: parse("base_color", &self.base_color)?,
            accent: parse("accent_color", &self.accent_color)?,
            outline: parse("outline_color", &self.outline_color)?,
            badge_fill: parse("badge.fill_color", &self.badge.fill_color)?,
            badge_text: parse("badge.text_color", &self.badge.text_color)?,
        })
    }
}

/// Resolved colors of a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub base: Color,
    pub accent: Color,
    pub outline: Color,
    pub badge_fill: Color,
    pub badge_text: Color,
}

impl Palette {
    /// Fill color of a headline word.
    pub fn word_color(&self, emphasized: bool) -> Color {
        if emphasized { self.accent } else { self.base }
    }
}

/// Font and watermark sources.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Font file; when unset the installed `font_family` is used.
    font: Option<PathBuf>,
    font_family: String,
    /// Watermark image; the layer is omitted when unset or unreadable.
    watermark: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_family: "sans-serif".to_string(),
            watermark: None,
        }
    }
}

impl AssetConfig {
    pub fn set_font(&mut self, font: Option<PathBuf>) {
        self.font = font;
    }

    pub fn set_watermark(&mut self, watermark: Option<PathBuf>) {
        self.watermark = watermark;
    }

    pub fn font(&self) -> Option<&Path> {
        self.font.as_deref()
    }

    pub fn watermark(&self) -> Option<&Path> {
        self.watermark.as_deref()
    }

    /// Where the headline font comes from.
    pub fn font_source(&self) -> FontSource {
        match &self.font {
            Some(path) => FontSource::File(path.clone()),
            None => FontSource::System(self.font_family.clone()),
        }
    }
}

/// Encoding options for the finished card.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { jpeg_quality: 88 }
    }
}

impl OutputConfig {
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}
