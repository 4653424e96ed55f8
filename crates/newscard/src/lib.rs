//! Newscard - headline layout and compositing for news card images.
//!
//! A card is a photo with a headline laid out along its bottom edge, a small
//! label badge above the headline, a darkening scrim behind the text and a
//! watermark in one corner. Headlines use `**double asterisks**` to mark
//! emphasized words, which are drawn in the accent color.
//!
//! The pipeline is:
//!
//! 1. [`markup`] parses the headline into emphasis-tagged words,
//! 2. [`layout::break_lines`] finds the largest font size at which the words
//!    fit the canvas constraints,
//! 3. [`layout::compose()`] positions every word and the badge,
//! 4. [`scrim::generate_scrim`] builds the readability gradient,
//! 5. [`composite::Compositor`] draws everything onto the fitted photo.
//!
//! [`CardBuilder`] runs all of them.

pub mod composite;
pub mod config;
pub mod layout;
pub mod scrim;

mod error;

pub use newscard_core::{color, geometry, text};
pub use newscard_markup as markup;

pub use error::NewscardError;

use std::{io::Write, path::Path};

use image::{RgbImage, RgbaImage, buffer::ConvertBuffer, codecs::jpeg::JpegEncoder};
use log::{debug, info, trace, warn};

use text::{CosmicTypesetter, FontHandle, Typesetter};

use composite::Compositor;
use config::{AppConfig, Palette, ScrimAnchor};
use layout::{Composition, LayoutResult};
use scrim::AlphaRamp;

/// Layout of a single card, ready for compositing.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    layout: LayoutResult,
    composition: Composition,
    scrim: AlphaRamp,
    font: FontHandle,
}

impl CardLayout {
    /// Line structure and chosen font size.
    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    /// Word positions and badge.
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn scrim(&self) -> &AlphaRamp {
        &self.scrim
    }

    /// Font the card is set in, at the chosen headline size.
    pub fn font(&self) -> &FontHandle {
        &self.font
    }
}

/// Builder for laying out and compositing news cards.
///
/// A builder holds the validated configuration, the resolved palette, the
/// font engine and the decoded watermark, so it is created once and reused
/// for every card. It is `Send + Sync`; concurrent calls share no mutable
/// state besides the typesetter's internal caches.
///
/// # Examples
///
/// ```rust,no_run
/// use newscard::{CardBuilder, config::AppConfig};
///
/// let builder = CardBuilder::new(AppConfig::default()).expect("valid config");
///
/// let photo = image::open("photo.jpg").expect("photo").to_rgba8();
/// let card = builder
///     .layout_and_composite("BREAKING **NEWS** TODAY", &photo, "NEWS")
///     .expect("Failed to render card");
///
/// assert_eq!(card.dimensions(), (2160, 2700));
/// ```
pub struct CardBuilder<T = CosmicTypesetter> {
    config: AppConfig,
    palette: Palette,
    typesetter: T,
    watermark: Option<RgbaImage>,
}

impl CardBuilder<CosmicTypesetter> {
    /// Creates a builder that renders text with cosmic-text.
    ///
    /// # Errors
    ///
    /// Returns [`NewscardError::Config`] if the configuration is invalid.
    pub fn new(config: AppConfig) -> Result<Self, NewscardError> {
        Self::with_typesetter(config, CosmicTypesetter::new())
    }
}

impl<T: Typesetter> CardBuilder<T> {
    /// Creates a builder with a custom font engine.
    ///
    /// The configured watermark is loaded here. If it cannot be read the
    /// builder is still created and cards are composited without it.
    ///
    /// # Errors
    ///
    /// Returns [`NewscardError::Config`] if the canvas constraints or the
    /// scrim ramp are unusable, or a configured color cannot be parsed.
    pub fn with_typesetter(config: AppConfig, typesetter: T) -> Result<Self, NewscardError> {
        config.canvas().validate().map_err(NewscardError::Config)?;
        config.style().scrim().validate().map_err(NewscardError::Config)?;
        let palette = config.style().palette().map_err(NewscardError::Config)?;
        let watermark = config.assets().watermark().and_then(load_watermark);

        Ok(Self {
            config,
            palette,
            typesetter,
            watermark,
        })
    }

    /// Replaces the watermark image.
    pub fn with_watermark(mut self, watermark: Option<RgbaImage>) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Lays out a headline and its badge without touching any pixels.
    ///
    /// The headline is upper-cased first when the style asks for it.
    /// Malformed markup is kept as literal text, and a headline that does not
    /// fit even at the minimum font size is laid out at that size anyway
    /// (see [`LayoutResult::fitted`]). An empty `label_text` omits the badge.
    ///
    /// # Errors
    ///
    /// Returns [`NewscardError::Font`] if the configured font is missing or
    /// unreadable.
    pub fn layout(&self, headline_raw: &str, label_text: &str) -> Result<CardLayout, NewscardError> {
        let spec = self.config.canvas();
        let style = self.config.style();

        let font = self
            .typesetter
            .load_font(&self.config.assets().font_source(), spec.initial_font_size())?;

        let headline = if style.uppercase() {
            headline_raw.to_uppercase()
        } else {
            headline_raw.to_string()
        };
        let words = markup::parse_words(&headline);
        info!(words = words.len(), font = font.family(); "Laying out headline");

        let layout = layout::break_lines(&words, &font, &self.typesetter, spec);
        let composition = layout::compose(
            &layout,
            label_text.trim(),
            &self.typesetter,
            &font,
            spec,
            style.badge(),
        );

        let scrim_top = match style.scrim().anchor() {
            ScrimAnchor::TextTop => composition.text_top(),
            ScrimAnchor::BadgeBottom => composition
                .badge()
                .map_or(composition.text_top(), |badge| badge.bounds().max_y()),
        };
        let scrim = scrim::generate_scrim(scrim_top, spec.size(), style.scrim());
        trace!(scrim_top, rows = scrim.height(); "Generated scrim");

        debug!(
            font_size = layout.font_size(),
            lines = layout.lines().len(),
            fitted = layout.fitted();
            "Headline layout complete"
        );

        let font = font.with_size(layout.font_size());
        Ok(CardLayout {
            layout,
            composition,
            scrim,
            font,
        })
    }

    /// Draws a laid-out card over `base`.
    ///
    /// # Errors
    ///
    /// Returns [`NewscardError::MissingBaseImage`] if `base` is empty.
    pub fn composite(&self, card: &CardLayout, base: &RgbaImage) -> Result<RgbaImage, NewscardError> {
        let compositor = Compositor::new(
            &self.typesetter,
            self.config.canvas(),
            self.config.style(),
            &self.palette,
        );
        compositor.composite(
            base,
            card.scrim(),
            card.composition().badge(),
            card.composition().words(),
            card.font(),
            self.watermark.as_ref(),
        )
    }

    /// Lays out `headline_raw` and composites it over `base` in one call.
    ///
    /// Identical inputs produce identical images.
    ///
    /// # Errors
    ///
    /// Returns [`NewscardError::MissingBaseImage`] for an empty base image and
    /// [`NewscardError::Font`] if the font cannot be loaded.
    pub fn layout_and_composite(
        &self,
        headline_raw: &str,
        base: &RgbaImage,
        label_text: &str,
    ) -> Result<RgbaImage, NewscardError> {
        if base.width() == 0 || base.height() == 0 {
            return Err(NewscardError::MissingBaseImage {
                width: base.width(),
                height: base.height(),
            });
        }

        let card = self.layout(headline_raw, label_text)?;
        let image = self.composite(&card, base)?;
        info!(width = image.width(), height = image.height(); "Card composited");
        Ok(image)
    }
}

/// Decodes an image in any supported format into RGBA.
///
/// # Errors
///
/// Returns [`NewscardError::Decode`] if the bytes are not a readable image.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, NewscardError> {
    let image = image::load_from_memory(bytes).map_err(NewscardError::Decode)?;
    debug!(width = image.width(), height = image.height(); "Decoded image");
    Ok(image.to_rgba8())
}

/// Encodes a card as a baseline JPEG, dropping the alpha channel.
///
/// # Errors
///
/// Returns [`NewscardError::Encode`] if encoding or writing fails.
pub fn encode_jpeg<W: Write>(image: &RgbaImage, quality: u8, writer: W) -> Result<(), NewscardError> {
    let rgb: RgbImage = image.convert();
    let mut encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100));
    encoder.encode_image(&rgb).map_err(NewscardError::Encode)
}

fn load_watermark(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(image) => {
            debug!(path:?, width = image.width(), height = image.height(); "Loaded watermark");
            Some(image.to_rgba8())
        }
        Err(err) => {
            warn!(path:?, err:%; "Watermark unavailable, cards will be composited without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use newscard_core::text::FixedAdvanceTypesetter;

    use super::*;

    #[test]
    fn test_missing_watermark_degrades() {
        assert!(load_watermark(Path::new("/nonexistent/logo.png")).is_none());

        let mut config = AppConfig::default();
        config
            .assets_mut()
            .set_watermark(Some(PathBuf::from("/nonexistent/logo.png")));
        let builder = CardBuilder::with_typesetter(config, FixedAdvanceTypesetter::default());
        assert!(builder.is_ok());
    }

    #[test]
    fn test_encode_jpeg_writes_jfif() {
        let image = RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        encode_jpeg(&image, 88, &mut bytes).unwrap();

        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, NewscardError::Decode(_)));
    }
}
