//! Font handles and the text contracts consumed by the layout engine.
//!
//! The layout engine never touches a font file or a glyph directly. It talks
//! to three narrow traits instead:
//!
//! - [`TextMeasurer`] - pixel width and vertical metrics of a string
//! - [`GlyphRasterizer`] - per-pixel glyph coverage for a string
//! - [`FontProvider`] - resolves a [`FontSource`] into a [`FontHandle`]
//!
//! Two implementations are provided:
//!
//! - [`CosmicTypesetter`] - real shaping and rasterization through cosmic-text
//! - [`FixedAdvanceTypesetter`] - deterministic per-character advances with
//!   block glyphs, useful when no font is installed and in tests
//!
//! # Quick Start
//!
//! ```
//! # use newscard_core::text::{FixedAdvanceTypesetter, FontHandle, TextMeasurer};
//! let typesetter = FixedAdvanceTypesetter::default();
//! let font = FontHandle::new("Anton", 40.0);
//!
//! let metrics = typesetter.measure("NEWS", &font);
//! assert_eq!(metrics.width, 80.0);
//! ```

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use cosmic_text::{
    Attrs, Buffer, Color as GlyphColor, Family, FontSystem, Metrics, Shaping, SwashCache,
};
use log::{debug, info};
use thiserror::Error;

/// Ratio of line box height to font size used when shaping with cosmic-text.
const LINE_BOX_FACTOR: f32 = 1.2;

/// A font family bound to a pixel size.
///
/// Handles are cheap to clone and to rebind to another size, so the autofit
/// search can create one per candidate size without touching the font file
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct FontHandle {
    family: Arc<str>,
    size: f32,
}

impl FontHandle {
    /// Creates a handle for `family` at `size` pixels.
    pub fn new(family: impl Into<Arc<str>>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// Returns the font family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Returns the font size in pixels.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Returns the same family bound to another size.
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            family: Arc::clone(&self.family),
            size,
        }
    }
}

/// Measured extent of a string at a given font handle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width in pixels.
    pub width: f32,
    /// Distance from the top of the line box to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f32,
}

impl TextMetrics {
    /// Total height of the line box.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Measures text. Must be deterministic for identical `(text, font)` pairs.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontHandle) -> TextMetrics;
}

/// Produces glyph coverage for a string.
///
/// `plot` receives `(x, y, coverage)` relative to the top-left corner of the
/// string's line box. Coverage is 0..=255. Pixels may be reported more than
/// once when glyphs overlap.
pub trait GlyphRasterizer: TextMeasurer {
    fn rasterize(&self, text: &str, font: &FontHandle, plot: &mut dyn FnMut(i32, i32, u8));
}

/// Where a font comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A TrueType/OpenType file on disk.
    File(PathBuf),
    /// An installed font family, or one of the generic names
    /// `sans-serif`, `serif`, `monospace`.
    System(String),
}

/// Errors raised while resolving a font asset.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read font file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("no usable font face in {}", .0.display())]
    Unsupported(PathBuf),
}

/// Resolves font sources into handles.
pub trait FontProvider {
    /// Loads (or looks up) the font and binds it to `size` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`FontError`] when the font file is missing or unreadable.
    fn load_font(&self, source: &FontSource, size: f32) -> Result<FontHandle, FontError>;
}

/// Everything the card pipeline needs from a font engine.
pub trait Typesetter: GlyphRasterizer + FontProvider + Send + Sync {}

impl<T> Typesetter for T where T: GlyphRasterizer + FontProvider + Send + Sync {}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_font_file(path: &Path) -> Result<Vec<u8>, FontError> {
    fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => FontError::Missing(path.to_path_buf()),
        _ => FontError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Typesetter backed by cosmic-text.
///
/// It maintains one reusable `FontSystem` and `SwashCache` to avoid expensive
/// recreation. Both sit behind mutexes so a single instance can be shared
/// by concurrent requests. Lock order is always font system, then cache.
pub struct CosmicTypesetter {
    font_system: Mutex<FontSystem>,
    swash_cache: Mutex<SwashCache>,
    /// Family names of font files already registered, keyed by path.
    registered: Mutex<HashMap<PathBuf, Arc<str>>>,
}

impl Default for CosmicTypesetter {
    fn default() -> Self {
        Self::new()
    }
}

impl CosmicTypesetter {
    /// Create a new typesetter with system font discovery.
    pub fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
            swash_cache: Mutex::new(SwashCache::new()),
            registered: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a font file once and returns its family name.
    fn register_file(&self, path: &Path) -> Result<Arc<str>, FontError> {
        let mut registered = lock(&self.registered);
        if let Some(family) = registered.get(path) {
            return Ok(Arc::clone(family));
        }

        let data = read_font_file(path)?;

        let mut font_system = lock(&self.font_system);
        let db = font_system.db_mut();
        let known_faces = db.len();
        db.load_font_data(data);

        let family: Arc<str> = db
            .faces()
            .skip(known_faces)
            .find_map(|face| face.families.first().map(|(name, _)| name.as_str()))
            .ok_or_else(|| FontError::Unsupported(path.to_path_buf()))?
            .into();

        info!(path = path.display().to_string(), family = &*family; "Registered font file");
        registered.insert(path.to_path_buf(), Arc::clone(&family));
        Ok(family)
    }

    /// Shapes `text` into a single unbounded line and hands the buffer to `f`.
    fn with_shaped<R>(
        &self,
        text: &str,
        font: &FontHandle,
        f: impl FnOnce(&mut FontSystem, &mut Buffer, Metrics) -> R,
    ) -> R {
        let mut font_system = lock(&self.font_system);

        let metrics = Metrics::new(font.size(), font.size() * LINE_BOX_FACTOR);
        let mut buffer = Buffer::new(&mut *font_system, metrics);
        {
            let mut buffer = buffer.borrow_with(&mut *font_system);
            let attrs = Attrs::new().family(family_for(font.family()));

            buffer.set_size(None, None);
            buffer.set_text(text, &attrs, Shaping::Advanced, None);
            buffer.shape_until_scroll(true);
        }

        f(&mut *font_system, &mut buffer, metrics)
    }
}

fn family_for(name: &str) -> Family<'_> {
    match name {
        "sans-serif" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        concrete => Family::Name(concrete),
    }
}

impl TextMeasurer for CosmicTypesetter {
    fn measure(&self, text: &str, font: &FontHandle) -> TextMetrics {
        let fallback_ascent = font.size() * LINE_BOX_FACTOR * 0.8;
        let fallback_descent = font.size() * LINE_BOX_FACTOR - fallback_ascent;
        if text.is_empty() {
            return TextMetrics {
                width: 0.0,
                ascent: fallback_ascent,
                descent: fallback_descent,
            };
        }

        self.with_shaped(text, font, |_, buffer, metrics| {
            let mut width: f32 = 0.0;
            let mut ascent: Option<f32> = None;

            for run in buffer.layout_runs() {
                if let Some(last) = run.glyphs.last() {
                    width = width.max(last.x + last.w);
                }
                ascent.get_or_insert(run.line_y - run.line_top);
            }

            match ascent {
                Some(ascent) => TextMetrics {
                    width,
                    ascent,
                    descent: metrics.line_height - ascent,
                },
                None => {
                    debug!(text; "No layout runs, estimating text width");
                    TextMetrics {
                        width: text.chars().count() as f32 * (font.size() * 0.55),
                        ascent: fallback_ascent,
                        descent: fallback_descent,
                    }
                }
            }
        })
    }
}

impl GlyphRasterizer for CosmicTypesetter {
    fn rasterize(&self, text: &str, font: &FontHandle, plot: &mut dyn FnMut(i32, i32, u8)) {
        if text.trim().is_empty() {
            return;
        }

        self.with_shaped(text, font, |font_system, buffer, _| {
            let mut swash_cache = lock(&self.swash_cache);
            let mut buffer = buffer.borrow_with(font_system);
            // White ink: only the alpha channel carries coverage.
            let ink = GlyphColor::rgb(0xFF, 0xFF, 0xFF);

            buffer.draw(&mut swash_cache, ink, |x, y, w, h, color| {
                let coverage = color.a();
                if coverage == 0 {
                    return;
                }
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        plot(x + dx, y + dy, coverage);
                    }
                }
            });
        });
    }
}

impl FontProvider for CosmicTypesetter {
    fn load_font(&self, source: &FontSource, size: f32) -> Result<FontHandle, FontError> {
        match source {
            FontSource::File(path) => Ok(FontHandle::new(self.register_file(path)?, size)),
            FontSource::System(family) => Ok(FontHandle::new(family.as_str(), size)),
        }
    }
}

/// Typesetter with a fixed advance per character and solid block glyphs.
///
/// Every non-whitespace character advances by `size * advance_ratio`, and
/// every whitespace character by `size * space_ratio`. Results depend only
/// on the character count, which makes layouts exactly predictable.
///
/// # Examples
///
/// ```
/// # use newscard_core::text::{FixedAdvanceTypesetter, FontHandle, TextMeasurer};
/// let typesetter = FixedAdvanceTypesetter::new(0.5, 0.25);
/// let font = FontHandle::new("block", 10.0);
/// assert_eq!(typesetter.measure("AB C", &font).width, 17.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceTypesetter {
    advance_ratio: f32,
    space_ratio: f32,
}

impl Default for FixedAdvanceTypesetter {
    fn default() -> Self {
        Self::new(0.5, 0.3)
    }
}

impl FixedAdvanceTypesetter {
    /// Creates a typesetter with the given advance ratios (relative to font size).
    pub fn new(advance_ratio: f32, space_ratio: f32) -> Self {
        Self {
            advance_ratio,
            space_ratio,
        }
    }

    fn advance(&self, c: char, size: f32) -> f32 {
        if c.is_whitespace() {
            size * self.space_ratio
        } else {
            size * self.advance_ratio
        }
    }
}

impl TextMeasurer for FixedAdvanceTypesetter {
    fn measure(&self, text: &str, font: &FontHandle) -> TextMetrics {
        let size = font.size();
        TextMetrics {
            width: text.chars().map(|c| self.advance(c, size)).sum(),
            ascent: size * 0.8,
            descent: size * 0.2,
        }
    }
}

impl GlyphRasterizer for FixedAdvanceTypesetter {
    fn rasterize(&self, text: &str, font: &FontHandle, plot: &mut dyn FnMut(i32, i32, u8)) {
        let size = font.size();
        let top = (size * 0.1).round() as i32;
        let bottom = (size * 0.8).round() as i32;
        let mut caret = 0.0f32;

        for c in text.chars() {
            let advance = self.advance(c, size);
            if !c.is_whitespace() {
                let left = (caret + advance * 0.1).round() as i32;
                let right = (caret + advance * 0.9).round() as i32;
                for y in top..bottom {
                    for x in left..right {
                        plot(x, y, u8::MAX);
                    }
                }
            }
            caret += advance;
        }
    }
}

impl FontProvider for FixedAdvanceTypesetter {
    fn load_font(&self, source: &FontSource, size: f32) -> Result<FontHandle, FontError> {
        match source {
            FontSource::File(path) => {
                read_font_file(path)?;
                let family = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .ok_or_else(|| FontError::Unsupported(path.clone()))?;
                Ok(FontHandle::new(family, size))
            }
            FontSource::System(family) => Ok(FontHandle::new(family.as_str(), size)),
        }
    }
}
