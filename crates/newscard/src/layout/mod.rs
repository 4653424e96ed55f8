//! Headline layout.
//!
//! Layout runs in two stages:
//!
//! 1. [`autofit::break_lines`] searches for the largest font size at which
//!    the words wrap into a block that satisfies the [`CanvasSpec`]
//!    constraints, producing a [`LayoutResult`].
//! 2. [`compose()`] turns the line structure into absolute word positions and
//!    places the label badge above the first line.
//!
//! [`CanvasSpec`]: crate::config::CanvasSpec

pub mod autofit;
pub mod compose;

pub use autofit::break_lines;
pub use compose::{Badge, Composition, PositionedWord, compose, text_top};

use newscard_markup::Word;

/// Curly quotation marks; words containing one are set at the quote size.
const QUOTE_MARKS: [char; 2] = ['\u{201C}', '\u{201D}'];

/// Whether `text` contains a curly quotation mark.
pub fn is_quoted(text: &str) -> bool {
    text.contains(QUOTE_MARKS)
}

/// A word with the font size it is set in and its advance width at that size.
///
/// The size equals the layout's font size except for quoted words, which are
/// scaled by [`CanvasSpec::quote_scale`](crate::config::CanvasSpec::quote_scale).
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredWord {
    word: Word,
    width: f32,
    font_size: f32,
}

impl MeasuredWord {
    pub fn new(word: Word, width: f32, font_size: f32) -> Self {
        Self {
            word,
            width,
            font_size,
        }
    }

    pub fn text(&self) -> &str {
        self.word.text()
    }

    pub fn is_emphasized(&self) -> bool {
        self.word.is_emphasized()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }
}

/// One line of the headline block.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    words: Vec<MeasuredWord>,
    space_width: f32,
}

impl Line {
    /// Creates an empty line whose words are separated by `space_width`.
    pub fn new(space_width: f32) -> Self {
        Self {
            words: Vec::new(),
            space_width,
        }
    }

    pub fn words(&self) -> &[MeasuredWord] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Width of a single inter-word space.
    pub fn space_width(&self) -> f32 {
        self.space_width
    }

    /// Sum of the word widths, without spacing.
    pub fn words_width(&self) -> f32 {
        self.words.iter().map(MeasuredWord::width).sum()
    }

    /// Number of inter-word gaps.
    pub fn gap_count(&self) -> usize {
        self.words.len().saturating_sub(1)
    }

    /// Natural width: words joined by single spaces.
    pub fn width(&self) -> f32 {
        self.words_width() + self.gap_count() as f32 * self.space_width
    }

    /// Natural width after appending a word of `width`.
    pub fn width_with(&self, width: f32) -> f32 {
        if self.words.is_empty() {
            return width;
        }
        (self.words_width() + width) + (self.gap_count() + 1) as f32 * self.space_width
    }

    /// Line text with single spaces between words.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(MeasuredWord::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn push(&mut self, word: MeasuredWord) {
        self.words.push(word);
    }

    pub(crate) fn pop(&mut self) -> Option<MeasuredWord> {
        self.words.pop()
    }

    pub(crate) fn push_front(&mut self, word: MeasuredWord) {
        self.words.insert(0, word);
    }

    pub(crate) fn pop_front(&mut self) -> Option<MeasuredWord> {
        (!self.words.is_empty()).then(|| self.words.remove(0))
    }
}

/// Result of the autofit search.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    font_size: f32,
    lines: Vec<Line>,
    line_height: f32,
    block_height: f32,
    fitted: bool,
}

impl LayoutResult {
    /// Creates a layout; the block height is `lines.len() * line_height`.
    pub fn new(font_size: f32, lines: Vec<Line>, line_height: f32, fitted: bool) -> Self {
        let block_height = lines.len() as f32 * line_height;
        Self {
            font_size,
            lines,
            line_height,
            block_height,
            fitted,
        }
    }

    /// Font size in pixels shared by every line.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Lines in top-to-bottom order. Never empty; an empty headline yields a
    /// single empty line.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn block_height(&self) -> f32 {
        self.block_height
    }

    /// Whether every constraint held. `false` means the minimum font size was
    /// reached and the layout is a best effort.
    pub fn fitted(&self) -> bool {
        self.fitted
    }
}
