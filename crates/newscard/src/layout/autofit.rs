//! Autofit line breaking.
//!
//! The breaker walks a descending sequence of candidate font sizes, from the
//! canvas's initial size down to its floor, and greedily packs the words into
//! lines at each size. The first size whose layout satisfies every
//! constraint wins:
//!
//! - the block height is at most `max_block_height`,
//! - there are at most `max_line_count` lines,
//! - no line is wider than `max_line_width`.
//!
//! When nothing fits, the layout at the floor size is returned with
//! [`LayoutResult::fitted`] set to `false`. A single word wider than the
//! line limit always gets a line of its own and is never split.
//!
//! Words containing curly quotes are measured at the candidate size times
//! [`CanvasSpec::quote_scale`], re-derived on every step. Line height and
//! spacing follow the candidate size alone.

use std::iter;

use log::{debug, trace, warn};

use newscard_core::text::{FontHandle, TextMeasurer};
use newscard_markup::Word;

use super::{LayoutResult, Line, MeasuredWord, is_quoted};
use crate::config::CanvasSpec;

/// Finds the largest candidate font size at which `words` fit the spec.
///
/// `font` selects the family; its size is ignored. The result depends only on
/// the inputs and the measurer, so repeated calls produce identical layouts.
pub fn break_lines(
    words: &[Word],
    font: &FontHandle,
    measurer: &dyn TextMeasurer,
    spec: &CanvasSpec,
) -> LayoutResult {
    let mut best_effort = None;

    for font_size in candidate_sizes(spec) {
        let attempt = layout_at(words, &font.with_size(font_size), measurer, spec);
        trace!(
            font_size,
            lines = attempt.lines().len(),
            block_height = attempt.block_height(),
            fitted = attempt.fitted();
            "Autofit attempt"
        );
        if attempt.fitted() {
            debug!(
                font_size,
                lines = attempt.lines().len(),
                words = words.len();
                "Headline fitted"
            );
            return attempt;
        }
        best_effort = Some(attempt);
    }

    let result = best_effort.unwrap_or_else(|| {
        layout_at(
            words,
            &font.with_size(spec.min_font_size()),
            measurer,
            spec,
        )
    });
    warn!(
        font_size = result.font_size(),
        lines = result.lines().len(),
        block_height = result.block_height();
        "Headline does not fit at the minimum font size, using best effort layout"
    );
    result
}

/// Candidate font sizes in search order: the initial size, then repeatedly
/// one step smaller, clamped so the floor itself is always tried last.
pub(crate) fn candidate_sizes(spec: &CanvasSpec) -> impl Iterator<Item = f32> + use<> {
    let floor = spec.min_font_size();
    let step = spec.font_size_step();
    let first = spec.initial_font_size().max(floor);

    iter::successors(Some(first), move |&size| {
        let next = (size - step).max(floor);
        (next < size).then_some(next)
    })
}

/// Lays out `words` at exactly `font`'s size and checks the constraints.
pub(crate) fn layout_at(
    words: &[Word],
    font: &FontHandle,
    measurer: &dyn TextMeasurer,
    spec: &CanvasSpec,
) -> LayoutResult {
    let max_width = spec.max_line_width();
    let mut lines = pack(words, font, measurer, max_width, spec.quote_scale());
    balance_last_line(&mut lines, spec.min_last_line_words(), max_width);

    let mut result = LayoutResult::new(font.size(), lines, spec.line_height(font.size()), false);
    result.fitted = satisfies(&result, spec);
    result
}

/// Greedy first-fit packing. Always yields at least one line; the only
/// possible empty line is the single line of an empty word list.
fn pack(
    words: &[Word],
    font: &FontHandle,
    measurer: &dyn TextMeasurer,
    max_width: f32,
    quote_scale: f32,
) -> Vec<Line> {
    let space_width = measurer.measure(" ", font).width;
    let quote_font = font.with_size(font.size() * quote_scale);
    let mut lines = Vec::new();
    let mut current = Line::new(space_width);

    for word in words {
        let word_font = if is_quoted(word.text()) { &quote_font } else { font };
        let width = measurer.measure(word.text(), word_font).width;
        if !current.is_empty() && current.width_with(width) > max_width {
            lines.push(std::mem::replace(&mut current, Line::new(space_width)));
        }
        current.push(MeasuredWord::new(word.clone(), width, word_font.size()));
    }
    lines.push(current);

    lines
}

/// Moves words from the second-to-last line down until the last line holds
/// `min_words` words, as long as the last line still fits and the previous
/// line keeps at least one word.
fn balance_last_line(lines: &mut [Line], min_words: usize, max_width: f32) {
    let [.., previous, last] = lines else {
        return;
    };

    while last.len() < min_words && previous.len() > 1 {
        let Some(word) = previous.pop() else {
            break;
        };
        last.push_front(word);
        if last.width() > max_width {
            if let Some(word) = last.pop_front() {
                previous.push(word);
            }
            break;
        }
    }
}

fn satisfies(result: &LayoutResult, spec: &CanvasSpec) -> bool {
    result.block_height() <= spec.max_block_height()
        && result.lines().len() <= spec.max_line_count()
        && result
            .lines()
            .iter()
            .all(|line| line.width() <= spec.max_line_width())
}
