//! Emphasis markup parser for Newscard headlines.
//!
//! Headlines use a single piece of markup: text wrapped in a pair of double
//! asterisks is emphasized.
//!
//! ```text
//! BREAKING **NEWS** TODAY
//!          ^^^^^^^^ emphasized
//! ```
//!
//! Parsing happens in two steps:
//!
//! 1. [`parse`] splits the raw string into [`Segment`]s, each either
//!    emphasized or plain.
//! 2. [`tokenize`] splits segments on whitespace into [`Word`]s that carry
//!    their segment's emphasis.
//!
//! [`parse_words`] runs both. Parsing never fails: anything that is not a
//! well-formed `**...**` span is kept as literal text.
//!
//! # Example
//!
//! ```
//! use newscard_markup::{Segment, Word, parse, parse_words};
//!
//! let segments = parse("BREAKING **NEWS** TODAY");
//! assert_eq!(
//!     segments,
//!     vec![
//!         Segment::new("BREAKING ", false),
//!         Segment::new("NEWS", true),
//!         Segment::new(" TODAY", false),
//!     ]
//! );
//!
//! let words = parse_words("BREAKING **NEWS** TODAY");
//! assert_eq!(words[1], Word::new("NEWS", true));
//! ```

mod segment;

pub use segment::{Segment, Word};

use log::{trace, warn};
use winnow::{
    Parser as _,
    combinator::{alt, delimited, repeat},
    error::{ContextError, ErrMode},
    token::{literal, take_till},
};

/// Emphasis delimiter.
const DELIMITER: &str = "**";

type Input<'a> = &'a str;
type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// A lexical piece of the headline before adjacent plain pieces are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Emphasis(&'a str),
    Plain(&'a str),
}

/// `**body**` where the body is non-empty and contains no `*`.
fn emphasis<'a>(input: &mut Input<'a>) -> IResult<Piece<'a>> {
    delimited(
        literal(DELIMITER),
        take_till(1.., '*'),
        literal(DELIMITER),
    )
    .map(Piece::Emphasis)
    .parse_next(input)
}

/// Run of text up to the next `*`.
fn plain_run<'a>(input: &mut Input<'a>) -> IResult<Piece<'a>> {
    take_till(1.., '*').map(Piece::Plain).parse_next(input)
}

/// A `*` that does not open a well-formed emphasis span.
fn stray_star<'a>(input: &mut Input<'a>) -> IResult<Piece<'a>> {
    literal("*").map(Piece::Plain).parse_next(input)
}

fn piece<'a>(input: &mut Input<'a>) -> IResult<Piece<'a>> {
    alt((emphasis, plain_run, stray_star)).parse_next(input)
}

/// Splits a raw headline into emphasis-tagged segments.
///
/// Matched `**...**` spans become emphasized segments with the delimiters
/// removed. Everything else, unterminated or empty delimiters included, is
/// plain text. Adjacent plain text is merged, and no empty segment is ever
/// produced, so an empty input yields no segments.
pub fn parse(raw: &str) -> Vec<Segment> {
    let mut input: Input<'_> = raw;
    let parsed: IResult<Vec<Piece<'_>>> = repeat(0.., piece).parse_next(&mut input);

    let mut pieces = match parsed {
        Ok(pieces) => pieces,
        Err(err) => {
            warn!(err:?; "Markup parsing failed, treating headline as plain text");
            input = "";
            vec![Piece::Plain(raw)]
        }
    };
    if !input.is_empty() {
        warn!(rest = input; "Unparsed markup left over, keeping it as plain text");
        pieces.push(Piece::Plain(input));
    }

    let mut segments: Vec<Segment> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Emphasis(text) => segments.push(Segment::new(text, true)),
            Piece::Plain(text) => match segments.last_mut() {
                Some(last) if !last.is_emphasized() => last.push_str(text),
                _ => segments.push(Segment::new(text, false)),
            },
        }
    }

    trace!(segments:?; "Parsed headline markup");
    segments
}

/// Splits segments on whitespace into words.
///
/// Empty tokens produced by runs of whitespace are dropped. A token that
/// continues across a segment boundary without whitespace (for example
/// `SUPER**NOVA**`) stays a single word, emphasized if any part of it is.
pub fn tokenize(segments: &[Segment]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    // Whether the last word may still be extended by the next segment.
    let mut open = false;

    for segment in segments {
        let text = segment.text();
        let mut tokens = text.split_whitespace();

        if open && !text.starts_with(char::is_whitespace) {
            if let (Some(last), Some(first)) = (words.last_mut(), tokens.next()) {
                last.extend(first, segment.is_emphasized());
            }
        }

        words.extend(tokens.map(|token| Word::new(token, segment.is_emphasized())));
        open = text.chars().last().is_some_and(|c| !c.is_whitespace());
    }

    words
}

/// Parses markup and tokenizes it into words in one step.
pub fn parse_words(raw: &str) -> Vec<Word> {
    tokenize(&parse(raw))
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn headline_strategy() -> impl Strategy<Value = Vec<(String, bool, String)>> {
        prop::collection::vec(
            ("[A-Z0-9'?!.,]{1,10}", any::<bool>(), "[ \t]{1,3}"),
            0..12,
        )
    }

    fn render(parts: &[(String, bool, String)]) -> String {
        parts
            .iter()
            .map(|(text, emphasized, gap)| {
                if *emphasized {
                    format!("**{text}**{gap}")
                } else {
                    format!("{text}{gap}")
                }
            })
            .collect()
    }

    /// Joining the words with single spaces reproduces the headline with
    /// markers stripped and whitespace normalized.
    fn check_words_round_trip(parts: Vec<(String, bool, String)>) -> Result<(), TestCaseError> {
        let raw = render(&parts);
        let words = parse_words(&raw);

        let joined = words
            .iter()
            .map(|w| w.text())
            .collect::<Vec<_>>()
            .join(" ");
        let expected = parts
            .iter()
            .map(|(text, _, _)| text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(joined, expected);

        for (word, (_, emphasized, _)) in words.iter().zip(&parts) {
            prop_assert_eq!(word.is_emphasized(), *emphasized);
        }
        Ok(())
    }

    /// Segments never lose text other than the delimiters of matched pairs.
    fn check_segments_are_lossless(raw: String) -> Result<(), TestCaseError> {
        let segments = parse(&raw);
        let emphasized = segments.iter().filter(|s| s.is_emphasized()).count();
        let text_len: usize = segments.iter().map(|s| s.text().len()).sum();

        prop_assert_eq!(text_len + emphasized * 2 * DELIMITER.len(), raw.len());
        prop_assert!(segments.iter().all(|s| !s.text().is_empty()));
        Ok(())
    }

    proptest! {
        #[test]
        fn words_round_trip(parts in headline_strategy()) {
            check_words_round_trip(parts)?;
        }

        #[test]
        fn segments_are_lossless(raw in "[A-C *\t]{0,40}") {
            check_segments_are_lossless(raw)?;
        }
    }
}
