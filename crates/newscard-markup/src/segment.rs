//! Parsed headline text units.

/// A run of headline text that is either entirely emphasized or entirely plain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    text: String,
    emphasized: bool,
}

impl Segment {
    pub fn new(text: impl Into<String>, emphasized: bool) -> Self {
        Self {
            text: text.into(),
            emphasized,
        }
    }

    /// Returns the segment text with delimiters removed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_emphasized(&self) -> bool {
        self.emphasized
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

/// A whitespace-delimited token carrying the emphasis of the segment it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    text: String,
    emphasized: bool,
}

impl Word {
    pub fn new(text: impl Into<String>, emphasized: bool) -> Self {
        Self {
            text: text.into(),
            emphasized,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_emphasized(&self) -> bool {
        self.emphasized
    }

    /// Appends text glued to this word across a segment boundary.
    pub(crate) fn extend(&mut self, text: &str, emphasized: bool) {
        self.text.push_str(text);
        self.emphasized |= emphasized;
    }
}
