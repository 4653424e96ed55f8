//! Error adapter for converting NewscardError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use newscard::NewscardError;

/// Adapter that renders a [`NewscardError`] through miette.
pub struct ErrorAdapter<'a>(pub &'a NewscardError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            NewscardError::Io(_) => "newscard::io",
            NewscardError::Decode(_) => "newscard::decode",
            NewscardError::MissingBaseImage { .. } => "newscard::base_image",
            NewscardError::Font(_) => "newscard::font",
            NewscardError::Config(_) => "newscard::config",
            NewscardError::Encode(_) => "newscard::encode",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            NewscardError::Decode(_) | NewscardError::MissingBaseImage { .. } => {
                "the base photo must be a non-empty PNG, JPEG, GIF, BMP or WebP image"
            }
            NewscardError::Font(_) => {
                "check `assets.font` in the configuration file or pass --font"
            }
            NewscardError::Config(_) => {
                "see the `[canvas]`, `[style]`, `[assets]` and `[output]` configuration sections"
            }
            NewscardError::Io(_) | NewscardError::Encode(_) => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
