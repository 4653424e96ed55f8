//! Error types for Newscard operations.
//!
//! [`NewscardError`] covers every fatal condition of the card pipeline.
//! Markup problems are never errors (malformed markup is rendered as
//! literal text) and a missing watermark only degrades the output.

use std::io;

use thiserror::Error;

use newscard_core::text::FontError;

/// The main error type for Newscard operations.
#[derive(Debug, Error)]
pub enum NewscardError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to decode base image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Base image is empty ({width}x{height})")]
    MissingBaseImage { width: u32, height: u32 },

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to encode card: {0}")]
    Encode(#[source] image::ImageError),
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_font_error_converts() {
        let err: NewscardError = FontError::Missing(PathBuf::from("missing.ttf")).into();
        assert!(matches!(err, NewscardError::Font(_)));
        assert!(err.to_string().contains("missing.ttf"));
    }

    #[test]
    fn test_missing_base_image_message() {
        let err = NewscardError::MissingBaseImage {
            width: 0,
            height: 12,
        };
        assert_eq!(err.to_string(), "Base image is empty (0x12)");
    }
}
