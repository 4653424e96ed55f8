//! CLI logic for the Newscard card renderer.
//!
//! This module contains the core CLI logic: loading configuration, reading
//! the base photo, rendering the card and writing it as a JPEG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};
use rand::Rng;

use newscard::{CardBuilder, NewscardError};

/// Length of generated output file names, without extension.
const OUTPUT_NAME_LEN: usize = 12;
const OUTPUT_NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Run the Newscard CLI application
///
/// Renders the headline over the base photo and writes the card as a JPEG.
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns `NewscardError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Undecodable or empty base photos
/// - Missing or unreadable fonts
/// - Encoding errors
pub fn run(args: &Args) -> Result<PathBuf, NewscardError> {
    info!(
        image_path = args.image.display().to_string(),
        label = args.label;
        "Rendering card"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(font) = &args.font {
        app_config.assets_mut().set_font(Some(font.clone()));
    }
    if let Some(watermark) = &args.watermark {
        app_config.assets_mut().set_watermark(Some(watermark.clone()));
    }
    let quality = args.quality.unwrap_or(app_config.output().jpeg_quality());

    let bytes = fs::read(&args.image)?;
    let base = newscard::decode_image(&bytes)?;

    let builder = CardBuilder::new(app_config)?;
    let card = builder.layout_and_composite(&args.headline, &base, &args.label)?;

    let mut encoded = Vec::new();
    newscard::encode_jpeg(&card, quality, &mut encoded)?;

    let output = match &args.output {
        Some(path) => {
            fs::write(path, &encoded)?;
            path.clone()
        }
        None => {
            let (path, mut file) = create_random_output(&args.output_dir)?;
            file.write_all(&encoded)?;
            path
        }
    };

    info!(output_file = output.display().to_string(), quality; "Card written");
    Ok(output)
}

/// A `<12 random lowercase letters and digits>.jpg` path inside `dir`.
fn random_output_path(dir: &Path) -> PathBuf {
    let mut rng = rand::rng();
    let name: String = (0..OUTPUT_NAME_LEN)
        .map(|_| char::from(OUTPUT_NAME_CHARSET[rng.random_range(0..OUTPUT_NAME_CHARSET.len())]))
        .collect();
    dir.join(format!("{name}.jpg"))
}

/// Creates a new, randomly named output file in `dir`.
///
/// The file is created atomically, so concurrent runs never share a name;
/// a taken name is regenerated.
fn create_random_output(dir: &Path) -> io::Result<(PathBuf, File)> {
    loop {
        let path = random_output_path(dir);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                debug!(path:?; "Created output file");
                return Ok((path, file));
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path:?; "Output file name taken, regenerating");
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_output_path_shape() {
        let path = random_output_path(Path::new("cards"));

        assert_eq!(path.parent(), Some(Path::new("cards")));
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("jpg"));

        let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap();
        assert_eq!(stem.len(), OUTPUT_NAME_LEN);
        assert!(
            stem.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_random_outputs_are_distinct_files() {
        let dir = tempfile::tempdir().unwrap();

        let (first, _) = create_random_output(dir.path()).unwrap();
        let (second, _) = create_random_output(dir.path()).unwrap();

        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_random_output_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let err = create_random_output(&missing).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
