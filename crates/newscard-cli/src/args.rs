//! Command-line argument definitions for the Newscard CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments name the headline and base photo, choose where
//! the card is written, override assets from the configuration file, and
//! control logging verbosity.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the Newscard card renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Headline text; wrap words in **double asterisks** to emphasize them
    #[arg(help = "Headline text")]
    pub headline: String,

    /// Path to the base photo
    #[arg(short, long)]
    pub image: PathBuf,

    /// Path to the output JPEG file; a random name in `--output-dir` when unset
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for randomly named output files
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Badge label; an empty label omits the badge
    #[arg(short, long, default_value = "NEWS")]
    pub label: String,

    /// Font file overriding `assets.font` from the configuration
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Watermark image overriding `assets.watermark` from the configuration
    #[arg(long)]
    pub watermark: Option<PathBuf>,

    /// JPEG quality (1-100) overriding `output.jpeg_quality`
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
