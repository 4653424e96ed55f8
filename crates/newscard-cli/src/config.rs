//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use newscard::{NewscardError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for NewscardError {
    fn from(err: ConfigError) -> Self {
        NewscardError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (newscard/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, NewscardError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let found = search_paths().into_iter().find(|candidate| {
        let exists = candidate.exists();
        debug!(path = candidate.display().to_string(), exists; "Checked configuration path");
        exists
    });

    match found {
        Some(path) => {
            info!(path = path.display().to_string(); "Loading configuration");
            load_config_file(&path)
        }
        None => {
            debug!("No configuration file found, using default configuration");
            Ok(AppConfig::default())
        }
    }
}

/// Implicit configuration locations, most specific first.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("newscard/config.toml")];
    match ProjectDirs::from("com", "newscard", "newscard") {
        Some(dirs) => paths.push(dirs.config_dir().join("config.toml")),
        None => debug!("Could not determine platform-specific config directory"),
    }
    paths
}

/// Load configuration from a TOML file
///
/// Relative asset paths in the file are resolved against the file's
/// directory.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, NewscardError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let mut config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(base) = path.parent() {
        resolve_asset_paths(&mut config, base);
    }

    Ok(config)
}

fn resolve_asset_paths(config: &mut AppConfig, base: &Path) {
    let resolve = |path: &Path| {
        if path.is_relative() {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    };

    let assets = config.assets_mut();
    let font = assets.font().map(|path| resolve(path));
    let watermark = assets.watermark().map(|path| resolve(path));
    assets.set_font(font);
    assets.set_watermark(watermark);
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use newscard::config::Alignment;

    use super::*;

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let result = load_config(Some(dir.path().join("absent.toml")));
        assert!(matches!(result, Err(NewscardError::Config(message)) if message.contains("absent.toml")));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[canvas\nwidth = ").unwrap();

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(NewscardError::Config(message)) if message.contains("Failed to parse")));
    }

    #[test]
    fn test_loads_and_resolves_relative_assets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [canvas]
            alignment = "justified"

            [assets]
            font = "fonts/Anton-Regular.ttf"
            watermark = "/srv/logo.png"
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.canvas().alignment(), Alignment::Justified);
        assert_eq!(
            config.assets().font(),
            Some(dir.path().join("fonts/Anton-Regular.ttf").as_path())
        );
        assert_eq!(config.assets().watermark(), Some(Path::new("/srv/logo.png")));
    }

    #[test]
    fn test_search_paths_prefer_local_directory() {
        let paths = search_paths();
        assert_eq!(paths[0], PathBuf::from("newscard/config.toml"));
        assert!(paths.iter().skip(1).all(|path| path.ends_with("config.toml")));
    }
}
