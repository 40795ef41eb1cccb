//! Configuration loading and discovery for `shp.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::ShpConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory and its ancestors
pub const CONFIG_FILE_NAME: &str = "shp.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse shp.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override extraction output directory
    pub out: Option<PathBuf>,
    /// Override scale factor
    pub scale: Option<u8>,
    /// Force spritesheet output
    pub sheet: Option<bool>,
    /// Override spritesheet columns
    pub columns: Option<u32>,
    /// Override the packed container path
    pub pack_out: Option<PathBuf>,
    /// Override post-pack verification
    pub verify: Option<bool>,
}

/// Find shp.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for shp.toml
/// 2. Check XDG_CONFIG_HOME/shpkit/shp.toml (or ~/.config/shpkit/shp.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find shp.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("shpkit").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find shp.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a shp.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("mod/shp.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<ShpConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(ShpConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<ShpConfig, ConfigError> {
    log::debug!("loading config from {}", path.display());
    let contents = fs::read_to_string(path)?;
    let config: ShpConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut ShpConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.extract.out = Some(out.clone());
    }

    if let Some(scale) = overrides.scale {
        config.extract.scale = scale;
    }

    if let Some(sheet) = overrides.sheet {
        config.extract.sheet = sheet;
    }

    if let Some(columns) = overrides.columns {
        config.extract.columns = Some(columns);
    }

    if let Some(ref out) = overrides.pack_out {
        config.pack.out = Some(out.clone());
    }

    if let Some(verify) = overrides.verify {
        config.pack.verify = verify;
    }
}
