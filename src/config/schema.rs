//! Configuration schema types for `shp.toml`
//!
//! Defines the structure and validation rules for shpkit tool settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest integer scale accepted for PNG export
pub const MAX_SCALE: u8 = 16;

/// Frame extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Integer nearest-neighbor scale factor for exported PNGs
    #[serde(default = "default_scale")]
    pub scale: u8,
    /// Write one spritesheet instead of one PNG per frame
    #[serde(default)]
    pub sheet: bool,
    /// Spritesheet columns (all frames in one row when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    /// Output directory (next to the input when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { scale: default_scale(), sheet: false, columns: None, out: None }
    }
}

fn default_scale() -> u8 {
    1
}

/// Container packing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Container written when `pack` is run without `-o`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
    /// Reload the written container and compare every frame
    #[serde(default = "default_true")]
    pub verify: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self { out: None, verify: default_true() }
    }
}

fn default_true() -> bool {
    true
}

/// Root configuration structure for `shp.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShpConfig {
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub pack: PackConfig,
}

/// A single config validation failure
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "extract.scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shp.toml: '{}' {}", self.field, self.message)
    }
}

impl ShpConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.extract.scale == 0 || self.extract.scale > MAX_SCALE {
            errors.push(ConfigValidationError {
                field: "extract.scale".to_string(),
                message: format!("must be between 1 and {}", MAX_SCALE),
            });
        }

        if self.extract.columns == Some(0) {
            errors.push(ConfigValidationError {
                field: "extract.columns".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
