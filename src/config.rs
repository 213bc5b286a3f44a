//! Configuration file support
//!
//! Settings are read from TOML and merged with command-line overrides, the
//! command line taking precedence.
//!
//! Search order for [`Config::load`]:
//!
//! 1. `./bwcrop.toml`
//! 2. `<config dir>/bwcrop/config.toml` (e.g. `~/.config/bwcrop/config.toml`)
//!
//! ```toml
//! [search]
//! luminance_threshold = 75
//! percentage_threshold = 33
//! window_degrees = 1.0
//! step_degrees = 0.01
//! interpolation = "bilinear"
//!
//! [output]
//! suffix = "-cropped"
//! extension = "tiff"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::border::{DEFAULT_LUMINANCE_THRESHOLD, DEFAULT_PERCENTAGE_THRESHOLD};
use crate::pipeline::PipelineConfig;
use crate::rotate::Interpolation;
use crate::search::{SearchOptions, DEFAULT_STEP_DEGREES, DEFAULT_WINDOW_DEGREES};

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "bwcrop.toml";

/// Default suffix appended to the input stem
pub const DEFAULT_OUTPUT_SUFFIX: &str = "-cropped";

/// Default output extension (reference format)
pub const DEFAULT_OUTPUT_EXTENSION: &str = "tiff";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `[search]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub luminance_threshold: u32,
    pub percentage_threshold: u32,
    pub window_degrees: f64,
    pub step_degrees: f64,
    pub interpolation: Interpolation,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            luminance_threshold: DEFAULT_LUMINANCE_THRESHOLD,
            percentage_threshold: DEFAULT_PERCENTAGE_THRESHOLD,
            window_degrees: DEFAULT_WINDOW_DEGREES,
            step_degrees: DEFAULT_STEP_DEGREES,
            interpolation: Interpolation::default(),
        }
    }
}

/// `[output]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub suffix: String,
    pub extension: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchSection,
    pub output: OutputSection,
}

impl Config {
    /// Load from the first config file found, or defaults if there is none
    pub fn load() -> Result<Self, ConfigError> {
        match Self::search_paths().into_iter().find(|path| path.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Candidate config files in priority order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("bwcrop").join("config.toml"));
        }
        paths
    }

    /// Load from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Merge with command-line overrides (CLI wins)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> PipelineConfig {
        let search = SearchOptions::builder()
            .luminance_threshold(cli.luminance_threshold.unwrap_or(self.search.luminance_threshold))
            .percentage_threshold(
                cli.percentage_threshold
                    .unwrap_or(self.search.percentage_threshold),
            )
            .window_degrees(cli.window_degrees.unwrap_or(self.search.window_degrees))
            .step_degrees(cli.step_degrees.unwrap_or(self.search.step_degrees))
            .interpolation(cli.interpolation.unwrap_or(self.search.interpolation))
            .build();

        PipelineConfig {
            search,
            output_suffix: self.output.suffix.clone(),
            output_extension: self.output.extension.clone(),
        }
    }
}

/// Values explicitly given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub luminance_threshold: Option<u32>,
    pub percentage_threshold: Option<u32>,
    pub window_degrees: Option<f64>,
    pub step_degrees: Option<f64>,
    pub interpolation: Option<Interpolation>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}
