//! Engine configuration
//!
//! Read from a JSON file where every field is optional; anything left out
//! takes its default.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::projection::{ProjectionConfig, DEFAULT_OVERFLOW_LIMIT, DEFAULT_PERIOD_CAP};
use crate::schema::MissingFieldPolicy;
use crate::tables::DEFAULT_TABLES_PATH;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "fincalc.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding tier table CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSON file where saved calculations are kept
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Number of saved calculations retained
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Hard cap on projected periods
    #[serde(default = "default_projection_cap")]
    pub projection_cap: u32,

    #[serde(default)]
    pub missing_field_policy: MissingFieldPolicy,
}

fn default_data_dir() -> PathBuf { PathBuf::from(DEFAULT_TABLES_PATH) }
fn default_history_path() -> PathBuf { PathBuf::from("fincalc_history.json") }
fn default_history_limit() -> usize { 10 }
fn default_projection_cap() -> u32 { DEFAULT_PERIOD_CAP }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_path: default_history_path(),
            history_limit: default_history_limit(),
            projection_cap: default_projection_cap(),
            missing_field_policy: MissingFieldPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load from `path`, or the defaults when the file does not exist
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn projection(&self) -> ProjectionConfig {
        ProjectionConfig {
            period_cap: self.projection_cap,
            overflow_limit: DEFAULT_OVERFLOW_LIMIT,
        }
    }
}
