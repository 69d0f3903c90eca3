// ⚙️ Pipeline configuration
// Optional TOML file; every field has a default.
//
//   group_size = { exactly = 2 }      # or { at_least = 1 }
//   database = "dwellings.db"
//   log_filter = "dwelling_etl=info"

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dwelling::GroupSizePolicy;

pub const DEFAULT_DATABASE: &str = "dwellings.db";
pub const DEFAULT_LOG_FILTER: &str = "dwelling_etl=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub group_size: GroupSizePolicy,
    pub database: PathBuf,
    pub log_filter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            group_size: GroupSizePolicy::default(),
            database: PathBuf::from(DEFAULT_DATABASE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse pipeline config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Defaults when no file is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
