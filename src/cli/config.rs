//! Configuration file
//!
//! ```json
//! {
//!   "store_path": "db/taxi.tripdb",
//!   "sources": ["data/"],
//!   "lookup_path": "data/taxi_zone_lookup.csv",
//!   "analysis_year": 2024
//! }
//! ```
//!
//! Only `sources` is required. `"analysis_year": null` keeps every row.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::executor::Store;
use crate::ingest::{IngestOptions, Ingestor};
use crate::observability::Event;

use super::errors::{CliError, CliResult};

const MIN_ANALYSIS_YEAR: i32 = 1900;
const MAX_ANALYSIS_YEAR: i32 = 2100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Store file (optional, default "db/taxi.tripdb")
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Parquet files or directories of them
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Zone lookup CSV (optional, default "data/taxi_zone_lookup.csv")
    #[serde(default = "default_lookup_path")]
    pub lookup_path: PathBuf,

    /// Pickup year to keep (optional, default 2024)
    #[serde(default = "default_analysis_year")]
    pub analysis_year: Option<i32>,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("db/taxi.tripdb")
}
fn default_lookup_path() -> PathBuf {
    PathBuf::from("data/taxi_zone_lookup.csv")
}
fn default_analysis_year() -> Option<i32> {
    Some(2024)
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        info!(
            event = %Event::ConfigLoaded,
            path = %path.display(),
            sources = config.sources.len() as u64,
            analysis_year = ?config.analysis_year,
        );
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.store_path.as_os_str().is_empty() {
            return Err(CliError::config_error("store_path must not be empty"));
        }

        if self.sources.is_empty() {
            return Err(CliError::config_error("sources must list at least one path"));
        }

        if let Some(year) = self.analysis_year {
            if !(MIN_ANALYSIS_YEAR..=MAX_ANALYSIS_YEAR).contains(&year) {
                return Err(CliError::config_error(format!(
                    "Invalid analysis_year: {}. Expected {}..={} or null.",
                    year, MIN_ANALYSIS_YEAR, MAX_ANALYSIS_YEAR
                )));
            }
        }

        Ok(())
    }

    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(
            &self.store_path,
            IngestOptions {
                analysis_year: self.analysis_year,
            },
        )
    }

    pub fn store(&self) -> Store {
        Store::new(&self.store_path)
    }
}
