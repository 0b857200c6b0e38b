use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executor::DEFAULT_MAX_RESULT_ROWS;
use crate::samples::DatabaseId;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime settings, read from a JSON file. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Queries producing more rows than this fail with an execution error.
    pub max_result_rows: usize,
    pub default_database: DatabaseId,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_result_rows: DEFAULT_MAX_RESULT_ROWS,
            default_database: DatabaseId::Salesman,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) if path.exists() => Config::load(path),
            Some(path) => {
                warn!("config {} not found, using defaults", path.display());
                Ok(Config::default())
            }
            None => Ok(Config::default()),
        }
    }
}
