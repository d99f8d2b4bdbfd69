use std::{fs, path::Path, path::PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filters::Filters;
use crate::locale::Locale;
use crate::utils;

pub const DEFAULT_FALLBACK_IMAGE: &str = "https://dummyimage.com/800x450/eaeaea/6b7280&text=Events";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_TIMEZONE: &str = "Etc/GMT+3";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unknown timezone {0:?}")]
    Timezone(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_url: Option<String>,
    pub fallback_image: String,
    /// IANA zone name used for offset-less dates and for "today".
    pub timezone: String,
    pub locale: Locale,
    pub request_timeout_secs: Option<u64>,
    pub output: Option<PathBuf>,
    pub filters: Filters,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_url: None,
            fallback_image: DEFAULT_FALLBACK_IMAGE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            locale: Locale::default(),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            output: None,
            filters: Filters::default(),
        }
    }
}

impl AppConfig {
    /// Reads `config.json` from the data directory; a missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&utils::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn zone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::Timezone(self.timezone.clone()))
    }
}
