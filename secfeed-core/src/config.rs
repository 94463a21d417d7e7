use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::SnapshotCache;
use crate::error::ConfigError;
use crate::source::FetchConfig;
use crate::template::DEFAULT_OUTPUT_FORMAT;

pub const DEFAULT_FEED_URL: &str = "https://nvd.nist.gov/feeds/xml/cve/misc/nvd-rss-analyzed.xml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed_url: String,
    pub filter_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub site_root: PathBuf,
    pub output_format: String,
    pub request_timeout_secs: u64,
    pub refresh_interval_mins: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_owned(),
            filter_dir: PathBuf::from("conf"),
            cache_dir: PathBuf::from(".sec-feed"),
            site_root: PathBuf::from("site"),
            output_format: DEFAULT_OUTPUT_FORMAT.to_owned(),
            request_timeout_secs: 30,
            refresh_interval_mins: 10,
        }
    }
}

impl AppConfig {
    /// Loads a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn cache(&self) -> SnapshotCache {
        SnapshotCache::in_dir(&self.cache_dir)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..FetchConfig::default()
        }
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.refresh_interval_mins))
    }
}
