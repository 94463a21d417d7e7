use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secfeed_core::{AppConfig, ConfigError, Mode};

#[derive(Debug, Parser)]
#[command(
    name = "sec-feed",
    version,
    about = "A cli checker utility for generating vulnerability feeds."
)]
pub struct Cli {
    /// JSON config file; flags and environment variables override its values
    #[arg(long, global = true, env = "SEC_FEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// the url source feed
    #[arg(long, global = true, env = "SEC_FEED_URL")]
    pub url: Option<String>,

    /// the directory path to source filters from
    #[arg(long, global = true, env = "SEC_FEED_FILTER_PATH")]
    pub filter_path: Option<PathBuf>,

    /// the directory path to store all cache files
    #[arg(long, global = true, env = "SEC_FEED_CACHE_PATH")]
    pub cache_path: Option<PathBuf>,

    /// the directory path to the hugo root
    #[arg(long, global = true, env = "SEC_FEED_SITE_PATH")]
    pub site_path: Option<PathBuf>,

    /// a formatting string for the resulting output data
    #[arg(long, global = true, env = "SEC_FEED_OUTPUT_FORMAT")]
    pub format: Option<String>,

    /// request timeout in seconds
    #[arg(long, global = true, env = "SEC_FEED_TIMEOUT")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print matching entries published since the last run
    New,
    /// Print every matching entry in the feed
    All,
    /// Write one site page per matching entry
    Generate,
}

impl From<Command> for Mode {
    fn from(command: Command) -> Self {
        match command {
            Command::New => Mode::New,
            Command::All => Mode::All,
            Command::Generate => Mode::Generate,
        }
    }
}

impl Cli {
    /// Defaults, then the config file, then environment and flags.
    pub fn app_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(url) = &self.url {
            config.feed_url = url.clone();
        }
        if let Some(dir) = &self.filter_path {
            config.filter_dir = dir.clone();
        }
        if let Some(dir) = &self.cache_path {
            config.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.site_path {
            config.site_root = dir.clone();
        }
        if let Some(format) = &self.format {
            config.output_format = format.clone();
        }
        if let Some(secs) = self.timeout {
            config.request_timeout_secs = secs;
        }
        Ok(config)
    }
}
