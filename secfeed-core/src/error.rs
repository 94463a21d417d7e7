use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid feed url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("feed parsing error: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file {path} is not a valid snapshot: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("failed to walk filter directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to read filter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file {} is empty", .path.display())]
    EmptyFilterFile { path: PathBuf },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),
    #[error("empty placeholder at byte {0}")]
    Empty(usize),
    #[error("unknown template field `{0}` (expected title, date, summary or link)")]
    UnknownField(String),
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("title `{0}` has no parenthesized tag list")]
    MalformedTitle(String),
    #[error("title `{0}` does not produce a usable file name")]
    InvalidFileName(String),
    #[error("failed to write page {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load filters: {0}")]
    Filters(#[from] FilterError),
    #[error("invalid output template: {0}")]
    Template(#[from] TemplateError),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("failed to cache feed: {0}")]
    Cache(#[from] CacheError),
    #[error("page generation failed: {0}")]
    Page(#[from] PageError),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
