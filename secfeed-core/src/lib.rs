pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod filters;
pub mod page;
pub mod pipeline;
pub mod reconcile;
pub mod source;
pub mod template;

pub use cache::SnapshotCache;
pub use config::AppConfig;
pub use error::{AppError, CacheError, ConfigError, FeedError, FilterError, PageError, TemplateError};
pub use feed::{FeedEntry, FeedSnapshot, FetchedFeed};
pub use filters::FilterSet;
pub use page::PageRecord;
pub use pipeline::{generate_pages, run, write_digest, Mode, RunReport};
pub use reconcile::{merge, Reconciled, Reconciler};
pub use source::{parse_feed, FeedSource, FetchConfig, HttpFeedSource};
pub use template::OutputTemplate;
