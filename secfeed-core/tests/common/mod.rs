#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use secfeed_core::{AppConfig, FeedEntry, FeedError, FeedSource, FetchedFeed};
use tempfile::TempDir;
use url::Url;

/// Serves a fixed feed, or fails every fetch when built with [`StubSource::failing`].
pub struct StubSource {
    feed: Option<FetchedFeed>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn serving(titles: &[&str]) -> Self {
        Self {
            feed: Some(feed(titles)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            feed: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeedSource for StubSource {
    async fn fetch(&self, _url: &Url) -> Result<FetchedFeed, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.feed
            .clone()
            .ok_or_else(|| FeedError::Parse("upstream unavailable".into()))
    }
}

pub fn entry(title: &str) -> FeedEntry {
    let id = title.split_whitespace().next().unwrap_or(title).to_lowercase();
    FeedEntry {
        title: title.into(),
        link: format!("https://nvd.nist.gov/vuln/detail/{id}"),
        guid: None,
        summary: format!("Summary of {id}."),
        published_at: Some(Utc.with_ymd_and_hms(2024, 10, 21, 7, 28, 0).unwrap()),
        seen: false,
    }
}

pub fn feed(titles: &[&str]) -> FetchedFeed {
    FetchedFeed {
        title: "NVD".into(),
        link: "https://nvd.nist.gov/".into(),
        description: "Analyzed CVEs".into(),
        ttl_minutes: None,
        entries: titles.iter().map(|t| entry(t)).collect(),
    }
}

/// Temporary working tree with a filter directory, a cache directory and a site root.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new(filters: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("conf")).unwrap();
        for (name, content) in filters {
            std::fs::write(dir.path().join("conf").join(name), content).unwrap();
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            feed_url: "http://feed.test/rss.xml".into(),
            filter_dir: self.root().join("conf"),
            cache_dir: self.root().join("cache"),
            site_root: self.root().join("site"),
            output_format: "{{ .Title }}\n".into(),
            request_timeout_secs: 5,
            refresh_interval_mins: 0,
        }
    }

    pub fn cache_file(&self) -> PathBuf {
        self.root().join("cache").join("cache.json")
    }

    pub fn page(&self, name: &str) -> PathBuf {
        self.root().join("site/content/cve").join(name)
    }
}
