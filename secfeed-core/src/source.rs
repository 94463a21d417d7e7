use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use reqwest::{redirect, Client, ClientBuilder};
use tracing::debug;
use url::Url;

use crate::error::FeedError;
use crate::feed::{FeedEntry, FetchedFeed};

/// Anything that can turn a feed URL into a parsed feed.
pub trait FeedSource {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedFeed, FeedError>> + Send;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("sec-feed/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(config: &FetchConfig) -> Result<Self, FeedError> {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::limited(5))
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &Url) -> Result<FetchedFeed, FeedError> {
        debug!(url = %url, "fetching feed");
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        parse_feed(&bytes)
    }
}

/// Parses an RSS 2.0 document, falling back to Atom.
pub fn parse_feed(body: &[u8]) -> Result<FetchedFeed, FeedError> {
    let rss_err = match rss::Channel::read_from(body) {
        Ok(channel) => return Ok(from_channel(&channel)),
        Err(err) => err,
    };
    match atom_syndication::Feed::read_from(body) {
        Ok(feed) => Ok(from_atom(&feed)),
        Err(atom_err) => Err(FeedError::Parse(format!(
            "not RSS ({rss_err}) and not Atom ({atom_err})"
        ))),
    }
}

fn from_channel(channel: &rss::Channel) -> FetchedFeed {
    let entries = channel
        .items()
        .iter()
        .map(|item| stamp(FeedEntry::from_rss_item(item)))
        .collect();

    FetchedFeed {
        title: channel.title().to_owned(),
        link: channel.link().to_owned(),
        description: channel.description().to_owned(),
        ttl_minutes: channel.ttl().and_then(|ttl| ttl.trim().parse().ok()),
        entries,
    }
}

fn from_atom(feed: &atom_syndication::Feed) -> FetchedFeed {
    let link = feed
        .links()
        .iter()
        .find(|link| link.rel() == "alternate")
        .or_else(|| feed.links().first())
        .map(|link| link.href().to_owned())
        .unwrap_or_default();

    FetchedFeed {
        title: feed.title().as_str().to_owned(),
        link,
        description: feed
            .subtitle()
            .map(|text| text.as_str().to_owned())
            .unwrap_or_default(),
        ttl_minutes: None,
        entries: feed.entries().iter().map(FeedEntry::from_atom_entry).collect(),
    }
}

fn stamp(mut entry: FeedEntry) -> FeedEntry {
    if entry.published_at.is_none() {
        entry.published_at = Some(Utc::now());
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>NVD</title>
    <link>https://nvd.nist.gov/</link>
    <description>Analyzed CVEs</description>
    <ttl>30</ttl>
    <item>
      <title>CVE-2024-0001 (Linux, Kernel)</title>
      <link>https://nvd.nist.gov/vuln/detail/CVE-2024-0001</link>
      <pubDate>Mon, 21 Oct 2024 07:28:00 GMT</pubDate>
      <description>Use after free.</description>
    </item>
    <item>
      <title>CVE-2024-0002 (OpenSSL)</title>
      <link>https://nvd.nist.gov/vuln/detail/CVE-2024-0002</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Advisories</title>
  <id>urn:advisories</id>
  <updated>2024-10-21T08:00:00Z</updated>
  <link href="https://example.com/"/>
  <entry>
    <title>GHSA-1 (npm)</title>
    <id>urn:ghsa-1</id>
    <updated>2024-10-21T08:00:00Z</updated>
    <link href="https://example.com/ghsa-1"/>
    <summary>Prototype pollution.</summary>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_channel() {
        let feed = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(feed.title, "NVD");
        assert_eq!(feed.ttl_minutes, Some(30));
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title, "CVE-2024-0001 (Linux, Kernel)");
        assert_eq!(feed.entries[0].summary, "Use after free.");
        assert_eq!(
            feed.entries[0].published_at.unwrap().to_rfc3339(),
            "2024-10-21T07:28:00+00:00"
        );
        // undated items are stamped with the fetch time
        assert!(feed.entries[1].published_at.is_some());
        assert!(feed.entries.iter().all(|e| !e.seen));
    }

    #[test]
    fn falls_back_to_atom() {
        let feed = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(feed.title, "Advisories");
        assert_eq!(feed.link, "https://example.com/");
        assert_eq!(feed.entries.len(), 1);
        let entry = &feed.entries[0];
        assert_eq!(entry.link, "https://example.com/ghsa-1");
        assert_eq!(entry.guid.as_deref(), Some("urn:ghsa-1"));
        assert_eq!(entry.summary, "Prototype pollution.");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_feed(b"not a feed").unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
    }
}
