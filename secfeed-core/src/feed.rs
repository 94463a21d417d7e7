use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seen: bool,
}

impl FeedEntry {
    /// Key used to recognise the same advisory across runs.
    pub fn identity(&self) -> String {
        match self.guid.as_deref() {
            Some(guid) if !guid.trim().is_empty() => guid.to_owned(),
            _ => format!("{}\u{1f}{}", self.link, self.title),
        }
    }

    pub fn from_rss_item(item: &rss::Item) -> Self {
        let published_at = item
            .pub_date()
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            title: item.title().unwrap_or_default().trim().to_owned(),
            link: item.link().unwrap_or_default().trim().to_owned(),
            guid: item.guid().map(|guid| guid.value().to_owned()),
            summary: item.description().unwrap_or_default().to_owned(),
            published_at,
            seen: false,
        }
    }

    pub fn from_atom_entry(entry: &atom_syndication::Entry) -> Self {
        let link = entry
            .links()
            .iter()
            .find(|link| link.rel() == "alternate")
            .or_else(|| entry.links().first())
            .map(|link| link.href().to_owned())
            .unwrap_or_default();

        let summary = entry
            .summary()
            .map(|text| text.as_str().to_owned())
            .or_else(|| {
                entry
                    .content()
                    .and_then(|content| content.value())
                    .map(ToOwned::to_owned)
            })
            .unwrap_or_default();

        let published_at = entry
            .published()
            .copied()
            .unwrap_or_else(|| *entry.updated())
            .with_timezone(&Utc);

        Self {
            title: entry.title().as_str().trim().to_owned(),
            link,
            guid: Some(entry.id().to_owned()).filter(|id| !id.is_empty()),
            summary,
            published_at: Some(published_at),
            seen: false,
        }
    }
}

/// A feed as returned by a [`FeedSource`](crate::source::FeedSource), before it is
/// reconciled against any cached state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub ttl_minutes: Option<u32>,
    pub entries: Vec<FeedEntry>,
}

/// Full feed state as persisted in the cache file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub refresh_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entries: Vec<FeedEntry>,
    #[serde(default)]
    pub unseen: usize,
}

impl FeedSnapshot {
    /// Builds a snapshot straight from a fetch. Entries stay unseen; they only
    /// count as new when diffed against an earlier snapshot.
    pub fn from_fetched(fetched: FetchedFeed, now: DateTime<Utc>, refresh: Duration) -> Self {
        let mut snapshot = Self {
            title: fetched.title,
            link: fetched.link,
            description: fetched.description,
            fetched_at: Some(now),
            refresh_after: Some(now + refresh_interval(fetched.ttl_minutes, refresh)),
            entries: fetched.entries,
            unseen: 0,
        };
        snapshot.recount();
        snapshot
    }

    pub fn recount(&mut self) {
        self.unseen = self.entries.iter().filter(|entry| !entry.seen).count();
    }

    pub fn unseen_entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter().filter(|entry| !entry.seen)
    }

    /// Marks every entry seen and zeroes the unseen counter.
    pub fn mark_consumed(&mut self) {
        for entry in &mut self.entries {
            entry.seen = true;
        }
        self.unseen = 0;
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.refresh_after.map_or(true, |after| after <= now)
    }
}

pub(crate) fn refresh_interval(ttl_minutes: Option<u32>, default: Duration) -> Duration {
    match ttl_minutes {
        Some(ttl) if ttl > 0 => Duration::minutes(i64::from(ttl)),
        _ => default,
    }
}
