use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::SnapshotCache;
use crate::error::AppError;
use crate::feed::{refresh_interval, FeedEntry, FeedSnapshot, FetchedFeed};
use crate::source::FeedSource;

/// Result of bringing the cached snapshot up to date.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub snapshot: FeedSnapshot,
    /// True when the snapshot was diffed against (or served from) a prior cache.
    pub was_cached: bool,
    /// Entries discovered by this run's update, in snapshot order.
    pub discovered: Vec<FeedEntry>,
}

pub struct Reconciler<'a, S> {
    source: &'a S,
    cache: &'a SnapshotCache,
    refresh: Duration,
}

impl<'a, S: FeedSource> Reconciler<'a, S> {
    pub fn new(source: &'a S, cache: &'a SnapshotCache, refresh: Duration) -> Self {
        Self {
            source,
            cache,
            refresh,
        }
    }

    /// Loads the cached snapshot and updates it from `url`, or fetches a fresh
    /// snapshot when there is no cache. With `tolerate_update_failure`, a failed
    /// update of an existing cache yields the stale snapshot instead of an error.
    pub async fn reconcile(
        &self,
        url: &Url,
        tolerate_update_failure: bool,
    ) -> Result<Reconciled, AppError> {
        let now = Utc::now();

        let Some(cached) = self.cache.load().await? else {
            info!(%url, "no cache found, fetching fresh feed");
            let fetched = self.source.fetch(url).await?;
            return Ok(Reconciled {
                snapshot: FeedSnapshot::from_fetched(fetched, now, self.refresh),
                was_cached: false,
                discovered: Vec::new(),
            });
        };

        if !cached.needs_refresh(now) {
            debug!(refresh_after = ?cached.refresh_after, "cached snapshot still fresh, skipping update");
            return Ok(Reconciled {
                snapshot: cached,
                was_cached: true,
                discovered: Vec::new(),
            });
        }

        match self.source.fetch(url).await {
            Ok(fetched) => {
                let (snapshot, discovered) = merge(cached, fetched, now, self.refresh);
                info!(
                    entries = snapshot.entries.len(),
                    new = discovered.len(),
                    "feed updated from cache"
                );
                Ok(Reconciled {
                    snapshot,
                    was_cached: true,
                    discovered,
                })
            }
            Err(err) if tolerate_update_failure => {
                warn!(error = %err, %url, "feed update failed, using stale cache");
                Ok(Reconciled {
                    snapshot: cached,
                    was_cached: true,
                    discovered: Vec::new(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Folds a fetched feed into a cached snapshot. Known entries keep their position
/// and seen flag; unknown ones are appended unseen and also returned.
pub fn merge(
    cached: FeedSnapshot,
    fetched: FetchedFeed,
    now: DateTime<Utc>,
    refresh: Duration,
) -> (FeedSnapshot, Vec<FeedEntry>) {
    let mut known: HashSet<String> = cached.entries.iter().map(FeedEntry::identity).collect();
    let mut entries = cached.entries;
    let mut discovered = Vec::new();

    for mut entry in fetched.entries {
        if known.insert(entry.identity()) {
            entry.seen = false;
            discovered.push(entry.clone());
            entries.push(entry);
        }
    }

    let mut snapshot = FeedSnapshot {
        title: fetched.title,
        link: fetched.link,
        description: fetched.description,
        fetched_at: Some(now),
        refresh_after: Some(now + refresh_interval(fetched.ttl_minutes, refresh)),
        entries,
        unseen: 0,
    };
    snapshot.recount();
    (snapshot, discovered)
}
