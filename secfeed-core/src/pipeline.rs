use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;
use url::Url;

use crate::config::AppConfig;
use crate::error::{AppError, FeedError, PageError};
use crate::feed::FeedEntry;
use crate::filters::FilterSet;
use crate::page::PageRecord;
use crate::reconcile::{Reconciled, Reconciler};
use crate::source::FeedSource;
use crate::template::OutputTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Digest of entries discovered since the previous run.
    New,
    /// Digest of every cached entry.
    All,
    /// One site page per matching entry.
    Generate,
}

impl Mode {
    /// Only the new-items digest depends on a fresh update.
    pub fn tolerates_update_failure(self) -> bool {
        !matches!(self, Mode::New)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::New => "new",
            Mode::All => "all",
            Mode::Generate => "generate",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub was_cached: bool,
    pub discovered: usize,
    pub candidates: usize,
    pub matched: usize,
    pub pages: Vec<PathBuf>,
}

/// Runs one invocation: load filters, reconcile the feed, persist the cache,
/// then render the matches for `mode`. Digest output goes to `out`.
pub async fn run<S, W>(
    mode: Mode,
    config: &AppConfig,
    source: &S,
    out: &mut W,
) -> Result<RunReport, AppError>
where
    S: FeedSource,
    W: Write,
{
    let template = match mode {
        Mode::Generate => None,
        Mode::New | Mode::All => Some(OutputTemplate::parse(&config.output_format)?),
    };

    let filters = FilterSet::load(&config.filter_dir)?;
    info!(count = filters.len(), dir = %config.filter_dir.display(), "filters loaded");

    let url = Url::parse(&config.feed_url).map_err(FeedError::from)?;
    let cache = config.cache();
    let Reconciled {
        mut snapshot,
        was_cached,
        discovered,
    } = Reconciler::new(source, &cache, config.refresh_interval())
        .reconcile(&url, mode.tolerates_update_failure())
        .await?;

    let candidates: Vec<FeedEntry> = match mode {
        Mode::New if was_cached => snapshot.unseen_entries().cloned().collect(),
        Mode::New => Vec::new(),
        Mode::All | Mode::Generate => snapshot.entries.clone(),
    };

    cache.save(&mut snapshot).await?;

    let matched = filters.select(&candidates);
    info!(%mode, candidates = candidates.len(), matched = matched.len(), "entries selected");

    let mut report = RunReport {
        was_cached,
        discovered: discovered.len(),
        candidates: candidates.len(),
        matched: matched.len(),
        pages: Vec::new(),
    };

    match template {
        Some(template) => write_digest(out, &template, matched)?,
        None => report.pages = generate_pages(&config.site_root, matched).await?,
    }

    Ok(report)
}

/// Renders each entry through `template`, in order.
pub fn write_digest<'a, W, I>(out: &mut W, template: &OutputTemplate, entries: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a FeedEntry>,
{
    for entry in entries {
        template.render_to(out, entry)?;
    }
    out.flush()
}

/// Writes one page per entry. The first failure stops the batch; pages written
/// before it stay on disk.
pub async fn generate_pages<'a, I>(site_root: &Path, entries: I) -> Result<Vec<PathBuf>, PageError>
where
    I: IntoIterator<Item = &'a FeedEntry>,
{
    let mut written = Vec::new();
    for entry in entries {
        let page = PageRecord::from_entry(entry)?;
        written.push(page.write(site_root).await?);
    }
    info!(count = written.len(), root = %site_root.display(), "pages generated");
    Ok(written)
}
