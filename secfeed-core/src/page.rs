use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::PageError;
use crate::feed::FeedEntry;

pub const CONTENT_SUBDIR: &str = "content/cve";
pub const PAGE_EXTENSION: &str = "md";

/// A feed entry reshaped for the static site: the advisory id split from its
/// trailing `(tag, tag)` list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub title: String,
    pub link: String,
    pub date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub summary: String,
}

impl PageRecord {
    pub fn from_entry(entry: &FeedEntry) -> Result<Self, PageError> {
        let (title, tags) = split_title(&entry.title)?;
        Ok(Self {
            title,
            link: entry.link.clone(),
            date: entry.published_at,
            tags,
            summary: entry.summary.clone(),
        })
    }

    pub fn file_name(&self) -> Result<String, PageError> {
        let stem = sanitize_file_stem(&self.title)
            .ok_or_else(|| PageError::InvalidFileName(self.title.clone()))?;
        Ok(format!("{stem}.{PAGE_EXTENSION}"))
    }

    /// Front matter followed by a link and the summary body.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("title: {}\n", yaml_quote(&self.title)));
        out.push_str(&format!(
            "date: {}\n",
            self.date.map(|d| d.to_rfc3339()).unwrap_or_default()
        ));
        out.push_str(&format!("cve: {}\n", self.link));
        out.push_str("tags:");
        for tag in &self.tags {
            out.push_str(&format!("\n  - {}", yaml_quote(tag)));
        }
        out.push_str("\ndraft: false\n---\n\n");
        out.push_str(&format!("<a href=\"{0}\">{0}</a>\n\n", self.link));
        out.push_str(&self.summary);
        out.push('\n');
        out
    }

    /// Writes the page under `<site_root>/content/cve/`, replacing any existing file.
    pub async fn write(&self, site_root: &Path) -> Result<PathBuf, PageError> {
        let dir = site_root.join(CONTENT_SUBDIR);
        let path = dir.join(self.file_name()?);
        let io_err = |source| PageError::Io {
            path: path.clone(),
            source,
        };
        tokio::fs::create_dir_all(&dir).await.map_err(io_err)?;
        tokio::fs::write(&path, self.render()).await.map_err(io_err)?;
        debug!(path = %path.display(), "page written");
        Ok(path)
    }
}

// a JSON string literal is also a valid YAML scalar
fn yaml_quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// Splits `"CVE-2024-9999 (Linux, Kernel)"` into the canonical title and its tags.
/// Only the first parenthesized group is read.
pub fn split_title(raw: &str) -> Result<(String, Vec<String>), PageError> {
    let (head, rest) = raw
        .split_once('(')
        .ok_or_else(|| PageError::MalformedTitle(raw.to_owned()))?;

    let group = rest.split('(').next().unwrap_or_default();
    let group = group.trim().trim_matches(|c| c == '(' || c == ')').trim();

    let tags = group
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    Ok((head.trim().to_owned(), tags))
}

fn sanitize_file_stem(title: &str) -> Option<String> {
    let stem: String = title
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_whitespace() || c.is_control() => '-',
            c => c,
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() || stem.chars().all(|c| c == '-') {
        None
    } else {
        Some(stem.to_owned())
    }
}
