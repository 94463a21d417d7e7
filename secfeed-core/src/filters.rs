use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::FilterError;
use crate::feed::FeedEntry;

/// Filter strings keyed by the base name of the file they were read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: BTreeMap<String, String>,
}

impl FilterSet {
    /// Walks `dir` recursively and reads the first non-blank line of every
    /// regular file. Stops at the first unreadable or blank file.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, FilterError> {
        let mut filters = BTreeMap::new();

        for dent in WalkDir::new(dir.as_ref()).sort_by_file_name() {
            let dent = dent?;
            if !dent.file_type().is_file() {
                continue;
            }
            let filter = first_non_blank_line(dent.path())?;
            let name = dent.file_name().to_string_lossy().into_owned();
            debug!(file = %dent.path().display(), %filter, "loaded filter");
            filters.insert(name, filter);
        }

        Ok(Self { filters })
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when any filter is a case-sensitive substring of `title`.
    pub fn matches(&self, title: &str) -> bool {
        self.filters.values().any(|filter| title.contains(filter.as_str()))
    }

    /// Keeps the entries whose title matches at least one filter, in input order.
    pub fn select<'a, I>(&self, entries: I) -> Vec<&'a FeedEntry>
    where
        I: IntoIterator<Item = &'a FeedEntry>,
    {
        entries
            .into_iter()
            .filter(|entry| self.matches(&entry.title))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            filters: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn first_non_blank_line(path: &Path) -> Result<String, FilterError> {
    let io_err = |source| FilterError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(io_err)? == 0 {
            break;
        }
        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        // filter files may use any encoding
        let line = String::from_utf8_lossy(raw);
        if !line.trim().is_empty() {
            return Ok(line.into_owned());
        }
    }
    Err(FilterError::EmptyFilterFile {
        path: path.to_path_buf(),
    })
}
