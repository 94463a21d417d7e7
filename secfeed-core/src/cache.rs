use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::feed::FeedSnapshot;

pub const CACHE_FILE_NAME: &str = "cache.json";

/// JSON-backed store for the last known feed snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache living at `<dir>/cache.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CACHE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when no cache file exists yet.
    pub async fn load(&self) -> Result<Option<FeedSnapshot>, CacheError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cached snapshot");
                return Ok(None);
            }
            Err(source) => return Err(self.io_err(source)),
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(source) => {
                warn!(error = %source, path = %self.path.display(), "failed to parse cache, trying tmp fallback");
                match self.read_tmp().await {
                    Some(snapshot) => Ok(Some(snapshot)),
                    None => Err(CacheError::Json {
                        path: self.path.clone(),
                        source,
                    }),
                }
            }
        }
    }

    /// Last snapshot written but not yet renamed into place, if it parses.
    async fn read_tmp(&self) -> Option<FeedSnapshot> {
        let tmp = self.tmp_path();
        let bytes = tokio::fs::read(&tmp).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %err, path = %tmp.display(), "tmp cache is not a valid snapshot either");
                None
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Marks the snapshot fully consumed, then atomically replaces the cache file.
    pub async fn save(&self, snapshot: &mut FeedSnapshot) -> Result<(), CacheError> {
        snapshot.mark_consumed();
        let bytes = serde_json::to_vec_pretty(&*snapshot).map_err(|source| CacheError::Json {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_err(source))?;
        }

        let tmp = self.tmp_path();
        write_file(&tmp, &bytes).await.map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_err(source))?;

        debug!(path = %self.path.display(), entries = snapshot.entries.len(), "snapshot cached");
        Ok(())
    }

    fn io_err(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o644);
    let mut file = options.open(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
