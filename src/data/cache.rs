//! Time-bounded memoization of loaded ratings tables.
//!
//! Tables are keyed by source-file identity (canonical path plus
//! modification time) and handed out as shared read-only `Arc`s.

use super::loader::{load_csv, LoadOptions, RatingsTable};
use crate::error::{DashboardError, DashboardResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    explode_genres: bool,
}

impl SourceKey {
    fn for_path(path: &Path, options: &LoadOptions) -> DashboardResult<Self> {
        let path = path
            .canonicalize()
            .map_err(|e| DashboardError::unavailable(path, e))?;
        let metadata =
            std::fs::metadata(&path).map_err(|e| DashboardError::unavailable(&path, e))?;

        Ok(Self {
            modified: metadata.modified().ok(),
            path,
            explode_genres: options.explode_genres,
        })
    }
}

struct CachedTable {
    table: Arc<RatingsTable>,
    loaded_at: Instant,
}

/// Load-once cache for ratings tables.
pub struct TableCache {
    ttl: Duration,
    entries: HashMap<SourceKey, CachedTable>,
}

impl TableCache {
    /// Create a cache whose entries expire `ttl` after loading.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Return the cached table for `path`, loading it if absent or expired.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> DashboardResult<Arc<RatingsTable>> {
        self.get_or_load_at(path, options, Instant::now())
    }

    fn get_or_load_at(
        &mut self,
        path: &Path,
        options: &LoadOptions,
        now: Instant,
    ) -> DashboardResult<Arc<RatingsTable>> {
        let key = SourceKey::for_path(path, options)?;

        if let Some(entry) = self.entries.get(&key) {
            let age = now.saturating_duration_since(entry.loaded_at);
            if age < self.ttl {
                debug!("Cache hit for {} (age {:.1}s)", key.path.display(), age.as_secs_f64());
                return Ok(Arc::clone(&entry.table));
            }
            debug!("Cache entry for {} expired", key.path.display());
        }

        let table = Arc::new(load_csv(&key.path, options)?);

        // Older versions of the same file can never be hit again.
        self.entries
            .retain(|k, _| k.path != key.path || k.modified == key.modified);
        info!("Cached ratings table from {}", key.path.display());
        self.entries.insert(
            key,
            CachedTable {
                table: Arc::clone(&table),
                loaded_at: now,
            },
        );

        Ok(table)
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
