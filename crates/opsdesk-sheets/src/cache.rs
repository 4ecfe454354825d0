//! TTL memoization keyed by sheet id.
//!
//! No eviction policy beyond expiry. Entries are swapped whole under one lock,
//! so a reader never sees a half-replaced sheet.

use opsdesk_core::Record;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::SheetSource;
use crate::error::SheetsError;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// A small read-through cache with per-lookup TTL.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value if it is younger than `ttl`.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| entry.value.clone())
    }

    pub fn put(&self, key: &str, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop one entry. Returns whether anything was cached under `key`.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key).is_some()
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`SheetSource`] behind a [`TtlCache`]. Failed reads are never cached.
pub struct CachedSheets {
    source: Arc<dyn SheetSource>,
    cache: TtlCache<Vec<Record>>,
}

impl CachedSheets {
    pub fn new(source: Arc<dyn SheetSource>) -> Self {
        Self {
            source,
            cache: TtlCache::new(),
        }
    }

    pub async fn fetch_sheet(&self, sheet_id: &str, ttl: Duration) -> Result<Vec<Record>, SheetsError> {
        if let Some(records) = self.cache.get(sheet_id, ttl) {
            tracing::trace!("cache hit for sheet {sheet_id}");
            return Ok(records);
        }
        let records = self.source.fetch_sheet(sheet_id).await?;
        self.cache.put(sheet_id, records.clone());
        Ok(records)
    }

    pub fn invalidate(&self, sheet_id: &str) {
        if self.cache.invalidate(sheet_id) {
            tracing::debug!("🧹 Cache entry dropped for sheet {sheet_id}");
        }
    }

    /// Forced refresh: the next read of every sheet goes to the store.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
        tracing::debug!("🧹 Sheet cache cleared");
    }

    pub fn cached_sheets(&self) -> usize {
        self.cache.len()
    }
}
