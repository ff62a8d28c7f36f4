//! In-memory TTL cache for crawl results.
//!
//! Entries are keyed by search and expire after a fixed TTL. Reads treat
//! expired entries as absent; `sweep` removes them eagerly.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::models::{JobRecord, SearchSpec};
use crate::query::QueryBuilder;

/// TTL for the simple pipeline (30 minutes).
pub const SIMPLE_TTL: Duration = Duration::from_secs(30 * 60);
/// TTL for the batch pipeline (60 minutes).
pub const BATCH_TTL: Duration = Duration::from_secs(60 * 60);

/// How a search is turned into a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    /// The first-page search URL, so every filter participates.
    CanonicalUrl,
    /// `"{keyword}-{location}"`; filters do not participate.
    KeywordLocation,
}

impl CacheKey {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "canonical-url" | "url" => Some(Self::CanonicalUrl),
            "keyword-location" => Some(Self::KeywordLocation),
            _ => None,
        }
    }

    pub fn key_for(self, spec: &SearchSpec, query: &QueryBuilder) -> String {
        match self {
            Self::CanonicalUrl => query.canonical(spec),
            Self::KeywordLocation => format!("{}-{}", spec.keyword(), spec.location()),
        }
    }
}

struct CacheEntry {
    records: Vec<JobRecord>,
    complete: bool,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Shared result cache.
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Records for `key` if present, unexpired, and enough for `limit`.
    ///
    /// An entry from a crawl that stopped early only satisfies requests it
    /// holds enough records for. A `limit` of 0 asks for everything, so only
    /// complete entries qualify. Results are truncated to `limit`.
    pub fn get(&self, key: &str, limit: usize) -> Option<Vec<JobRecord>> {
        let now = Instant::now();
        let guard = self.entries.read().ok()?;
        let entry = guard.get(key).filter(|e| !e.is_expired(now))?;

        let satisfied = entry.complete || (limit > 0 && entry.records.len() >= limit);
        if !satisfied {
            return None;
        }

        let take = if limit == 0 {
            entry.records.len()
        } else {
            limit.min(entry.records.len())
        };
        Some(entry.records[..take].to_vec())
    }

    /// Store records under `key`, replacing any previous entry.
    pub fn set(&self, key: String, records: Vec<JobRecord>, complete: bool) {
        if let Ok(mut guard) = self.entries.write() {
            guard.insert(
                key,
                CacheEntry {
                    records,
                    complete,
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
    }

    /// Evict expired entries. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        match self.entries.write() {
            Ok(mut guard) => {
                let before = guard.len();
                guard.retain(|_, entry| !entry.is_expired(now));
                before - guard.len()
            }
            Err(_) => 0,
        }
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run `sweep` every `interval` until the returned handle is aborted.
pub fn spawn_sweeper(cache: Arc<ResultCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.sweep();
            if removed > 0 {
                debug!(removed, remaining = cache.len(), "Swept expired cache entries");
            }
        }
    })
}
