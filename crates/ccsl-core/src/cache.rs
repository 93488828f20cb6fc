//! Segment result caching for the collector.
//!
//! Avoids re-running a producer while its last result is still fresh.
//! Entries are keyed by a composite string (`id|projectDir|currentDir` by
//! default) and carry an absolute expiry. Expired entries are never
//! returned; they stay in the map until overwritten or swept by
//! [`SegmentCache::evict_expired`].
//!
//! The store is shared by every producer task of a collection, so it sits
//! behind an [`RwLock`]: lookups run concurrently, inserts are exclusive.

use crate::segment::Segment;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A cached segment and the instant it stops being valid.
#[derive(Debug, Clone)]
struct CacheEntry {
    segment: Segment,
    expires_at: Instant,
}

/// Process-lifetime cache of producer results.
#[derive(Debug, Default)]
pub struct SegmentCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Hits counter for diagnostics.
    hits: AtomicU64,
    /// Misses counter for diagnostics.
    misses: AtomicU64,
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a fresh segment. Stale or absent keys are a miss.
    pub fn get(&self, key: &str) -> Option<Segment> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Segment> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.segment.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a segment for `ttl`. A zero TTL stores nothing.
    pub fn put(&self, key: impl Into<String>, segment: Segment, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let entry = CacheEntry {
            segment,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), entry);
    }

    /// Store a segment with a millisecond TTL; `ttl_ms <= 0` stores nothing.
    pub fn put_ms(&self, key: impl Into<String>, segment: Segment, ttl_ms: i64) {
        if ttl_ms <= 0 {
            return;
        }
        self.put(key, segment, Duration::from_millis(ttl_ms as u64));
    }

    /// Drop every entry whose expiry has passed.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, entry| now < entry.expires_at);
    }

    /// Invalidate all cache entries.
    pub fn invalidate_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Hit rate as a fraction (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
