//! In-memory cache layer for computed series
//!
//! Provides short-lived TTL caching of successful results keyed by
//! (date, source mode). Failures are never stored.

use crate::types::{SeriesResult, SourceMode};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Time source for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        if let Some(next) = chrono::Duration::from_std(by)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
        {
            *now = next;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Cache key: the requested date and mode, not the source that answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub date: NaiveDate,
    pub mode: SourceMode,
}

impl CacheKey {
    pub fn new(date: NaiveDate, mode: SourceMode) -> Self {
        Self { date, mode }
    }
}

/// Storage for computed series
#[cfg_attr(test, mockall::automock)]
pub trait SeriesCache: Send + Sync {
    /// Cached series, `None` if absent or expired
    fn get(&self, key: &CacheKey) -> Option<SeriesResult>;

    /// Store a series, replacing any previous entry for the key
    fn put(&self, key: CacheKey, value: SeriesResult, ttl: Duration);
}

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(value: T, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { value, expires_at }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// TTL cache guarded by a single lock. Expired entries are evicted lazily on
/// lookup or by `purge_expired`.
#[derive(Debug, Clone)]
pub struct TtlCache<C: Clock = SystemClock> {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry<SeriesResult>>>>,
    clock: C,
}

impl Default for TtlCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl TtlCache<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> TtlCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Clear expired entries
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        entries.retain(|_, entry| !entry.is_expired(now));
    }

    /// Get cache stats
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.read();
        let total = entries.len();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total_entries: total,
            expired_entries: expired,
            valid_entries: total - expired,
        }
    }
}

impl<C: Clock> SeriesCache for TtlCache<C> {
    fn get(&self, key: &CacheKey) -> Option<SeriesResult> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    fn put(&self, key: CacheKey, value: SeriesResult, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now(), ttl);
        self.entries.write().insert(key, entry);
    }
}

/// Cache that stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl SeriesCache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Option<SeriesResult> {
        None
    }

    fn put(&self, _key: CacheKey, _value: SeriesResult, _ttl: Duration) {}
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
}
