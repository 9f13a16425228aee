//! Time-bounded read cache over provider record lists.
//!
//! The cache is the only state the updater keeps between iterations. It maps
//! a zone name to the A records last fetched for that zone; entries are
//! visible for a fixed TTL after insertion and treated as absent afterwards,
//! so a stale zone is simply refetched. The write path refreshes the cached
//! copy of an updated record in place of a full refetch (see
//! [`RecordCache::apply_update`]).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::traits::ARecord;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

/// Default maximum number of cached zones.
pub const DEFAULT_CAPACITY: usize = 1000;

struct CacheEntry {
    records: Vec<ARecord>,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// In-memory, time-expiring map from a zone name to its known A records.
///
/// Capacity-bounded: inserting a new zone into a full cache evicts the
/// oldest entry. Callers always receive owned snapshots; the cache keeps
/// sole ownership of the stored records.
pub struct RecordCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl RecordCache {
    /// Create a cache with the given entry lifetime and zone capacity.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Cached records for `domain`, or `None` if absent or expired.
    pub async fn get(&self, domain: &str) -> Option<Vec<ARecord>> {
        let entries = self.entries.read().await;
        let entry = entries.get(domain)?;
        if entry.is_expired(self.ttl) {
            return None;
        }
        Some(entry.records.clone())
    }

    /// Insert the record set for `domain`.
    ///
    /// Expired entries are dropped first; if the cache is still at capacity
    /// and `domain` is new, the oldest entry makes room.
    pub async fn put(&self, domain: &str, records: Vec<ARecord>) {
        let mut entries = self.entries.write().await;

        entries.retain(|_, entry| !entry.is_expired(self.ttl));

        if !entries.contains_key(domain) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(zone, _)| zone.clone());
            if let Some(zone) = oldest {
                debug!(%zone, "record cache full, evicting oldest zone");
                entries.remove(&zone);
            }
        }

        entries.insert(
            domain.to_string(),
            CacheEntry {
                records,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Replace the cached record carrying the same id as `updated`.
    ///
    /// Lets a lookup later in the TTL window observe the new destination
    /// without a provider refetch. A zone that is absent, expired, or no
    /// longer contains the record is left alone; the next miss refetches it.
    pub async fn apply_update(&self, domain: &str, updated: &ARecord) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(domain)
            && let Some(slot) = entry.records.iter_mut().find(|r| r.id == updated.id)
        {
            *slot = updated.clone();
        }
    }

    /// Number of cached zones, including expired entries not yet dropped.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no zones at all.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}
