//! # Basis Cache — Sharing Tables Across Captures
//!
//! Every probe in a grid is usually captured at the same resolution and
//! band, so the same [`BasisTable`] is needed over and over. The cache keeps
//! the most recently used tables keyed by `(resolution, band)` and hands out
//! `Arc`s, so concurrent projections read one table without copying it.
//!
//! ## Locking
//!
//! The map sits behind a `Mutex`, but tables are built *outside* the lock: a
//! miss on a 256² table must not stall every other capture. If two threads
//! miss on the same key at once both build it, and the first one inserted
//! wins. The loser's table is dropped.
//!
//! ## Eviction
//!
//! Least-recently-used, by a monotonically increasing use counter. Capacities
//! are small (a handful of resolutions in practice), so eviction is a linear
//! scan.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::basis::Band;
use crate::error::Result;
use crate::table::BasisTable;

/// Capacity of [`BasisCache::global`].
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

type CacheKey = (u32, Band);

struct CacheEntry {
    table: Arc<BasisTable>,
    last_used: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    tick: u64,
}

/// LRU cache of basis tables.
pub struct BasisCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl BasisCache {
    /// Create a cache holding at most `capacity` tables (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// The process-wide cache.
    pub fn global() -> &'static BasisCache {
        static GLOBAL: OnceLock<BasisCache> = OnceLock::new();
        GLOBAL.get_or_init(|| BasisCache::new(DEFAULT_CACHE_CAPACITY))
    }

    /// Return the table for `(resolution, band)`, building it on a miss.
    pub fn get_or_build(&self, band: Band, resolution: u32) -> Result<Arc<BasisTable>> {
        let key = (resolution, band);

        {
            let mut state = self.lock();
            state.tick += 1;
            let tick = state.tick;
            if let Some(entry) = state.entries.get_mut(&key) {
                entry.last_used = tick;
                log::trace!("Basis cache hit: band {band}, resolution {resolution}");
                return Ok(Arc::clone(&entry.table));
            }
        }

        let table = Arc::new(BasisTable::build(band, resolution)?);

        let mut state = self.lock();
        state.tick += 1;
        let tick = state.tick;
        if let Some(entry) = state.entries.get_mut(&key) {
            // Another thread finished first.
            entry.last_used = tick;
            return Ok(Arc::clone(&entry.table));
        }

        while state.entries.len() >= self.capacity {
            let Some(oldest) = state
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| *k)
            else {
                break;
            };
            state.entries.remove(&oldest);
            log::debug!("Basis cache evicted band {}, resolution {}", oldest.1, oldest.0);
        }

        state.entries.insert(
            key,
            CacheEntry {
                table: Arc::clone(&table),
                last_used: tick,
            },
        );
        Ok(table)
    }

    /// Whether a table for `(resolution, band)` is currently cached.
    pub fn contains(&self, band: Band, resolution: u32) -> bool {
        self.lock().entries.contains_key(&(resolution, band))
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every cached table. Outstanding `Arc`s stay valid.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // The state is consistent after every statement, so a poisoned lock
        // is still safe to use.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BasisCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShError;

    fn band(b: u32) -> Band {
        Band::new(b).unwrap()
    }

    #[test]
    fn repeated_lookups_share_one_table() {
        let cache = BasisCache::new(4);
        let a = cache.get_or_build(band(3), 8).unwrap();
        let b = cache.get_or_build(band(3), 8).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_include_band_and_resolution() {
        let cache = BasisCache::new(4);
        let a = cache.get_or_build(band(3), 8).unwrap();
        let b = cache.get_or_build(band(2), 8).unwrap();
        let c = cache.get_or_build(band(3), 4).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.coeff_count(), 4);
        assert_eq!(c.resolution(), 4);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let cache = BasisCache::new(2);
        cache.get_or_build(band(1), 2).unwrap();
        cache.get_or_build(band(1), 4).unwrap();
        // Touch resolution 2 so resolution 4 becomes the oldest.
        cache.get_or_build(band(1), 2).unwrap();
        cache.get_or_build(band(1), 8).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(band(1), 2));
        assert!(!cache.contains(band(1), 4));
        assert!(cache.contains(band(1), 8));
    }

    #[test]
    fn failed_builds_are_not_cached() {
        let cache = BasisCache::new(2);
        assert_eq!(
            cache.get_or_build(band(2), 0).unwrap_err(),
            ShError::InvalidResolution(0)
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn evicted_tables_stay_alive_for_holders() {
        let cache = BasisCache::new(1);
        let held = cache.get_or_build(band(2), 2).unwrap();
        cache.get_or_build(band(2), 3).unwrap();
        assert!(!cache.contains(band(2), 2));
        assert_eq!(held.resolution(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(BasisCache::new(2));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_build(band(2), 4).unwrap())
            })
            .collect();
        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for t in &tables {
            assert!(Arc::ptr_eq(t, &cache.get_or_build(band(2), 4).unwrap()));
        }
        assert_eq!(cache.len(), 1);
    }
}
