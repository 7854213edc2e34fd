use std::collections::HashMap;

use crate::hash::Fingerprint;

use super::Selection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub gets: u64,
    pub hits: u64,
    pub puts: u64,
    pub evictions: u64,
}

/// Fingerprint -> chosen selection, for the life of the process.
pub trait ResultCache {
    fn get(&mut self, key: Fingerprint) -> Option<Selection>;
    fn put(&mut self, key: Fingerprint, selection: Selection);
    fn evict(&mut self, key: Fingerprint) -> bool;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plain hash map cache. Never persisted.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    map: HashMap<Fingerprint, Selection>,
    stats: CacheStats,
}

impl InMemoryCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self { map: HashMap::with_capacity(cap), stats: CacheStats::default() }
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl ResultCache for InMemoryCache {
    fn get(&mut self, key: Fingerprint) -> Option<Selection> {
        self.stats.gets = self.stats.gets.saturating_add(1);
        let hit = self.map.get(&key).cloned();
        if hit.is_some() {
            self.stats.hits = self.stats.hits.saturating_add(1);
            log::debug!("[cache] hit {key}");
        } else {
            log::debug!("[cache] miss {key}");
        }
        hit
    }

    fn put(&mut self, key: Fingerprint, selection: Selection) {
        self.stats.puts = self.stats.puts.saturating_add(1);
        self.map.insert(key, selection);
    }

    fn evict(&mut self, key: Fingerprint) -> bool {
        let removed = self.map.remove(&key).is_some();
        if removed {
            self.stats.evictions = self.stats.evictions.saturating_add(1);
        }
        removed
    }

    fn clear(&mut self) {
        self.map.clear();
        self.stats = CacheStats::default();
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }
}
