use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::MoveKey;
use crate::hash::Fingerprint;
use crate::persist::{load_or_default, write_json, StoreError};

pub const DEFAULT_BAD_CAP: usize = 5;
pub const DEFAULT_GOOD_CAP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodMove {
    pub key: MoveKey,
    pub score: f64,
}

/// Per-position record: ranked good moves and the most recent bad ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    #[serde(default)]
    pub good: Vec<GoodMove>,
    #[serde(default)]
    pub bad: Vec<MoveKey>,
}

/// Fingerprint-keyed move memory. Only the bad list blocks moves; the good
/// list is advisory.
#[derive(Debug, Clone)]
pub struct MoveMemory {
    entries: BTreeMap<Fingerprint, MemoryEntry>,
    bad_cap: usize,
    good_cap: usize,
}

impl Default for MoveMemory {
    fn default() -> Self {
        Self::with_caps(DEFAULT_BAD_CAP, DEFAULT_GOOD_CAP)
    }
}

impl MoveMemory {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caps(bad_cap: usize, good_cap: usize) -> Self {
        Self { entries: BTreeMap::new(), bad_cap: bad_cap.max(1), good_cap: good_cap.max(1) }
    }

    /// Append to the bad list; the oldest entries fall off past the cap.
    pub fn record_bad_move(&mut self, fp: Fingerprint, key: MoveKey) {
        let entry = self.entries.entry(fp).or_default();
        entry.bad.push(key);
        if entry.bad.len() > self.bad_cap {
            let excess = entry.bad.len() - self.bad_cap;
            entry.bad.drain(..excess);
        }
        log::info!("[memory] bad move {key} at {fp}");
    }

    /// Upsert into the good list. An existing key only ever has its score raised.
    pub fn record_good_move(&mut self, fp: Fingerprint, key: MoveKey, score: f64) {
        let entry = self.entries.entry(fp).or_default();
        match entry.good.iter_mut().find(|g| g.key == key) {
            Some(g) => {
                if score > g.score {
                    g.score = score;
                }
            }
            None => entry.good.push(GoodMove { key, score }),
        }
        sort_good(&mut entry.good);
        entry.good.truncate(self.good_cap);
        log::debug!("[memory] good move {key} at {fp} (score={score:.1})");
    }

    #[inline]
    pub fn is_blacklisted(&self, fp: Fingerprint, key: &MoveKey) -> bool {
        self.entries.get(&fp).map_or(false, |e| e.bad.contains(key))
    }

    pub fn good_moves(&self, fp: Fingerprint) -> &[GoodMove] {
        self.entries.get(&fp).map(|e| e.good.as_slice()).unwrap_or(&[])
    }

    pub fn bad_moves(&self, fp: Fingerprint) -> &[MoveKey] {
        self.entries.get(&fp).map(|e| e.bad.as_slice()).unwrap_or(&[])
    }

    /// Number of positions with any record.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Load from a JSON store, starting empty when it is missing or corrupt.
    /// Malformed fingerprints and records are skipped one by one; lists longer
    /// than the caps are trimmed the same way inserts would.
    pub fn load(path: &Path, bad_cap: usize, good_cap: usize) -> Self {
        let raw: BTreeMap<String, Value> = load_or_default(path, "memory");
        let mut mem = Self::with_caps(bad_cap, good_cap);
        let mut skipped = 0usize;
        for (hex, value) in raw {
            let Some(fp) = Fingerprint::from_hex(&hex) else {
                skipped += 1;
                continue;
            };
            if !value.is_object() {
                skipped += 1;
                continue;
            }
            let mut e = MemoryEntry {
                good: parse_list(value.get("good"), &mut skipped),
                bad: parse_list(value.get("bad"), &mut skipped),
            };
            if e.bad.len() > mem.bad_cap {
                let excess = e.bad.len() - mem.bad_cap;
                e.bad.drain(..excess);
            }
            sort_good(&mut e.good);
            e.good.truncate(mem.good_cap);
            if !e.good.is_empty() || !e.bad.is_empty() {
                mem.entries.insert(fp, e);
            }
        }
        if skipped > 0 {
            log::warn!("[memory] skipped {skipped} malformed records in {}", path.display());
        }
        let bad: usize = mem.entries.values().map(|e| e.bad.len()).sum();
        let good: usize = mem.entries.values().map(|e| e.good.len()).sum();
        log::info!("[memory] loaded {bad} bad and {good} good moves from {}", path.display());
        mem
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        write_json(path, &self.entries)
    }
}

/// Decode each element of an optional JSON array, counting the ones that fail.
fn parse_list<T: DeserializeOwned>(value: Option<&Value>, skipped: &mut usize) -> Vec<T> {
    let Some(value) = value else {
        return Vec::new();
    };
    let Some(items) = value.as_array() else {
        *skipped += 1;
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|v| match T::deserialize(v) {
            Ok(t) => Some(t),
            Err(_) => {
                *skipped += 1;
                None
            }
        })
        .collect()
}

#[inline]
fn sort_good(good: &mut [GoodMove]) {
    good.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
