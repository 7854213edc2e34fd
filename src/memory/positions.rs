use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::hash::Fingerprint;
use crate::persist::{load_or_default, write_json, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SeenFile {
    #[serde(default)]
    seen_hashes: Vec<String>,
}

/// Every board fingerprint seen across sessions. Telemetry only; it never
/// influences a decision.
#[derive(Debug, Clone, Default)]
pub struct PositionMemory {
    seen: BTreeSet<Fingerprint>,
}

impl PositionMemory {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn was_seen(&self, fp: Fingerprint) -> bool {
        self.seen.contains(&fp)
    }

    /// Returns true when the fingerprint is new.
    #[inline]
    pub fn mark_seen(&mut self, fp: Fingerprint) -> bool {
        self.seen.insert(fp)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Fingerprint> + '_ {
        self.seen.iter().copied()
    }

    /// Load `{"seen_hashes": [hex, ...]}`. Entries that are not valid hex are skipped.
    pub fn load(path: &Path) -> Self {
        let file: SeenFile = load_or_default(path, "position");
        let mut seen = BTreeSet::new();
        let mut skipped = 0usize;
        for h in &file.seen_hashes {
            match Fingerprint::from_hex(h) {
                Some(fp) => {
                    seen.insert(fp);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!("[position] skipped {skipped} malformed fingerprints in {}", path.display());
        }
        Self { seen }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let file = SeenFile { seen_hashes: self.seen.iter().map(|fp| fp.to_hex()).collect() };
        write_json(path, &file)
    }
}
