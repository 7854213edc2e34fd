use serde::Serialize;

use crate::chain::{Chain, MoveKey};

pub mod cache;
pub mod select;

pub use cache::{CacheStats, InMemoryCache, ResultCache};
pub use select::{SelectStats, Selector};

/// A chosen chain with its key and heuristic score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub chain: Chain,
    pub key: MoveKey,
    pub score: f64,
}

/// Why a selection did or did not produce a chain. Absence is a normal
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Found(Selection),
    NoChains,
    AllBlacklisted,
}

impl SelectOutcome {
    #[inline]
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            SelectOutcome::Found(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn into_selection(self) -> Option<Selection> {
        match self {
            SelectOutcome::Found(s) => Some(s),
            _ => None,
        }
    }
}
