#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // may be revisited
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod types;
pub mod board;
pub mod rng;
pub mod hash;
pub mod chain;
pub mod config;
pub mod persist;
pub mod profile;
pub mod memory;

pub mod engine {
    pub mod chains;
    pub mod score;
}

pub mod solver;
pub mod agent;

// Re-exports: stable minimal API surface for external callers
pub use crate::agent::{fallback_pair, Agent, Decision, MoveRecord, Stores};
pub use crate::board::Board;
pub use crate::chain::{Chain, MoveKey};
pub use crate::config::{load_config, EngineConfig, ProfilePolicy};
pub use crate::engine::chains::{enumerate_chains, filter_maximal, find_chains};
pub use crate::engine::score::{Anchor, Evaluator, ScoreBreakdown, Weights};
pub use crate::hash::{fingerprint, Fingerprint, ZobristTable};
pub use crate::memory::{MoveMemory, PositionMemory};
pub use crate::persist::StoreError;
pub use crate::profile::{
    BoardFeatures, FeatureWeights, GameOutcome, GamePerformance, ProfileCatalog, ProfileChoice, ProfileStats,
    SessionStats, HISTORY_LEN,
};
pub use crate::solver::{InMemoryCache, ResultCache, SelectOutcome, SelectStats, Selection, Selector};
pub use crate::types::{is_compatible, Cell, Dir, CELLS, COLS, MAX_VALUE, ROWS};
