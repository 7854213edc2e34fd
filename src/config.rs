use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::score::Weights;
use crate::persist::StoreError;
use crate::rng::DEFAULT_HASH_SEED;

/// Short-circuit rules for the length-ordered search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Accept a length's best chain at once when it scores above this.
    pub threshold: f64,
    /// Accept a length's best chain at once when it is this short or shorter.
    pub trusted_max_len: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self { threshold: 100.0, trusted_max_len: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub bad_cap: usize,
    pub good_cap: usize,
    /// Successful moves below this score are not ranked as good.
    pub good_move_min_score: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { bad_cap: 5, good_cap: 5, good_move_min_score: 5000.0 }
    }
}

/// What happens to the active profile after a completed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePolicy {
    Fixed,
    Cycle,
    Recommend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Base chain-length order; the catalog holds all of its permutations.
    pub base_lengths: Vec<u8>,
    pub policy: ProfilePolicy,
    /// Let board pressure reorder the active profile on each decision.
    pub adaptive: bool,
    pub pressure_threshold: f64,
    /// Adjust the pressure weights after every finished game. Off keeps the
    /// static default weighting.
    pub learn_weights: bool,
    pub learning_rate: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            base_lengths: vec![4, 5, 3, 6, 2, 7, 8, 9],
            policy: ProfilePolicy::Recommend,
            adaptive: true,
            pressure_threshold: 0.6,
            learn_weights: false,
            learning_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorePaths {
    pub moves: PathBuf,
    pub positions: PathBuf,
    pub profiles: PathBuf,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self {
            moves: PathBuf::from("move_memory.json"),
            positions: PathBuf::from("seen_boards.json"),
            profiles: PathBuf::from("optimal_orders.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub hash_seed: u64,
    pub weights: Weights,
    pub selector: SelectorConfig,
    pub memory: MemoryConfig,
    pub profiles: ProfileConfig,
    pub paths: StorePaths,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_seed: DEFAULT_HASH_SEED,
            weights: Weights::default(),
            selector: SelectorConfig::default(),
            memory: MemoryConfig::default(),
            profiles: ProfileConfig::default(),
            paths: StorePaths::default(),
        }
    }
}

/// Load an engine config from JSON. A missing file yields the defaults; a
/// malformed one is an error so a typo does not silently reset every weight.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, StoreError> {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("[config] {} not found, using defaults", path.display());
        return Ok(EngineConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| StoreError::corrupt(path, e))
}
