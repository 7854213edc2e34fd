use serde::Serialize;

use crate::board::Board;
use crate::chain::{Chain, MoveKey};
use crate::config::{EngineConfig, ProfilePolicy};
use crate::engine::score::Evaluator;
use crate::hash::{Fingerprint, ZobristTable};
use crate::memory::{MoveMemory, PositionMemory};
use crate::persist::StoreError;
use crate::profile::{BoardFeatures, GameOutcome, ProfileCatalog};
use crate::solver::{InMemoryCache, ResultCache, SelectOutcome, SelectStats, Selection, Selector};
use crate::types::Dir;

/// The three persistent stores an agent works against.
#[derive(Debug, Clone, Default)]
pub struct Stores {
    pub moves: MoveMemory,
    pub positions: PositionMemory,
    pub profiles: ProfileCatalog,
}

impl Stores {
    /// Load every store from the configured paths, degrading to empty stores.
    pub fn load(config: &EngineConfig) -> Self {
        Self {
            moves: MoveMemory::load(&config.paths.moves, config.memory.bad_cap, config.memory.good_cap),
            positions: PositionMemory::load(&config.paths.positions),
            profiles: ProfileCatalog::load(&config.paths.profiles, &config.profiles.base_lengths),
        }
    }
}

/// An executed move waiting for, or carrying, its success feedback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveRecord {
    pub fingerprint: Fingerprint,
    pub key: MoveKey,
    pub score: f64,
    pub success: Option<bool>,
}

/// Everything `decide` learned about one board.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub fingerprint: Fingerprint,
    pub outcome: SelectOutcome,
    pub profile_index: usize,
    pub order: Vec<u8>,
    /// Board pressure, when adaptive ordering ran.
    pub pressure: Option<f64>,
    pub from_cache: bool,
    pub new_position: bool,
    pub stats: SelectStats,
}

impl Decision {
    #[inline]
    pub fn chain(&self) -> Option<&Chain> {
        self.outcome.selection().map(|s| &s.chain)
    }
}

/// Running sum of pressure components over the boards of one game.
#[derive(Debug, Clone, Copy, Default)]
struct EpisodeFeatures {
    sum: [f64; 4],
    boards: u32,
}

impl EpisodeFeatures {
    fn add(&mut self, components: [f64; 4]) {
        for (s, c) in self.sum.iter_mut().zip(components) {
            *s += c;
        }
        self.boards += 1;
    }

    fn average(&self) -> Option<[f64; 4]> {
        (self.boards > 0).then(|| self.sum.map(|s| s / f64::from(self.boards)))
    }
}

/// Decision loop state: stores, selector, cache and the one pending move.
pub struct Agent<C: ResultCache = InMemoryCache> {
    config: EngineConfig,
    table: ZobristTable,
    selector: Selector,
    stores: Stores,
    cache: C,
    pending: Option<MoveRecord>,
    /// Profile whose order the last decision played.
    last_profile: Option<usize>,
    episode: EpisodeFeatures,
}

impl Agent<InMemoryCache> {
    pub fn new(config: EngineConfig, stores: Stores) -> Self {
        Self::with_cache(config, stores, InMemoryCache::new())
    }

    /// Build an agent over the stores named in `config.paths`.
    pub fn open(config: EngineConfig) -> Self {
        let stores = Stores::load(&config);
        log::info!(
            "[agent] opened: {} positions in memory, {} seen, {} profiles",
            stores.moves.len(),
            stores.positions.len(),
            stores.profiles.len()
        );
        Self::new(config, stores)
    }
}

impl<C: ResultCache> Agent<C> {
    pub fn with_cache(config: EngineConfig, stores: Stores, cache: C) -> Self {
        let table = ZobristTable::new(config.hash_seed);
        let selector = Selector::new(Evaluator::new(config.weights.clone()), config.selector.clone());
        Self {
            config,
            table,
            selector,
            stores,
            cache,
            pending: None,
            last_profile: None,
            episode: EpisodeFeatures::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    #[inline]
    pub fn stores_mut(&mut self) -> &mut Stores {
        &mut self.stores
    }

    #[inline]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    #[inline]
    pub fn evaluator(&self) -> &Evaluator {
        self.selector.evaluator()
    }

    #[inline]
    pub fn pending(&self) -> Option<&MoveRecord> {
        self.pending.as_ref()
    }

    #[inline]
    pub fn fingerprint(&self, board: &Board) -> Fingerprint {
        self.table.fingerprint(board)
    }

    /// Choose a chain for `board` and remember it as the pending move.
    ///
    /// A previous pending move without feedback is dropped.
    pub fn decide(&mut self, board: &Board) -> Decision {
        let fp = self.table.fingerprint(board);
        let new_position = self.stores.positions.mark_seen(fp);

        let (profile_index, order, pressure) = if self.config.profiles.adaptive {
            let choice = self.stores.profiles.adapt_strategy(board, self.config.profiles.pressure_threshold);
            self.episode.add(choice.features.components());
            (choice.index, choice.order, Some(choice.pressure))
        } else {
            let p = &self.stores.profiles;
            self.episode.add(BoardFeatures::from_board(board).components());
            (p.current_index, p.active_order().to_vec(), None)
        };
        self.last_profile = Some(profile_index);

        if let Some(stale) = self.pending.take() {
            log::debug!("[agent] dropping pending {} without feedback", stale.key);
        }

        let (outcome, from_cache, stats) = match self.cache.get(fp) {
            Some(hit) => (SelectOutcome::Found(hit), true, SelectStats::default()),
            None => {
                let outcome = self.selector.select(board, fp, &order, &self.stores.moves);
                if let SelectOutcome::Found(sel) = &outcome {
                    self.cache.put(fp, sel.clone());
                }
                (outcome, false, self.selector.last_stats().clone())
            }
        };

        if let Some(sel) = outcome.selection() {
            self.pending = Some(MoveRecord { fingerprint: fp, key: sel.key, score: sel.score, success: None });
            log::info!("[agent] {fp} -> {} score={:.1} cached={from_cache}", sel.chain, sel.score);
        } else {
            log::info!("[agent] {fp} -> no chain ({outcome:?})");
        }

        Decision { fingerprint: fp, outcome, profile_index, order, pressure, from_cache, new_position, stats }
    }

    /// Best orthogonal pair of nonempty cells, for when `decide` found no chain.
    /// The pair becomes the pending move.
    pub fn fallback(&mut self, board: &Board) -> Option<Selection> {
        let sel = fallback_pair(board, self.selector.evaluator())?;
        let fp = self.table.fingerprint(board);
        self.pending = Some(MoveRecord { fingerprint: fp, key: sel.key, score: sel.score, success: None });
        log::info!("[agent] {fp} -> fallback pair {} score={:.1}", sel.chain, sel.score);
        Some(sel)
    }

    /// Feed back whether the pending move changed the board.
    ///
    /// Success at or above the good-move score is ranked in memory. Failure
    /// blacklists the move and drops the cached choice for that position.
    pub fn report_outcome(&mut self, success: bool) -> Option<MoveRecord> {
        let mut rec = self.pending.take()?;
        rec.success = Some(success);
        if success {
            if rec.score >= self.config.memory.good_move_min_score {
                self.stores.moves.record_good_move(rec.fingerprint, rec.key, rec.score);
            }
        } else {
            self.stores.moves.record_bad_move(rec.fingerprint, rec.key);
            self.cache.evict(rec.fingerprint);
        }
        Some(rec)
    }

    /// Close a game: credit the profile that played it, learn the pressure
    /// weights and apply the profile policy.
    ///
    /// The credited profile is the one the last `decide` used, or the active
    /// one when no decision was made.
    pub fn finish_game(&mut self, outcome: GameOutcome) {
        self.pending = None;
        let episode = std::mem::take(&mut self.episode);
        let profiles = &mut self.stores.profiles;
        let index = self.last_profile.take().unwrap_or(profiles.current_index);
        profiles.record_game(index, outcome);
        if self.config.profiles.learn_weights {
            if let Some(avg) = episode.average() {
                profiles.learn_feature_weights(avg, outcome.won, self.config.profiles.learning_rate);
            }
        }
        match self.config.profiles.policy {
            ProfilePolicy::Fixed => {}
            ProfilePolicy::Cycle => profiles.advance(),
            ProfilePolicy::Recommend => {
                let next = profiles.recommend_profile();
                profiles.select(next);
            }
        }
        log::info!(
            "[agent] game over score={:.0} won={} on profile #{index}, next profile #{}",
            outcome.score,
            outcome.won,
            profiles.current_index
        );
    }

    /// Write all three stores. The first failure is returned.
    pub fn save(&self) -> Result<(), StoreError> {
        let paths = &self.config.paths;
        self.stores.moves.save(&paths.moves)?;
        self.stores.positions.save(&paths.positions)?;
        self.stores.profiles.save(&paths.profiles)?;
        log::debug!("[agent] stores saved");
        Ok(())
    }

    #[inline]
    pub fn is_game_lost(&self, board: &Board) -> bool {
        board.is_game_lost()
    }
}

/// Highest scoring pair of orthogonally adjacent nonempty cells, compatible or
/// not. Cells are visited row-major, neighbours in E, S, W, N order; the first
/// maximum wins.
pub fn fallback_pair(board: &Board, evaluator: &Evaluator) -> Option<Selection> {
    let mut best: Option<(Chain, f64)> = None;
    for (cell, v) in board.iter() {
        if v <= 0 {
            continue;
        }
        for dir in Dir::orthogonal() {
            let Some(next) = cell.step(dir) else { continue };
            if board.is_empty_at(next) {
                continue;
            }
            let Some(chain) = Chain::new(vec![cell, next]) else { continue };
            let score = evaluator.score(board, &chain);
            if best.as_ref().map_or(true, |(_, b)| score > *b) {
                best = Some((chain, score));
            }
        }
    }
    best.map(|(chain, score)| Selection { key: chain.key(), chain, score })
}
