use std::collections::BTreeMap;

use crate::board::Board;
use crate::chain::Chain;
use crate::config::SelectorConfig;
use crate::engine::chains::find_chains;
use crate::engine::score::Evaluator;
use crate::hash::Fingerprint;
use crate::memory::MoveMemory;

use super::{SelectOutcome, Selection};

/// Counters from the most recent `select` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectStats {
    /// Maximal chains found on the board.
    pub candidates: usize,
    /// Chains excluded by the blacklist (fallback pass included).
    pub blacklisted: usize,
    /// Number of `Evaluator::score` calls.
    pub evaluations: usize,
    /// Profiled lengths that had candidates, in the order they were scored.
    pub lengths_tried: Vec<usize>,
    pub fallback: bool,
}

/// Length-ordered chain search with a good-enough short circuit.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    evaluator: Evaluator,
    config: SelectorConfig,
    stats: SelectStats,
}

impl Selector {
    #[inline]
    pub fn new(evaluator: Evaluator, config: SelectorConfig) -> Self {
        Self { evaluator, config, stats: SelectStats::default() }
    }

    #[inline]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    #[inline]
    pub fn last_stats(&self) -> &SelectStats {
        &self.stats
    }

    /// Pick a chain for `board`.
    ///
    /// Lengths are tried in `order`; the first length whose best chain scores
    /// above the threshold, or is short enough to trust, wins outright. When no
    /// profiled length settles it, every non-blacklisted chain competes.
    pub fn select(
        &mut self,
        board: &Board,
        fp: Fingerprint,
        order: &[u8],
        moves: &MoveMemory,
    ) -> SelectOutcome {
        self.stats = SelectStats::default();
        let chains = find_chains(board);
        self.stats.candidates = chains.len();
        if chains.is_empty() {
            log::debug!("[select] no chains at {fp}");
            return SelectOutcome::NoChains;
        }

        let mut by_length: BTreeMap<usize, Vec<&Chain>> = BTreeMap::new();
        for chain in &chains {
            by_length.entry(chain.len()).or_default().push(chain);
        }

        let mut visited = 0u64;
        for &len in order {
            let len = len as usize;
            if len >= 64 || visited & (1 << len) != 0 {
                continue;
            }
            visited |= 1 << len;
            let Some(group) = by_length.get(&len) else {
                continue;
            };
            self.stats.lengths_tried.push(len);
            let Some(best) = self.best_of(board, fp, group.iter().copied(), moves) else {
                continue;
            };
            log::debug!("[select] length={len} best score={:.1} chain={}", best.score, best.chain);
            if best.score > self.config.threshold || len <= self.config.trusted_max_len {
                return SelectOutcome::Found(best);
            }
        }

        self.stats.fallback = true;
        match self.best_of(board, fp, chains.iter(), moves) {
            Some(best) => {
                log::debug!("[select] fallback best score={:.1} chain={}", best.score, best.chain);
                SelectOutcome::Found(best)
            }
            None => {
                log::info!("[select] all {} chains blacklisted at {fp}", chains.len());
                SelectOutcome::AllBlacklisted
            }
        }
    }

    /// Highest scoring non-blacklisted chain; the first one wins ties.
    fn best_of<'c>(
        &mut self,
        board: &Board,
        fp: Fingerprint,
        chains: impl Iterator<Item = &'c Chain>,
        moves: &MoveMemory,
    ) -> Option<Selection> {
        let mut best: Option<(&Chain, f64)> = None;
        for chain in chains {
            if moves.is_blacklisted(fp, &chain.key()) {
                self.stats.blacklisted += 1;
                continue;
            }
            let score = self.evaluator.score(board, chain);
            self.stats.evaluations += 1;
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((chain, score));
            }
        }
        best.map(|(chain, score)| Selection { key: chain.key(), chain: chain.clone(), score })
    }
}
