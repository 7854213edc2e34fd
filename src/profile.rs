use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::persist::{read_json, write_json, StoreError};
use crate::types::{Cell, CELLS, COLS, ROWS};

/// Running totals for one search order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub games: u32,
    pub total_score: f64,
    #[serde(default)]
    pub wins: u32,
    /// Seconds, summed over all games.
    #[serde(default)]
    pub total_duration: f64,
}

impl ProfileStats {
    #[inline]
    pub fn avg_score(&self) -> f64 {
        if self.games == 0 { 0.0 } else { self.total_score / f64::from(self.games) }
    }

    #[inline]
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 { 0.0 } else { f64::from(self.wins) / f64::from(self.games) }
    }

    #[inline]
    pub fn avg_duration(&self) -> f64 {
        if self.games == 0 { 0.0 } else { self.total_duration / f64::from(self.games) }
    }

    /// 50% win rate, 30% average score (per 10k), 20% speed.
    pub fn composite(&self) -> f64 {
        0.5 * self.win_rate() + 0.3 * (self.avg_score() / 10_000.0)
            + 0.2 * (1.0 / self.avg_duration().max(1.0))
    }
}

/// Result of one completed game, reported by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub score: f64,
    pub won: bool,
    pub duration_secs: f64,
    #[serde(default)]
    pub moves: u32,
    #[serde(default)]
    pub max_tile: i32,
}

impl GameOutcome {
    #[inline]
    pub fn new(score: f64, won: bool, duration_secs: f64) -> Self {
        Self { score, won, duration_secs, moves: 0, max_tile: 0 }
    }
}

/// One row of the recent-performance history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GamePerformance {
    pub score: f64,
    pub duration_secs: f64,
    pub moves: u32,
    pub max_tile: i32,
    pub score_per_second: f64,
    pub score_per_move: f64,
}

/// Games kept in [`SessionStats::history`].
pub const HISTORY_LEN: usize = 100;

/// Totals over every game, whatever profile played it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub total_games: u32,
    pub total_wins: u32,
    pub total_score: f64,
    pub total_moves: u64,
    pub max_score: f64,
    pub max_tile: i32,
    /// Most recent games, oldest first.
    pub history: VecDeque<GamePerformance>,
}

impl SessionStats {
    pub fn record(&mut self, outcome: &GameOutcome) {
        self.total_games += 1;
        if outcome.won {
            self.total_wins += 1;
        }
        self.total_score += outcome.score;
        self.total_moves += u64::from(outcome.moves);
        self.max_score = self.max_score.max(outcome.score);
        self.max_tile = self.max_tile.max(outcome.max_tile);

        let duration = outcome.duration_secs.max(0.0);
        self.history.push_back(GamePerformance {
            score: outcome.score,
            duration_secs: duration,
            moves: outcome.moves,
            max_tile: outcome.max_tile,
            score_per_second: outcome.score / duration.max(1.0),
            score_per_move: outcome.score / f64::from(outcome.moves.max(1)),
        });
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }

    #[inline]
    pub fn win_rate(&self) -> f64 {
        f64::from(self.total_wins) / f64::from(self.total_games.max(1))
    }

    #[inline]
    pub fn avg_score(&self) -> f64 {
        self.total_score / f64::from(self.total_games.max(1))
    }

    #[inline]
    pub fn avg_moves(&self) -> f64 {
        self.total_moves as f64 / f64::from(self.total_games.max(1))
    }

    /// Up to `n` most recent games, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &GamePerformance> {
        self.history.iter().skip(self.history.len().saturating_sub(n))
    }
}

/// Weights of the four pressure components. Learned per game and kept summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub fullness: f64,
    pub few_merges: f64,
    pub entropy: f64,
    pub corner: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self { fullness: 0.35, few_merges: 0.25, entropy: 0.2, corner: 0.2 }
    }
}

impl FeatureWeights {
    #[inline]
    pub fn as_array(&self) -> [f64; 4] {
        [self.fullness, self.few_merges, self.entropy, self.corner]
    }

    fn from_array(w: [f64; 4]) -> Self {
        Self { fullness: w[0], few_merges: w[1], entropy: w[2], corner: w[3] }
    }

    /// Scale each weight by how strongly its component showed during the game:
    /// up by `rate * c` after a win, down by `rate / 2 * c` after a loss. The
    /// result is renormalized to sum to 1.
    pub fn learn(&mut self, components: [f64; 4], won: bool, rate: f64) {
        let mut w = self.as_array();
        for (wi, c) in w.iter_mut().zip(components) {
            let c = c.clamp(0.0, 1.0);
            let factor = if won { 1.0 + rate * c } else { 1.0 - 0.5 * rate * c };
            *wi *= factor.max(0.0);
        }
        let total: f64 = w.iter().sum();
        if total > 0.0 && total.is_finite() {
            for wi in &mut w {
                *wi /= total;
            }
            *self = Self::from_array(w);
        }
    }
}

/// Board summary used to bias the search order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoardFeatures {
    pub empty_ratio: f64,
    /// Shannon entropy of the nonempty values, scaled to [0, 1].
    pub entropy: f64,
    pub max_tile_in_corner: bool,
    pub potential_merges: usize,
}

impl BoardFeatures {
    pub fn from_board(board: &Board) -> Self {
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for (_, v) in board.iter() {
            if v > 0 {
                *counts.entry(v).or_default() += 1;
            }
        }
        let n: usize = counts.values().sum();
        let entropy = if n == 0 {
            0.0
        } else {
            let h: f64 = counts
                .values()
                .map(|&k| {
                    let p = k as f64 / n as f64;
                    -p * p.log2()
                })
                .sum();
            h / (CELLS as f64).log2()
        };
        let (max_cell, _) = board.max_tile();
        Self {
            empty_ratio: board.empty_count() as f64 / CELLS as f64,
            entropy,
            max_tile_in_corner: is_corner(max_cell),
            potential_merges: board.equal_pairs(),
        }
    }

    /// Pressure components in [0, 1]: fullness, lack of merges, entropy and a
    /// max tile away from the corners.
    pub fn components(&self) -> [f64; 4] {
        let merges = (self.potential_merges as f64 / 20.0).min(1.0);
        let corner = if self.max_tile_in_corner { 0.0 } else { 1.0 };
        [1.0 - self.empty_ratio, 1.0 - merges, self.entropy, corner]
    }

    /// Weighted sum of [`BoardFeatures::components`]. High means cramped.
    pub fn pressure(&self, weights: &FeatureWeights) -> f64 {
        self.components().iter().zip(weights.as_array()).map(|(c, w)| c * w).sum()
    }
}

#[inline]
fn is_corner(cell: Cell) -> bool {
    (cell.row == 0 || cell.row as usize == ROWS - 1) && (cell.col == 0 || cell.col as usize == COLS - 1)
}

/// Order a decision should use, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileChoice {
    pub index: usize,
    pub order: Vec<u8>,
    pub features: BoardFeatures,
    pub pressure: f64,
    pub overridden: bool,
}

/// All permutations of a base chain-length order with per-order stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCatalog {
    pub base: Vec<u8>,
    pub orders: Vec<Vec<u8>>,
    pub current_index: usize,
    #[serde(default)]
    pub stats: BTreeMap<usize, ProfileStats>,
    #[serde(default)]
    pub feature_weights: FeatureWeights,
    #[serde(default)]
    pub session: SessionStats,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::generate(&[4, 5, 3, 6, 2, 7, 8, 9])
    }
}

impl ProfileCatalog {
    /// Every permutation of `base` in lexicographic index order; index 0 is `base`.
    pub fn generate(base: &[u8]) -> Self {
        Self {
            base: base.to_vec(),
            orders: permutations(base),
            current_index: 0,
            stats: BTreeMap::new(),
            feature_weights: FeatureWeights::default(),
            session: SessionStats::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn active_order(&self) -> &[u8] {
        self.orders.get(self.current_index).map(Vec::as_slice).unwrap_or(self.base.as_slice())
    }

    #[inline]
    pub fn order(&self, index: usize) -> Option<&[u8]> {
        self.orders.get(index).map(Vec::as_slice)
    }

    #[inline]
    pub fn stats(&self, index: usize) -> ProfileStats {
        self.stats.get(&index).copied().unwrap_or_default()
    }

    /// Make `index` the active profile. Out-of-range indices wrap.
    pub fn select(&mut self, index: usize) {
        if self.orders.is_empty() {
            return;
        }
        self.current_index = index % self.orders.len();
    }

    /// Step to the next profile, wrapping at the end of the catalog.
    pub fn advance(&mut self) {
        self.select(self.current_index + 1);
    }

    /// Fold one finished game into the stats of `index` and the session totals.
    pub fn record_game(&mut self, index: usize, outcome: GameOutcome) {
        self.session.record(&outcome);
        let s = self.stats.entry(index).or_default();
        s.games += 1;
        s.total_score += outcome.score;
        if outcome.won {
            s.wins += 1;
        }
        s.total_duration += outcome.duration_secs.max(0.0);
        log::info!(
            "[profile] #{index} games={} avg_score={:.1} win_rate={:.2}",
            s.games,
            s.avg_score(),
            s.win_rate()
        );
    }

    /// Best composite among profiles with at least one game. Ties go to the lower
    /// index; with no played profile the active index is returned.
    pub fn recommend_profile(&self) -> usize {
        let mut best: Option<(usize, f64)> = None;
        for (&idx, s) in &self.stats {
            if s.games == 0 || idx >= self.orders.len() {
                continue;
            }
            let c = s.composite();
            if best.map_or(true, |(_, b)| c > b) {
                best = Some((idx, c));
            }
        }
        best.map_or(self.current_index, |(idx, _)| idx)
    }

    /// Active order, pulled towards short chains on a high-pressure board.
    pub fn adapt_strategy(&self, board: &Board, pressure_threshold: f64) -> ProfileChoice {
        let index = self.current_index;
        let features = BoardFeatures::from_board(board);
        let pressure = features.pressure(&self.feature_weights);
        let mut order = self.order(index).unwrap_or(self.base.as_slice()).to_vec();
        let overridden = pressure > pressure_threshold;
        if overridden {
            order = short_first(&order);
            log::debug!("[profile] pressure {pressure:.2} > {pressure_threshold:.2}, order {order:?}");
        }
        ProfileChoice { index, order, features, pressure, overridden }
    }

    /// Adjust the pressure weights from the average components seen in one game.
    pub fn learn_feature_weights(&mut self, components: [f64; 4], won: bool, rate: f64) {
        self.feature_weights.learn(components, won, rate);
        log::debug!("[profile] feature weights now {:?}", self.feature_weights);
    }

    /// Load the catalog, regenerating from `base` when the store is missing or
    /// unusable.
    pub fn load(path: &Path, base: &[u8]) -> Self {
        match read_json::<ProfileCatalog>(path) {
            Ok(Some(mut cat)) => {
                if cat.orders.is_empty() || cat.orders.iter().any(Vec::is_empty) {
                    log::warn!("[profile] {} has no usable orders, regenerating", path.display());
                    let mut fresh = Self::generate(if cat.base.is_empty() { base } else { cat.base.as_slice() });
                    fresh.stats = std::mem::take(&mut cat.stats);
                    fresh.feature_weights = cat.feature_weights;
                    fresh.session = std::mem::take(&mut cat.session);
                    return fresh;
                }
                let n = cat.orders.len();
                cat.current_index %= n;
                cat.stats.retain(|&idx, _| idx < n);
                log::info!("[profile] loaded {n} orders, active #{}", cat.current_index);
                cat
            }
            Ok(None) => Self::generate(base),
            Err(e) => {
                log::warn!("[profile] {e}; regenerating");
                Self::generate(base)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        write_json(path, self)
    }

    /// Drop every stat and the session totals, keeping the orders, the active
    /// index and the learned weights.
    pub fn reset_stats(&mut self) {
        self.stats.clear();
        self.session = SessionStats::default();
    }
}

/// Lengths <= 3 first, relative order kept on both sides.
fn short_first(order: &[u8]) -> Vec<u8> {
    let (mut short, long): (Vec<u8>, Vec<u8>) = order.iter().partition(|&&l| l <= 3);
    short.extend(long);
    short
}

/// Lexicographic permutations over positions, like walking index tuples in order.
fn permutations(base: &[u8]) -> Vec<Vec<u8>> {
    let n = base.len();
    let mut idx: Vec<usize> = (0..n).collect();
    let mut out = vec![base.to_vec()];
    if n < 2 {
        return out;
    }
    loop {
        let Some(i) = (0..n - 1).rev().find(|&i| idx[i] < idx[i + 1]) else {
            break;
        };
        let j = (i + 1..n).rev().find(|&j| idx[j] > idx[i]).unwrap_or(i + 1);
        idx.swap(i, j);
        idx[i + 1..].reverse();
        out.push(idx.iter().map(|&k| base[k]).collect());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutations_count_and_order() {
        let p = permutations(&[3, 1, 2]);
        assert_eq!(
            p,
            vec![
                vec![3, 1, 2],
                vec![3, 2, 1],
                vec![1, 3, 2],
                vec![1, 2, 3],
                vec![2, 3, 1],
                vec![2, 1, 3],
            ]
        );
        assert_eq!(permutations(&[4, 5, 3, 6, 2, 7, 8, 9]).len(), 40_320);
    }

    #[test]
    fn learned_weights_stay_normalized() {
        let mut w = FeatureWeights::default();
        w.learn([1.0, 0.0, 0.0, 0.0], true, 0.1);
        let sum: f64 = w.as_array().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(w.fullness > 0.35);
        assert!(w.few_merges < 0.25);

        let before = w;
        w.learn([0.0, 0.0, 1.0, 0.0], false, 0.1);
        assert!(w.entropy < before.entropy);
        assert!(w.fullness > before.fullness);
    }

    #[test]
    fn short_first_keeps_relative_order() {
        assert_eq!(short_first(&[4, 5, 3, 6, 2, 7]), vec![3, 2, 4, 5, 6, 7]);
    }
}
