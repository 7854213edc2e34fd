use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::chain::Chain;
use crate::types::{is_compatible, Cell, Dir, COLS, ROWS};

/// Where the positional bonus pulls chains towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Center,
    Corner,
}

/// Cell the max tile should live in (bottom-left).
pub const TARGET_CORNER: Cell = Cell { row: (ROWS - 1) as u8, col: 0 };

const CENTER: Cell = Cell { row: (ROWS / 2) as u8, col: (COLS / 2) as u8 };

/// Heuristic coefficients. Every field falls back to its default when absent
/// from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub length_bonus: f64,
    pub small_tile_max: i32,
    pub small_tile_bonus: f64,
    pub length_soft_cap: usize,
    pub length_penalty_step: f64,
    pub anchor: Anchor,
    pub position_scale: f64,
    pub bridge_base: f64,
    pub bridge_tier: i32,
    pub cleanup_bonus: f64,
    pub isolation_min_value: i32,
    pub isolation_base: f64,
    pub straight_bonus: f64,
    pub open_cell_coef: f64,
    pub pair_coef: f64,
    pub connectivity_min_neighbors: usize,
    pub connectivity_penalty: f64,
    pub empty_space: bool,
    pub corner_terms: bool,
    pub corner_toward: f64,
    pub corner_away: f64,
    pub growth_bonus: f64,
    pub corner_tier: i32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            length_bonus: 100.0,
            small_tile_max: 16,
            small_tile_bonus: 100.0,
            length_soft_cap: 5,
            length_penalty_step: 40.0,
            anchor: Anchor::Center,
            position_scale: 3.0,
            bridge_base: 20.0,
            bridge_tier: 64,
            cleanup_bonus: 5.0,
            isolation_min_value: 128,
            isolation_base: 30.0,
            straight_bonus: 20.0,
            open_cell_coef: 8.0,
            pair_coef: 40.0,
            connectivity_min_neighbors: 3,
            connectivity_penalty: 15.0,
            empty_space: true,
            corner_terms: true,
            corner_toward: 100.0,
            corner_away: 120.0,
            growth_bonus: 200.0,
            corner_tier: 1024,
        }
    }
}

/// Every term of one evaluation. Penalties are stored as positive magnitudes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub length: f64,
    pub small_tiles: f64,
    pub length_penalty: f64,
    pub position: f64,
    pub bridge_penalty: f64,
    pub cleanup: f64,
    pub isolation_penalty: f64,
    pub straight: f64,
    pub lookahead: f64,
    pub connectivity_penalty: f64,
    pub empty_space: f64,
    pub corner: f64,
    pub growth: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base + self.length + self.small_tiles + self.position + self.cleanup + self.straight
            + self.lookahead
            + self.empty_space
            + self.corner
            + self.growth
            - self.length_penalty
            - self.bridge_penalty
            - self.isolation_penalty
            - self.connectivity_penalty
    }
}

#[inline]
fn tier(value: i32, step: i32) -> f64 {
    if step <= 0 {
        return 1.0;
    }
    f64::from((value / step).max(1))
}

/// Chain scoring against a fixed weight table. Higher is better.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    weights: Weights,
}

impl Evaluator {
    #[inline]
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    #[inline]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    #[inline]
    pub fn score(&self, board: &Board, chain: &Chain) -> f64 {
        self.breakdown(board, chain).total()
    }

    pub fn breakdown(&self, board: &Board, chain: &Chain) -> ScoreBreakdown {
        let w = &self.weights;
        let len = chain.len();
        let mut s = ScoreBreakdown {
            base: chain.values(board).map(f64::from).sum(),
            length: len as f64 * w.length_bonus,
            ..ScoreBreakdown::default()
        };

        s.small_tiles = chain.values(board).filter(|&v| v > 0 && v <= w.small_tile_max).count()
            as f64
            * w.small_tile_bonus;

        if len > w.length_soft_cap {
            s.length_penalty = (len - w.length_soft_cap) as f64 * w.length_penalty_step;
        }

        let anchor = match w.anchor {
            Anchor::Center => CENTER,
            Anchor::Corner => TARGET_CORNER,
        };
        let position: u32 = chain
            .cells()
            .iter()
            .map(|&c| 10u32.saturating_sub(c.manhattan(anchor) * 2))
            .sum();
        s.position = f64::from(position) * w.position_scale;

        s.bridge_penalty = self.bridge_penalty(board, chain);

        let mut empty_neighbors = 0usize;
        for &cell in chain.cells() {
            empty_neighbors += Dir::all()
                .into_iter()
                .filter_map(|d| cell.step(d))
                .filter(|&n| board.is_empty_at(n))
                .count();
        }
        s.cleanup = empty_neighbors as f64 * w.cleanup_bonus;

        s.isolation_penalty = self.isolation_penalty(board, chain);

        if chain.is_straight() {
            s.straight = w.straight_bonus;
        }

        let after = board.without(chain.cells());
        s.lookahead = after.filled_count() as f64 * w.open_cell_coef
            + after.compatible_pairs() as f64 * w.pair_coef;

        let crowded = chain
            .cells()
            .iter()
            .filter(|&&c| {
                Board::orthogonal_neighbors(c)
                    .into_iter()
                    .flatten()
                    .filter(|&n| !board.is_empty_at(n))
                    .count()
                    >= w.connectivity_min_neighbors
            })
            .count();
        s.connectivity_penalty = crowded as f64 * w.connectivity_penalty;

        if w.empty_space {
            let empty_after = after.empty_count();
            s.empty_space = if empty_after < 3 {
                -150.0
            } else if empty_after < 5 {
                -50.0
            } else {
                (empty_after as f64 * 5.0).min(100.0)
            };
        }

        if w.corner_terms {
            let (pos_before, max_before) = board.max_tile();
            let (pos_after, max_after) = after.max_tile();
            let t = if w.corner_tier > 0 { f64::from(max_after / w.corner_tier) } else { 0.0 };
            let d_before = pos_before.manhattan(TARGET_CORNER);
            let d_after = pos_after.manhattan(TARGET_CORNER);
            if d_after < d_before {
                s.corner = w.corner_toward * t;
            } else if d_after > d_before {
                s.corner = -w.corner_away * t;
            }
            if max_after > max_before {
                s.growth = w.growth_bonus * t;
            }
        }

        s
    }

    /// Removing a cell breaks pairs it formed with outside neighbors. Neighbors
    /// left with a single partner are hit twice as hard.
    fn bridge_penalty(&self, board: &Board, chain: &Chain) -> f64 {
        let w = &self.weights;
        let mut total = 0.0;
        for &cell in chain.cells() {
            let v = board.get(cell);
            for n in Board::orthogonal_neighbors(cell).into_iter().flatten() {
                if chain.contains(n) {
                    continue;
                }
                let nv = board.get(n);
                if nv <= 0 || !is_compatible(v, nv) {
                    continue;
                }
                let mut p = w.bridge_base * tier(v, w.bridge_tier);
                if board.compatible_partners(n) == 1 {
                    p *= 2.0;
                }
                total += p;
            }
        }
        total
    }

    fn isolation_penalty(&self, board: &Board, chain: &Chain) -> f64 {
        let w = &self.weights;
        let mut total = 0.0;
        for v in chain.values(board) {
            if v < w.isolation_min_value {
                continue;
            }
            let survives = board.iter().any(|(c, bv)| bv == v && !chain.contains(c));
            if !survives {
                total += w.isolation_base * tier(v, w.isolation_min_value);
            }
        }
        total
    }
}
