use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::types::Cell;

/// Identity of a move for blacklisting: length plus endpoints.
///
/// The interior path is not part of the key, so two chains with the same
/// endpoints and length share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MoveKey {
    pub length: u8,
    pub start: Cell,
    pub end: Cell,
}

impl std::fmt::Display for MoveKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "len={} {}->{}", self.length, self.start, self.end)
    }
}

/// Ordered path of adjacent, merge-compatible cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct Chain {
    cells: Vec<Cell>,
    mask: u32,
}

impl Chain {
    /// Build from an ordered cell list. Returns None when shorter than 2 or a
    /// coordinate repeats.
    pub fn new(cells: Vec<Cell>) -> Option<Self> {
        if cells.len() < 2 {
            return None;
        }
        let mut mask = 0u32;
        for c in &cells {
            if mask & c.bit() != 0 {
                return None;
            }
            mask |= c.bit();
        }
        Some(Self { cells, mask })
    }

    #[inline]
    pub(crate) fn from_parts(cells: Vec<Cell>, mask: u32) -> Self {
        Self { cells, mask }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Bitmask over board cells (bit = row*COLS + col).
    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.mask() & cell.bit() != 0
    }

    #[inline]
    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    #[inline]
    pub fn end(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    #[inline]
    pub fn key(&self) -> MoveKey {
        MoveKey { length: self.cells.len() as u8, start: self.start(), end: self.end() }
    }

    /// All steps share one direction vector.
    pub fn is_straight(&self) -> bool {
        let step = |a: Cell, b: Cell| (b.row as i32 - a.row as i32, b.col as i32 - a.col as i32);
        let first = step(self.cells[0], self.cells[1]);
        self.cells.windows(2).all(|w| step(w[0], w[1]) == first)
    }

    #[inline]
    pub fn values<'a>(&'a self, board: &'a Board) -> impl Iterator<Item = i32> + 'a {
        self.cells.iter().map(move |&c| board.get(c))
    }
}

impl TryFrom<Vec<Cell>> for Chain {
    type Error = String;

    fn try_from(cells: Vec<Cell>) -> Result<Self, Self::Error> {
        let n = cells.len();
        Chain::new(cells).ok_or_else(|| format!("invalid chain of {n} cells"))
    }
}

impl From<Chain> for Vec<Cell> {
    fn from(chain: Chain) -> Self {
        chain.cells
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.cells.iter().map(Cell::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
