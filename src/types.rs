use serde::{Deserialize, Serialize};

/// Board dimensions (5 rows x 4 columns).
pub const ROWS: usize = 5;
pub const COLS: usize = 4;
pub const CELLS: usize = ROWS * COLS;

/// Largest tile value that gets its own hash token; bigger values share the last one.
pub const MAX_VALUE: i32 = 4096;

/// Board coordinate. Deserialization goes through the same bounds check as [`Cell::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCell")]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

#[derive(Deserialize)]
struct RawCell {
    row: u8,
    col: u8,
}

impl TryFrom<RawCell> for Cell {
    type Error = String;

    fn try_from(raw: RawCell) -> Result<Self, Self::Error> {
        Cell::new(raw.row as usize, raw.col as usize)
            .ok_or_else(|| format!("cell ({}, {}) is off the {ROWS}x{COLS} board", raw.row, raw.col))
    }
}

impl Cell {
    #[inline]
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < ROWS && col < COLS {
            Some(Self { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        debug_assert!(idx < CELLS);
        Self { row: (idx / COLS) as u8, col: (idx % COLS) as u8 }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.row as usize * COLS + self.col as usize
    }

    #[inline]
    pub fn bit(self) -> u32 {
        1u32 << self.index()
    }

    /// Neighbor in direction `dir`, or None when it falls off the board.
    #[inline]
    pub fn step(self, dir: Dir) -> Option<Cell> {
        let (dr, dc) = dir.delta();
        let r = self.row as i32 + dr;
        let c = self.col as i32 + dc;
        if r < 0 || c < 0 {
            return None;
        }
        Cell::new(r as usize, c as usize)
    }

    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        (self.row as i32 - other.row as i32).unsigned_abs()
            + (self.col as i32 - other.col as i32).unsigned_abs()
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    East,
    South,
    West,
    North,
    SouthEast,
    SouthWest,
    NorthEast,
    NorthWest,
}

impl Dir {
    /// All eight directions in exploration order.
    #[inline]
    pub fn all() -> [Dir; 8] {
        [
            Dir::East,
            Dir::South,
            Dir::West,
            Dir::North,
            Dir::SouthEast,
            Dir::SouthWest,
            Dir::NorthEast,
            Dir::NorthWest,
        ]
    }

    #[inline]
    pub fn orthogonal() -> [Dir; 4] {
        [Dir::East, Dir::South, Dir::West, Dir::North]
    }

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::East => (0, 1),
            Dir::South => (1, 0),
            Dir::West => (0, -1),
            Dir::North => (-1, 0),
            Dir::SouthEast => (1, 1),
            Dir::SouthWest => (1, -1),
            Dir::NorthEast => (-1, 1),
            Dir::NorthWest => (-1, -1),
        }
    }
}

/// Merge compatibility: equal, or one exactly double the other.
#[inline]
pub fn is_compatible(a: i32, b: i32) -> bool {
    a == b || a.checked_mul(2) == Some(b) || b.checked_mul(2) == Some(a)
}
