use serde::{Deserialize, Serialize};

use crate::types::{is_compatible, Cell, Dir, CELLS, COLS, ROWS};

/// Recognized tile grid. Values <= 0 mean "empty".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i32>>", into = "Vec<Vec<i32>>")]
pub struct Board {
    // Cells laid out row-major (r*COLS + c)
    cells: [i32; CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self { cells: [0; CELLS] }
    }
}

impl Board {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_rows(rows: [[i32; COLS]; ROWS]) -> Self {
        let mut b = Self::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                b.cells[r * COLS + c] = v;
            }
        }
        b
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> i32 {
        self.cells[cell.index()]
    }

    #[inline]
    pub fn set(&mut self, cell: Cell, value: i32) {
        self.cells[cell.index()] = value;
    }

    #[inline]
    pub fn is_empty_at(&self, cell: Cell) -> bool {
        self.get(cell) <= 0
    }

    /// Iterate all cells with their value, row-major.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Cell, i32)> + '_ {
        self.cells.iter().enumerate().map(|(i, &v)| (Cell::from_index(i), v))
    }

    #[inline]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v > 0).count()
    }

    #[inline]
    pub fn empty_count(&self) -> usize {
        CELLS - self.filled_count()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled_count() == CELLS
    }

    /// First cell (row-major) holding the maximum value, with that value.
    /// An all-empty board reports (0, 0) with value 0.
    pub fn max_tile(&self) -> (Cell, i32) {
        let max = self.cells.iter().copied().fold(0, i32::max);
        let idx = self.cells.iter().position(|&v| v == max).unwrap_or(0);
        (Cell::from_index(idx), max)
    }

    /// Copy with the given cells marked empty (no gravity, no refill).
    pub fn without(&self, cells: &[Cell]) -> Board {
        let mut b = *self;
        for &cell in cells {
            b.set(cell, 0);
        }
        b
    }

    /// Orthogonal neighbors in [East, South, West, North] order; None means off-board.
    #[inline]
    pub fn orthogonal_neighbors(cell: Cell) -> [Option<Cell>; 4] {
        Dir::orthogonal().map(|d| cell.step(d))
    }

    /// Number of orthogonal neighbors compatible with the tile at `cell`.
    pub fn compatible_partners(&self, cell: Cell) -> usize {
        let v = self.get(cell);
        if v <= 0 {
            return 0;
        }
        Self::orthogonal_neighbors(cell)
            .into_iter()
            .flatten()
            .filter(|&n| {
                let nv = self.get(n);
                nv > 0 && is_compatible(v, nv)
            })
            .count()
    }

    /// Orthogonal compatible pairs, each pair counted once (right and down links).
    pub fn compatible_pairs(&self) -> usize {
        let mut n = 0;
        for (cell, v) in self.iter() {
            if v <= 0 {
                continue;
            }
            for d in [Dir::East, Dir::South] {
                if let Some(other) = cell.step(d) {
                    let ov = self.get(other);
                    if ov > 0 && is_compatible(v, ov) {
                        n += 1;
                    }
                }
            }
        }
        n
    }

    /// Orthogonal pairs of equal tiles, each pair counted once.
    pub fn equal_pairs(&self) -> usize {
        let mut n = 0;
        for (cell, v) in self.iter() {
            if v <= 0 {
                continue;
            }
            for d in [Dir::East, Dir::South] {
                if let Some(other) = cell.step(d) {
                    if self.get(other) == v {
                        n += 1;
                    }
                }
            }
        }
        n
    }

    /// Board is full and no two orthogonal neighbors can merge.
    pub fn is_game_lost(&self) -> bool {
        self.is_full() && self.compatible_pairs() == 0
    }
}

impl TryFrom<Vec<Vec<i32>>> for Board {
    type Error = String;

    fn try_from(rows: Vec<Vec<i32>>) -> Result<Self, Self::Error> {
        if rows.len() != ROWS {
            return Err(format!("expected {ROWS} rows, got {}", rows.len()));
        }
        let mut b = Board::new();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != COLS {
                return Err(format!("row {r}: expected {COLS} columns, got {}", row.len()));
            }
            for (c, &v) in row.iter().enumerate() {
                b.cells[r * COLS + c] = v;
            }
        }
        Ok(b)
    }
}

impl From<Board> for Vec<Vec<i32>> {
    fn from(b: Board) -> Self {
        b.cells.chunks(COLS).map(<[i32]>::to_vec).collect()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(COLS) {
            for &v in row {
                if v > 0 {
                    write!(f, "{v:>6}")?;
                } else {
                    write!(f, "{:>6}", ".")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
