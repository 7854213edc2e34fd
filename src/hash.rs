use std::fmt;
use std::sync::OnceLock;

use rand::Rng;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::Board;
use crate::rng::{table_rng, DEFAULT_HASH_SEED};
use crate::types::{CELLS, MAX_VALUE};

/// 64-bit board fingerprint. Persisted as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    #[inline]
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Parse 1 to 16 lowercase hex digits. Signs, whitespace and uppercase are rejected.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 16 || !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return None;
        }
        u64::from_str_radix(s, 16).ok().map(Fingerprint)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct FingerprintVisitor;

impl<'de> Visitor<'de> for FingerprintVisitor {
    type Value = Fingerprint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a hex-encoded 64-bit fingerprint")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Fingerprint::from_hex(v).ok_or_else(|| E::custom(format!("invalid fingerprint '{v}'")))
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(FingerprintVisitor)
    }
}

const VALUES: usize = MAX_VALUE as usize + 1;

/// Zobrist table: one random token per (cell, clamped value).
pub struct ZobristTable {
    seed: u64,
    tokens: Box<[u64]>,
}

impl ZobristTable {
    pub fn new(seed: u64) -> Self {
        let mut rng = table_rng(seed);
        let tokens: Vec<u64> = (0..CELLS * VALUES).map(|_| rng.gen::<u64>()).collect();
        Self { seed, tokens: tokens.into_boxed_slice() }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn token(&self, cell_idx: usize, value: i32) -> u64 {
        let v = value.clamp(0, MAX_VALUE) as usize;
        self.tokens[cell_idx * VALUES + v]
    }

    /// XOR-fold of the tokens of every cell, empty cells included (as value 0).
    pub fn fingerprint(&self, board: &Board) -> Fingerprint {
        let mut z = 0u64;
        for (cell, v) in board.iter() {
            z ^= self.token(cell.index(), v);
        }
        Fingerprint(z)
    }
}

impl fmt::Debug for ZobristTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZobristTable")
            .field("seed", &self.seed)
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

static DEFAULT_TABLE: OnceLock<ZobristTable> = OnceLock::new();

/// Process-wide table built from [`DEFAULT_HASH_SEED`] on first use.
#[inline]
pub fn default_table() -> &'static ZobristTable {
    DEFAULT_TABLE.get_or_init(|| ZobristTable::new(DEFAULT_HASH_SEED))
}

#[inline]
pub fn fingerprint(board: &Board) -> Fingerprint {
    default_table().fingerprint(board)
}
