use rand::SeedableRng;
use rand_pcg::Pcg64;

/// Seed of the default hash table. Changing it invalidates every persisted fingerprint.
pub const DEFAULT_HASH_SEED: u64 = 2248;

/// Deterministic RNG used to fill hash tables.
///
/// The same seed yields the same sequence across runs and platforms, which keeps
/// persisted fingerprints valid between sessions.
#[inline]
pub fn table_rng(seed: u64) -> Pcg64 {
    Pcg64::seed_from_u64(seed)
}
