//! Deterministic Random Number Generator
//!
//! A seed string is hashed to a positive 32-bit integer; the stream is then
//! `frac(sin(seed_hash + cursor) * 10000)` with a cursor that advances on
//! every draw. Given the same `(seed_hash, cursor)` pair, the stream is
//! identical on every client, which is what co-op sessions rely on.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alphabet used for generated seeds (no 0/O, 1/I/L ambiguity).
const SEED_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Prefix for generated seeds.
pub const SEED_PREFIX: &str = "HALO-";

/// Deterministic float stream driven by a hashed seed and a cursor.
///
/// # Determinism Guarantee
///
/// The output is a pure function of `(seed_hash, cursor)`. Two states built
/// from the same seed string produce the same sequence, and a state
/// restored from a checkpoint continues exactly where it left off.
///
/// # Example
///
/// ```
/// use halo::core::rng::SeedState;
///
/// let mut a = SeedState::from_seed("HALO-TEST1");
/// let mut b = SeedState::from_seed("HALO-TEST1");
/// assert_eq!(a.next(), b.next());
/// assert_eq!(a.cursor(), 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedState {
    seed_hash: u32,
    cursor: u64,
}

impl Default for SeedState {
    fn default() -> Self {
        Self::from_seed("")
    }
}

impl SeedState {
    /// Create a stream from a seed string, cursor at 1.
    pub fn from_seed(seed: &str) -> Self {
        Self {
            seed_hash: hash_seed(seed),
            cursor: 1,
        }
    }

    /// Rebuild a stream from a checkpoint.
    pub fn from_parts(seed_hash: u32, cursor: u64) -> Self {
        Self { seed_hash, cursor }
    }

    /// Point the stream at a new seed and reset the cursor to 1.
    pub fn reseed(&mut self, seed: &str) {
        self.seed_hash = hash_seed(seed);
        self.cursor = 1;
    }

    /// Hashed seed.
    pub fn seed_hash(&self) -> u32 {
        self.seed_hash
    }

    /// Number of the next draw (starts at 1).
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Draw the next float in `[0, 1)` and advance the cursor.
    ///
    /// Floating point rounding can push the fractional part of a tiny
    /// negative product up to exactly `1.0`; callers that index with the
    /// result must clamp (see [`SeedState::pick_one`]).
    pub fn next(&mut self) -> f64 {
        let raw = ((self.seed_hash as f64) + (self.cursor as f64)).sin() * 10000.0;
        self.cursor += 1;
        raw - raw.floor()
    }

    /// Draw an index in `[0, len)`. Returns 0 for `len == 0` without drawing.
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let idx = (self.next() * len as f64).floor() as usize;
        idx.min(len - 1)
    }

    /// Roll a die with `sides` faces, result in `[1, sides]`.
    pub fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        let roll = (self.next() * sides as f64).floor() as u32 + 1;
        roll.min(sides)
    }

    /// Select a uniformly random element.
    ///
    /// Consumes exactly one draw for a non-empty slice; an empty slice
    /// returns `None` and leaves the cursor untouched.
    pub fn pick_one<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        let idx = self.next_index(slice.len());
        slice.get(idx)
    }

    /// Fisher-Yates shuffle into a new vector.
    ///
    /// Consumes exactly `len - 1` draws (none for fewer than two items).
    pub fn shuffle<T: Clone>(&mut self, slice: &[T]) -> Vec<T> {
        let mut out = slice.to_vec();
        for i in (1..out.len()).rev() {
            let j = self.next_index(i + 1);
            out.swap(i, j);
        }
        out
    }
}

/// Polynomial rolling hash over UTF-16 code units (`h = h * 31 + c`),
/// wrapped to 32 bits, then `|h| + 1` so the result is never zero.
pub fn hash_seed(seed: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in seed.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    hash.unsigned_abs() + 1
}

/// Generate a fresh, non-deterministic seed such as `HALO-7KQ2ZP`.
pub fn generate_seed() -> String {
    let mut rng = rand::thread_rng();
    let mut out = String::from(SEED_PREFIX);
    for _ in 0..6 {
        let idx = rng.gen_range(0..SEED_ALPHABET.len());
        out.push(SEED_ALPHABET[idx] as char);
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = SeedState::from_seed("HALO-TEST1");
        let mut rng2 = SeedState::from_seed("HALO-TEST1");

        for _ in 0..1000 {
            assert_eq!(rng1.next().to_bits(), rng2.next().to_bits());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SeedState::from_seed("HALO-AAAAAA");
        let mut rng2 = SeedState::from_seed("HALO-BBBBBB");

        assert_ne!(rng1.next(), rng2.next());
    }

    #[test]
    fn test_hash_seed_known_values() {
        // These values must never change or shared seeds stop lining up.
        assert_eq!(hash_seed(""), 1);
        assert_eq!(hash_seed("a"), 98);
        assert_eq!(hash_seed("HALO-TEST1"), 713_554_675);
    }

    #[test]
    fn test_hash_seed_min_value_does_not_overflow() {
        // Any input is fine; the point is that |i32::MIN| + 1 fits in u32.
        assert_eq!(i32::MIN.unsigned_abs() + 1, 2_147_483_649);
        assert!(hash_seed("overflow-check-overflow-check") >= 1);
    }

    #[test]
    fn test_known_values() {
        let mut rng = SeedState::from_seed("HALO-TEST1");
        let first = rng.next();
        let second = rng.next();
        assert!((first - 0.416_417_403_541_345_27).abs() < 1e-9);
        assert!((second - 0.752_582_126_580_932_7).abs() < 1e-9);
    }

    #[test]
    fn test_cursor_advances_per_draw() {
        let mut rng = SeedState::from_seed("HALO-TEST1");
        assert_eq!(rng.cursor(), 1);
        rng.next();
        rng.next();
        assert_eq!(rng.cursor(), 3);

        rng.reseed("HALO-OTHER");
        assert_eq!(rng.cursor(), 1);
        assert_eq!(rng.seed_hash(), hash_seed("HALO-OTHER"));
    }

    #[test]
    fn test_next_in_unit_range() {
        let mut rng = SeedState::from_seed("range");
        for _ in 0..10_000 {
            let v = rng.next();
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_pick_one_bounds_and_empty() {
        let mut rng = SeedState::from_seed("pick");
        let items = [1, 2, 3];
        for _ in 0..1000 {
            assert!(rng.pick_one(&items).is_some());
        }

        let before = rng.cursor();
        let empty: [u8; 0] = [];
        assert_eq!(rng.pick_one(&empty), None);
        assert_eq!(rng.cursor(), before);
    }

    #[test]
    fn test_roll_die_bounds() {
        let mut rng = SeedState::from_seed("dice");
        for _ in 0..1000 {
            let roll = rng.roll_die(22);
            assert!((1..=22).contains(&roll));
        }
        assert_eq!(rng.roll_die(0), 0);
    }

    #[test]
    fn test_shuffle_determinism_and_draw_count() {
        let mut rng1 = SeedState::from_seed("shuffle");
        let mut rng2 = SeedState::from_seed("shuffle");

        let items = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let a = rng1.shuffle(&items);
        let b = rng2.shuffle(&items);
        assert_eq!(a, b);
        assert_eq!(rng1.cursor(), 1 + 9);

        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, items.to_vec());

        let before = rng1.cursor();
        assert!(rng1.shuffle::<u8>(&[]).is_empty());
        assert_eq!(rng1.shuffle(&[7]), vec![7]);
        assert_eq!(rng1.cursor(), before);
    }

    #[test]
    fn test_state_checkpoint() {
        let mut rng = SeedState::from_seed("checkpoint");
        for _ in 0..50 {
            rng.next();
        }

        let saved = SeedState::from_parts(rng.seed_hash(), rng.cursor());
        let next_values: Vec<u64> = (0..10).map(|_| rng.next().to_bits()).collect();

        let mut restored = saved;
        for expected in next_values {
            assert_eq!(restored.next().to_bits(), expected);
        }
    }

    #[test]
    fn test_generate_seed_shape() {
        let seed = generate_seed();
        assert!(seed.starts_with(SEED_PREFIX));
        assert_eq!(seed.len(), SEED_PREFIX.len() + 6);
        assert!(seed[SEED_PREFIX.len()..]
            .bytes()
            .all(|b| SEED_ALPHABET.contains(&b)));
    }
}
