//! Run Fingerprints
//!
//! Deterministic SHA-256 digests of run state. Co-op peers exchange the
//! hex digest in sync payloads to check whether they are on the same beat
//! of the same seed.

use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for run state.
///
/// Order of updates is part of the fingerprint format.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for run state.
    pub fn for_run_state() -> Self {
        Self::new(b"HALO_RUN_STATE_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a length-prefixed string.
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Update with a length-prefixed list of strings.
    pub fn update_str_list<S: AsRef<str>>(&mut self, values: &[S]) {
        self.update_u32(values.len() as u32);
        for value in values {
            self.update_str(value.as_ref());
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute a run fingerprint.
///
/// Seed position is always hashed first; the closure adds the run fields.
pub fn compute_state_hash<F>(seed_hash: u32, cursor: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_run_state();
    hasher.update_u32(seed_hash);
    hasher.update_u64(cursor);
    add_state(&mut hasher);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_determinism() {
        let h1 = compute_state_hash(42, 7, |h| {
            h.update_i32(-3);
            h.update_str("sovereign");
        });
        let h2 = compute_state_hash(42, 7, |h| {
            h.update_i32(-3);
            h.update_str("sovereign");
        });
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_cursor_changes_hash() {
        let h1 = compute_state_hash(42, 7, |_| {});
        let h2 = compute_state_hash(42, 8, |_| {});
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_string_lists_are_length_prefixed() {
        let h1 = compute_state_hash(1, 1, |h| h.update_str_list(&["ab", "c"]));
        let h2 = compute_state_hash(1, 1, |h| h.update_str_list(&["a", "bc"]));
        assert_ne!(h1, h2);
    }
}
