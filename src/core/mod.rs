//! Core deterministic primitives.
//!
//! Everything the run engine draws from lives here: the seeded float
//! stream and the run fingerprint hasher.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::{SeedState, hash_seed, generate_seed};
pub use hash::{StateHash, StateHasher, compute_state_hash};
