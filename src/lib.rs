//! # HALO Engine
//!
//! Deterministic run engine, gacha economy and co-op relay for HALO.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        HALO ENGINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seed hash and sin-based float stream      │
//! │  └── hash.rs     - Run fingerprints                          │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── config.rs   - Tunable rules                             │
//! │  ├── catalog.rs  - Cards, elements, oracle dice              │
//! │  ├── state.rs    - Game state, wallet, logs                  │
//! │  ├── collection.rs - Ownership and deck legality             │
//! │  ├── gacha.rs    - Packs, pity, VIP                          │
//! │  ├── encounter.rs- Encounter generation                      │
//! │  ├── run.rs      - Run lifecycle and piles                   │
//! │  ├── resolve.rs  - Card effects                              │
//! │  ├── beat.rs     - Beat loop and replays                     │
//! │  └── events.rs   - Run events                                │
//! │                                                              │
//! │  persist/        - Save slots over key-value stores          │
//! │                                                              │
//! │  network/        - Relay (non-deterministic)                 │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── room.rs     - Room membership                           │
//! │  ├── server.rs   - WebSocket relay server                    │
//! │  └── client.rs   - Relay client boundary                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic given a seed position:
//! - Every random choice draws from `GameState::rng`
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - Timestamps only touch log entries, never game decisions
//!
//! Given the same seed, cursor, state and actions, a run produces the
//! same piles, encounters and fingerprint.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod persist;

// Re-export commonly used types
pub use core::rng::{generate_seed, hash_seed, SeedState, SEED_PREFIX};
pub use core::hash::StateHash;
pub use game::config::Rules;
pub use game::state::GameState;
pub use game::run::{start_run, end_run, RunEnd};
pub use game::beat::{play_card, resolve_beat, replay_run, RunAction};
pub use persist::{Persistence, SaveSlot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
