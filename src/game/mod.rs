//! Game Logic Module
//!
//! The meta-game and the run engine. Deterministic given a seed position:
//! every random choice draws from `GameState::rng`.
//!
//! ## Module Structure
//!
//! - `config`: Tunable constants (`Rules`)
//! - `catalog`: Cards, elements, dice, themes
//! - `state`: Aggregate game state, wallet, logs
//! - `collection`: Owned cards and deck legality
//! - `gacha`: Rarity rolls and pack pulls
//! - `encounter`: Encounter generation
//! - `run`: Run lifecycle and piles
//! - `resolve`: Card effect resolution
//! - `beat`: Play/beat loop and replays
//! - `events`: Run events for replay and feedback

pub mod config;
pub mod catalog;
pub mod state;
pub mod collection;
pub mod gacha;
pub mod encounter;
pub mod run;
pub mod resolve;
pub mod beat;
pub mod events;

// Re-export key types
pub use config::{Difficulty, PackDef, Rules, RulesError};
pub use catalog::{card_by_id, Card, Effect, Element, Rarity, ARCHETYPES};
pub use state::{Currencies, Currency, GameState, LogEntry, OnlineState};
pub use collection::{add_card_to_deck, ensure_deck_legal, remove_card_from_deck, Collection};
pub use gacha::{pull_pack, GachaPull, PullError};
pub use encounter::{next_encounter, Encounter, OracleRoll};
pub use run::{cash_out, end_run, start_run, start_run_with_seed, Run, RunEnd, RunSummary};
pub use resolve::{resolve_card, CardOutcome};
pub use beat::{play_card, replay_run, resolve_beat, BeatResult, RunAction};
pub use events::{RunEvent, RunEventData};
