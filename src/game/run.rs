//! Run Lifecycle
//!
//! A run owns three piles (draw, hand, discard) that partition its card
//! ids, the current encounter and the bounded stats. Runs start from the
//! legalized deck and end banked, crashed or victorious; ending pays out
//! and clears the run.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::SeedState;
use crate::game::collection::ensure_deck_legal;
use crate::game::config::{Difficulty, Rules};
use crate::game::encounter::{next_encounter, Encounter};
use crate::game::state::{Currency, GameState, LogEntry, LogKind};

// =============================================================================
// TYPES
// =============================================================================

/// Run status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Accepting plays and beats.
    #[default]
    Running,
    /// Aegis broke or doom maxed out.
    Crashed,
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunEnd {
    /// Player cashed out.
    Banked,
    /// Run crashed.
    Crashed,
    /// Run won; pays extra embers.
    Victory,
}

impl fmt::Display for RunEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunEnd::Banked => "banked",
            RunEnd::Crashed => "crashed",
            RunEnd::Victory => "victory",
        })
    }
}

/// A depth marked on the route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMarker {
    /// Depth at which the mark was placed.
    pub depth: u32,
    /// Marker label.
    pub note: String,
}

/// An active run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Status.
    pub status: RunStatus,
    /// Beats survived.
    pub depth: u32,
    /// Momentum stat.
    pub momentum: i32,
    /// Aegis stat; reaching 0 crashes the run.
    pub aegis: i32,
    /// Doom stat; reaching the maximum crashes the run.
    pub doom: i32,
    /// Cards still to draw, front first.
    pub draw_pile: Vec<String>,
    /// Playable cards.
    pub hand: Vec<String>,
    /// Played and discarded cards.
    pub discard: Vec<String>,
    /// Encounter of the current beat.
    pub current: Encounter,
    /// Most recently revealed encounter.
    #[serde(default)]
    pub last_omen: Option<Encounter>,
    /// Marked depths.
    #[serde(default)]
    pub route: Vec<RouteMarker>,
}

impl Run {
    /// Whether the run still accepts plays and beats.
    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    /// Every card id of the run, across all three piles.
    pub fn all_cards(&self) -> impl Iterator<Item = &String> {
        self.draw_pile
            .iter()
            .chain(self.hand.iter())
            .chain(self.discard.iter())
    }

    /// Whether a crash condition holds.
    pub fn should_crash(&self, rules: &Rules) -> bool {
        self.aegis <= rules.aegis.min || self.doom >= rules.doom.max
    }
}

/// Payout and final stats of an ended run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Why the run ended.
    pub reason: RunEnd,
    /// Final depth.
    pub depth: u32,
    /// Final momentum.
    pub momentum: i32,
    /// Final aegis.
    pub aegis: i32,
    /// Final doom.
    pub doom: i32,
    /// Credits paid.
    pub credits: u64,
    /// Embers paid.
    pub embers: u64,
}

// =============================================================================
// PILES
// =============================================================================

/// Draw up to `count` cards into the hand.
///
/// An empty draw pile is refilled by shuffling the discard pile; when both
/// are empty drawing stops early. Returns the number of cards drawn.
pub fn draw_cards(run: &mut Run, rng: &mut SeedState, count: u32) -> u32 {
    draw_into(&mut run.draw_pile, &mut run.hand, &mut run.discard, rng, count)
}

fn draw_into(
    draw_pile: &mut Vec<String>,
    hand: &mut Vec<String>,
    discard: &mut Vec<String>,
    rng: &mut SeedState,
    count: u32,
) -> u32 {
    let mut drawn = 0;
    for _ in 0..count {
        if draw_pile.is_empty() {
            *draw_pile = rng.shuffle(discard);
            discard.clear();
        }
        if draw_pile.is_empty() {
            break;
        }
        hand.push(draw_pile.remove(0));
        drawn += 1;
    }
    drawn
}

/// Doom gained at the end of a beat: one for negative momentum, one for a
/// broken aegis.
pub fn doom_tick(run: &Run) -> i32 {
    let mut inc = 0;
    if run.momentum < 0 {
        inc += 1;
    }
    if run.aegis <= 0 {
        inc += 1;
    }
    inc
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Build a fresh run: shuffle the deck, draw a hand, roll an encounter.
fn base_run(deck: &[String], difficulty: Difficulty, rng: &mut SeedState, rules: &Rules) -> Run {
    let start = rules.difficulties.get(difficulty);
    let mut draw_pile = rng.shuffle(deck);
    let mut hand = Vec::new();
    let mut discard = Vec::new();
    draw_into(&mut draw_pile, &mut hand, &mut discard, rng, rules.hand_size as u32);
    let current = next_encounter(rng, rules);

    Run {
        status: RunStatus::Running,
        depth: 0,
        momentum: rules.momentum.clamp(start.momentum),
        aegis: rules.aegis.clamp(start.aegis),
        doom: rules.doom.clamp(start.doom),
        draw_pile,
        hand,
        discard,
        current,
        last_omen: None,
        route: Vec::new(),
    }
}

/// Start a run on the current seed position, replacing any active run.
pub fn start_run(state: &mut GameState, rules: &Rules) {
    state.deck = ensure_deck_legal(&state.deck, &state.collection, rules);
    let run = base_run(&state.deck, state.profile.difficulty, &mut state.rng, rules);

    info!(
        seed = %state.profile.seed,
        difficulty = %state.profile.difficulty,
        deck = state.deck.len(),
        "run started"
    );
    state.run = Some(run);
    let body = format!("Seed {}", state.profile.seed);
    state.add_log(LogEntry::new(LogKind::Run, "Run initialized", body));
}

/// Reseed, then start a run.
pub fn start_run_with_seed(state: &mut GameState, seed: &str, rules: &Rules) {
    state.reseed(seed);
    start_run(state, rules);
}

/// End the active run and pay out.
///
/// Credits are `max(0, depth + momentum) * credits_per_point`; a victory
/// adds embers. Returns `None` when there is no run.
pub fn end_run(state: &mut GameState, reason: RunEnd, rules: &Rules) -> Option<RunSummary> {
    let run = state.run.take()?;

    let points = (i64::from(run.depth) + i64::from(run.momentum)).max(0) as u64;
    let credits = points * rules.credits_per_point;
    let embers = if reason == RunEnd::Victory {
        rules.victory_embers
    } else {
        0
    };
    state.currencies.credit(Currency::Credits, credits);
    state.currencies.credit(Currency::Embers, embers);

    let summary = RunSummary {
        reason,
        depth: run.depth,
        momentum: run.momentum,
        aegis: run.aegis,
        doom: run.doom,
        credits,
        embers,
    };

    info!(
        reason = %reason,
        depth = run.depth,
        credits,
        embers,
        "run ended"
    );
    let body = format!(
        "Depth {}, Momentum {}, Aegis {}, Doom {}. +{} credits",
        run.depth, run.momentum, run.aegis, run.doom, credits
    );
    state.add_log(LogEntry::new(LogKind::Cashout, format!("Run {}", reason), body));
    Some(summary)
}

/// Bank the active run.
pub fn cash_out(state: &mut GameState, rules: &Rules) -> Option<RunSummary> {
    end_run(state, RunEnd::Banked, rules)
}

/// SHA-256 fingerprint of a run at a seed position.
///
/// Two peers on the same seed that made the same moves produce the same
/// fingerprint.
pub fn fingerprint(run: &Run, rng: &SeedState) -> StateHash {
    compute_state_hash(rng.seed_hash(), rng.cursor(), |h| {
        h.update_bool(run.is_running());
        h.update_u32(run.depth);
        h.update_i32(run.momentum);
        h.update_i32(run.aegis);
        h.update_i32(run.doom);
        h.update_str_list(&run.draw_pile);
        h.update_str_list(&run.hand);
        h.update_str_list(&run.discard);
        h.update_str(run.current.element.as_str());
        h.update_bool(run.current.boon);
        h.update_bool(run.current.threat);
    })
}

// =============================================================================
// TESTS
// =============================================================================
