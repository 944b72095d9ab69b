//! Beat Resolution
//!
//! The run loop: play cards from the hand, then resolve the beat. A beat
//! applies the threat and boon gates, moves one step deeper, redraws the
//! hand, rolls the next encounter and ticks doom. Crashing ends the run.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::catalog::card_by_id;
use crate::game::config::Rules;
use crate::game::encounter::next_encounter;
use crate::game::events::RunEvent;
use crate::game::resolve::{resolve_card, CardOutcome};
use crate::game::run::{cash_out, doom_tick, draw_cards, end_run, RunEnd, RunStatus, RunSummary};
use crate::game::state::{GameState, LogEntry, LogKind};

/// Result of a beat.
#[derive(Debug, Default)]
pub struct BeatResult {
    /// Events generated this beat
    pub events: Vec<RunEvent>,
    /// Whether the run crashed this beat
    pub crashed: bool,
    /// Payout if the run ended
    pub summary: Option<RunSummary>,
}

/// A recorded player action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "card", rename_all = "snake_case")]
pub enum RunAction {
    /// Play a card by id.
    Play(String),
    /// Play whatever card is first in hand.
    PlayFirst,
    /// Resolve the beat.
    Beat,
    /// Bank the run.
    CashOut,
}

/// Play a card from the hand.
///
/// No-op returning `None` when there is no running run, the card is not in
/// hand or the id is unknown.
pub fn play_card(state: &mut GameState, id: &str, rules: &Rules) -> Option<CardOutcome> {
    let run = state.run.as_mut().filter(|run| run.status == RunStatus::Running)?;
    let idx = run.hand.iter().position(|c| c == id)?;
    let card = card_by_id(id)?;

    let played = run.hand.remove(idx);
    let outcome = resolve_card(run, &mut state.rng, &mut state.currencies, card, rules);
    run.discard.push(played);
    let against = run.current.element;

    state.add_log(
        LogEntry::new(LogKind::Card, card.name, card.text).with_meta(format!("vs {}", against)),
    );
    Some(outcome)
}

/// Advance the active run by one beat.
///
/// No-op on a missing or crashed run.
pub fn resolve_beat(state: &mut GameState, rules: &Rules) -> BeatResult {
    let mut result = BeatResult::default();

    let Some(run) = state.run.as_mut().filter(|run| run.status == RunStatus::Running) else {
        return result;
    };

    // 1. Gates, on the encounter being left
    let threat_hit = run.current.threat && run.doom >= rules.threat_doom_gate;
    if threat_hit {
        run.aegis = rules.aegis.clamp(run.aegis - 1);
        result
            .events
            .push(RunEvent::threat_overloaded(run.depth, run.aegis));
    }
    if run.current.boon && run.momentum >= rules.boon_momentum_gate {
        state.currencies.credit_all(&rules.boon_reward);
        result.events.push(RunEvent::boon_paid(
            run.depth,
            rules.boon_reward.credits,
            rules.boon_reward.embers,
        ));
    }

    // 2. Advance and redraw
    run.depth += 1;
    let hand = std::mem::take(&mut run.hand);
    run.discard.extend(hand);
    draw_cards(run, &mut state.rng, rules.hand_size as u32);
    run.current = next_encounter(&mut state.rng, rules);

    // 3. Doom tick and crash check
    let tick = doom_tick(run);
    run.doom = rules.doom.clamp(run.doom + tick);
    result
        .events
        .push(RunEvent::beat_advanced(run.depth, run.current.element, tick));

    let depth = run.depth;
    result.crashed = run.should_crash(rules);
    if result.crashed {
        run.status = RunStatus::Crashed;
    }
    debug!(depth, crashed = result.crashed, "beat resolved");

    if threat_hit {
        state.add_log(LogEntry::new(
            LogKind::Threat,
            "Threat overloaded",
            "Aegis cracked under pressure",
        ));
    }
    if result.crashed {
        result.summary = end_run(state, RunEnd::Crashed, rules);
        if let Some(summary) = &result.summary {
            result
                .events
                .push(RunEvent::run_ended(depth, summary.reason, summary.credits));
        }
    }
    result
}

/// Apply recorded actions in order.
///
/// Returns every event produced. Actions after the run ends are no-ops.
pub fn replay_run(state: &mut GameState, actions: &[RunAction], rules: &Rules) -> Vec<RunEvent> {
    let mut all_events = Vec::new();

    for action in actions {
        match action {
            RunAction::Play(id) => {
                play_recorded(state, id, rules, &mut all_events);
            }
            RunAction::PlayFirst => {
                let first = state.run.as_ref().and_then(|run| run.hand.first().cloned());
                if let Some(id) = first {
                    play_recorded(state, &id, rules, &mut all_events);
                }
            }
            RunAction::Beat => {
                all_events.extend(resolve_beat(state, rules).events);
            }
            RunAction::CashOut => {
                let depth = state.run.as_ref().map(|run| run.depth).unwrap_or(0);
                if let Some(summary) = cash_out(state, rules) {
                    all_events.push(RunEvent::run_ended(depth, summary.reason, summary.credits));
                }
            }
        }
    }

    all_events
}

fn play_recorded(state: &mut GameState, id: &str, rules: &Rules, events: &mut Vec<RunEvent>) {
    let Some(outcome) = play_card(state, id, rules) else {
        return;
    };
    if let Some(run) = &state.run {
        events.push(RunEvent::card_played(
            run.depth,
            id,
            run.current.element,
            outcome.advantage,
            outcome.credits,
        ));
    }
}
