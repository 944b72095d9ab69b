//! Card Resolution
//!
//! Applies one card to a run. Advantage is computed once per card from the
//! element wheel; effects then apply in [`Effect`] declaration order and
//! every stat is clamped after every change.

use tracing::debug;

use crate::core::rng::SeedState;
use crate::game::catalog::{element_advantage, Card, Effect};
use crate::game::config::Rules;
use crate::game::encounter::roll_oracle_die;
use crate::game::run::{draw_cards, RouteMarker, Run};
use crate::game::state::{Currencies, Currency};

/// Note attached to route markers placed by cards.
pub const ROUTE_MARK_NOTE: &str = "Marked";

/// What resolving a card did beyond stat changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardOutcome {
    /// +1 advantaged, -1 disadvantaged, 0 neutral.
    pub advantage: i32,
    /// Credits paid into the wallet.
    pub credits: u64,
    /// Cards drawn.
    pub drawn: u32,
}

/// Resolve a card against the run's current encounter.
///
/// Any disadvantage adds one doom after all effects. Credits earned are
/// paid into `wallet` at the end.
pub fn resolve_card(
    run: &mut Run,
    rng: &mut SeedState,
    wallet: &mut Currencies,
    card: &Card,
    rules: &Rules,
) -> CardOutcome {
    let advantage = element_advantage(card.element, run.current.element);
    let advantaged = i32::from(advantage > 0);
    let mut outcome = CardOutcome {
        advantage,
        ..CardOutcome::default()
    };

    for effect in card.ordered_effects() {
        match effect {
            Effect::Momentum(delta) => {
                run.momentum = rules.momentum.clamp(run.momentum + delta + advantaged);
            }
            Effect::Aegis(delta) => {
                run.aegis = rules.aegis.clamp(run.aegis + delta + advantaged);
            }
            Effect::Doom(delta) => {
                run.doom = rules.doom.clamp(run.doom + delta - advantaged);
            }
            Effect::Draw(count) => {
                outcome.drawn += draw_cards(run, rng, count);
            }
            Effect::RevealOmen => {
                run.last_omen = Some(run.current.clone());
            }
            Effect::Reflect => {
                if run.current.threat {
                    run.current.threat = false;
                    run.current.boon = true;
                }
            }
            Effect::Stabilize => {
                if advantage > 0 {
                    run.doom = rules.doom.clamp(0);
                }
            }
            Effect::DoubleRoll => {
                let first = roll_oracle_die(rng);
                let second = roll_oracle_die(rng);
                let winner = if first.roll >= second.roll { first } else { second };
                let gain = 1 + i32::from(winner.is_high());
                run.momentum = rules.momentum.clamp(run.momentum + gain);
                let mut omen = run.current.clone();
                omen.dice = winner;
                run.last_omen = Some(omen);
            }
            Effect::SetMomentum(value) => {
                run.momentum = rules.momentum.clamp(value);
            }
            Effect::BonusCredits(amount) => {
                outcome.credits += amount;
            }
            Effect::CashMomentum => {
                outcome.credits += run.momentum.max(0) as u64 * rules.momentum_cash_rate;
                run.momentum = rules.momentum.clamp(1);
            }
            Effect::DepthShield => {
                run.route.push(RouteMarker {
                    depth: run.depth,
                    note: ROUTE_MARK_NOTE.to_string(),
                });
            }
        }
    }

    if advantage < 0 {
        run.doom = rules.doom.clamp(run.doom + 1);
    }
    wallet.credit(Currency::Credits, outcome.credits);

    debug!(
        card = card.id,
        vs = %run.current.element,
        advantage,
        momentum = run.momentum,
        aegis = run.aegis,
        doom = run.doom,
        "card resolved"
    );
    outcome
}
