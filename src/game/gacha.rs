//! Gacha Engine
//!
//! Rarity rolls with a VIP bonus and a pity floor, and pack purchases that
//! debit the wallet and grow the collection.

use thiserror::Error;
use tracing::debug;

use crate::core::rng::SeedState;
use crate::game::catalog::{cards_of_rarity, Card, Rarity};
use crate::game::config::{PackDef, RarityWeights, Rules};
use crate::game::state::{Currency, GachaRecord, GameState};

/// Reasons a pull is refused. `Display` is the player-facing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PullError {
    /// No pack with that key.
    #[error("Missing pack")]
    MissingPack,

    /// A balance is below the pack price.
    #[error("Not enough {0}")]
    NotEnough(Currency),
}

/// Cards drawn from one pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GachaPull {
    /// Pack display name.
    pub pack: String,
    /// Cards in draw order.
    pub cards: Vec<&'static Card>,
}

impl GachaPull {
    /// Drawn card ids.
    pub fn ids(&self) -> Vec<String> {
        self.cards.iter().map(|c| c.id.to_string()).collect()
    }
}

/// Roll a rarity with one draw.
///
/// The roll spans `100 + bonus`; the top `mythic + bonus` is mythic, the
/// `rare` band beneath `100` is rare, the rest common.
pub fn roll_rarity(rng: &mut SeedState, weights: &RarityWeights, bonus: u32) -> Rarity {
    let roll = rng.next() * f64::from(100 + bonus);
    let mythic_cut = f64::from(weights.mythic + bonus);
    if roll >= 100.0 - mythic_cut {
        Rarity::Mythic
    } else if roll >= 100.0 - f64::from(weights.rare) {
        Rarity::Rare
    } else {
        Rarity::Common
    }
}

/// Rarity for draw `index` of a pack. Pity at the ceiling forces rare,
/// overriding both the roll and a guaranteed rarity.
fn draw_rarity(
    rng: &mut SeedState,
    pack: &PackDef,
    index: u32,
    pity: u32,
    bonus: u32,
    rules: &Rules,
) -> Rarity {
    let mut rarity = match pack.guaranteed {
        Some(r) => r,
        None => roll_rarity(rng, &rules.rarity_weights, bonus),
    };
    if pity >= rules.pity_ceiling {
        rarity = Rarity::Rare;
    }
    if pack.bonus_rare && index + 1 == pack.size && rarity == Rarity::Common {
        rarity = Rarity::Rare;
    }
    rarity
}

/// Buy and open a pack.
///
/// Nothing is debited unless every balance covers the price. Each draw
/// updates the collection and the pity counter; the batch is appended to
/// the pull history.
pub fn pull_pack(state: &mut GameState, key: &str, rules: &Rules) -> Result<GachaPull, PullError> {
    let pack = rules.pack(key).ok_or(PullError::MissingPack)?;
    state
        .currencies
        .try_debit(&pack.cost)
        .map_err(PullError::NotEnough)?;

    let bonus = if state.vip { rules.vip_bonus } else { 0 };
    let mut cards = Vec::with_capacity(pack.size as usize);

    for index in 0..pack.size {
        let rarity = draw_rarity(&mut state.rng, pack, index, state.pity, bonus, rules);
        let pool = cards_of_rarity(rarity);
        let Some(card) = state.rng.pick_one(&pool).copied() else {
            continue;
        };
        state.collection.add(card.id, 1);
        state.pity = if rarity.is_rare_or_better() { 0 } else { state.pity + 1 };
        cards.push(card);
    }

    debug!(pack = %pack.name, cards = cards.len(), pity = state.pity, "pack opened");

    let pull = GachaPull {
        pack: pack.name.clone(),
        cards,
    };
    state.gacha_log.push(GachaRecord {
        pack: pull.pack.clone(),
        results: pull.ids(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    });
    Ok(pull)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(seed: &str) -> (GameState, Rules) {
        let rules = Rules::default();
        (GameState::with_seed(&rules, seed), rules)
    }

    #[test]
    fn test_missing_pack() {
        let (mut state, rules) = fresh("gacha");
        let before = state.clone();
        assert_eq!(pull_pack(&mut state, "nope", &rules), Err(PullError::MissingPack));
        assert_eq!(state, before);
        assert_eq!(PullError::MissingPack.to_string(), "Missing pack");
    }

    #[test]
    fn test_not_enough_credits_debits_nothing() {
        let (mut state, rules) = fresh("gacha");
        state.currencies.credits = 249;
        let cursor = state.rng.cursor();

        let err = pull_pack(&mut state, "pulse", &rules).unwrap_err();
        assert_eq!(err.to_string(), "Not enough credits");
        assert_eq!(state.currencies.credits, 249);
        assert_eq!(state.rng.cursor(), cursor);
        assert!(state.gacha_log.is_empty());
    }

    #[test]
    fn test_pulse_pack() {
        let (mut state, rules) = fresh("gacha");
        let total_before: u32 = state.collection.iter().map(|(_, n)| n).sum();

        let pull = pull_pack(&mut state, "pulse", &rules).unwrap();
        assert_eq!(pull.pack, "Pulse Pack");
        assert_eq!(pull.cards.len(), 3);
        assert_eq!(state.currencies.credits, 1200 - 250);

        let total_after: u32 = state.collection.iter().map(|(_, n)| n).sum();
        assert_eq!(total_after, total_before + 3);
        assert_eq!(state.gacha_log.len(), 1);
        assert_eq!(state.gacha_log[0].results, pull.ids());
    }

    #[test]
    fn test_legend_pack_is_mythic() {
        let (mut state, rules) = fresh("vault");
        let pull = pull_pack(&mut state, "legend", &rules).unwrap();
        assert_eq!(pull.cards.len(), 1);
        assert_eq!(pull.cards[0].rarity, Rarity::Mythic);
        assert_eq!(state.currencies.shards, 0);
        assert_eq!(state.pity, 0);

        let err = pull_pack(&mut state, "legend", &rules).unwrap_err();
        assert_eq!(err, PullError::NotEnough(Currency::Shards));
    }

    #[test]
    fn test_radiant_last_draw_is_rare_or_better() {
        let (mut state, rules) = fresh("radiant");
        state.currencies.embers = 80 * 20;
        for _ in 0..20 {
            let pull = pull_pack(&mut state, "radiant", &rules).unwrap();
            assert_eq!(pull.cards.len(), 5);
            assert!(pull.cards[4].rarity.is_rare_or_better());
        }
    }

    #[test]
    fn test_pity_forces_rare() {
        let (mut state, rules) = fresh("pity");
        state.pity = rules.pity_ceiling;
        state.currencies.credits = 10_000;
        let pull = pull_pack(&mut state, "pulse", &rules).unwrap();
        assert_eq!(pull.cards[0].rarity, Rarity::Rare);
        assert_eq!(state.pity, 0);
    }

    #[test]
    fn test_pity_overrides_guaranteed_mythic() {
        let (mut state, rules) = fresh("vault");
        state.pity = rules.pity_ceiling;
        let pull = pull_pack(&mut state, "legend", &rules).unwrap();
        assert_eq!(pull.cards.len(), 1);
        assert_eq!(pull.cards[0].rarity, Rarity::Rare);
        assert_eq!(state.pity, 0);
    }

    #[test]
    fn test_pity_overrides_rolled_mythic() {
        let rules = Rules {
            rarity_weights: RarityWeights { common: 0, rare: 0, mythic: 100 },
            ..Rules::default()
        };
        let pack = rules.pack("pulse").unwrap().clone();
        let mut rng = SeedState::from_seed("pity");

        assert_eq!(draw_rarity(&mut rng, &pack, 0, 0, 0, &rules), Rarity::Mythic);
        assert_eq!(draw_rarity(&mut rng, &pack, 0, rules.pity_ceiling, 0, &rules), Rarity::Rare);
    }

    #[test]
    fn test_roll_rarity_bands() {
        let weights = RarityWeights::default();
        let mut rng = SeedState::from_seed("bands");
        let mut seen = [0u32; 3];
        for _ in 0..5000 {
            match roll_rarity(&mut rng, &weights, 0) {
                Rarity::Common => seen[0] += 1,
                Rarity::Rare => seen[1] += 1,
                Rarity::Mythic => seen[2] += 1,
            }
        }
        assert!(seen[0] > seen[1] && seen[1] > seen[2] && seen[2] > 0);
    }

    #[test]
    fn test_roll_rarity_consumes_one_draw() {
        let mut rng = SeedState::from_seed("one");
        roll_rarity(&mut rng, &RarityWeights::default(), 5);
        assert_eq!(rng.cursor(), 2);
    }
}
