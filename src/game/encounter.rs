//! Encounters
//!
//! Each beat faces one encounter drawn from the seeded stream. The draw
//! order is fixed (theme, element, die, die roll, boon, threat, lore) so
//! that co-op peers on the same seed see the same encounter.

use serde::{Deserialize, Serialize};

use crate::core::rng::SeedState;
use crate::game::catalog::{OracleDie, Element, DIVINATION_DICE, DIVINATION_THEMES, LORE_LINES};
use crate::game::config::Rules;

/// Draws consumed by [`next_encounter`].
pub const ENCOUNTER_DRAWS: u64 = 7;

/// Draws consumed by [`roll_oracle_die`].
pub const ORACLE_DRAWS: u64 = 2;

/// Result of one oracle die.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRoll {
    /// Die name.
    pub die: String,
    /// Number of faces.
    pub sides: u32,
    /// Face rolled, in `[1, sides]`.
    pub roll: u32,
}

impl OracleRoll {
    /// Whether the roll lands in the upper half of the die.
    pub fn is_high(&self) -> bool {
        f64::from(self.roll) > f64::from(self.sides) / 2.0
    }
}

/// One encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    /// Element cards are checked against.
    pub element: Element,
    /// Divination theme.
    pub theme: String,
    /// Oracle roll.
    pub dice: OracleRoll,
    /// Boon encounters pay out at high momentum.
    pub boon: bool,
    /// Threat encounters crack aegis at high doom.
    pub threat: bool,
    /// Flavor text.
    pub lore: String,
}

/// Pick a die uniformly and roll it. Two draws.
pub fn roll_oracle_die(rng: &mut SeedState) -> OracleRoll {
    let die = rng
        .pick_one(DIVINATION_DICE)
        .copied()
        .unwrap_or(OracleDie { name: "Void Die", sides: 33 });
    OracleRoll {
        die: die.name.to_string(),
        sides: die.sides,
        roll: rng.roll_die(die.sides),
    }
}

/// Generate the next encounter. Seven draws.
pub fn next_encounter(rng: &mut SeedState, rules: &Rules) -> Encounter {
    let theme = rng.pick_one(DIVINATION_THEMES).copied().unwrap_or_default();
    let element = rng.pick_one(&Element::ALL).copied().unwrap_or(Element::Wood);
    let dice = roll_oracle_die(rng);
    let boon = rng.next() > rules.boon_threshold;
    let threat = rng.next() > rules.threat_threshold;
    let lore = rng.pick_one(LORE_LINES).copied().unwrap_or_default();

    Encounter {
        element,
        theme: theme.to_string(),
        dice,
        boon,
        threat,
        lore: lore.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encounter_draw_count() {
        let rules = Rules::default();
        let mut rng = SeedState::from_seed("enc");
        next_encounter(&mut rng, &rules);
        assert_eq!(rng.cursor(), 1 + ENCOUNTER_DRAWS);

        roll_oracle_die(&mut rng);
        assert_eq!(rng.cursor(), 1 + ENCOUNTER_DRAWS + ORACLE_DRAWS);
    }

    #[test]
    fn test_encounter_determinism() {
        let rules = Rules::default();
        let mut a = SeedState::from_seed("HALO-SAME");
        let mut b = SeedState::from_seed("HALO-SAME");
        for _ in 0..50 {
            assert_eq!(next_encounter(&mut a, &rules), next_encounter(&mut b, &rules));
        }
    }

    #[test]
    fn test_known_encounter() {
        // HALO-TEST1 after a six-card shuffle (5 draws) and four card draws.
        let rules = Rules::default();
        let mut rng = SeedState::from_parts(713_554_675, 6);
        let enc = next_encounter(&mut rng, &rules);
        assert_eq!(enc.element, Element::Wood);
        assert_eq!(enc.theme, DIVINATION_THEMES[12]);
        assert_eq!(enc.dice.sides, 33);
        assert_eq!(enc.dice.roll, 33);
        assert!(enc.boon);
        assert!(enc.threat);
        assert_eq!(enc.lore, LORE_LINES[5]);
        assert_eq!(rng.cursor(), 13);
    }

    #[test]
    fn test_oracle_roll_in_range() {
        let mut rng = SeedState::from_seed("oracle");
        for _ in 0..500 {
            let r = roll_oracle_die(&mut rng);
            assert!(r.roll >= 1 && r.roll <= r.sides);
        }
    }

    #[test]
    fn test_is_high() {
        let roll = |roll, sides| OracleRoll { die: "d".into(), sides, roll };
        assert!(roll(12, 22).is_high());
        assert!(!roll(11, 22).is_high());
        assert!(roll(17, 33).is_high());
        assert!(!roll(16, 33).is_high());
    }
}
