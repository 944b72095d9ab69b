//! Rules Configuration
//!
//! Every tunable constant of the engine in one value. The shipped variants
//! of the game disagree on bounds, thresholds and multipliers; `Rules`
//! carries one consistent set as its `Default` and can be overridden from a
//! JSON file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::catalog::Rarity;
use crate::game::state::{Currencies, Currency};

// =============================================================================
// BOUNDS
// =============================================================================

/// Inclusive bounds for a run stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBounds {
    /// Lowest allowed value.
    pub min: i32,
    /// Highest allowed value.
    pub max: i32,
}

impl StatBounds {
    /// Create bounds.
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Clamp a value into the bounds.
    #[inline]
    pub fn clamp(&self, value: i32) -> i32 {
        value.max(self.min).min(self.max)
    }

    /// Whether the value lies within the bounds.
    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

// =============================================================================
// DIFFICULTY
// =============================================================================

/// Difficulty tier chosen on the profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Extra starting momentum.
    #[serde(alias = "chill")]
    Easy,
    /// Baseline.
    #[default]
    Standard,
    /// Thin starting aegis.
    #[serde(alias = "brutal")]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "easy",
            Difficulty::Standard => "standard",
            Difficulty::Hard => "hard",
        })
    }
}

/// Starting stats for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStart {
    /// Initial momentum.
    pub momentum: i32,
    /// Initial aegis.
    pub aegis: i32,
    /// Initial doom.
    #[serde(default)]
    pub doom: i32,
}

/// Starting stats per difficulty tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTable {
    /// Easy tier.
    pub easy: RunStart,
    /// Standard tier.
    pub standard: RunStart,
    /// Hard tier.
    pub hard: RunStart,
}

impl DifficultyTable {
    /// Starting stats for a tier.
    pub fn get(&self, difficulty: Difficulty) -> RunStart {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Standard => self.standard,
            Difficulty::Hard => self.hard,
        }
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: RunStart { momentum: 3, aegis: 3, doom: 0 },
            standard: RunStart { momentum: 2, aegis: 3, doom: 0 },
            hard: RunStart { momentum: 2, aegis: 1, doom: 0 },
        }
    }
}

// =============================================================================
// GACHA
// =============================================================================

/// Rarity roll weights out of 100 (before the VIP bonus).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityWeights {
    /// Common weight (informational; commons fill the remainder).
    pub common: u32,
    /// Rare weight.
    pub rare: u32,
    /// Mythic weight.
    pub mythic: u32,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self { common: 68, rare: 25, mythic: 7 }
    }
}

/// A purchasable pack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDef {
    /// Display name.
    pub name: String,
    /// Number of cards drawn.
    pub size: u32,
    /// Price per currency.
    pub cost: BTreeMap<Currency, u64>,
    /// Upgrade a common final draw to rare.
    #[serde(default)]
    pub bonus_rare: bool,
    /// Every draw is this rarity.
    #[serde(default)]
    pub guaranteed: Option<Rarity>,
}

impl PackDef {
    /// Pack with a single-currency price.
    pub fn new(name: &str, size: u32, currency: Currency, amount: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            cost: BTreeMap::from([(currency, amount)]),
            bonus_rare: false,
            guaranteed: None,
        }
    }
}

fn default_packs() -> BTreeMap<String, PackDef> {
    let mut packs = BTreeMap::new();
    packs.insert(
        "pulse".to_string(),
        PackDef::new("Pulse Pack", 3, Currency::Credits, 250),
    );
    packs.insert(
        "radiant".to_string(),
        PackDef {
            bonus_rare: true,
            ..PackDef::new("Radiant Cache", 5, Currency::Embers, 80)
        },
    );
    packs.insert(
        "legend".to_string(),
        PackDef {
            guaranteed: Some(Rarity::Mythic),
            ..PackDef::new("Axis Vault", 1, Currency::Shards, 1)
        },
    );
    packs
}

// =============================================================================
// RULES
// =============================================================================

/// Errors loading a rules file.
#[derive(Debug, Error)]
pub enum RulesError {
    /// File could not be read.
    #[error("failed to read rules: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid rules JSON.
    #[error("invalid rules: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Engine constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rules {
    /// Momentum bounds.
    pub momentum: StatBounds,
    /// Aegis bounds.
    pub aegis: StatBounds,
    /// Doom bounds; reaching `doom.max` crashes the run.
    pub doom: StatBounds,

    /// Cards drawn at run start and after every beat.
    pub hand_size: usize,
    /// Maximum deck length.
    pub max_deck_size: usize,
    /// Deck used when legality filtering leaves nothing.
    pub fallback_deck: Vec<String>,
    /// Deck of a fresh profile.
    pub starter_deck: Vec<String>,
    /// Copies of each common granted to a fresh profile.
    pub starter_commons: u32,
    /// Copies of each rare granted to a fresh profile.
    pub starter_rares: u32,
    /// Balances of a fresh profile.
    pub starting_currencies: Currencies,
    /// Starting stats per difficulty.
    pub difficulties: DifficultyTable,

    /// Rarity weights.
    pub rarity_weights: RarityWeights,
    /// Extra roll range and mythic window for VIP profiles.
    pub vip_bonus: u32,
    /// Pity value at which a draw is forced to rare.
    pub pity_ceiling: u32,
    /// Packs by key.
    pub packs: BTreeMap<String, PackDef>,

    /// An encounter is a boon when `next() > boon_threshold`.
    pub boon_threshold: f64,
    /// An encounter is a threat when `next() > threat_threshold`.
    pub threat_threshold: f64,
    /// Doom at or above which a threat cracks aegis.
    pub threat_doom_gate: i32,
    /// Momentum at or above which a boon pays out.
    pub boon_momentum_gate: i32,
    /// Boon payout.
    pub boon_reward: Currencies,

    /// Credits per point of `depth + momentum` at run end.
    pub credits_per_point: u64,
    /// Embers granted on a victory.
    pub victory_embers: u64,
    /// Credits per momentum point when a card cashes momentum.
    pub momentum_cash_rate: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            momentum: StatBounds::new(-3, 9),
            aegis: StatBounds::new(0, 6),
            doom: StatBounds::new(0, 8),

            hand_size: 4,
            max_deck_size: 12,
            fallback_deck: ["sovereign", "warden", "seeker"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            starter_deck: ["sovereign", "warden", "seeker", "architect", "mirror", "labyrinth"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            starter_commons: 2,
            starter_rares: 1,
            starting_currencies: Currencies {
                credits: 1200,
                embers: 220,
                shards: 1,
            },
            difficulties: DifficultyTable::default(),

            rarity_weights: RarityWeights::default(),
            vip_bonus: 5,
            pity_ceiling: 8,
            packs: default_packs(),

            boon_threshold: 0.55,
            threat_threshold: 0.45,
            threat_doom_gate: 6,
            boon_momentum_gate: 4,
            boon_reward: Currencies {
                credits: 20,
                embers: 2,
                shards: 0,
            },

            credits_per_point: 15,
            victory_embers: 12,
            momentum_cash_rate: 10,
        }
    }
}

impl Rules {
    /// Parse rules from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, RulesError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load rules from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let body = std::fs::read_to_string(path)?;
        Self::from_json_str(&body)
    }

    /// Look up a pack.
    pub fn pack(&self, key: &str) -> Option<&PackDef> {
        self.packs.get(key)
    }
}
