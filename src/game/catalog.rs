//! Card Catalog
//!
//! Static tables: archetype cards, the five-element wheel, oracle dice,
//! encounter themes and lore lines. Nothing here is mutated at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// ELEMENTS
// =============================================================================

/// Five-element wheel used for advantage checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// Wood
    Wood,
    /// Fire
    Fire,
    /// Earth
    Earth,
    /// Metal
    Metal,
    /// Water
    Water,
}

impl Element {
    /// All elements in encounter sampling order.
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    /// The element this one controls.
    pub fn strong(self) -> Element {
        match self {
            Element::Wood => Element::Earth,
            Element::Fire => Element::Metal,
            Element::Earth => Element::Water,
            Element::Metal => Element::Wood,
            Element::Water => Element::Fire,
        }
    }

    /// The element this one is controlled by.
    pub fn weak(self) -> Element {
        match self {
            Element::Wood => Element::Metal,
            Element::Fire => Element::Water,
            Element::Earth => Element::Wood,
            Element::Metal => Element::Fire,
            Element::Water => Element::Earth,
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }

    /// Display color used by clients.
    pub fn color(self) -> &'static str {
        match self {
            Element::Wood => "#4CAF50",
            Element::Fire => "#FF7043",
            Element::Earth => "#C0A46B",
            Element::Metal => "#B0BEC5",
            Element::Water => "#4FC3F7",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advantage of a card element over an encounter element: +1, -1 or 0.
pub fn element_advantage(card: Element, encounter: Element) -> i32 {
    if card.strong() == encounter {
        1
    } else if card.weak() == encounter {
        -1
    } else {
        0
    }
}

// =============================================================================
// RARITY
// =============================================================================

/// Card rarity tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    /// Common
    Common,
    /// Rare
    Rare,
    /// Mythic
    Mythic,
}

impl Rarity {
    /// Rare or better resets the pity counter.
    pub fn is_rare_or_better(self) -> bool {
        !matches!(self, Rarity::Common)
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Mythic => "mythic",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// EFFECTS
// =============================================================================

/// One typed card effect.
///
/// Variant declaration order is the resolution order: the resolver sorts a
/// card's effects before applying them, so a catalog entry may list them in
/// any order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Effect {
    /// Add to momentum (+1 when advantaged).
    Momentum(i32),
    /// Add to aegis (+1 when advantaged).
    Aegis(i32),
    /// Add to doom (-1 when advantaged).
    Doom(i32),
    /// Draw cards into the hand.
    Draw(u32),
    /// Reveal the current encounter as the last omen.
    RevealOmen,
    /// Turn a threatening encounter into a boon.
    Reflect,
    /// Clear doom entirely when advantaged.
    Stabilize,
    /// Roll two oracle dice, keep the best, gain momentum.
    DoubleRoll,
    /// Overwrite momentum.
    SetMomentum(i32),
    /// Flat credit payout.
    BonusCredits(u64),
    /// Convert momentum into credits, then reset momentum to 1.
    CashMomentum,
    /// Mark the current depth on the route.
    DepthShield,
}

// =============================================================================
// CARDS
// =============================================================================

/// Immutable catalog card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    /// Stable id stored in collections and decks.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Element for advantage checks.
    pub element: Element,
    /// Rules text.
    pub text: &'static str,
    /// Effects, in any order.
    pub effects: &'static [Effect],
}

impl Card {
    /// Effects in resolution order.
    pub fn ordered_effects(&self) -> Vec<Effect> {
        let mut ops = self.effects.to_vec();
        ops.sort();
        ops
    }
}

/// Every archetype card.
pub const ARCHETYPES: &[Card] = &[
    Card {
        id: "sovereign",
        name: "Sovereign Ember",
        rarity: Rarity::Common,
        element: Element::Fire,
        text: "+2 Momentum. If advantaged, burn 1 Doom.",
        effects: &[Effect::Momentum(2), Effect::Doom(-1)],
    },
    Card {
        id: "warden",
        name: "Warden of Roots",
        rarity: Rarity::Common,
        element: Element::Wood,
        text: "Restore 1 Aegis. If advantaged, draw 1 archetype.",
        effects: &[Effect::Aegis(1), Effect::Draw(1)],
    },
    Card {
        id: "seeker",
        name: "Seeker of Currents",
        rarity: Rarity::Common,
        element: Element::Water,
        text: "+1 Momentum, reveal omen. If advantaged, convert omen to boon.",
        effects: &[Effect::Momentum(1), Effect::RevealOmen],
    },
    Card {
        id: "architect",
        name: "Architect of Stone",
        rarity: Rarity::Rare,
        element: Element::Earth,
        text: "Stabilize: set Doom to 0 if advantaged; otherwise -1 Doom.",
        effects: &[Effect::Doom(-1), Effect::Stabilize],
    },
    Card {
        id: "mirror",
        name: "Mirror of Blades",
        rarity: Rarity::Rare,
        element: Element::Metal,
        text: "Reflect threat. If advantaged, gain 1 Momentum and 1 Aegis.",
        effects: &[Effect::Reflect, Effect::Momentum(1), Effect::Aegis(1)],
    },
    Card {
        id: "oracle",
        name: "Prismatic Oracle",
        rarity: Rarity::Rare,
        element: Element::Water,
        text: "Roll two oracle dice, pick best. Gain +1 Momentum per hit.",
        effects: &[Effect::DoubleRoll],
    },
    Card {
        id: "phoenix",
        name: "Phoenix Crown",
        rarity: Rarity::Mythic,
        element: Element::Fire,
        text: "Heal to 3 Aegis, +2 Momentum. Advantage adds bonus credit.",
        effects: &[Effect::Aegis(3), Effect::Momentum(2), Effect::BonusCredits(50)],
    },
    Card {
        id: "river",
        name: "River Between Worlds",
        rarity: Rarity::Mythic,
        element: Element::Water,
        text: "Summon ally: set Momentum to 3, draw 2, reveal omen.",
        effects: &[Effect::SetMomentum(3), Effect::Draw(2), Effect::RevealOmen],
    },
    Card {
        id: "forge",
        name: "Starforge Anvil",
        rarity: Rarity::Mythic,
        element: Element::Metal,
        text: "Cash any Momentum into Credits x10, then set Momentum to 1.",
        effects: &[Effect::CashMomentum],
    },
    Card {
        id: "labyrinth",
        name: "Labyrinth Keeper",
        rarity: Rarity::Rare,
        element: Element::Earth,
        text: "Mark the path: reduce Depth cost by 1 this beat; draw 1.",
        effects: &[Effect::DepthShield, Effect::Draw(1)],
    },
];

/// Look up a card by id.
pub fn card_by_id(id: &str) -> Option<&'static Card> {
    ARCHETYPES.iter().find(|c| c.id == id)
}

/// All cards of one rarity, in catalog order.
pub fn cards_of_rarity(rarity: Rarity) -> Vec<&'static Card> {
    ARCHETYPES.iter().filter(|c| c.rarity == rarity).collect()
}

// =============================================================================
// ORACLE TABLES
// =============================================================================

/// A named divination die.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OracleDie {
    /// Display name.
    pub name: &'static str,
    /// Number of faces.
    pub sides: u32,
}

/// Dice an encounter may roll.
pub const DIVINATION_DICE: &[OracleDie] = &[
    OracleDie { name: "Tarot Major", sides: 22 },
    OracleDie { name: "I Ching", sides: 64 },
    OracleDie { name: "Runes", sides: 24 },
    OracleDie { name: "Astral Houses", sides: 12 },
    OracleDie { name: "Void Die", sides: 33 },
];

/// Encounter themes.
pub const DIVINATION_THEMES: &[&str] = &[
    "Initiation",
    "Challenge",
    "Reversal",
    "Breakthrough",
    "Union",
    "Fragment",
    "Signal",
    "Riddle",
    "Gift",
    "Debt",
    "Memory",
    "Future Echo",
    "Threshold",
    "Labyrinth",
    "Guardian",
    "Bloom",
];

/// Encounter flavor text.
pub const LORE_LINES: &[&str] = &[
    "Echoes of past selves ask for alignment.",
    "Two timelines braid together and demand a choice.",
    "A silent guardian flips an unseen coin.",
    "The Labyrinth grows new corridors in real time.",
    "Archetype avatars convene at the Inner Court.",
    "A future self hands you a mirrored key.",
    "A rival faction offers a pact of convenience.",
];
