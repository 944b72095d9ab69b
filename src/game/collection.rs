//! Collection and Deck Legality
//!
//! Owned card counts and the rules tying a deck to them. A deck may only
//! reference owned cards and never exceeds the configured size.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::catalog::{card_by_id, Rarity, ARCHETYPES};
use crate::game::config::Rules;

/// Card id to owned count. Counts only grow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection(BTreeMap<String, u32>);

impl Collection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned copies of a card.
    pub fn count(&self, id: &str) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }

    /// Whether at least one copy is owned.
    pub fn owns(&self, id: &str) -> bool {
        self.count(id) > 0
    }

    /// Add copies of a card.
    pub fn add(&mut self, id: &str, copies: u32) {
        let entry = self.0.entry(id.to_string()).or_insert(0);
        *entry = entry.saturating_add(copies);
    }

    /// Number of distinct cards owned.
    pub fn distinct(&self) -> usize {
        self.0.values().filter(|&&n| n > 0).count()
    }

    /// Iterate `(id, count)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(id, n)| (id.as_str(), *n))
    }
}

/// Collection of a fresh profile: every common and every rare, with the
/// configured number of copies each. Mythics come only from pulls.
pub fn starter_collection(rules: &Rules) -> Collection {
    let mut collection = Collection::new();
    for card in ARCHETYPES {
        let copies = match card.rarity {
            Rarity::Common => rules.starter_commons,
            Rarity::Rare => rules.starter_rares,
            Rarity::Mythic => 0,
        };
        if copies > 0 {
            collection.add(card.id, copies);
        }
    }
    collection
}

/// Make a deck legal against a collection.
///
/// Keeps owned ids in order, substitutes the fallback deck when nothing is
/// left, then truncates to the maximum size. The collection is untouched.
pub fn ensure_deck_legal(deck: &[String], collection: &Collection, rules: &Rules) -> Vec<String> {
    let mut legal: Vec<String> = deck
        .iter()
        .filter(|id| collection.owns(id))
        .cloned()
        .collect();
    if legal.is_empty() {
        debug!("deck empty after legality filter, using fallback");
        legal = rules.fallback_deck.clone();
    }
    legal.truncate(rules.max_deck_size);
    legal
}

/// Append a card to the deck if it exists, is owned and the deck has room.
pub fn add_card_to_deck(
    deck: &mut Vec<String>,
    collection: &Collection,
    id: &str,
    rules: &Rules,
) -> bool {
    if card_by_id(id).is_none() || !collection.owns(id) || deck.len() >= rules.max_deck_size {
        return false;
    }
    deck.push(id.to_string());
    true
}

/// Remove the first copy of a card from the deck.
pub fn remove_card_from_deck(deck: &mut Vec<String>, id: &str) -> bool {
    match deck.iter().position(|d| d == id) {
        Some(idx) => {
            deck.remove(idx);
            true
        }
        None => false,
    }
}
