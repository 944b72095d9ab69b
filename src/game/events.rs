//! Run Events
//!
//! Events emitted while a run advances, for replays and client feedback.
//! They describe what happened; the state change has already been applied.

use serde::{Deserialize, Serialize};

use crate::game::catalog::Element;
use crate::game::run::RunEnd;

/// Order of events emitted within the same depth.
///
/// Lower value = listed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Card plays come first
    CardPlay = 0,
    /// Then the threat gate
    Threat = 1,
    /// Then the boon gate
    Boon = 2,
    /// Then the beat advance
    Advance = 3,
    /// Run end is always last
    RunEnd = 255,
}

/// Run event data.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEventData {
    /// A card was played
    CardPlayed {
        /// Card id
        card: String,
        /// Element of the encounter it was played against
        against: Element,
        /// Advantage of the play
        advantage: i32,
        /// Credits earned by the card
        credits: u64,
    },

    /// High doom cracked aegis on a threat
    ThreatOverloaded {
        /// Aegis after the crack
        aegis: i32,
    },

    /// High momentum paid out on a boon
    BoonPaid {
        /// Credits paid
        credits: u64,
        /// Embers paid
        embers: u64,
    },

    /// The run moved one beat deeper
    BeatAdvanced {
        /// Element of the new encounter
        next: Element,
        /// Doom added by the end-of-beat tick
        doom_tick: i32,
    },

    /// The run ended
    RunEnded {
        /// Why it ended
        reason: RunEnd,
        /// Credits paid
        credits: u64,
    },
}

/// A run event stamped with the depth it happened at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEvent {
    /// Depth when the event occurred
    pub depth: u32,

    /// Listing priority
    pub priority: EventPriority,

    /// Event data
    pub data: RunEventData,
}

impl RunEvent {
    /// Create a new event.
    pub fn new(depth: u32, priority: EventPriority, data: RunEventData) -> Self {
        Self { depth, priority, data }
    }

    /// Create card played event.
    pub fn card_played(depth: u32, card: &str, against: Element, advantage: i32, credits: u64) -> Self {
        Self::new(
            depth,
            EventPriority::CardPlay,
            RunEventData::CardPlayed {
                card: card.to_string(),
                against,
                advantage,
                credits,
            },
        )
    }

    /// Create threat overloaded event.
    pub fn threat_overloaded(depth: u32, aegis: i32) -> Self {
        Self::new(depth, EventPriority::Threat, RunEventData::ThreatOverloaded { aegis })
    }

    /// Create boon paid event.
    pub fn boon_paid(depth: u32, credits: u64, embers: u64) -> Self {
        Self::new(depth, EventPriority::Boon, RunEventData::BoonPaid { credits, embers })
    }

    /// Create beat advanced event.
    pub fn beat_advanced(depth: u32, next: Element, doom_tick: i32) -> Self {
        Self::new(
            depth,
            EventPriority::Advance,
            RunEventData::BeatAdvanced { next, doom_tick },
        )
    }

    /// Create run ended event.
    pub fn run_ended(depth: u32, reason: RunEnd, credits: u64) -> Self {
        Self::new(depth, EventPriority::RunEnd, RunEventData::RunEnded { reason, credits })
    }
}

impl PartialOrd for RunEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RunEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: depth, then priority, then payload so Equal matches ==
        self.depth
            .cmp(&other.depth)
            .then(self.priority.cmp(&other.priority))
            .then_with(|| self.data.cmp(&other.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let play = RunEvent::card_played(3, "warden", Element::Earth, 1, 0);
        let threat = RunEvent::threat_overloaded(3, 2);
        let end = RunEvent::run_ended(3, RunEnd::Crashed, 45);
        let later = RunEvent::card_played(4, "seeker", Element::Fire, 0, 0);

        // Same depth: play < threat < end
        assert!(play < threat);
        assert!(threat < end);

        // Depth dominates priority
        assert!(end < later);
    }

    #[test]
    fn test_event_ordering_agrees_with_eq() {
        let warden = RunEvent::card_played(3, "warden", Element::Earth, 1, 0);
        let seeker = RunEvent::card_played(3, "seeker", Element::Earth, 1, 0);

        assert_ne!(warden, seeker);
        assert_ne!(warden.cmp(&seeker), std::cmp::Ordering::Equal);
        assert_eq!(warden.cmp(&warden.clone()), std::cmp::Ordering::Equal);

        let set: std::collections::BTreeSet<_> = [warden.clone(), seeker, warden].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = RunEvent::boon_paid(1, 20, 2);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["data"]["type"], "boon_paid");
        assert_eq!(value["data"]["credits"], 20);
    }
}
