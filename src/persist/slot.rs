//! Save Slot
//!
//! Saves never fail from the caller's point of view: the last saved state
//! is always kept in memory, and a broken backend only downgrades the slot
//! to memory-only with a single warning. Loading prefers the primary
//! record, then the in-memory copy, then the first legacy record merged
//! onto a fresh state.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{PersistError, Persistence};
use crate::game::config::Rules;
use crate::game::state::GameState;

/// Key of the current save format.
pub const PRIMARY_KEY: &str = "halo_meta_state_v1";

/// Keys of older save formats, in import priority order.
pub const LEGACY_KEYS: [&str; 3] = ["halo_mobile_state_v2", "halo_state", "halo_meta_arc_v0"];

/// Outcome of a save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    /// Written to the backend.
    Persisted,
    /// Backend failed; state is held in memory for this session only.
    MemoryOnly,
}

/// Save slot over a persistence backend.
#[derive(Debug)]
pub struct SaveSlot<P> {
    store: P,
    memory: Option<GameState>,
    warned: bool,
}

impl<P: Persistence> SaveSlot<P> {
    /// Slot over a backend.
    pub fn new(store: P) -> Self {
        Self {
            store,
            memory: None,
            warned: false,
        }
    }

    /// The backend.
    pub fn store(&self) -> &P {
        &self.store
    }

    /// Mutable access to the backend.
    pub fn store_mut(&mut self) -> &mut P {
        &mut self.store
    }

    /// Whether a save has failed during this session.
    pub fn degraded(&self) -> bool {
        self.warned
    }

    /// Persist the state. Always keeps an in-memory copy.
    pub fn save(&mut self, state: &GameState) -> SaveStatus {
        self.memory = Some(state.clone());

        let result = serde_json::to_string(state)
            .map_err(PersistError::from)
            .and_then(|body| self.store.set(PRIMARY_KEY, &body));

        match result {
            Ok(()) => SaveStatus::Persisted,
            Err(err) => {
                if !self.warned {
                    warn!(error = %err, "storage unavailable; keeping state in memory only");
                    self.warned = true;
                }
                SaveStatus::MemoryOnly
            }
        }
    }

    /// Load the best available state.
    pub fn load(&mut self, rules: &Rules) -> GameState {
        match self.read_primary() {
            Ok(Some(state)) => return state,
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "failed to load state");
                if let Some(state) = &self.memory {
                    return state.clone();
                }
            }
        }

        if let Some(state) = self.import_legacy(rules) {
            self.memory = Some(state.clone());
            return state;
        }

        match &self.memory {
            Some(state) => state.clone(),
            None => GameState::new(rules),
        }
    }

    fn read_primary(&self) -> Result<Option<GameState>, PersistError> {
        match self.store.get(PRIMARY_KEY)? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// First readable legacy record, shallow-merged onto a fresh state.
    fn import_legacy(&self, rules: &Rules) -> Option<GameState> {
        for key in LEGACY_KEYS {
            let body = match self.store.get(key) {
                Ok(Some(body)) => body,
                Ok(None) => continue,
                Err(err) => {
                    warn!(key, error = %err, "legacy migration failed");
                    continue;
                }
            };
            match merge_onto_fresh(&body, rules) {
                Ok(state) => {
                    info!(key, "imported legacy save");
                    return Some(state);
                }
                Err(err) => debug!(key, error = %err, "legacy record unusable"),
            }
        }
        None
    }
}

/// Overwrite the top-level fields of a fresh state with a record's fields.
fn merge_onto_fresh(body: &str, rules: &Rules) -> Result<GameState, PersistError> {
    let Value::Object(legacy) = serde_json::from_str::<Value>(body)? else {
        return Err(PersistError::Serialization(<serde_json::Error as serde::de::Error>::custom(
            "legacy record is not an object",
        )));
    };
    let mut base = serde_json::to_value(GameState::new(rules))?;

    if let Value::Object(base_map) = &mut base {
        for (key, value) in legacy {
            base_map.insert(key, value);
        }
    }
    Ok(serde_json::from_value(base)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;

    #[test]
    fn test_save_then_load() {
        let rules = Rules::default();
        let mut slot = SaveSlot::new(MemoryStore::new());
        let mut state = GameState::with_seed(&rules, "HALO-SAVE01");
        state.currencies.credits = 42;

        assert_eq!(slot.save(&state), SaveStatus::Persisted);
        assert!(slot.store().get(PRIMARY_KEY).unwrap().is_some());

        let mut fresh_slot = SaveSlot::new(slot.store().clone());
        assert_eq!(fresh_slot.load(&rules), state);
    }

    #[test]
    fn test_failed_save_keeps_memory_copy() {
        let rules = Rules::default();
        let mut slot = SaveSlot::new(MemoryStore::read_only());
        let state = GameState::with_seed(&rules, "HALO-BLOCKED");

        assert_eq!(slot.save(&state), SaveStatus::MemoryOnly);
        assert!(slot.degraded());
        assert_eq!(slot.save(&state), SaveStatus::MemoryOnly);
        assert_eq!(slot.load(&rules), state);
    }

    #[test]
    fn test_corrupt_primary_falls_back_to_memory() {
        let rules = Rules::default();
        let mut slot = SaveSlot::new(MemoryStore::new());
        let state = GameState::with_seed(&rules, "HALO-CORRUPT");
        slot.save(&state);

        slot.store_mut().set(PRIMARY_KEY, "{not json").unwrap();
        assert_eq!(slot.load(&rules), state);
    }

    #[test]
    fn test_legacy_merge() {
        let rules = Rules::default();
        let legacy = r#"{"vip":true,"pity":5,"profile":{"pilot":"Nova","seed":"OLD-SEED"}}"#;
        let mut slot = SaveSlot::new(MemoryStore::with_records([("halo_state", legacy)]));

        let state = slot.load(&rules);
        assert!(state.vip);
        assert_eq!(state.pity, 5);
        assert_eq!(state.profile.pilot, "Nova");
        assert_eq!(state.profile.title, "Axis Runner");
        assert_eq!(state.currencies.credits, 1200);
        assert_eq!(state.deck.len(), 6);
    }

    #[test]
    fn test_legacy_priority() {
        let rules = Rules::default();
        let mut slot = SaveSlot::new(MemoryStore::with_records([
            ("halo_meta_arc_v0", r#"{"pity":1}"#),
            ("halo_mobile_state_v2", r#"{"pity":2}"#),
        ]));
        assert_eq!(slot.load(&rules).pity, 2);
    }

    #[test]
    fn test_empty_store_gives_fresh_state() {
        let rules = Rules::default();
        let mut slot = SaveSlot::new(MemoryStore::new());
        let state = slot.load(&rules);
        assert!(state.profile.seed.starts_with("HALO-"));
        assert!(state.run.is_none());
        assert_eq!(state.rng.cursor(), 1);
    }
}
