use std::path::PathBuf;

use halo::persist::{FileStore, MemoryStore, Persistence, SaveSlot, SaveStatus, PRIMARY_KEY};
use halo::{resolve_beat, start_run, GameState, Rules};

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("halo-persist-{}", uuid::Uuid::new_v4()))
}

#[test]
fn test_file_slot_resumes_run() {
    let rules = Rules::default();
    let dir = temp_dir();

    let mut state = GameState::with_seed(&rules, "HALO-SAVE02");
    start_run(&mut state, &rules);
    resolve_beat(&mut state, &rules);

    let mut slot = SaveSlot::new(FileStore::new(&dir));
    assert_eq!(slot.save(&state), SaveStatus::Persisted);

    let mut reopened = SaveSlot::new(FileStore::new(&dir));
    let mut loaded = reopened.load(&rules);
    assert_eq!(loaded, state);

    resolve_beat(&mut state, &rules);
    resolve_beat(&mut loaded, &rules);
    assert_eq!(loaded.run, state.run);
    assert_eq!(loaded.rng, state.rng);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_saved_record_shape() {
    let rules = Rules::default();
    let mut slot = SaveSlot::new(MemoryStore::new());
    slot.save(&GameState::with_seed(&rules, "HALO-SHAPE1"));

    let body = slot.store().get(PRIMARY_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["profile"]["seed"], "HALO-SHAPE1");
    assert_eq!(value["cursor"], 1);
    assert!(value["seedHash"].is_u64());
    assert!(value["gachaLog"].is_array());
    assert_eq!(value["run"], serde_json::Value::Null);
}

#[test]
fn test_blocked_storage_keeps_session() {
    let rules = Rules::default();
    let mut slot = SaveSlot::new(MemoryStore::read_only());
    let mut state = GameState::with_seed(&rules, "HALO-BLOCK2");
    start_run(&mut state, &rules);

    assert_eq!(slot.save(&state), SaveStatus::MemoryOnly);
    assert_eq!(slot.load(&rules), state);

    slot.store_mut().set_read_only(false);
    assert_eq!(slot.save(&state), SaveStatus::Persisted);
    assert!(slot.degraded());
}

#[test]
fn test_legacy_record_imported_once_saved() {
    let rules = Rules::default();
    let legacy = r#"{"currencies":{"credits":5,"embers":1,"shards":0},"vip":true}"#;
    let mut slot = SaveSlot::new(MemoryStore::with_records([("halo_mobile_state_v2", legacy)]));

    let state = slot.load(&rules);
    assert_eq!(state.currencies.credits, 5);
    assert!(state.vip);
    assert_eq!(state.profile.title, "Axis Runner");

    assert_eq!(slot.save(&state), SaveStatus::Persisted);
    assert!(slot.store().get(PRIMARY_KEY).unwrap().is_some());
    assert_eq!(slot.load(&rules), state);
}
