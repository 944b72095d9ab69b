//! HALO Relay
//!
//! Serves the co-op WebSocket relay. `halo-relay demo [SEED]` instead plays
//! a deterministic run, checks it against a replay and saves the result.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use halo::{
    game::run::{cash_out, fingerprint},
    network::{RelayServer, ServerConfig},
    persist::{FileStore, SaveSlot, SaveStatus},
    play_card, replay_run, resolve_beat, start_run, GameState, RunAction, Rules, VERSION,
};

/// Beats the demo plays before banking.
const DEMO_BEATS: usize = 6;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("HALO engine v{}", VERSION);
    let rules = load_rules()?;

    let mut args = std::env::args().skip(1);
    let command = args.next();
    let seed = args.next().unwrap_or_else(|| "HALO-TEST1".to_string());
    match command.as_deref() {
        Some("demo") => demo_run(&rules, &seed),
        Some(other) => bail!("unknown command: {}", other),
        None => {
            let server = RelayServer::new(ServerConfig::from_env());
            tokio::select! {
                result = server.run() => result.context("relay failed")?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    server.shutdown();
                }
            }
            Ok(())
        }
    }
}

/// Rules from `HALO_RULES`, or the defaults.
fn load_rules() -> Result<Rules> {
    match std::env::var("HALO_RULES") {
        Ok(path) => {
            let rules = Rules::from_json_file(&path)
                .with_context(|| format!("failed to load rules from {}", path))?;
            info!("Rules loaded from {}", path);
            Ok(rules)
        }
        Err(_) => Ok(Rules::default()),
    }
}

/// Play a run, verify it replays identically, then bank and save it.
fn demo_run(rules: &Rules, seed: &str) -> Result<()> {
    info!("=== Starting Demo Run ===");
    info!("Seed: {}", seed);

    let mut live = GameState::with_seed(rules, seed);
    start_run(&mut live, rules);
    let checkpoint = live.clone();

    let mut actions = Vec::new();
    for beat in 0..DEMO_BEATS {
        let first = live.run.as_ref().and_then(|run| run.hand.first().cloned());
        if let Some(id) = first {
            if let Some(outcome) = play_card(&mut live, &id, rules) {
                info!("Beat {}: played {} (advantage {}, +{} credits)", beat, id, outcome.advantage, outcome.credits);
            }
        }
        actions.push(RunAction::PlayFirst);

        let result = resolve_beat(&mut live, rules);
        actions.push(RunAction::Beat);
        if let Some(run) = &live.run {
            info!(
                "Beat {}: depth {} momentum {} aegis {} doom {}",
                beat, run.depth, run.momentum, run.aegis, run.doom
            );
        }
        if result.crashed {
            info!("Run crashed on beat {}", beat);
            break;
        }
    }

    info!("=== Verifying Determinism ===");
    let mut replayed = checkpoint;
    let events = replay_run(&mut replayed, &actions, rules);
    info!("Replayed {} actions, {} events", actions.len(), events.len());

    let live_hash = live.run.as_ref().map(|run| hex::encode(fingerprint(run, &live.rng)));
    let replay_hash = replayed.run.as_ref().map(|run| hex::encode(fingerprint(run, &replayed.rng)));
    info!("Live fingerprint:   {:?}", live_hash);
    info!("Replay fingerprint: {:?}", replay_hash);
    if live_hash != replay_hash || live.currencies != replayed.currencies {
        bail!("determinism failure: replay diverged");
    }
    info!("DETERMINISM VERIFIED");

    if let Some(summary) = cash_out(&mut live, rules) {
        info!(
            "Banked at depth {}: +{} credits, +{} embers",
            summary.depth, summary.credits, summary.embers
        );
    }

    let dir = std::env::var("HALO_SAVE_DIR").unwrap_or_else(|_| "halo-save".to_string());
    let mut slot = SaveSlot::new(FileStore::new(&dir));
    match slot.save(&live) {
        SaveStatus::Persisted => info!("Saved to {}", dir),
        SaveStatus::MemoryOnly => warn!("Save to {} failed; state kept in memory only", dir),
    }
    Ok(())
}
