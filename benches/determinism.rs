//! Benchmarks for the deterministic run engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use halo::game::gacha::pull_pack;
use halo::game::run::fingerprint;
use halo::{replay_run, start_run, GameState, RunAction, Rules, SeedState};

fn bench_rng(c: &mut Criterion) {
    c.bench_function("seed_state_next_1000", |b| {
        b.iter(|| {
            let mut rng = SeedState::from_seed("HALO-BENCH");
            for _ in 0..1000 {
                black_box(rng.next());
            }
        })
    });
}

fn bench_runs(c: &mut Criterion) {
    let rules = Rules::default();
    let mut group = c.benchmark_group("replay_run");
    for beats in [4usize, 16, 64] {
        let actions: Vec<RunAction> = (0..beats)
            .flat_map(|_| [RunAction::PlayFirst, RunAction::Beat])
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(beats), &actions, |b, actions| {
            b.iter(|| {
                let mut state = GameState::with_seed(&rules, "HALO-BENCH");
                start_run(&mut state, &rules);
                black_box(replay_run(&mut state, actions, &rules))
            })
        });
    }
    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let rules = Rules::default();
    let mut state = GameState::with_seed(&rules, "HALO-BENCH");
    start_run(&mut state, &rules);
    let Some(run) = state.run.clone() else { return };

    c.bench_function("run_fingerprint", |b| {
        b.iter(|| black_box(fingerprint(&run, &state.rng)))
    });
}

fn bench_pulls(c: &mut Criterion) {
    let rules = Rules::default();
    c.bench_function("pulse_pack_pull", |b| {
        b.iter(|| {
            let mut state = GameState::with_seed(&rules, "HALO-BENCH");
            black_box(pull_pack(&mut state, "pulse", &rules).is_ok())
        })
    });
}

criterion_group!(benches, bench_rng, bench_runs, bench_fingerprint, bench_pulls);
criterion_main!(benches);
