//! Turn loop benchmarks for hivefall_core.
//!
//! Run with: `cargo bench -p hivefall_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hivefall_core::engine::{apply_action, new_game, Action};
use hivefall_core::grid::Direction;
use hivefall_core::rng::SeededRng;
use hivefall_core::rules::HivefallRules;

fn action_stream(len: usize) -> Vec<Action> {
    let pattern = [
        Action::Move(Direction::Left),
        Action::Move(Direction::Up),
        Action::Engage,
        Action::Attack("fists".into()),
        Action::Tick(250),
        Action::Move(Direction::Right),
        Action::Move(Direction::Down),
        Action::Flee,
    ];
    pattern.iter().cycle().take(len).cloned().collect()
}

/// Runs a seeded action stream from a fresh state.
pub fn turn_loop_benchmark(c: &mut Criterion) {
    let rules = HivefallRules::default();
    let mut group = c.benchmark_group("turn_loop");
    for len in [64usize, 512] {
        let actions = action_stream(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &actions, |b, actions| {
            b.iter(|| {
                let mut rng = SeededRng::new(42);
                let state = actions.iter().fold(new_game(&rules), |state, action| {
                    apply_action(&state, action, &rules, &mut rng)
                });
                black_box(state.state_hash())
            });
        });
    }
    group.finish();
}

/// Measures the cost of hashing a populated state.
pub fn state_hash_benchmark(c: &mut Criterion) {
    let rules = HivefallRules::default();
    let mut rng = SeededRng::new(7);
    let state = action_stream(256).iter().fold(new_game(&rules), |state, action| {
        apply_action(&state, action, &rules, &mut rng)
    });
    c.bench_function("state_hash", |b| b.iter(|| black_box(state.state_hash())));
}

criterion_group!(benches, turn_loop_benchmark, state_hash_benchmark);
criterion_main!(benches);
