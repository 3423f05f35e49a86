//! End-to-end tests for the headless runner: rules files, recorded runs and
//! batch results on disk.

use std::fs;

use hivefall_core::error::HivefallError;
use hivefall_core::replay::Replay;
use hivefall_core::rules::HivefallRules;
use hivefall_core::state::GameStatus;
use hivefall_headless::batch::{run_batch, BatchConfig, BatchResults};
use hivefall_headless::runner::{load_rules, run_game, GameConfig};
use hivefall_headless::HeadlessError;
use hivefall_test_utils::fixtures::board_rules;

#[test]
fn rules_file_merges_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.ron");
    fs::write(&path, "(board: (rows: 8, cols: 10), spawn: (max_enemies: 3))").unwrap();

    let rules = load_rules(Some(&path)).unwrap();
    assert_eq!(rules.board.rows, 8);
    assert_eq!(rules.board.cols, 10);
    assert_eq!(rules.spawn.max_enemies, 3);
    assert_eq!(rules.player, HivefallRules::default().player);
}

#[test]
fn invalid_rules_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    fs::write(&path, "(player: (max_hp: 0))").unwrap();

    let err = load_rules(Some(&path)).unwrap_err();
    assert!(matches!(
        err,
        HeadlessError::Core(HivefallError::InvalidRules(_))
    ));
}

#[test]
fn unparsable_rules_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.ron");
    fs::write(&path, "(spawn: (max_enemy: 3))").unwrap();

    let err = load_rules(Some(&path)).unwrap_err();
    assert!(matches!(err, HeadlessError::Core(HivefallError::RulesParse(_))));
}

#[test]
fn recorded_run_replays_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.replay");

    let config = GameConfig::with_seed(42).max_actions(800).recording();
    let outcome = run_game(&config).unwrap();
    outcome.replay.as_ref().unwrap().save(&path).unwrap();

    let loaded = Replay::load(&path).unwrap();
    assert_eq!(loaded.seed, 42);
    assert_eq!(loaded.final_hash, outcome.report.final_hash);
    let replayed = loaded.verify().unwrap();
    assert_eq!(*replayed, *outcome.state);
}

#[test]
fn small_board_runs_finish() {
    let mut rules = board_rules(6, 6);
    rules.spawn.max_enemies = 2;
    rules.spawn.first_spawn_after_moves = 2;

    let outcome = run_game(&GameConfig::with_seed(8).rules(rules).max_actions(20_000)).unwrap();
    assert_ne!(outcome.report.status, GameStatus::Playing);
    assert_eq!(
        outcome.report.infected_count as usize + outcome.state.enemies().len(),
        outcome.report.spawned_total as usize
    );
}

#[test]
fn batch_results_roundtrip_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("batch.json");

    let mut config = BatchConfig::new(6).with_seed(100).with_parallel(2);
    config.max_actions = 500;
    let results = run_batch(config);
    assert_eq!(results.games.len(), 6);
    assert!(results.errors.is_empty());
    results.save(&path).unwrap();

    let loaded = BatchResults::load(&path).unwrap();
    assert_eq!(loaded.games, results.games);
    assert_eq!(loaded.summary, results.summary);
    assert_eq!(loaded.config.rules, results.config.rules);
}

#[test]
fn batch_is_independent_of_thread_count() {
    let mut serial = BatchConfig::new(8).with_seed(7).with_parallel(1);
    serial.max_actions = 400;
    let parallel = serial.clone().with_parallel(4);

    let a = run_batch(serial);
    let b = run_batch(parallel);
    let hashes = |r: &BatchResults| r.games.iter().map(|g| g.final_hash).collect::<Vec<_>>();
    assert_eq!(hashes(&a), hashes(&b));
    assert_eq!(a.games[0].seed, 7);
    assert_eq!(a.games[7].seed, 14);
}
