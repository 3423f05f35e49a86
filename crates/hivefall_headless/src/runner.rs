//! Single-run driver.
//!
//! Plays one seeded run with the [`Autopilot`] until it ends or the action
//! budget is spent, optionally recording a [`Replay`].

use std::path::Path;
use std::sync::Arc;

use hivefall_core::engine::{apply_action, new_game};
use hivefall_core::inventory::WeaponId;
use hivefall_core::replay::Replay;
use hivefall_core::rng::SeededRng;
use hivefall_core::rules::HivefallRules;
use hivefall_core::state::{GameStatus, HivefallState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::autopilot::Autopilot;
use crate::error::{HeadlessError, Result};

/// Default action budget per run.
pub const DEFAULT_MAX_ACTIONS: u32 = 5_000;

/// Default milliseconds per autopilot tick.
pub const DEFAULT_TICK_MS: u32 = 250;

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Engine seed.
    pub seed: u64,
    /// Rules of the run.
    pub rules: HivefallRules,
    /// Stop after this many actions even if the run is still going.
    pub max_actions: u32,
    /// Milliseconds per autopilot tick.
    pub tick_ms: u32,
    /// Record a replay of the run.
    pub record: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            rules: HivefallRules::default(),
            max_actions: DEFAULT_MAX_ACTIONS,
            tick_ms: DEFAULT_TICK_MS,
            record: false,
        }
    }
}

impl GameConfig {
    /// Default config with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Set the rules.
    pub fn rules(mut self, rules: HivefallRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the action budget.
    pub fn max_actions(mut self, max_actions: u32) -> Self {
        self.max_actions = max_actions;
        self
    }

    /// Record a replay.
    pub fn recording(mut self) -> Self {
        self.record = true;
        self
    }
}

/// Summary of a finished (or abandoned) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    /// Engine seed.
    pub seed: u64,
    /// Status when the run stopped.
    pub status: GameStatus,
    /// Actions issued by the autopilot.
    pub actions: u32,
    /// Actions the engine rejected.
    pub rejected_actions: u32,
    /// Fights started.
    pub fights: u32,
    /// Accepted player moves.
    pub move_count: u32,
    /// Enemies converted.
    pub infected_count: u32,
    /// Enemies spawned.
    pub spawned_total: u32,
    /// Player hit points at the end.
    pub hp: u32,
    /// Food left at the end.
    pub food: u32,
    /// Weapons owned at the end.
    pub weapons: Vec<WeaponId>,
    /// Hash of the final state.
    pub final_hash: u64,
}

impl GameReport {
    /// The run ended in a win.
    pub fn is_win(&self) -> bool {
        self.status == GameStatus::Won
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    /// Summary.
    pub report: GameReport,
    /// Final state.
    pub state: Arc<HivefallState>,
    /// Recording, when requested.
    pub replay: Option<Replay>,
}

/// Play one run.
///
/// The rules are validated first; an invalid rule set never reaches the
/// engine.
pub fn run_game(config: &GameConfig) -> Result<GameOutcome> {
    let rules = &config.rules;
    rules.validate()?;

    let mut rng = SeededRng::new(config.seed);
    let mut pilot = Autopilot::new(config.seed, config.tick_ms);
    let mut replay = config
        .record
        .then(|| Replay::new(config.seed, rules.clone()));

    let mut state = new_game(rules);
    let mut actions = 0;
    let mut rejected_actions = 0;
    let mut fights = 0;

    while actions < config.max_actions {
        let Some(action) = pilot.decide(&state, rules) else {
            break;
        };
        let next = apply_action(&state, &action, rules, &mut rng);
        actions += 1;

        if Arc::ptr_eq(&state, &next) {
            rejected_actions += 1;
            debug!(?action, "Action rejected");
        }
        if state.fight().is_none() && next.fight().is_some() {
            fights += 1;
        }
        if let Some(replay) = replay.as_mut() {
            replay.record(action);
        }
        state = next;
    }

    if let Some(replay) = replay.as_mut() {
        replay.finalize(&state);
    }

    let report = GameReport {
        seed: config.seed,
        status: state.status(),
        actions,
        rejected_actions,
        fights,
        move_count: state.move_count(),
        infected_count: state.infected_count(),
        spawned_total: state.spawned_total(),
        hp: state.hp(),
        food: state.inventory().food(),
        weapons: state.inventory().weapons().to_vec(),
        final_hash: state.state_hash(),
    };

    info!(
        seed = config.seed,
        status = ?report.status,
        actions = report.actions,
        infected = report.infected_count,
        "Run finished"
    );

    Ok(GameOutcome {
        report,
        state,
        replay,
    })
}

/// Load rules from a RON overrides file merged over the defaults, or the
/// defaults when no file is given. The result is validated.
pub fn load_rules(path: Option<&Path>) -> Result<HivefallRules> {
    let rules = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| HeadlessError::RulesFile {
                path: path.to_path_buf(),
                source,
            })?;
            HivefallRules::from_ron(&text)?
        }
        None => HivefallRules::default(),
    };
    rules.validate()?;
    Ok(rules)
}

/// Play the same run `runs` times and check every report matches.
pub fn verify_determinism(config: &GameConfig, runs: u32) -> Result<bool> {
    let mut first: Option<GameReport> = None;
    for _ in 0..runs {
        let report = run_game(config)?.report;
        match &first {
            Some(expected) if *expected != report => return Ok(false),
            Some(_) => {}
            None => first = Some(report),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hivefall_core::error::HivefallError;

    #[test]
    fn test_budget_caps_actions() {
        let outcome = run_game(&GameConfig::with_seed(3).max_actions(10)).unwrap();
        assert!(outcome.report.actions <= 10);
        assert!(outcome.replay.is_none());
    }

    #[test]
    fn test_recorded_run_verifies() {
        let outcome = run_game(&GameConfig::with_seed(11).max_actions(400).recording()).unwrap();
        let replay = outcome.replay.unwrap();
        assert_eq!(replay.action_count(), outcome.report.actions as usize);
        let replayed = replay.verify().unwrap();
        assert_eq!(replayed.state_hash(), outcome.report.final_hash);
    }

    #[test]
    fn test_runs_are_deterministic() {
        assert!(verify_determinism(&GameConfig::with_seed(5).max_actions(600), 3).unwrap());
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let mut rules = HivefallRules::default();
        rules.board.rows = 0;
        let err = run_game(&GameConfig::default().rules(rules)).unwrap_err();
        assert!(matches!(
            err,
            HeadlessError::Core(HivefallError::InvalidRules(_))
        ));
    }

    #[test]
    fn test_no_enemies_wins_immediately() {
        let mut rules = HivefallRules::default();
        rules.spawn.max_enemies = 0;
        let outcome = run_game(&GameConfig::with_seed(1).rules(rules)).unwrap();
        assert_eq!(outcome.report.status, GameStatus::Won);
        assert_eq!(outcome.report.actions, 1);
    }

    #[test]
    fn test_missing_rules_file() {
        let err = load_rules(Some(Path::new("/no/such/rules.ron"))).unwrap_err();
        assert!(matches!(err, HeadlessError::RulesFile { .. }));
    }
}
