//! Batch runner for balance testing.
//!
//! Plays many seeded autopilot runs in parallel using rayon and
//! aggregates the outcomes.

use std::path::Path;
use std::time::Instant;

use hivefall_core::rules::HivefallRules;
use hivefall_core::state::GameStatus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::runner::{run_game, GameConfig, GameReport, DEFAULT_MAX_ACTIONS, DEFAULT_TICK_MS};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of runs to play
    pub game_count: u32,
    /// Seed of the first run; run `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Worker threads (0 = rayon default)
    pub parallel_games: u32,
    /// Action budget per run
    pub max_actions: u32,
    /// Milliseconds per autopilot tick
    pub tick_ms: u32,
    /// Rules shared by every run
    pub rules: HivefallRules,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            seed_start: 0,
            parallel_games: 0,
            max_actions: DEFAULT_MAX_ACTIONS,
            tick_ms: DEFAULT_TICK_MS,
            rules: HivefallRules::default(),
        }
    }
}

impl BatchConfig {
    /// Create config for `game_count` runs
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set worker threads
    pub fn with_parallel(mut self, parallel_games: u32) -> Self {
        self.parallel_games = parallel_games;
        self
    }

    /// Set rules
    pub fn with_rules(mut self, rules: HivefallRules) -> Self {
        self.rules = rules;
        self
    }

    fn game_config(&self, seed: u64) -> GameConfig {
        GameConfig {
            seed,
            rules: self.rules.clone(),
            max_actions: self.max_actions,
            tick_ms: self.tick_ms,
            record: false,
        }
    }
}

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Runs played.
    pub total_games: u32,
    /// Runs won.
    pub wins: u32,
    /// Runs lost.
    pub losses: u32,
    /// Runs that hit the action budget.
    pub unfinished: u32,
    /// Wins over runs played.
    pub win_rate: f64,
    /// Mean actions per run.
    pub avg_actions: f64,
    /// Mean accepted moves per run.
    pub avg_moves: f64,
    /// Mean enemies converted per run.
    pub avg_infected: f64,
    /// Mean fights per run.
    pub avg_fights: f64,
    /// Shortest run in actions.
    pub min_actions: u32,
    /// Longest run in actions.
    pub max_actions: u32,
}

impl BatchSummary {
    /// Calculate summary from a list of reports.
    #[must_use]
    pub fn from_games(games: &[GameReport]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_games: games.len() as u32,
            min_actions: u32::MAX,
            ..Default::default()
        };
        let mut actions_sum = 0u64;
        let mut moves_sum = 0u64;
        let mut infected_sum = 0u64;
        let mut fights_sum = 0u64;

        for game in games {
            match game.status {
                GameStatus::Won => summary.wins += 1,
                GameStatus::Lost => summary.losses += 1,
                GameStatus::Playing => summary.unfinished += 1,
            }
            actions_sum += u64::from(game.actions);
            moves_sum += u64::from(game.move_count);
            infected_sum += u64::from(game.infected_count);
            fights_sum += u64::from(game.fights);
            summary.min_actions = summary.min_actions.min(game.actions);
            summary.max_actions = summary.max_actions.max(game.actions);
        }

        let n = games.len() as f64;
        summary.win_rate = f64::from(summary.wins) / n;
        summary.avg_actions = actions_sum as f64 / n;
        summary.avg_moves = moves_sum as f64 / n;
        summary.avg_infected = infected_sum as f64 / n;
        summary.avg_fights = fights_sum as f64 / n;
        summary
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual run reports, in seed order
    pub games: Vec<GameReport>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Run index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run a batch of games
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        games = config.game_count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let play = || -> Vec<std::result::Result<GameReport, BatchError>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                match run_game(&config.game_config(seed)) {
                    Ok(outcome) => {
                        debug!(game = i, seed, status = ?outcome.report.status, "Run complete");
                        Ok(outcome.report)
                    }
                    Err(e) => {
                        warn!("Game {} failed: {}", i, e);
                        Err(BatchError {
                            game_index: i,
                            seed,
                            message: e.to_string(),
                        })
                    }
                }
            })
            .collect()
    };

    let results = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(play),
            Err(e) => {
                warn!("Failed to build thread pool: {}, using the global pool", e);
                play()
            }
        }
    } else {
        play()
    };

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_ok());
    let games: Vec<GameReport> = games.into_iter().filter_map(|r| r.ok()).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(|r| r.err()).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(0.001)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}
