//! Replay recording and verification.
//!
//! A replay stores the seed, the rules and the stream of actions of a run.
//! Since every random draw comes from a [`SeededRng`] built from the seed,
//! re-applying the actions reproduces the run exactly.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{apply_action, new_game, Action};
use crate::error::{HivefallError, Result};
use crate::rng::SeededRng;
use crate::rules::HivefallRules;
use crate::state::HivefallState;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Seed of the run's random source.
    pub seed: u64,
    /// Rules the run was played with.
    pub rules: HivefallRules,
    /// Every action applied, in order, including rejected ones.
    pub actions: Vec<Action>,
    /// Move count when the run was finalized.
    pub final_move_count: u32,
    /// State hash when the run was finalized.
    pub final_hash: u64,
}

impl Replay {
    /// Start an empty replay.
    #[must_use]
    pub fn new(seed: u64, rules: HivefallRules) -> Self {
        Self {
            version: REPLAY_VERSION,
            seed,
            rules,
            actions: Vec::new(),
            final_move_count: 0,
            final_hash: 0,
        }
    }

    /// Record an action.
    pub fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Finalize the replay with the end state.
    pub fn finalize(&mut self, state: &HivefallState) {
        self.final_move_count = state.move_count();
        self.final_hash = state.state_hash();
    }

    /// Number of recorded actions.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Save the replay to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path.as_ref(), bytes).map_err(|source| HivefallError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })
    }

    /// Load a replay from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|source| HivefallError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        let replay: Self = bincode::deserialize(&bytes)?;

        if replay.version != REPLAY_VERSION {
            return Err(HivefallError::ReplayVersion {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }
        Ok(replay)
    }

    /// Re-run every action from a fresh state and return the final state.
    #[must_use]
    pub fn play(&self) -> Arc<HivefallState> {
        let mut rng = SeededRng::new(self.seed);
        self.actions
            .iter()
            .fold(new_game(&self.rules), |state, action| {
                apply_action(&state, action, &self.rules, &mut rng)
            })
    }

    /// Re-run the replay and check that it ends in the recorded state.
    pub fn verify(&self) -> Result<Arc<HivefallState>> {
        let state = self.play();
        let replayed = state.state_hash();
        if replayed != self.final_hash || state.move_count() != self.final_move_count {
            return Err(HivefallError::ReplayDesync {
                actions: self.actions.len(),
                recorded: self.final_hash,
                replayed,
            });
        }
        tracing::debug!(actions = self.actions.len(), hash = replayed, "Replay verified");
        Ok(state)
    }
}
