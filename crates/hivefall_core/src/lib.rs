//! # Hivefall Core
//!
//! Deterministic turn-based grid-combat engine.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No timers (elapsed time is passed in explicitly)
//! - No ambient randomness (every draw comes from a [`rng::RandomSource`])
//! - No IO outside the explicit replay save/load helpers
//!
//! State is immutable from the host's point of view: every operation in
//! [`engine`] takes the current [`state::HivefallState`] behind an `Arc` and
//! returns the next one, handing back the very same `Arc` when the action
//! is rejected.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Board, terrain and occupancy tags
//! - [`movement`] / [`collision`] - Step resolution and entry classification
//! - [`pursuit`] - Greedy chase AI for enemies and infected allies
//! - [`pacing`] - Spawn cadence and edge placement
//! - [`combat`] - The encounter state machine
//! - [`engine`] - Turn orchestration and the public transition surface
//! - [`rules`] - Per-run configuration and RON overrides
//! - [`replay`] - Recording and verifying runs
//!
//! ## Debug Validation
//!
//! The `debug-validation` feature asserts grid/actor occupancy agreement
//! after every accepted transition:
//!
//! ```bash
//! cargo test -p hivefall_core --features debug-validation
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod collision;
pub mod combat;
pub mod engine;
pub mod error;
pub mod grid;
pub mod inventory;
pub mod loot;
pub mod math;
pub mod movement;
pub mod pacing;
pub mod pursuit;
pub mod replay;
pub mod rng;
pub mod rules;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{CombatExchange, FightPhase, FightState, PhaseKind, WonChoice};
    pub use crate::engine::{
        apply_action, attack, choose_won_outcome, end_fight, engage, flee, grant_weapon,
        move_player, new_game, reset, start_fight, tick_enemy_hit, use_food, Action,
    };
    pub use crate::error::{HivefallError, Result};
    pub use crate::grid::{CellEntity, CellState, Direction, GridPos, Terrain};
    pub use crate::inventory::{Inventory, WeaponId};
    pub use crate::math::Fixed;
    pub use crate::replay::Replay;
    pub use crate::rng::{RandomSource, SeededRng};
    pub use crate::rules::{HivefallRules, RulesOverrides, WeaponStats};
    pub use crate::state::{Enemy, EnemyId, GameStatus, HivefallState, InfectedAlly};
}
