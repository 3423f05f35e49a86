//! Entry classification for actors stepping into a cell.
//!
//! Classification never mutates state; the engine applies the consequence.

use crate::grid::{CellEntity, GridPos};
use crate::state::{AllyId, EnemyId, HivefallState};

/// What happens when an actor enters a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Walkable and unoccupied.
    Free,
    /// Off the board or impassable terrain.
    BlockedByTerrain,
    /// An occupant the mover may not share a cell with.
    BlockedByOccupant(CellEntity),
    /// The player and this enemy meet; an encounter starts.
    Fight(EnemyId),
    /// An infected ally and an enemy meet; the ally is spent on the enemy.
    Strike {
        /// The ally that is consumed.
        ally: AllyId,
        /// The enemy that takes the hit.
        enemy: EnemyId,
    },
}

impl Collision {
    /// Returns true if the mover may step onto the cell.
    #[must_use]
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

fn walkable(state: &HivefallState, pos: GridPos) -> bool {
    state.grid.is_walkable(pos)
}

/// Classify the player stepping onto `pos`.
///
/// Allies block the player; an enemy starts a fight.
#[must_use]
pub fn classify_player_entry(state: &HivefallState, pos: GridPos) -> Collision {
    if !walkable(state, pos) {
        return Collision::BlockedByTerrain;
    }
    if let Some(enemy) = state.enemy_at(pos) {
        return Collision::Fight(enemy.id);
    }
    if state.ally_at(pos).is_some() {
        return Collision::BlockedByOccupant(CellEntity::AllyInfected);
    }
    Collision::Free
}

/// Classify an enemy stepping onto `pos`.
///
/// The player starts a fight, an ally strikes the enemy, another enemy blocks.
#[must_use]
pub fn classify_enemy_entry(state: &HivefallState, enemy: EnemyId, pos: GridPos) -> Collision {
    if !walkable(state, pos) {
        return Collision::BlockedByTerrain;
    }
    if state.player == pos {
        return Collision::Fight(enemy);
    }
    if let Some(ally) = state.ally_at(pos) {
        return Collision::Strike {
            ally: ally.id,
            enemy,
        };
    }
    match state.enemy_at(pos) {
        Some(other) if other.id != enemy => Collision::BlockedByOccupant(CellEntity::Enemy),
        _ => Collision::Free,
    }
}

/// Classify an infected ally stepping onto `pos`.
///
/// An enemy takes the strike; the player and other allies block.
#[must_use]
pub fn classify_ally_entry(state: &HivefallState, ally: AllyId, pos: GridPos) -> Collision {
    if !walkable(state, pos) {
        return Collision::BlockedByTerrain;
    }
    if state.player == pos {
        return Collision::BlockedByOccupant(CellEntity::Player);
    }
    if let Some(enemy) = state.enemy_at(pos) {
        return Collision::Strike {
            ally,
            enemy: enemy.id,
        };
    }
    match state.ally_at(pos) {
        Some(other) if other.id != ally => Collision::BlockedByOccupant(CellEntity::AllyInfected),
        _ => Collision::Free,
    }
}
