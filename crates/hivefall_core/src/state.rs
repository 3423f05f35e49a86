//! The aggregate run state.
//!
//! [`HivefallState`] is the single aggregate root of a run. The engine
//! treats it as an immutable value: every transition clones the previous
//! state, edits the copy, and hands it out behind an [`Arc`]. The grid sits
//! behind its own `Arc` and is only copied when occupancy actually changes.
//! A rejected action returns the very same `Arc`, so hosts detect no-ops
//! with [`Arc::ptr_eq`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::combat::FightState;
use crate::error::{HivefallError, Result};
use crate::grid::{CellEntity, GameCell, Grid, GridPos, Terrain};
use crate::inventory::Inventory;
use crate::pacing::SpawnPacing;
use crate::rules::HivefallRules;

/// Enemy identifier, unique for the lifetime of a run and never reused.
pub type EnemyId = u32;

/// Infected ally identifier, unique for the lifetime of a run.
pub type AllyId = u32;

/// A live enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enemy {
    /// Spawn-order identifier.
    pub id: EnemyId,
    /// Board position.
    pub position: GridPos,
    /// Remaining hit points.
    pub hp: u32,
    /// Hit points at spawn.
    pub max_hp: u32,
}

/// A converted enemy that hunts the remaining enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InfectedAlly {
    /// Conversion-order identifier.
    pub id: AllyId,
    /// Board position.
    pub position: GridPos,
}

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// The run is in progress.
    #[default]
    Playing,
    /// Every enemy of the run has been spawned and converted.
    Won,
    /// The player was defeated.
    Lost,
}

/// Complete state of one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HivefallState {
    pub(crate) grid: Arc<Grid>,
    pub(crate) player: GridPos,
    pub(crate) hp: u32,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) allies: Vec<InfectedAlly>,
    pub(crate) move_count: u32,
    pub(crate) infected_count: u32,
    pub(crate) inventory: Inventory,
    pub(crate) fight: Option<FightState>,
    pub(crate) status: GameStatus,
    pub(crate) pacing: SpawnPacing,
    pub(crate) next_enemy_id: EnemyId,
    pub(crate) next_infected_id: AllyId,
}

impl HivefallState {
    /// Fresh run state: terrain laid out, player at the start cell with full
    /// hp and the starting loadout, no enemies or allies.
    ///
    /// Rules are expected to have passed [`HivefallRules::validate`].
    #[must_use]
    pub fn new(rules: &HivefallRules) -> Self {
        let mut grid = Grid::new(rules.board.bounds());
        let terrain = [
            (Terrain::Wall, &rules.board.walls),
            (Terrain::Obstacle, &rules.board.obstacles),
            (Terrain::Hazard, &rules.board.hazards),
        ];
        for (kind, cells) in terrain {
            for pos in cells {
                grid.set_terrain(*pos, kind);
            }
        }

        let player = rules.board.player_start();
        grid.set_entity(player, CellEntity::Player);

        let mut inventory = Inventory::new();
        for id in &rules.starting_weapons {
            let consumable = rules.weapon(id).is_some_and(|w| w.consumable);
            inventory.grant_weapon(id, consumable);
        }

        Self {
            grid: Arc::new(grid),
            player,
            hp: rules.player.max_hp,
            enemies: Vec::new(),
            allies: Vec::new(),
            move_count: 0,
            infected_count: 0,
            inventory,
            fight: None,
            status: GameStatus::Playing,
            pacing: SpawnPacing::new(&rules.spawn),
            next_enemy_id: 1,
            next_infected_id: 1,
        }
    }

    /// The board.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// A board cell; `None` if out of bounds.
    #[must_use]
    pub fn cell(&self, pos: GridPos) -> Option<&GameCell> {
        self.grid.cell(pos)
    }

    /// Player position.
    #[must_use]
    pub const fn player(&self) -> GridPos {
        self.player
    }

    /// Player hit points.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Infected allies in conversion order.
    #[must_use]
    pub fn allies(&self) -> &[InfectedAlly] {
        &self.allies
    }

    /// Successful player moves this run.
    #[must_use]
    pub const fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Enemies converted this run.
    #[must_use]
    pub const fn infected_count(&self) -> u32 {
        self.infected_count
    }

    /// Player inventory.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The active encounter, if any.
    #[must_use]
    pub const fn fight(&self) -> Option<&FightState> {
        self.fight.as_ref()
    }

    /// Overall run status.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Spawn pacing counters.
    #[must_use]
    pub const fn pacing(&self) -> SpawnPacing {
        self.pacing
    }

    /// Identifier the next spawned enemy will get.
    #[must_use]
    pub const fn next_enemy_id(&self) -> EnemyId {
        self.next_enemy_id
    }

    /// Identifier the next converted ally will get.
    #[must_use]
    pub const fn next_infected_id(&self) -> AllyId {
        self.next_infected_id
    }

    /// Enemies spawned so far this run, alive or not.
    #[must_use]
    pub const fn spawned_total(&self) -> u32 {
        self.next_enemy_id.saturating_sub(1)
    }

    /// Look up a live enemy.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// The live enemy standing on a cell.
    #[must_use]
    pub fn enemy_at(&self, pos: GridPos) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.position == pos)
    }

    /// The ally standing on a cell.
    #[must_use]
    pub fn ally_at(&self, pos: GridPos) -> Option<&InfectedAlly> {
        self.allies.iter().find(|a| a.position == pos)
    }

    /// Place a new enemy on a free walkable cell, consuming the next enemy id.
    ///
    /// Used by the spawner and by hosts authoring scenarios. Returns `None`
    /// if the cell is off the board, not walkable or occupied.
    pub fn place_enemy(&mut self, pos: GridPos, max_hp: u32) -> Option<EnemyId> {
        if !self.is_free(pos) {
            return None;
        }
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        self.enemies.push(Enemy {
            id,
            position: pos,
            hp: max_hp,
            max_hp,
        });
        Arc::make_mut(&mut self.grid).set_entity(pos, CellEntity::Enemy);
        Some(id)
    }

    /// Place a new infected ally on a free walkable cell, consuming the next
    /// ally id.
    pub fn place_ally(&mut self, pos: GridPos) -> Option<AllyId> {
        if !self.is_free(pos) {
            return None;
        }
        Some(self.add_ally(pos))
    }

    /// Set player hit points, for scenario authoring.
    pub fn set_hp(&mut self, hp: u32) {
        self.hp = hp;
    }

    /// Returns true if the cell is on the board, walkable and unoccupied.
    #[must_use]
    pub fn is_free(&self, pos: GridPos) -> bool {
        self.grid
            .cell(pos)
            .is_some_and(|c| c.terrain.is_walkable() && c.entity == CellEntity::None)
    }

    pub(crate) fn add_ally(&mut self, pos: GridPos) -> AllyId {
        let id = self.next_infected_id;
        self.next_infected_id += 1;
        self.allies.push(InfectedAlly { id, position: pos });
        Arc::make_mut(&mut self.grid).set_entity(pos, CellEntity::AllyInfected);
        id
    }

    pub(crate) fn relocate_player(&mut self, to: GridPos) {
        let grid = Arc::make_mut(&mut self.grid);
        grid.set_entity(self.player, CellEntity::None);
        grid.set_entity(to, CellEntity::Player);
        self.player = to;
    }

    pub(crate) fn relocate_enemy(&mut self, id: EnemyId, to: GridPos) {
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) else {
            return;
        };
        let from = enemy.position;
        enemy.position = to;
        let grid = Arc::make_mut(&mut self.grid);
        grid.set_entity(from, CellEntity::None);
        grid.set_entity(to, CellEntity::Enemy);
    }

    pub(crate) fn relocate_ally(&mut self, id: AllyId, to: GridPos) {
        let Some(ally) = self.allies.iter_mut().find(|a| a.id == id) else {
            return;
        };
        let from = ally.position;
        ally.position = to;
        let grid = Arc::make_mut(&mut self.grid);
        grid.set_entity(from, CellEntity::None);
        grid.set_entity(to, CellEntity::AllyInfected);
    }

    /// Remove an enemy, clearing its cell. Returns the removed enemy.
    pub(crate) fn remove_enemy(&mut self, id: EnemyId) -> Option<Enemy> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        let enemy = self.enemies.remove(index);
        Arc::make_mut(&mut self.grid).set_entity(enemy.position, CellEntity::None);
        Some(enemy)
    }

    /// Remove an ally, clearing its cell. Returns the removed ally.
    pub(crate) fn remove_ally(&mut self, id: AllyId) -> Option<InfectedAlly> {
        let index = self.allies.iter().position(|a| a.id == id)?;
        let ally = self.allies.remove(index);
        Arc::make_mut(&mut self.grid).set_entity(ally.position, CellEntity::None);
        Some(ally)
    }

    /// Convert a defeated enemy: it leaves the live list, the conversion
    /// counter grows, and a fresh ally takes its cell.
    pub(crate) fn convert_enemy(&mut self, id: EnemyId) -> Option<(GridPos, AllyId)> {
        let enemy = self.remove_enemy(id)?;
        self.infected_count += 1;
        let ally = self.add_ally(enemy.position);
        tracing::debug!(enemy = id, ally, position = ?enemy.position, "Enemy converted");
        Some((enemy.position, ally))
    }

    /// End the run in defeat: hp floors at zero and any encounter closes.
    pub(crate) fn apply_defeat(&mut self) {
        self.hp = 0;
        self.fight = None;
        if self.status != GameStatus::Lost {
            tracing::debug!(moves = self.move_count, "Run lost");
        }
        self.status = GameStatus::Lost;
    }

    /// Verify that every grid entity tag agrees with the actor lists.
    pub fn check_occupancy(&self) -> Result<()> {
        let mut expected = Grid::new(self.grid.bounds());
        expected.set_entity(self.player, CellEntity::Player);
        for enemy in &self.enemies {
            expected.set_entity(enemy.position, CellEntity::Enemy);
        }
        for ally in &self.allies {
            expected.set_entity(ally.position, CellEntity::AllyInfected);
        }

        let actors = 1 + self.enemies.len() + self.allies.len();
        let tagged = self
            .grid
            .iter()
            .filter(|(_, c)| c.entity != CellEntity::None)
            .count();

        for ((pos, found), (_, want)) in self.grid.iter().zip(expected.iter()) {
            if found.entity != want.entity {
                return Err(HivefallError::OccupancyMismatch {
                    pos,
                    expected: want.entity,
                    found: found.entity,
                });
            }
        }
        if tagged != actors {
            // Two actors share a cell: the tags matched but one was overwritten.
            let mut seen: Vec<GridPos> = Vec::with_capacity(actors);
            let positions = std::iter::once(self.player)
                .chain(self.enemies.iter().map(|e| e.position))
                .chain(self.allies.iter().map(|a| a.position));
            for pos in positions {
                if seen.contains(&pos) {
                    let found = self.grid.entity(pos).unwrap_or_default();
                    return Err(HivefallError::OccupancyMismatch {
                        pos,
                        expected: CellEntity::None,
                        found,
                    });
                }
                seen.push(pos);
            }
        }
        Ok(())
    }

    /// Compute a hash of the complete state for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the state to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize a state from bytes.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }

    /// Wrap the state for handing to the engine.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::WeaponId;

    #[test]
    fn test_new_state_defaults() {
        let state = HivefallState::new(&HivefallRules::default());
        assert_eq!(state.player(), GridPos::new(7, 12));
        assert_eq!(state.hp(), 10);
        assert!(state.enemies().is_empty());
        assert!(state.allies().is_empty());
        assert_eq!(state.move_count(), 0);
        assert_eq!(state.status(), GameStatus::Playing);
        assert_eq!(state.spawned_total(), 0);
        assert_eq!(state.inventory().weapons(), &[WeaponId::from("fists")]);
        assert_eq!(state.grid().entity(state.player()), Some(CellEntity::Player));
        state.check_occupancy().unwrap();
    }

    #[test]
    fn test_terrain_is_laid_out() {
        let mut rules = HivefallRules::default();
        rules.board.walls = vec![GridPos::new(0, 0)];
        rules.board.hazards = vec![GridPos::new(1, 1)];
        let state = HivefallState::new(&rules);
        assert_eq!(state.grid().terrain(GridPos::new(0, 0)), Some(Terrain::Wall));
        assert_eq!(state.grid().terrain(GridPos::new(1, 1)), Some(Terrain::Hazard));
    }

    #[test]
    fn test_place_enemy_assigns_increasing_ids() {
        let mut state = HivefallState::new(&HivefallRules::default());
        let a = state.place_enemy(GridPos::new(0, 0), 6).unwrap();
        let b = state.place_enemy(GridPos::new(0, 1), 6).unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(state.place_enemy(GridPos::new(0, 1), 6), None);
        assert_eq!(state.place_enemy(state.player(), 6), None);
        assert_eq!(state.spawned_total(), 2);
        state.check_occupancy().unwrap();
    }

    #[test]
    fn test_convert_enemy() {
        let mut state = HivefallState::new(&HivefallRules::default());
        let id = state.place_enemy(GridPos::new(3, 3), 6).unwrap();
        let (pos, ally) = state.convert_enemy(id).unwrap();
        assert_eq!(pos, GridPos::new(3, 3));
        assert_eq!(ally, 1);
        assert!(state.enemies().is_empty());
        assert_eq!(state.infected_count(), 1);
        assert_eq!(state.grid().entity(pos), Some(CellEntity::AllyInfected));
        state.check_occupancy().unwrap();
    }

    #[test]
    fn test_occupancy_mismatch_detected() {
        let mut state = HivefallState::new(&HivefallRules::default());
        state.place_enemy(GridPos::new(2, 2), 6).unwrap();
        Arc::make_mut(&mut state.grid).set_entity(GridPos::new(2, 2), CellEntity::None);
        assert!(matches!(
            state.check_occupancy(),
            Err(HivefallError::OccupancyMismatch { .. })
        ));
    }

    #[test]
    fn test_serialization_roundtrip_preserves_hash() {
        let mut state = HivefallState::new(&HivefallRules::default());
        state.place_enemy(GridPos::new(0, 4), 6).unwrap();
        let bytes = state.serialize().unwrap();
        let restored = HivefallState::deserialize(&bytes).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.state_hash(), state.state_hash());
    }

    #[test]
    fn test_defeat_clears_everything() {
        let mut state = HivefallState::new(&HivefallRules::default());
        state.apply_defeat();
        assert_eq!(state.hp(), 0);
        assert_eq!(state.status(), GameStatus::Lost);
        assert!(state.fight().is_none());
    }
}
