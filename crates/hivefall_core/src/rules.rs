//! Per-run configuration.
//!
//! [`HivefallRules`] is immutable for the duration of a run. Hosts start from
//! [`HivefallRules::default`] and layer a [`RulesOverrides`] on top; nested
//! groups are merged field by field, and weapons are merged per weapon and
//! per stat, so an override file only needs to list the keys it changes.
//!
//! # Example RON override
//!
//! ```ron
//! (
//!     board: (rows: 10, cols: 10, walls: [(row: 2, col: 3)]),
//!     spawn: (max_enemies: 4),
//!     drops: (food_chance: 0.5),
//!     weapons: {
//!         "crowbar": (damage: 3),
//!     },
//! )
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{HivefallError, Result};
use crate::grid::{Bounds, GridPos};
use crate::inventory::WeaponId;
use crate::math::{fraction_serde, option_fraction_serde, Fixed};

/// Board size and static terrain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardRules {
    /// Number of rows.
    pub rows: i32,
    /// Number of columns.
    pub cols: i32,
    /// Impassable wall cells.
    pub walls: Vec<GridPos>,
    /// Impassable obstacle cells.
    pub obstacles: Vec<GridPos>,
    /// Walkable cells that hurt the player.
    pub hazards: Vec<GridPos>,
    /// Player start; the board centre when unset.
    pub player_start: Option<GridPos>,
}

impl Default for BoardRules {
    fn default() -> Self {
        Self {
            rows: 14,
            cols: 24,
            walls: Vec::new(),
            obstacles: Vec::new(),
            hazards: Vec::new(),
            player_start: None,
        }
    }
}

impl BoardRules {
    /// Board dimensions.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        Bounds::new(self.rows, self.cols)
    }

    /// Where the player starts.
    #[must_use]
    pub fn player_start(&self) -> GridPos {
        self.player_start.unwrap_or_else(|| self.bounds().center())
    }
}

/// Enemy spawn pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRules {
    /// Total enemies ever spawned in one run.
    pub max_enemies: u32,
    /// Successful player moves before the first spawn; also the starting interval.
    pub first_spawn_after_moves: u32,
    /// Floor for the spawn interval.
    pub min_interval: u32,
    /// Shrink the interval once every this many spawns (0 disables shrinking).
    pub decrease_every_spawns: u32,
    /// How much the interval shrinks each time.
    pub decrease_step: u32,
    /// Edge positions tried before a spawn is skipped.
    pub max_placement_attempts: u32,
}

impl Default for SpawnRules {
    fn default() -> Self {
        Self {
            max_enemies: 12,
            first_spawn_after_moves: 5,
            min_interval: 2,
            decrease_every_spawns: 2,
            decrease_step: 1,
            max_placement_attempts: 24,
        }
    }
}

/// Player vitals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRules {
    /// Maximum (and starting) hit points.
    pub max_hp: u32,
    /// Hit points restored by one food unit.
    pub food_heal: u32,
    /// Damage taken when stepping onto hazard terrain.
    pub hazard_damage: u32,
}

impl Default for PlayerRules {
    fn default() -> Self {
        Self {
            max_hp: 10,
            food_heal: 3,
            hazard_damage: 1,
        }
    }
}

/// Encounter constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Hit points of a freshly spawned enemy.
    pub enemy_max_hp: u32,
    /// Damage of one enemy attack.
    pub enemy_hit_damage: u32,
    /// Milliseconds between enemy attacks during combat.
    pub enemy_hit_interval_ms: u32,
    /// Damage an infected ally deals on contact.
    pub infected_hit_damage: u32,
    /// Food granted when harvesting remains.
    pub harvest_food: u32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            enemy_max_hp: 6,
            enemy_hit_damage: 1,
            enemy_hit_interval_ms: 1500,
            infected_hit_damage: 3,
            harvest_food: 1,
        }
    }
}

/// Loot probabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropRules {
    /// Chance of a food drop per kill.
    #[serde(with = "fraction_serde")]
    pub food_chance: Fixed,
    /// Chance of a weapon drop per kill.
    #[serde(with = "fraction_serde")]
    pub weapon_chance: Fixed,
}

impl Default for DropRules {
    fn default() -> Self {
        Self {
            food_chance: Fixed::from_num(35) / Fixed::from_num(100),
            weapon_chance: Fixed::from_num(25) / Fixed::from_num(100),
        }
    }
}

/// Stats of one weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponStats {
    /// Display name.
    pub name: String,
    /// Damage per hit.
    pub damage: u32,
    /// Milliseconds before the weapon can be used again.
    pub cooldown_ms: u32,
    /// Milliseconds the enemy's attack timer is frozen after a hit.
    pub stun_ms: u32,
    /// Relative weight among weapon drops (0 never drops).
    pub drop_weight: u32,
    /// Spends a charge on every use.
    pub consumable: bool,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            name: String::new(),
            damage: 1,
            cooldown_ms: 1000,
            stun_ms: 0,
            drop_weight: 0,
            consumable: false,
        }
    }
}

impl WeaponStats {
    /// Create weapon stats with a name and the default numbers.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder method to set damage.
    #[must_use]
    pub const fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    /// Builder method to set cooldown.
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown_ms: u32) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    /// Builder method to set stun duration.
    #[must_use]
    pub const fn with_stun(mut self, stun_ms: u32) -> Self {
        self.stun_ms = stun_ms;
        self
    }

    /// Builder method to set drop weight.
    #[must_use]
    pub const fn with_drop_weight(mut self, weight: u32) -> Self {
        self.drop_weight = weight;
        self
    }

    /// Builder method to mark the weapon consumable.
    #[must_use]
    pub const fn consumable(mut self) -> Self {
        self.consumable = true;
        self
    }
}

/// Complete configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HivefallRules {
    /// Board size and terrain.
    pub board: BoardRules,
    /// Spawn pacing.
    pub spawn: SpawnRules,
    /// Player vitals.
    pub player: PlayerRules,
    /// Encounter constants.
    pub combat: CombatRules,
    /// Loot probabilities.
    pub drops: DropRules,
    /// Every weapon that exists in this run.
    pub weapons: BTreeMap<WeaponId, WeaponStats>,
    /// Weapons the player owns at the start.
    pub starting_weapons: Vec<WeaponId>,
}

impl Default for HivefallRules {
    fn default() -> Self {
        let weapons = [
            ("fists", WeaponStats::named("Fists").with_cooldown(500)),
            (
                "crowbar",
                WeaponStats::named("Crowbar")
                    .with_damage(2)
                    .with_cooldown(900)
                    .with_drop_weight(4),
            ),
            (
                "shotgun",
                WeaponStats::named("Shotgun")
                    .with_damage(4)
                    .with_cooldown(1800)
                    .with_drop_weight(1),
            ),
            (
                "taser",
                WeaponStats::named("Taser")
                    .with_cooldown(1200)
                    .with_stun(2000)
                    .with_drop_weight(2),
            ),
            (
                "molotov",
                WeaponStats::named("Molotov")
                    .with_damage(5)
                    .with_cooldown(0)
                    .with_drop_weight(2)
                    .consumable(),
            ),
        ]
        .into_iter()
        .map(|(id, stats)| (WeaponId::from(id), stats))
        .collect();

        Self {
            board: BoardRules::default(),
            spawn: SpawnRules::default(),
            player: PlayerRules::default(),
            combat: CombatRules::default(),
            drops: DropRules::default(),
            weapons,
            starting_weapons: vec![WeaponId::from("fists")],
        }
    }
}

impl HivefallRules {
    /// Defaults merged with caller overrides.
    #[must_use]
    pub fn from_overrides(overrides: &RulesOverrides) -> Self {
        Self::default().with_overrides(overrides)
    }

    /// Merge overrides key by key into these rules.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &RulesOverrides) -> Self {
        if let Some(board) = &overrides.board {
            board.apply(&mut self.board);
        }
        if let Some(spawn) = &overrides.spawn {
            spawn.apply(&mut self.spawn);
        }
        if let Some(player) = &overrides.player {
            player.apply(&mut self.player);
        }
        if let Some(combat) = &overrides.combat {
            combat.apply(&mut self.combat);
        }
        if let Some(drops) = &overrides.drops {
            drops.apply(&mut self.drops);
        }
        for (id, weapon) in &overrides.weapons {
            let stats = self
                .weapons
                .entry(id.clone())
                .or_insert_with(|| WeaponStats::named(id.as_str()));
            weapon.apply(stats);
        }
        set(&mut self.starting_weapons, &overrides.starting_weapons);
        self
    }

    /// Parse overrides from RON and merge them over the defaults.
    pub fn from_ron(text: &str) -> Result<Self> {
        let overrides = RulesOverrides::from_ron(text)?;
        Ok(Self::from_overrides(&overrides))
    }

    /// Stats of a weapon, if it exists.
    #[must_use]
    pub fn weapon(&self, id: &WeaponId) -> Option<&WeaponStats> {
        self.weapons.get(id)
    }

    /// Check every precondition the engine relies on.
    ///
    /// All violations are reported together.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let bounds = self.board.bounds();

        if self.board.rows <= 0 || self.board.cols <= 0 {
            errors.push(format!(
                "board must have positive dimensions, got {}x{}",
                self.board.rows, self.board.cols
            ));
        } else {
            let start = self.board.player_start();
            if !bounds.contains(start) {
                errors.push(format!("player start {start:?} is outside the board"));
            }
            let terrain = [
                ("wall", &self.board.walls),
                ("obstacle", &self.board.obstacles),
                ("hazard", &self.board.hazards),
            ];
            for (kind, cells) in terrain {
                for pos in cells {
                    if !bounds.contains(*pos) {
                        errors.push(format!("{kind} at {pos:?} is outside the board"));
                    }
                }
            }
            if self.board.walls.contains(&start) || self.board.obstacles.contains(&start) {
                errors.push(format!("player start {start:?} is not walkable"));
            }
        }

        if self.spawn.first_spawn_after_moves == 0 {
            errors.push("spawn.first_spawn_after_moves must be at least 1".to_string());
        }
        if self.spawn.min_interval == 0 {
            errors.push("spawn.min_interval must be at least 1".to_string());
        }
        if self.spawn.max_placement_attempts == 0 {
            errors.push("spawn.max_placement_attempts must be at least 1".to_string());
        }
        if self.player.max_hp == 0 {
            errors.push("player.max_hp must be at least 1".to_string());
        }
        if self.combat.enemy_max_hp == 0 {
            errors.push("combat.enemy_max_hp must be at least 1".to_string());
        }
        if self.combat.enemy_hit_interval_ms == 0 {
            errors.push("combat.enemy_hit_interval_ms must be at least 1".to_string());
        }

        for (name, chance) in [
            ("food_chance", self.drops.food_chance),
            ("weapon_chance", self.drops.weapon_chance),
        ] {
            if chance < Fixed::ZERO || chance > Fixed::ONE {
                errors.push(format!("drops.{name} must be within [0, 1], got {chance}"));
            }
        }

        if self.starting_weapons.is_empty() {
            errors.push("starting_weapons must not be empty".to_string());
        }
        for id in &self.starting_weapons {
            if !self.weapons.contains_key(id) {
                errors.push(format!("starting weapon '{id}' is not defined"));
            }
        }
        for (id, stats) in &self.weapons {
            if stats.damage == 0 {
                errors.push(format!("weapon '{id}' must deal damage"));
            }
        }
        let total_weight: u64 = self.weapons.values().map(|w| u64::from(w.drop_weight)).sum();
        if total_weight > i32::MAX as u64 {
            errors.push(format!(
                "weapon drop weights must total at most {}, got {total_weight}",
                i32::MAX
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(HivefallError::InvalidRules(errors))
        }
    }
}

fn set<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

/// Partial [`BoardRules`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardOverrides {
    /// See [`BoardRules::rows`].
    pub rows: Option<i32>,
    /// See [`BoardRules::cols`].
    pub cols: Option<i32>,
    /// See [`BoardRules::walls`].
    pub walls: Option<Vec<GridPos>>,
    /// See [`BoardRules::obstacles`].
    pub obstacles: Option<Vec<GridPos>>,
    /// See [`BoardRules::hazards`].
    pub hazards: Option<Vec<GridPos>>,
    /// See [`BoardRules::player_start`].
    pub player_start: Option<GridPos>,
}

impl BoardOverrides {
    fn apply(&self, rules: &mut BoardRules) {
        set(&mut rules.rows, &self.rows);
        set(&mut rules.cols, &self.cols);
        set(&mut rules.walls, &self.walls);
        set(&mut rules.obstacles, &self.obstacles);
        set(&mut rules.hazards, &self.hazards);
        if self.player_start.is_some() {
            rules.player_start = self.player_start;
        }
    }
}

/// Partial [`SpawnRules`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnOverrides {
    /// See [`SpawnRules::max_enemies`].
    pub max_enemies: Option<u32>,
    /// See [`SpawnRules::first_spawn_after_moves`].
    pub first_spawn_after_moves: Option<u32>,
    /// See [`SpawnRules::min_interval`].
    pub min_interval: Option<u32>,
    /// See [`SpawnRules::decrease_every_spawns`].
    pub decrease_every_spawns: Option<u32>,
    /// See [`SpawnRules::decrease_step`].
    pub decrease_step: Option<u32>,
    /// See [`SpawnRules::max_placement_attempts`].
    pub max_placement_attempts: Option<u32>,
}

impl SpawnOverrides {
    fn apply(&self, rules: &mut SpawnRules) {
        set(&mut rules.max_enemies, &self.max_enemies);
        set(&mut rules.first_spawn_after_moves, &self.first_spawn_after_moves);
        set(&mut rules.min_interval, &self.min_interval);
        set(&mut rules.decrease_every_spawns, &self.decrease_every_spawns);
        set(&mut rules.decrease_step, &self.decrease_step);
        set(&mut rules.max_placement_attempts, &self.max_placement_attempts);
    }
}

/// Partial [`PlayerRules`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerOverrides {
    /// See [`PlayerRules::max_hp`].
    pub max_hp: Option<u32>,
    /// See [`PlayerRules::food_heal`].
    pub food_heal: Option<u32>,
    /// See [`PlayerRules::hazard_damage`].
    pub hazard_damage: Option<u32>,
}

impl PlayerOverrides {
    fn apply(&self, rules: &mut PlayerRules) {
        set(&mut rules.max_hp, &self.max_hp);
        set(&mut rules.food_heal, &self.food_heal);
        set(&mut rules.hazard_damage, &self.hazard_damage);
    }
}

/// Partial [`CombatRules`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombatOverrides {
    /// See [`CombatRules::enemy_max_hp`].
    pub enemy_max_hp: Option<u32>,
    /// See [`CombatRules::enemy_hit_damage`].
    pub enemy_hit_damage: Option<u32>,
    /// See [`CombatRules::enemy_hit_interval_ms`].
    pub enemy_hit_interval_ms: Option<u32>,
    /// See [`CombatRules::infected_hit_damage`].
    pub infected_hit_damage: Option<u32>,
    /// See [`CombatRules::harvest_food`].
    pub harvest_food: Option<u32>,
}

impl CombatOverrides {
    fn apply(&self, rules: &mut CombatRules) {
        set(&mut rules.enemy_max_hp, &self.enemy_max_hp);
        set(&mut rules.enemy_hit_damage, &self.enemy_hit_damage);
        set(&mut rules.enemy_hit_interval_ms, &self.enemy_hit_interval_ms);
        set(&mut rules.infected_hit_damage, &self.infected_hit_damage);
        set(&mut rules.harvest_food, &self.harvest_food);
    }
}

/// Partial [`DropRules`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DropOverrides {
    /// See [`DropRules::food_chance`].
    #[serde(with = "option_fraction_serde")]
    pub food_chance: Option<Fixed>,
    /// See [`DropRules::weapon_chance`].
    #[serde(with = "option_fraction_serde")]
    pub weapon_chance: Option<Fixed>,
}

impl DropOverrides {
    fn apply(&self, rules: &mut DropRules) {
        set(&mut rules.food_chance, &self.food_chance);
        set(&mut rules.weapon_chance, &self.weapon_chance);
    }
}

/// Partial [`WeaponStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaponOverrides {
    /// See [`WeaponStats::name`].
    pub name: Option<String>,
    /// See [`WeaponStats::damage`].
    pub damage: Option<u32>,
    /// See [`WeaponStats::cooldown_ms`].
    pub cooldown_ms: Option<u32>,
    /// See [`WeaponStats::stun_ms`].
    pub stun_ms: Option<u32>,
    /// See [`WeaponStats::drop_weight`].
    pub drop_weight: Option<u32>,
    /// See [`WeaponStats::consumable`].
    pub consumable: Option<bool>,
}

impl WeaponOverrides {
    fn apply(&self, stats: &mut WeaponStats) {
        set(&mut stats.name, &self.name);
        set(&mut stats.damage, &self.damage);
        set(&mut stats.cooldown_ms, &self.cooldown_ms);
        set(&mut stats.stun_ms, &self.stun_ms);
        set(&mut stats.drop_weight, &self.drop_weight);
        set(&mut stats.consumable, &self.consumable);
    }
}

/// Caller overrides layered over [`HivefallRules::default`].
///
/// Absent keys keep their default. Weapons not present in the defaults are
/// created from [`WeaponStats::named`] before their overrides apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesOverrides {
    /// Board overrides.
    pub board: Option<BoardOverrides>,
    /// Spawn pacing overrides.
    pub spawn: Option<SpawnOverrides>,
    /// Player overrides.
    pub player: Option<PlayerOverrides>,
    /// Combat overrides.
    pub combat: Option<CombatOverrides>,
    /// Drop overrides.
    pub drops: Option<DropOverrides>,
    /// Per-weapon overrides.
    pub weapons: BTreeMap<WeaponId, WeaponOverrides>,
    /// Replacement starting loadout.
    pub starting_weapons: Option<Vec<WeaponId>>,
}

impl RulesOverrides {
    /// Parse overrides from RON. `Some(..)` wrappers are optional.
    pub fn from_ron(text: &str) -> Result<Self> {
        let options =
            ron::Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME);
        Ok(options.from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        HivefallRules::default().validate().unwrap();
    }

    #[test]
    fn test_default_player_start_is_center() {
        let rules = HivefallRules::default();
        assert_eq!(rules.board.player_start(), GridPos::new(7, 12));
    }

    #[test]
    fn test_nested_groups_merge_key_by_key() {
        let overrides = RulesOverrides {
            spawn: Some(SpawnOverrides {
                max_enemies: Some(3),
                ..SpawnOverrides::default()
            }),
            ..RulesOverrides::default()
        };
        let rules = HivefallRules::from_overrides(&overrides);
        let defaults = SpawnRules::default();
        assert_eq!(rules.spawn.max_enemies, 3);
        assert_eq!(rules.spawn.first_spawn_after_moves, defaults.first_spawn_after_moves);
        assert_eq!(rules.spawn.min_interval, defaults.min_interval);
        assert_eq!(rules.board, BoardRules::default());
    }

    #[test]
    fn test_weapon_overrides_merge_per_stat() {
        let rules = HivefallRules::from_ron(r#"(weapons: { "crowbar": (damage: 7) })"#).unwrap();
        let crowbar = rules.weapon(&WeaponId::from("crowbar")).unwrap();
        assert_eq!(crowbar.damage, 7);
        assert_eq!(crowbar.cooldown_ms, 900);
        assert_eq!(crowbar.name, "Crowbar");
        assert_eq!(rules.weapons.len(), HivefallRules::default().weapons.len());
    }

    #[test]
    fn test_new_weapon_from_overrides() {
        let rules =
            HivefallRules::from_ron(r#"(weapons: { "chainsaw": (damage: 9, drop_weight: 1) })"#)
                .unwrap();
        let saw = rules.weapon(&WeaponId::from("chainsaw")).unwrap();
        assert_eq!(saw.name, "chainsaw");
        assert_eq!(saw.damage, 9);
        assert!(!saw.consumable);
    }

    #[test]
    fn test_ron_groups_without_some() {
        let rules = HivefallRules::from_ron(
            "(board: (rows: 6, cols: 8, hazards: [(row: 1, col: 1)]), drops: (food_chance: 0.5))",
        )
        .unwrap();
        assert_eq!(rules.board.bounds(), Bounds::new(6, 8));
        assert_eq!(rules.board.hazards, vec![GridPos::new(1, 1)]);
        assert_eq!(rules.drops.food_chance, Fixed::from_num(0.5));
        assert_eq!(rules.drops.weapon_chance, DropRules::default().weapon_chance);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(HivefallRules::from_ron("(spawn: (max_enemy: 3))").is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut rules = HivefallRules::default();
        rules.board.rows = 0;
        rules.combat.enemy_hit_interval_ms = 0;
        rules.drops.food_chance = Fixed::from_num(2);
        rules.starting_weapons = vec![WeaponId::from("laser")];

        match rules.validate() {
            Err(HivefallError::InvalidRules(errors)) => assert_eq!(errors.len(), 4, "{errors:?}"),
            other => panic!("expected invalid rules, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_terrain_bounds() {
        let mut rules = HivefallRules::default();
        rules.board.walls.push(GridPos::new(40, 0));
        rules.board.obstacles.push(rules.board.player_start());
        let Err(HivefallError::InvalidRules(errors)) = rules.validate() else {
            panic!("expected invalid rules");
        };
        assert_eq!(errors.len(), 2, "{errors:?}");
    }

    #[test]
    fn test_validate_drop_weight_total() {
        let mut rules = HivefallRules::default();
        if let Some(crowbar) = rules.weapons.get_mut(&WeaponId::from("crowbar")) {
            crowbar.drop_weight = 3_000_000_000;
        }
        let Err(HivefallError::InvalidRules(errors)) = rules.validate() else {
            panic!("expected invalid rules");
        };
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("drop weights"));

        if let Some(crowbar) = rules.weapons.get_mut(&WeaponId::from("crowbar")) {
            crowbar.drop_weight = i32::MAX as u32 - 5;
        }
        rules.validate().unwrap();
    }
}
