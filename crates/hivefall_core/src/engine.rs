//! Turn orchestration and the public transition surface.
//!
//! Every function takes the current state behind an [`Arc`] and returns the
//! next one. A rejected action returns the input `Arc` itself, so hosts can
//! detect no-ops with [`Arc::ptr_eq`]. Every accepted transition runs
//! through [`evaluate_status`] before it is handed out.
//!
//! # Turn order
//!
//! 1. Resolve the player's step; off-board, blocked or ally-occupied cells
//!    reject the move.
//! 2. Stepping onto an enemy starts a fight and ends the turn.
//! 3. Otherwise the player moves and hazards apply.
//! 4. Enemies, then allies, each take one pursuit step in list order. An
//!    enemy reaching the player starts a fight and freezes every actor
//!    after it.
//! 5. Spawn pacing advances and, when due and under the cap, an enemy
//!    appears on a free edge cell.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hivefall_core::engine::{move_player, new_game};
//! use hivefall_core::grid::Direction;
//! use hivefall_core::rng::SeededRng;
//! use hivefall_core::rules::HivefallRules;
//!
//! let rules = HivefallRules::default();
//! let mut rng = SeededRng::new(7);
//! let state = new_game(&rules);
//!
//! let next = move_player(&state, Direction::Left, &rules, &mut rng);
//! assert_eq!(next.move_count(), 1);
//! assert!(!Arc::ptr_eq(&state, &next));
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collision::{classify_ally_entry, classify_enemy_entry, classify_player_entry, Collision};
use crate::combat::{self, WonChoice};
use crate::grid::{Direction, Terrain};
use crate::inventory::WeaponId;
use crate::movement::resolve_step;
use crate::pacing::{advance_spawn_pacing, after_spawn, sample_edge_position};
use crate::pursuit::{nearest_enemy, next_step_toward};
use crate::rng::RandomSource;
use crate::rules::HivefallRules;
use crate::state::{AllyId, EnemyId, GameStatus, HivefallState};

/// A single host input, as recorded in replays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Player step.
    Move(Direction),
    /// Open an encounter with an enemy.
    StartFight(EnemyId),
    /// Interlude to combat.
    Engage,
    /// Leave the encounter.
    Flee,
    /// Use a weapon.
    Attack(WeaponId),
    /// Eat one food unit.
    UseFood,
    /// Record the won-phase choice.
    ChooseWonOutcome(WonChoice),
    /// Close a won encounter.
    EndFight,
    /// Advance combat timers by this many milliseconds.
    Tick(u32),
    /// Put a weapon in the inventory.
    GrantWeapon(WeaponId),
}

/// Fresh run state for the rules.
#[must_use]
pub fn new_game(rules: &HivefallRules) -> Arc<HivefallState> {
    tracing::debug!(
        rows = rules.board.rows,
        cols = rules.board.cols,
        max_enemies = rules.spawn.max_enemies,
        "New run"
    );
    HivefallState::new(rules).into_shared()
}

/// Discard the current run and start over.
#[must_use]
pub fn reset(rules: &HivefallRules) -> Arc<HivefallState> {
    new_game(rules)
}

fn transition<F>(state: &Arc<HivefallState>, rules: &HivefallRules, apply: F) -> Arc<HivefallState>
where
    F: FnOnce(&mut HivefallState) -> bool,
{
    let mut next = HivefallState::clone(state);
    if !apply(&mut next) {
        return Arc::clone(state);
    }
    evaluate_status(&mut next, rules);

    #[cfg(feature = "debug-validation")]
    if let Err(err) = next.check_occupancy() {
        panic!("occupancy invariant broken after transition: {err}");
    }

    Arc::new(next)
}

/// Settle the run status after a mutation.
///
/// The run is lost when hp reaches zero, and won when no encounter is
/// open, the spawn cap has been reached and no enemy is alive.
pub fn evaluate_status(state: &mut HivefallState, rules: &HivefallRules) {
    if state.status != GameStatus::Playing {
        return;
    }
    if state.hp == 0 {
        state.apply_defeat();
        return;
    }
    if state.fight.is_none()
        && state.spawned_total() >= rules.spawn.max_enemies
        && state.enemies.is_empty()
    {
        tracing::debug!(
            moves = state.move_count,
            infected = state.infected_count,
            "Run won"
        );
        state.status = GameStatus::Won;
    }
}

/// Take one player turn in `direction`.
#[must_use]
pub fn move_player<R>(
    state: &Arc<HivefallState>,
    direction: Direction,
    rules: &HivefallRules,
    rng: &mut R,
) -> Arc<HivefallState>
where
    R: RandomSource + ?Sized,
{
    transition(state, rules, |next| take_turn(next, direction, rules, rng))
}

fn take_turn<R>(
    state: &mut HivefallState,
    direction: Direction,
    rules: &HivefallRules,
    rng: &mut R,
) -> bool
where
    R: RandomSource + ?Sized,
{
    if state.status != GameStatus::Playing || state.fight.is_some() {
        return false;
    }

    let grid = Arc::clone(&state.grid);
    let step = resolve_step(state.player, direction, grid.bounds(), |pos| {
        !grid.is_walkable(pos)
    });
    let Some(to) = step.destination() else {
        return false;
    };
    match classify_player_entry(state, to) {
        Collision::Free => {}
        Collision::Fight(enemy) => return combat::start_fight(state, enemy),
        _ => return false,
    }

    state.relocate_player(to);
    state.move_count += 1;

    if grid.terrain(to) == Some(Terrain::Hazard) && rules.player.hazard_damage > 0 {
        state.hp = state.hp.saturating_sub(rules.player.hazard_damage);
        tracing::trace!(hp = state.hp, position = ?to, "Hazard damage");
        if state.hp == 0 {
            state.apply_defeat();
            return true;
        }
    }

    if advance_enemies(state, rules) {
        return true;
    }
    advance_allies(state, rules);
    advance_spawns(state, rules, rng);
    true
}

/// Move every enemy one step toward the player. Returns true if one of them
/// reached the player and opened a fight.
fn advance_enemies(state: &mut HivefallState, rules: &HivefallRules) -> bool {
    let ids: Vec<EnemyId> = state.enemies.iter().map(|e| e.id).collect();
    for id in ids {
        // Gone if an earlier strike converted it.
        let Some(enemy) = state.enemy(id).copied() else {
            continue;
        };
        let to = next_step_toward(enemy.position, state.player, state.grid.bounds(), |pos| {
            !state.grid.is_walkable(pos) || state.enemy_at(pos).is_some()
        });
        if to == enemy.position {
            continue;
        }

        match classify_enemy_entry(state, id, to) {
            Collision::Free => state.relocate_enemy(id, to),
            Collision::Fight(enemy) => {
                tracing::debug!(enemy, "Enemy reached the player");
                return combat::start_fight(state, enemy);
            }
            Collision::Strike { ally, enemy } => resolve_strike(state, ally, enemy, rules),
            Collision::BlockedByTerrain | Collision::BlockedByOccupant(_) => {}
        }
    }
    false
}

/// Move every ally one step toward its nearest enemy.
fn advance_allies(state: &mut HivefallState, rules: &HivefallRules) {
    let ids: Vec<AllyId> = state.allies.iter().map(|a| a.id).collect();
    for id in ids {
        let Some(ally) = state.allies.iter().find(|a| a.id == id).copied() else {
            continue;
        };
        let Some(target) = nearest_enemy(ally.position, &state.enemies).map(|e| e.position) else {
            return;
        };
        let to = next_step_toward(ally.position, target, state.grid.bounds(), |pos| {
            !state.grid.is_walkable(pos) || state.player == pos || state.ally_at(pos).is_some()
        });
        if to == ally.position {
            continue;
        }

        match classify_ally_entry(state, id, to) {
            Collision::Free => state.relocate_ally(id, to),
            Collision::Strike { ally, enemy } => resolve_strike(state, ally, enemy, rules),
            Collision::Fight(_) | Collision::BlockedByTerrain | Collision::BlockedByOccupant(_) => {}
        }
    }
}

/// An ally and an enemy met: the ally is spent and the enemy takes the hit.
fn resolve_strike(state: &mut HivefallState, ally: AllyId, enemy: EnemyId, rules: &HivefallRules) {
    state.remove_ally(ally);
    let Some(target) = state.enemies.iter_mut().find(|e| e.id == enemy) else {
        return;
    };
    target.hp = target.hp.saturating_sub(rules.combat.infected_hit_damage);
    let hp = target.hp;
    tracing::debug!(ally, enemy, hp, "Ally struck enemy");
    if hp == 0 {
        state.convert_enemy(enemy);
    }
}

fn advance_spawns<R>(state: &mut HivefallState, rules: &HivefallRules, rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    let advance = advance_spawn_pacing(state.pacing);
    state.pacing = advance.pacing;
    if !advance.should_spawn || state.spawned_total() >= rules.spawn.max_enemies {
        return;
    }

    let position = sample_edge_position(
        state.grid.bounds(),
        rng,
        |pos| !state.is_free(pos),
        rules.spawn.max_placement_attempts,
    );
    let Some(position) = position else {
        tracing::debug!(
            attempts = rules.spawn.max_placement_attempts,
            "No free edge cell for spawn"
        );
        return;
    };
    if let Some(id) = state.place_enemy(position, rules.combat.enemy_max_hp) {
        state.pacing = after_spawn(state.pacing, state.spawned_total(), &rules.spawn);
        tracing::debug!(
            enemy = id,
            ?position,
            interval = state.pacing.current_interval,
            "Enemy spawned"
        );
    }
}

/// Open an encounter with a live enemy.
#[must_use]
pub fn start_fight(
    state: &Arc<HivefallState>,
    enemy: EnemyId,
    rules: &HivefallRules,
) -> Arc<HivefallState> {
    transition(state, rules, |next| combat::start_fight(next, enemy))
}

/// Interlude to combat.
#[must_use]
pub fn engage(state: &Arc<HivefallState>, rules: &HivefallRules) -> Arc<HivefallState> {
    transition(state, rules, |next| combat::engage(next, rules))
}

/// Leave an interlude or combat.
#[must_use]
pub fn flee(state: &Arc<HivefallState>, rules: &HivefallRules) -> Arc<HivefallState> {
    transition(state, rules, combat::flee)
}

/// Use a ready weapon. Loot for a kill is drawn from `rng`.
#[must_use]
pub fn attack<R>(
    state: &Arc<HivefallState>,
    weapon: &WeaponId,
    rules: &HivefallRules,
    rng: &mut R,
) -> Arc<HivefallState>
where
    R: RandomSource + ?Sized,
{
    transition(state, rules, |next| combat::attack(next, weapon, rules, rng))
}

/// Eat one food unit during combat.
#[must_use]
pub fn use_food(state: &Arc<HivefallState>, rules: &HivefallRules) -> Arc<HivefallState> {
    transition(state, rules, |next| combat::use_food(next, rules))
}

/// Record the won-phase choice.
#[must_use]
pub fn choose_won_outcome(
    state: &Arc<HivefallState>,
    choice: WonChoice,
    rules: &HivefallRules,
) -> Arc<HivefallState> {
    transition(state, rules, |next| combat::choose_won_outcome(next, choice, rules))
}

/// Close a won encounter once its choice is made.
#[must_use]
pub fn end_fight(state: &Arc<HivefallState>, rules: &HivefallRules) -> Arc<HivefallState> {
    transition(state, rules, combat::end_fight)
}

/// Advance combat timers by `elapsed_ms`.
#[must_use]
pub fn tick_enemy_hit(
    state: &Arc<HivefallState>,
    elapsed_ms: u32,
    rules: &HivefallRules,
) -> Arc<HivefallState> {
    transition(state, rules, |next| {
        combat::tick_enemy_hit(next, elapsed_ms, rules)
    })
}

/// Put a weapon in the inventory.
#[must_use]
pub fn grant_weapon(
    state: &Arc<HivefallState>,
    weapon: &WeaponId,
    rules: &HivefallRules,
) -> Arc<HivefallState> {
    transition(state, rules, |next| combat::grant_weapon(next, weapon, rules))
}

/// Apply one recorded action.
#[must_use]
pub fn apply_action<R>(
    state: &Arc<HivefallState>,
    action: &Action,
    rules: &HivefallRules,
    rng: &mut R,
) -> Arc<HivefallState>
where
    R: RandomSource + ?Sized,
{
    match action {
        Action::Move(direction) => move_player(state, *direction, rules, rng),
        Action::StartFight(enemy) => start_fight(state, *enemy, rules),
        Action::Engage => engage(state, rules),
        Action::Flee => flee(state, rules),
        Action::Attack(weapon) => attack(state, weapon, rules, rng),
        Action::UseFood => use_food(state, rules),
        Action::ChooseWonOutcome(choice) => choose_won_outcome(state, *choice, rules),
        Action::EndFight => end_fight(state, rules),
        Action::Tick(elapsed_ms) => tick_enemy_hit(state, *elapsed_ms, rules),
        Action::GrantWeapon(weapon) => grant_weapon(state, weapon, rules),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::PhaseKind;
    use crate::grid::{CellEntity, GridPos};
    use crate::math::Fixed;
    use crate::rules::WeaponStats;

    fn zeros() -> impl FnMut() -> Fixed {
        || Fixed::ZERO
    }

    /// Never rolls loot; spawns land at the top-left corner.
    fn high() -> impl FnMut() -> Fixed {
        || Fixed::from_num(0.99)
    }

    fn bucket(index: u32, bound: u32) -> Fixed {
        Fixed::from_num(2 * index + 1) / Fixed::from_num(2 * bound)
    }

    fn quiet_rules() -> HivefallRules {
        let mut rules = HivefallRules::default();
        rules.spawn.first_spawn_after_moves = 1000;
        rules
    }

    fn with_state(
        rules: &HivefallRules,
        edit: impl FnOnce(&mut HivefallState),
    ) -> Arc<HivefallState> {
        let mut state = HivefallState::new(rules);
        edit(&mut state);
        state.into_shared()
    }

    fn lethal_fists(rules: &mut HivefallRules) {
        rules.weapons.insert(
            WeaponId::from("fists"),
            WeaponStats::named("Fists").with_damage(100),
        );
    }

    #[test]
    fn test_starting_state() {
        let state = new_game(&HivefallRules::default());
        assert_eq!(state.player(), GridPos::new(7, 12));
        assert!(state.enemies().is_empty());
        assert_eq!(state.move_count(), 0);
        assert_eq!(state.status(), GameStatus::Playing);
    }

    #[test]
    fn test_edge_moves_are_identity_noops() {
        let cases = [
            (GridPos::new(0, 5), Direction::Up),
            (GridPos::new(13, 5), Direction::Down),
            (GridPos::new(5, 0), Direction::Left),
            (GridPos::new(5, 23), Direction::Right),
        ];
        for (start, direction) in cases {
            let mut rules = HivefallRules::default();
            rules.board.player_start = Some(start);
            let state = new_game(&rules);
            let next = move_player(&state, direction, &rules, &mut zeros());
            assert!(Arc::ptr_eq(&state, &next), "{direction:?} from {start:?}");
            assert_eq!(next.move_count(), 0);
        }
    }

    #[test]
    fn test_walls_and_allies_block() {
        let mut rules = quiet_rules();
        rules.board.walls = vec![GridPos::new(6, 12)];
        let state = with_state(&rules, |s| {
            s.place_ally(GridPos::new(7, 11)).unwrap();
        });
        let up = move_player(&state, Direction::Up, &rules, &mut zeros());
        assert!(Arc::ptr_eq(&state, &up));
        let left = move_player(&state, Direction::Left, &rules, &mut zeros());
        assert!(Arc::ptr_eq(&state, &left));
    }

    #[test]
    fn test_move_updates_grid_tags() {
        let rules = quiet_rules();
        let state = new_game(&rules);
        let next = move_player(&state, Direction::Down, &rules, &mut zeros());
        assert_eq!(next.player(), GridPos::new(8, 12));
        assert_eq!(next.grid().entity(GridPos::new(7, 12)), Some(CellEntity::None));
        assert_eq!(next.grid().entity(GridPos::new(8, 12)), Some(CellEntity::Player));
        // The previous state is untouched.
        assert_eq!(state.grid().entity(GridPos::new(7, 12)), Some(CellEntity::Player));
        next.check_occupancy().unwrap();
    }

    #[test]
    fn test_spawn_on_top_edge_after_first_interval() {
        let mut rules = HivefallRules::default();
        rules.spawn.first_spawn_after_moves = 5;
        let mut draws = vec![bucket(0, 4), bucket(5, 24)].into_iter();
        let mut rng = move || draws.next().unwrap_or(Fixed::ZERO);

        let mut state = new_game(&rules);
        for step in 1..=5 {
            state = move_player(&state, Direction::Left, &rules, &mut rng);
            let expected = usize::from(step == 5);
            assert_eq!(state.enemies().len(), expected, "after move {step}");
        }
        let enemy = state.enemies()[0];
        assert_eq!(enemy.position, GridPos::new(0, 5));
        assert_eq!(enemy.id, 1);
        assert_eq!(state.pacing().moves_since_last_spawn, 0);
        state.check_occupancy().unwrap();
    }

    #[test]
    fn test_spawn_cap_stops_spawning() {
        let mut rules = HivefallRules::default();
        rules.spawn.first_spawn_after_moves = 1;
        rules.spawn.max_enemies = 1;
        let mut state = new_game(&rules);
        for _ in 0..4 {
            state = move_player(&state, Direction::Down, &rules, &mut zeros());
        }
        assert_eq!(state.spawned_total(), 1);
        assert_eq!(state.enemies().len(), 1);
    }

    #[test]
    fn test_stepping_onto_enemy_starts_fight() {
        let rules = quiet_rules();
        let state = with_state(&rules, |s| {
            s.place_enemy(GridPos::new(7, 13), 6).unwrap();
            s.place_enemy(GridPos::new(0, 0), 6).unwrap();
        });
        let next = move_player(&state, Direction::Right, &rules, &mut zeros());
        let fight = next.fight().unwrap();
        assert_eq!(fight.enemy_id, 1);
        assert_eq!(fight.phase_kind(), PhaseKind::Interlude);
        assert_eq!(next.move_count(), 0);
        assert_eq!(next.player(), GridPos::new(7, 12));
        assert_eq!(next.enemies()[1].position, GridPos::new(0, 0));

        // No moves while an encounter is open.
        let blocked = move_player(&next, Direction::Left, &rules, &mut zeros());
        assert!(Arc::ptr_eq(&next, &blocked));
    }

    #[test]
    fn test_enemy_contact_freezes_remaining_actors() {
        let rules = quiet_rules();
        let state = with_state(&rules, |s| {
            s.place_enemy(GridPos::new(6, 11), 6).unwrap();
            s.place_enemy(GridPos::new(0, 0), 6).unwrap();
            s.place_ally(GridPos::new(13, 23)).unwrap();
        });
        let next = move_player(&state, Direction::Left, &rules, &mut zeros());

        assert_eq!(next.player(), GridPos::new(7, 11));
        assert_eq!(next.move_count(), 1);
        assert_eq!(next.fight().map(|f| f.enemy_id), Some(1));
        assert_eq!(next.enemies()[0].position, GridPos::new(6, 11));
        assert_eq!(next.enemies()[1].position, GridPos::new(0, 0));
        assert_eq!(next.allies()[0].position, GridPos::new(13, 23));
        assert_eq!(next.pacing(), state.pacing());
    }

    #[test]
    fn test_enemy_walking_into_ally_takes_strike() {
        let rules = quiet_rules();
        let state = with_state(&rules, |s| {
            s.place_enemy(GridPos::new(0, 0), 6).unwrap();
            s.place_ally(GridPos::new(0, 1)).unwrap();
        });
        let next = move_player(&state, Direction::Left, &rules, &mut zeros());
        assert!(next.allies().is_empty());
        let enemy = next.enemies()[0];
        assert_eq!(enemy.position, GridPos::new(0, 0));
        assert_eq!(enemy.hp, 3);
        assert_eq!(next.grid().entity(GridPos::new(0, 1)), Some(CellEntity::None));
        next.check_occupancy().unwrap();
    }

    #[test]
    fn test_strike_kill_converts_enemy() {
        let rules = quiet_rules();
        let state = with_state(&rules, |s| {
            s.place_enemy(GridPos::new(0, 0), 3).unwrap();
            s.place_ally(GridPos::new(0, 1)).unwrap();
        });
        let next = move_player(&state, Direction::Left, &rules, &mut zeros());
        assert!(next.enemies().is_empty());
        assert_eq!(next.infected_count(), 1);
        assert_eq!(next.allies().len(), 1);
        assert_eq!(next.allies()[0].position, GridPos::new(0, 0));
        assert_eq!(next.allies()[0].id, 2);
        next.check_occupancy().unwrap();
    }

    #[test]
    fn test_ally_hunts_nearest_enemy() {
        let rules = quiet_rules();
        let state = with_state(&rules, |s| {
            s.place_enemy(GridPos::new(0, 0), 6).unwrap();
            s.place_ally(GridPos::new(0, 2)).unwrap();
        });
        // The enemy steps to (0, 1) first, then the ally walks into it.
        let next = move_player(&state, Direction::Left, &rules, &mut zeros());
        assert!(next.allies().is_empty());
        assert_eq!(next.enemies()[0].position, GridPos::new(0, 1));
        assert_eq!(next.enemies()[0].hp, 3);
    }

    #[test]
    fn test_hazard_damage() {
        let mut rules = quiet_rules();
        rules.board.hazards = vec![GridPos::new(7, 11)];
        let state = new_game(&rules);
        let next = move_player(&state, Direction::Left, &rules, &mut zeros());
        assert_eq!(next.hp(), 9);

        let fragile = with_state(&rules, |s| s.set_hp(1));
        let dead = move_player(&fragile, Direction::Left, &rules, &mut zeros());
        assert_eq!(dead.hp(), 0);
        assert_eq!(dead.status(), GameStatus::Lost);
    }

    #[test]
    fn test_attack_rejected_in_interlude_and_won() {
        let mut rules = quiet_rules();
        lethal_fists(&mut rules);
        let fists = WeaponId::from("fists");
        let state = with_state(&rules, |s| {
            s.place_enemy(GridPos::new(7, 13), 6).unwrap();
        });
        let interlude = start_fight(&state, 1, &rules);
        let rejected = attack(&interlude, &fists, &rules, &mut high());
        assert!(Arc::ptr_eq(&interlude, &rejected));

        let combat = engage(&interlude, &rules);
        let won = attack(&combat, &fists, &rules, &mut high());
        assert_eq!(won.fight().map(|f| f.phase_kind()), Some(PhaseKind::Won));
        let again = attack(&won, &fists, &rules, &mut high());
        assert!(Arc::ptr_eq(&won, &again));
    }

    #[test]
    fn test_full_encounter_wins_run() {
        let mut rules = quiet_rules();
        rules.spawn.max_enemies = 1;
        lethal_fists(&mut rules);
        let state = with_state(&rules, |s| {
            s.place_enemy(GridPos::new(7, 13), 6).unwrap();
        });

        let state = move_player(&state, Direction::Right, &rules, &mut high());
        let state = engage(&state, &rules);
        let state = attack(&state, &WeaponId::from("fists"), &rules, &mut high());
        assert_eq!(state.status(), GameStatus::Playing);
        assert_eq!(state.infected_count(), 1);

        let closed_early = end_fight(&state, &rules);
        assert!(Arc::ptr_eq(&state, &closed_early));

        let state = choose_won_outcome(&state, WonChoice::Infect, &rules);
        assert_eq!(state.status(), GameStatus::Playing);
        let state = end_fight(&state, &rules);
        assert!(state.fight().is_none());
        assert_eq!(state.status(), GameStatus::Won);

        let after = move_player(&state, Direction::Left, &rules, &mut high());
        assert!(Arc::ptr_eq(&state, &after));
    }

    #[test]
    fn test_enemy_hits_can_lose_run() {
        let rules = quiet_rules();
        let state = with_state(&rules, |s| {
            s.place_enemy(GridPos::new(7, 13), 6).unwrap();
            s.set_hp(2);
        });
        let state = engage(&start_fight(&state, 1, &rules), &rules);
        let state = tick_enemy_hit(&state, 10_000, &rules);
        assert_eq!(state.status(), GameStatus::Lost);
        assert_eq!(state.hp(), 0);
        assert!(state.fight().is_none());
    }

    #[test]
    fn test_rejected_combat_calls_are_identity() {
        let rules = quiet_rules();
        let state = new_game(&rules);
        assert!(Arc::ptr_eq(&state, &engage(&state, &rules)));
        assert!(Arc::ptr_eq(&state, &flee(&state, &rules)));
        assert!(Arc::ptr_eq(&state, &use_food(&state, &rules)));
        assert!(Arc::ptr_eq(&state, &tick_enemy_hit(&state, 500, &rules)));
        assert!(Arc::ptr_eq(&state, &start_fight(&state, 42, &rules)));
        assert!(Arc::ptr_eq(
            &state,
            &choose_won_outcome(&state, WonChoice::Harvest, &rules)
        ));
    }

    #[test]
    fn test_weapon_grants() {
        let rules = quiet_rules();
        let state = new_game(&rules);
        let same = grant_weapon(&state, &WeaponId::from("fists"), &rules);
        assert!(Arc::ptr_eq(&state, &same));

        let molotov = WeaponId::from("molotov");
        let once = grant_weapon(&state, &molotov, &rules);
        let twice = grant_weapon(&once, &molotov, &rules);
        assert_eq!(once.inventory().charges(&molotov), 1);
        assert_eq!(twice.inventory().charges(&molotov), 2);
    }

    #[test]
    fn test_apply_action_dispatches() {
        let rules = quiet_rules();
        let state = new_game(&rules);
        let moved = apply_action(&state, &Action::Move(Direction::Up), &rules, &mut zeros());
        assert_eq!(moved.player(), GridPos::new(6, 12));
        let same = apply_action(&moved, &Action::EndFight, &rules, &mut zeros());
        assert!(Arc::ptr_eq(&moved, &same));
    }

    #[test]
    fn test_reset_starts_over() {
        let rules = quiet_rules();
        let state = new_game(&rules);
        let moved = move_player(&state, Direction::Up, &rules, &mut zeros());
        assert_eq!(reset(&rules), state);
        assert_ne!(*moved, *state);
    }

    #[cfg(feature = "debug-validation")]
    #[test]
    #[should_panic(expected = "occupancy invariant")]
    fn test_debug_validation_catches_stale_tags() {
        let rules = quiet_rules();
        // Player field moved without its grid tag.
        let state = with_state(&rules, |s| s.player = GridPos::new(0, 0));
        let _ = move_player(&state, Direction::Right, &rules, &mut high());
    }
}
