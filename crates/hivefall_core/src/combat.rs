//! Encounter state machine.
//!
//! An encounter moves through three phases:
//!
//! - **Interlude**: the fight has started but the enemy is inert. The
//!   player engages or flees.
//! - **Combat**: live exchange. The player uses ready weapons, eats, or
//!   flees; the enemy attacks on a fixed timer driven by
//!   [`tick_enemy_hit`].
//! - **Won**: the enemy is dead. Exactly one [`WonChoice`] must be recorded
//!   before the encounter can close.
//!
//! There is no lost phase: a lethal enemy hit ends the whole run and clears
//! the encounter.
//!
//! Every function here edits a working copy of the state and reports
//! whether anything changed; the engine wraps them in the shared-state
//! no-op convention and re-evaluates the run status afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::grid::{CellState, GridPos};
use crate::inventory::WeaponId;
use crate::loot::{roll_loot, Drop};
use crate::rng::RandomSource;
use crate::rules::HivefallRules;
use crate::state::{AllyId, EnemyId, GameStatus, HivefallState};

/// Terminal choice made after winning an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WonChoice {
    /// Keep the converted ally; it hunts the remaining enemies.
    Infect,
    /// Remove the remains from the board and take food from them.
    Harvest,
}

/// Timers and enemy hp during the live exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatExchange {
    /// Enemy hit points.
    pub enemy_hp: u32,
    /// Milliseconds until each owned weapon is ready again.
    pub weapon_cooldowns: BTreeMap<WeaponId, u32>,
    /// Milliseconds the enemy attack timer stays frozen.
    pub enemy_stun_ms: u32,
    /// Milliseconds until the next enemy attack.
    pub enemy_hit_ms_until_next: u32,
}

impl CombatExchange {
    /// Milliseconds until a weapon is ready (0 when ready or untracked).
    #[must_use]
    pub fn cooldown(&self, id: &WeaponId) -> u32 {
        self.weapon_cooldowns.get(id).copied().unwrap_or(0)
    }
}

/// Phase of an encounter, each carrying only the data meaningful to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FightPhase {
    /// Encounter started, enemy inert.
    Interlude {
        /// Enemy hit points at the start of the encounter.
        enemy_hp: u32,
    },
    /// Live exchange.
    Combat(CombatExchange),
    /// Enemy defeated, awaiting the terminal choice.
    Won {
        /// Items awarded for the kill, in roll order.
        drops: Vec<Drop>,
        /// Cell holding the converted remains.
        remains: GridPos,
        /// Ally created from the remains.
        ally: AllyId,
        /// The terminal choice, once made.
        choice: Option<WonChoice>,
    },
}

/// Discriminant of [`FightPhase`], handy for hosts deciding which actions to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// See [`FightPhase::Interlude`].
    Interlude,
    /// See [`FightPhase::Combat`].
    Combat,
    /// See [`FightPhase::Won`].
    Won,
}

/// An active encounter with one enemy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FightState {
    /// The enemy being fought.
    pub enemy_id: EnemyId,
    /// The enemy's maximum hit points.
    pub enemy_max_hp: u32,
    /// Current phase.
    pub phase: FightPhase,
}

impl FightState {
    /// Which phase the encounter is in.
    #[must_use]
    pub const fn phase_kind(&self) -> PhaseKind {
        match self.phase {
            FightPhase::Interlude { .. } => PhaseKind::Interlude,
            FightPhase::Combat(_) => PhaseKind::Combat,
            FightPhase::Won { .. } => PhaseKind::Won,
        }
    }

    /// Enemy hit points, or 0 once the enemy is dead.
    #[must_use]
    pub const fn enemy_hp(&self) -> u32 {
        match &self.phase {
            FightPhase::Interlude { enemy_hp } => *enemy_hp,
            FightPhase::Combat(exchange) => exchange.enemy_hp,
            FightPhase::Won { .. } => 0,
        }
    }

    /// The live exchange, when in combat.
    #[must_use]
    pub const fn exchange(&self) -> Option<&CombatExchange> {
        match &self.phase {
            FightPhase::Combat(exchange) => Some(exchange),
            _ => None,
        }
    }

    /// Drops of a won encounter (empty otherwise).
    #[must_use]
    pub fn drops(&self) -> &[Drop] {
        match &self.phase {
            FightPhase::Won { drops, .. } => drops,
            _ => &[],
        }
    }

    /// The recorded terminal choice, if any.
    #[must_use]
    pub const fn won_choice(&self) -> Option<WonChoice> {
        match self.phase {
            FightPhase::Won { choice, .. } => choice,
            _ => None,
        }
    }
}

fn exchange_mut(state: &mut HivefallState) -> Option<&mut CombatExchange> {
    match state.fight.as_mut().map(|f| &mut f.phase) {
        Some(FightPhase::Combat(exchange)) => Some(exchange),
        _ => None,
    }
}

/// Open an encounter with a live enemy.
///
/// Only valid while playing with no encounter active.
pub fn start_fight(state: &mut HivefallState, enemy_id: EnemyId) -> bool {
    if state.status != GameStatus::Playing || state.fight.is_some() {
        return false;
    }
    let Some(enemy) = state.enemy(enemy_id).copied() else {
        return false;
    };

    tracing::debug!(enemy = enemy_id, hp = enemy.hp, position = ?enemy.position, "Fight started");
    state.fight = Some(FightState {
        enemy_id,
        enemy_max_hp: enemy.max_hp,
        phase: FightPhase::Interlude { enemy_hp: enemy.hp },
    });
    true
}

/// Interlude to combat. Arms the enemy attack timer and readies every weapon.
pub fn engage(state: &mut HivefallState, rules: &HivefallRules) -> bool {
    let weapons = state.inventory.weapons().to_vec();
    let Some(fight) = state.fight.as_mut() else {
        return false;
    };
    let FightPhase::Interlude { enemy_hp } = fight.phase else {
        return false;
    };

    fight.phase = FightPhase::Combat(CombatExchange {
        enemy_hp,
        weapon_cooldowns: weapons.into_iter().map(|id| (id, 0)).collect(),
        enemy_stun_ms: 0,
        enemy_hit_ms_until_next: rules.combat.enemy_hit_interval_ms.max(1),
    });
    true
}

/// Leave an interlude or combat. The enemy keeps its hp and position.
pub fn flee(state: &mut HivefallState) -> bool {
    match state.fight.as_ref().map(FightState::phase_kind) {
        Some(PhaseKind::Interlude | PhaseKind::Combat) => {
            state.fight = None;
            true
        }
        _ => false,
    }
}

/// Strike with a ready weapon.
///
/// The weapon must be owned, off cooldown and, for consumables, charged.
/// Damage is written through to the live enemy. A killing blow converts the
/// enemy, rolls loot and moves the encounter to the won phase.
pub fn attack<R>(
    state: &mut HivefallState,
    weapon: &WeaponId,
    rules: &HivefallRules,
    rng: &mut R,
) -> bool
where
    R: RandomSource + ?Sized,
{
    let Some(stats) = rules.weapon(weapon) else {
        return false;
    };
    if !state.inventory.has_weapon(weapon) {
        return false;
    }
    let Some(fight) = state.fight.as_ref() else {
        return false;
    };
    let enemy_id = fight.enemy_id;
    match fight.exchange() {
        Some(exchange) if exchange.cooldown(weapon) == 0 => {}
        _ => return false,
    }
    if stats.consumable && !state.inventory.spend_charge(weapon) {
        return false;
    }
    let still_owned = state.inventory.has_weapon(weapon);

    let Some(exchange) = exchange_mut(state) else {
        return false;
    };
    if !still_owned {
        exchange.weapon_cooldowns.remove(weapon);
    }
    exchange.enemy_hp = exchange.enemy_hp.saturating_sub(stats.damage);
    let enemy_hp = exchange.enemy_hp;

    if enemy_hp > 0 {
        if still_owned {
            exchange
                .weapon_cooldowns
                .insert(weapon.clone(), stats.cooldown_ms);
        }
        exchange.enemy_stun_ms = exchange.enemy_stun_ms.max(stats.stun_ms);
        if let Some(enemy) = state.enemies.iter_mut().find(|e| e.id == enemy_id) {
            enemy.hp = enemy_hp;
        }
        tracing::trace!(enemy = enemy_id, %weapon, enemy_hp, "Enemy hit");
        return true;
    }

    let Some((remains, ally)) = state.convert_enemy(enemy_id) else {
        return false;
    };
    let drops = roll_loot(rules, rng);
    for drop in &drops {
        match drop {
            Drop::Food => state.inventory.add_food(1),
            Drop::Weapon(id) => {
                grant_weapon(state, id, rules);
            }
        }
    }
    if !drops.is_empty() {
        Arc::make_mut(&mut state.grid).set_state(remains, Some(CellState::Loot));
    }
    if let Some(fight) = state.fight.as_mut() {
        fight.phase = FightPhase::Won {
            drops,
            remains,
            ally,
            choice: None,
        };
    }
    true
}

/// Eat one food unit during combat, healing up to max hp.
pub fn use_food(state: &mut HivefallState, rules: &HivefallRules) -> bool {
    let in_combat = state
        .fight
        .as_ref()
        .is_some_and(|f| f.phase_kind() == PhaseKind::Combat);
    if !in_combat || !state.inventory.take_food() {
        return false;
    }
    state.hp = state
        .hp
        .saturating_add(rules.player.food_heal)
        .min(rules.player.max_hp);
    true
}

/// Record the terminal choice of a won encounter and apply its consequence.
pub fn choose_won_outcome(
    state: &mut HivefallState,
    choice: WonChoice,
    rules: &HivefallRules,
) -> bool {
    let Some(FightState {
        phase:
            FightPhase::Won {
                remains,
                ally,
                choice: recorded,
                ..
            },
        ..
    }) = state.fight.as_mut()
    else {
        return false;
    };
    if recorded.is_some() {
        return false;
    }
    *recorded = Some(choice);
    let (remains, ally) = (*remains, *ally);

    match choice {
        WonChoice::Infect => {}
        WonChoice::Harvest => {
            state.remove_ally(ally);
            Arc::make_mut(&mut state.grid).set_state(remains, None);
            state.inventory.add_food(rules.combat.harvest_food);
        }
    }
    tracing::debug!(?choice, ?remains, "Won outcome chosen");
    true
}

/// Close a won encounter whose terminal choice has been made.
pub fn end_fight(state: &mut HivefallState) -> bool {
    let remains = match state.fight.as_ref().map(|fight| &fight.phase) {
        Some(FightPhase::Won {
            remains,
            choice: Some(_),
            ..
        }) => *remains,
        _ => return false,
    };
    if state.grid.cell(remains).and_then(|cell| cell.state) == Some(CellState::Loot) {
        Arc::make_mut(&mut state.grid).set_state(remains, None);
    }
    state.fight = None;
    true
}

/// Advance combat timers by `elapsed_ms`.
///
/// Weapon cooldowns tick down; stun time is consumed before the enemy
/// attack countdown advances. When the remaining time spans several attack
/// intervals, the enemy attacks that many times. A lethal attack ends the
/// run immediately.
pub fn tick_enemy_hit(state: &mut HivefallState, elapsed_ms: u32, rules: &HivefallRules) -> bool {
    if elapsed_ms == 0 {
        return false;
    }
    let interval = rules.combat.enemy_hit_interval_ms.max(1);
    let Some(exchange) = exchange_mut(state) else {
        return false;
    };

    for cooldown in exchange.weapon_cooldowns.values_mut() {
        *cooldown = cooldown.saturating_sub(elapsed_ms);
    }
    let absorbed = exchange.enemy_stun_ms.min(elapsed_ms);
    exchange.enemy_stun_ms -= absorbed;
    let remaining = elapsed_ms - absorbed;

    let until_next = exchange.enemy_hit_ms_until_next;
    if remaining < until_next {
        exchange.enemy_hit_ms_until_next = until_next - remaining;
        return true;
    }
    let overflow = remaining - until_next;
    let hits = 1 + overflow / interval;
    exchange.enemy_hit_ms_until_next = interval - overflow % interval;

    for hit in 1..=hits {
        state.hp = state.hp.saturating_sub(rules.combat.enemy_hit_damage);
        if state.hp == 0 {
            tracing::debug!(hit, "Lethal enemy hit");
            state.apply_defeat();
            break;
        }
    }
    true
}

/// Grant a weapon following the inventory rules.
///
/// Non-consumables already owned are a no-op. During combat a newly
/// tracked weapon starts ready.
pub fn grant_weapon(state: &mut HivefallState, id: &WeaponId, rules: &HivefallRules) -> bool {
    let Some(stats) = rules.weapon(id) else {
        return false;
    };
    if !state.inventory.grant_weapon(id, stats.consumable) {
        return false;
    }
    if let Some(exchange) = exchange_mut(state) {
        exchange.weapon_cooldowns.entry(id.clone()).or_insert(0);
    }
    true
}
