//! Built-in autopilot that plays a run without a human.
//!
//! The policy is deliberately simple; it exists to exercise the engine in
//! batches, not to play well.
//!
//! | Situation              | Action                                         |
//! |------------------------|------------------------------------------------|
//! | Interlude              | engage                                         |
//! | Combat, hp <= max / 3  | eat, if any food is left                       |
//! | Combat                 | strongest ready weapon, otherwise wait a tick  |
//! | Won, nothing chosen    | infect                                         |
//! | Won, choice made       | end the fight                                  |
//! | Exploring              | step toward the nearest enemy, else wander     |

use hivefall_core::combat::{FightState, PhaseKind, WonChoice};
use hivefall_core::engine::Action;
use hivefall_core::grid::{CellEntity, Direction, GridPos};
use hivefall_core::inventory::WeaponId;
use hivefall_core::pursuit::{nearest_enemy, next_step_toward};
use hivefall_core::rng::{RandomSource, SeededRng};
use hivefall_core::rules::HivefallRules;
use hivefall_core::state::{GameStatus, HivefallState};

/// Autopilot state: its own random stream and the tick length it waits with.
///
/// The wander stream is separate from the engine's so recorded runs replay
/// from the engine seed alone.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: SeededRng,
    tick_ms: u32,
}

impl Autopilot {
    /// Autopilot for the run seeded with `seed`, waiting `tick_ms` per tick.
    ///
    /// A zero tick would never advance combat, so it is raised to 1 ms.
    #[must_use]
    pub fn new(seed: u64, tick_ms: u32) -> Self {
        Self {
            rng: SeededRng::new(!seed),
            tick_ms: tick_ms.max(1),
        }
    }

    /// Milliseconds passed to each `Tick` action.
    #[must_use]
    pub const fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    /// Next action for `state`, or `None` once the run is over.
    pub fn decide(&mut self, state: &HivefallState, rules: &HivefallRules) -> Option<Action> {
        if state.status() != GameStatus::Playing {
            return None;
        }

        let action = match state.fight() {
            Some(fight) => self.fight_action(state, fight, rules),
            None => self.explore(state),
        };
        Some(action)
    }

    fn fight_action(
        &self,
        state: &HivefallState,
        fight: &FightState,
        rules: &HivefallRules,
    ) -> Action {
        match fight.phase_kind() {
            PhaseKind::Interlude => Action::Engage,
            PhaseKind::Combat => {
                let max_hp = rules.player.max_hp;
                if state.hp().saturating_mul(3) <= max_hp && state.inventory().food() > 0 {
                    return Action::UseFood;
                }
                match strongest_ready_weapon(state, fight, rules) {
                    Some(id) => Action::Attack(id),
                    None => Action::Tick(self.tick_ms),
                }
            }
            PhaseKind::Won => match fight.won_choice() {
                None => Action::ChooseWonOutcome(WonChoice::Infect),
                Some(_) => Action::EndFight,
            },
        }
    }

    fn explore(&mut self, state: &HivefallState) -> Action {
        let player = state.player();
        if let Some(target) = nearest_enemy(player, state.enemies()) {
            let grid = state.grid();
            let next = next_step_toward(player, target.position, grid.bounds(), |pos| {
                !grid.is_walkable(pos) || grid.entity(pos) == Some(CellEntity::AllyInfected)
            });
            if let Some(direction) = direction_between(player, next) {
                return Action::Move(direction);
            }
        }
        Action::Move(Direction::ALL[self.rng.pick_below(4) as usize])
    }
}

/// The owned, defined, off-cooldown weapon with the highest damage.
/// Ties go to the weapon acquired first.
fn strongest_ready_weapon(
    state: &HivefallState,
    fight: &FightState,
    rules: &HivefallRules,
) -> Option<WeaponId> {
    let exchange = fight.exchange()?;
    state
        .inventory()
        .weapons()
        .iter()
        .filter(|id| exchange.cooldown(id) == 0)
        .filter_map(|id| rules.weapon(id).map(|stats| (id, stats.damage)))
        .fold(None, |best: Option<(&WeaponId, u32)>, (id, damage)| match best {
            Some((_, best_damage)) if best_damage >= damage => best,
            _ => Some((id, damage)),
        })
        .map(|(id, _)| id.clone())
}

fn direction_between(from: GridPos, to: GridPos) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|direction| from.step(*direction) == to)
}
