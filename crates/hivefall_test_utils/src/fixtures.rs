//! Test fixtures and helpers.
//!
//! Scripted random sources, small boards and pre-populated states for
//! consistent testing.

use std::collections::VecDeque;
use std::sync::Arc;

use fixed::types::I32F32;
use hivefall_core::grid::GridPos;
use hivefall_core::pacing::Edge;
use hivefall_core::rng::RandomSource;
use hivefall_core::rules::HivefallRules;
use hivefall_core::state::HivefallState;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In engine code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A fraction that lands in the middle of bucket `index` out of `bound`,
/// so `pick_below(bound)` returns exactly `index`.
#[must_use]
pub fn bucket(index: u32, bound: u32) -> I32F32 {
    I32F32::from_num(2 * index + 1) / I32F32::from_num(2 * bound)
}

/// The two draws that make the spawner pick `edge` and then `offset`
/// along it, on a board of `rows` by `cols`.
#[must_use]
pub fn edge_draws(edge: Edge, offset: u32, rows: u32, cols: u32) -> [I32F32; 2] {
    let (index, along) = match edge {
        Edge::Top => (0, cols),
        Edge::Bottom => (1, cols),
        Edge::Left => (2, rows),
        Edge::Right => (3, rows),
    };
    [bucket(index, 4), bucket(offset, along)]
}

/// A random source that replays a fixed script, then a fallback value.
///
/// The default source has an empty script and always returns 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: VecDeque<I32F32>,
    fallback: I32F32,
    drawn: usize,
}

impl ScriptedRng {
    /// Script the given draws; once exhausted every draw returns 0.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = I32F32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: I32F32::ZERO,
            drawn: 0,
        }
    }

    /// A source that always returns `value`.
    #[must_use]
    pub fn constant(value: I32F32) -> Self {
        Self::new(Vec::<I32F32>::new()).with_fallback(value)
    }

    /// Value returned once the script is exhausted.
    #[must_use]
    pub fn with_fallback(mut self, value: I32F32) -> Self {
        self.fallback = value;
        self
    }

    /// Append more draws to the script.
    pub fn push(&mut self, values: impl IntoIterator<Item = I32F32>) {
        self.values.extend(values);
    }

    /// Scripted draws not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Total draws taken so far.
    #[must_use]
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomSource for ScriptedRng {
    fn next_fraction(&mut self) -> I32F32 {
        self.drawn += 1;
        self.values.pop_front().unwrap_or(self.fallback)
    }
}

/// Default rules on a `rows` by `cols` board with the player centred.
#[must_use]
pub fn board_rules(rows: i32, cols: i32) -> HivefallRules {
    let mut rules = HivefallRules::default();
    rules.board.rows = rows;
    rules.board.cols = cols;
    rules
}

/// Default rules with automatic spawning pushed out of reach, for
/// hand-placed scenarios.
#[must_use]
pub fn quiet_rules() -> HivefallRules {
    let mut rules = HivefallRules::default();
    rules.spawn.first_spawn_after_moves = u32::MAX;
    rules
}

/// A fresh state with enemies (at full hp) and allies placed in order.
///
/// # Panics
///
/// Panics if any position is not free.
#[must_use]
pub fn state_with(
    rules: &HivefallRules,
    enemies: &[GridPos],
    allies: &[GridPos],
) -> Arc<HivefallState> {
    let mut state = HivefallState::new(rules);
    for pos in enemies {
        state
            .place_enemy(*pos, rules.combat.enemy_max_hp)
            .unwrap_or_else(|| panic!("enemy cell {pos:?} is not free"));
    }
    for pos in allies {
        state
            .place_ally(*pos)
            .unwrap_or_else(|| panic!("ally cell {pos:?} is not free"));
    }
    state.into_shared()
}
