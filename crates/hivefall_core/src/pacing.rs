//! Enemy spawn pacing and edge placement.
//!
//! Every successful player move advances a counter. When the counter
//! reaches the current interval a spawn is due and the counter resets.
//! After a spawn is actually placed the interval may shrink, once every
//! `decrease_every_spawns` spawns, never below `min_interval`.

use serde::{Deserialize, Serialize};

use crate::grid::{Bounds, GridPos};
use crate::rng::RandomSource;
use crate::rules::SpawnRules;

/// Spawn pacing counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnPacing {
    /// Successful moves required between spawns.
    pub current_interval: u32,
    /// Successful moves since the last spawn was due.
    pub moves_since_last_spawn: u32,
}

impl SpawnPacing {
    /// Starting pacing for a run: the first spawn is due after
    /// `first_spawn_after_moves` moves.
    #[must_use]
    pub fn new(rules: &SpawnRules) -> Self {
        Self {
            current_interval: rules.first_spawn_after_moves.max(1),
            moves_since_last_spawn: 0,
        }
    }
}

/// Result of advancing pacing by one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingAdvance {
    /// Updated counters.
    pub pacing: SpawnPacing,
    /// Whether a spawn is due this turn.
    pub should_spawn: bool,
}

/// Count one successful player move.
///
/// The interval itself never changes here.
#[must_use]
pub fn advance_spawn_pacing(pacing: SpawnPacing) -> PacingAdvance {
    let moves = pacing.moves_since_last_spawn + 1;
    if moves >= pacing.current_interval {
        PacingAdvance {
            pacing: SpawnPacing {
                moves_since_last_spawn: 0,
                ..pacing
            },
            should_spawn: true,
        }
    } else {
        PacingAdvance {
            pacing: SpawnPacing {
                moves_since_last_spawn: moves,
                ..pacing
            },
            should_spawn: false,
        }
    }
}

/// Shrink the interval after a spawn was placed, if this spawn is on the
/// decrease cadence.
///
/// `total_spawned` counts the spawn just placed.
#[must_use]
pub fn after_spawn(pacing: SpawnPacing, total_spawned: u32, rules: &SpawnRules) -> SpawnPacing {
    let floor = rules.min_interval.max(1);
    let on_cadence =
        rules.decrease_every_spawns > 0 && total_spawned % rules.decrease_every_spawns == 0;
    if !on_cadence || pacing.current_interval <= floor {
        return pacing;
    }

    let current_interval = pacing
        .current_interval
        .saturating_sub(rules.decrease_step)
        .max(floor);
    tracing::debug!(
        from = pacing.current_interval,
        to = current_interval,
        total_spawned,
        "Spawn interval shrunk"
    );
    SpawnPacing {
        current_interval,
        ..pacing
    }
}

/// Board edge a spawn is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Row 0.
    Top,
    /// Last row.
    Bottom,
    /// Column 0.
    Left,
    /// Last column.
    Right,
}

impl Edge {
    const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];
}

/// Sample a uniform position on a uniform board edge.
///
/// Draws the edge first, then the coordinate along it.
pub fn sample_edge<R>(bounds: Bounds, rng: &mut R) -> GridPos
where
    R: RandomSource + ?Sized,
{
    let edge = Edge::ALL[rng.pick_below(4) as usize];
    match edge {
        Edge::Top => GridPos::new(0, rng.pick_below(bounds.cols as u32) as i32),
        Edge::Bottom => GridPos::new(bounds.rows - 1, rng.pick_below(bounds.cols as u32) as i32),
        Edge::Left => GridPos::new(rng.pick_below(bounds.rows as u32) as i32, 0),
        Edge::Right => GridPos::new(rng.pick_below(bounds.rows as u32) as i32, bounds.cols - 1),
    }
}

/// Find a free edge position, retrying up to `max_attempts` times.
///
/// Returns `None` when every attempt landed on an invalid position; no
/// spawn happens this turn in that case.
pub fn sample_edge_position<R, F>(
    bounds: Bounds,
    rng: &mut R,
    is_invalid: F,
    max_attempts: u32,
) -> Option<GridPos>
where
    R: RandomSource + ?Sized,
    F: Fn(GridPos) -> bool,
{
    (0..max_attempts)
        .map(|_| sample_edge(bounds, rng))
        .find(|pos| !is_invalid(*pos))
}
