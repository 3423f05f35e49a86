//! Greedy single-step pursuit shared by enemies and infected allies.

use crate::grid::{Bounds, GridPos};
use crate::state::Enemy;

/// Next position for an actor at `from` chasing `target`.
///
/// The axis with the larger distance is tried first (rows win ties), then
/// the other axis. A candidate is skipped when it leaves the board or
/// `is_blocked` rejects it, except that the target cell itself is always
/// accepted. Returns `from` when no candidate is usable.
pub fn next_step_toward<F>(from: GridPos, target: GridPos, bounds: Bounds, is_blocked: F) -> GridPos
where
    F: Fn(GridPos) -> bool,
{
    let d_row = target.row - from.row;
    let d_col = target.col - from.col;

    let row_step = GridPos::new(from.row + d_row.signum(), from.col);
    let col_step = GridPos::new(from.row, from.col + d_col.signum());
    let candidates = if d_row.abs() >= d_col.abs() {
        [(d_row, row_step), (d_col, col_step)]
    } else {
        [(d_col, col_step), (d_row, row_step)]
    };

    candidates
        .into_iter()
        .filter(|(delta, _)| *delta != 0)
        .map(|(_, pos)| pos)
        .find(|pos| bounds.contains(*pos) && (*pos == target || !is_blocked(*pos)))
        .unwrap_or(from)
}

/// The live enemy closest to `pos` by Manhattan distance; ties go to the
/// earliest in the list.
#[must_use]
pub fn nearest_enemy(pos: GridPos, enemies: &[Enemy]) -> Option<&Enemy> {
    enemies
        .iter()
        .min_by_key(|e| pos.manhattan_distance(e.position))
}
