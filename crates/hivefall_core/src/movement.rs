//! Single-step movement resolution.

use crate::grid::{Bounds, Direction, GridPos};

/// Result of attempting a one-cell step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The destination is on the board and not blocked.
    Moved(GridPos),
    /// The destination lies outside the board.
    OutOfBounds,
    /// The destination is on the board but rejected by the blocking predicate.
    Blocked(GridPos),
}

impl StepOutcome {
    /// The destination, if the step succeeded.
    #[must_use]
    pub const fn destination(self) -> Option<GridPos> {
        match self {
            Self::Moved(pos) => Some(pos),
            Self::OutOfBounds | Self::Blocked(_) => None,
        }
    }
}

/// Resolve a step from `from` in `direction`.
///
/// Pure: the predicate is only consulted for in-bounds destinations.
pub fn resolve_step<F>(from: GridPos, direction: Direction, bounds: Bounds, is_blocked: F) -> StepOutcome
where
    F: Fn(GridPos) -> bool,
{
    let to = from.step(direction);
    if !bounds.contains(to) {
        StepOutcome::OutOfBounds
    } else if is_blocked(to) {
        StepOutcome::Blocked(to)
    } else {
        StepOutcome::Moved(to)
    }
}
