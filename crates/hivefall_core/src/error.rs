//! Error types for the Hivefall engine.
//!
//! Engine transitions never fail: rejected actions return the input state
//! unchanged. Errors only arise at the edges, when loading or validating
//! rules, persisting state and replays, or checking invariants.

use thiserror::Error;

use crate::grid::{CellEntity, GridPos};

/// Result type alias using [`HivefallError`].
pub type Result<T> = std::result::Result<T, HivefallError>;

/// Top-level error type for the engine.
#[derive(Debug, Error)]
pub enum HivefallError {
    /// Rules failed validation.
    #[error("Invalid rules: {}", .0.join("; "))]
    InvalidRules(Vec<String>),

    /// Rules file parsing error.
    #[error("Failed to parse rules: {0}")]
    RulesParse(#[from] ron::error::SpannedError),

    /// Binary (de)serialization error.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    /// Filesystem error.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// Path that was being accessed.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Replay was written by an incompatible format version.
    #[error("Replay version mismatch: expected {expected}, got {found}")]
    ReplayVersion {
        /// Version this build understands.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Replaying the recorded actions did not reproduce the recorded state.
    #[error("Replay desync after {actions} actions: recorded hash {recorded}, replayed hash {replayed}")]
    ReplayDesync {
        /// Number of actions replayed.
        actions: usize,
        /// Hash stored in the replay.
        recorded: u64,
        /// Hash produced by replaying.
        replayed: u64,
    },

    /// A grid entity tag disagrees with the actor lists.
    #[error("Occupancy mismatch at {pos:?}: grid says {found:?}, actors say {expected:?}")]
    OccupancyMismatch {
        /// Offending cell.
        pos: GridPos,
        /// Tag implied by the actor lists.
        expected: CellEntity,
        /// Tag stored in the grid.
        found: CellEntity,
    },
}
