//! Board representation and per-cell occupancy tags.
//!
//! The board is a row-major vector of [`GameCell`]s. Terrain is fixed for the
//! whole run; the entity tag on each cell mirrors the authoritative actor
//! lists held by [`HivefallState`](crate::state::HivefallState).

use serde::{Deserialize, Serialize};

/// Integer board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    /// Row index, 0 is the top edge.
    pub row: i32,
    /// Column index, 0 is the left edge.
    pub col: i32,
}

impl GridPos {
    /// Create a new position.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The neighbouring position one step in `direction`.
    ///
    /// Not bounds-checked; use [`Bounds::contains`] before using the result.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// Manhattan distance to another position.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// The four cardinal step directions. Diagonals are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// All directions in a fixed order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// `(row, col)` delta for one step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }
}

/// Board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Number of rows.
    pub rows: i32,
    /// Number of columns.
    pub cols: i32,
}

impl Bounds {
    /// Create new bounds.
    #[must_use]
    pub const fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// Check if a position lies on the board.
    #[must_use]
    pub const fn contains(self, pos: GridPos) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    /// The centre cell (rounded down), where the player starts.
    #[must_use]
    pub const fn center(self) -> GridPos {
        GridPos::new(self.rows / 2, self.cols / 2)
    }
}

/// Static terrain of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    /// Walkable ground.
    #[default]
    Open,
    /// Impassable wall.
    Wall,
    /// Walkable, but hurts the player on entry.
    Hazard,
    /// Impassable debris.
    Obstacle,
}

impl Terrain {
    /// Returns true if actors may enter this terrain.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Open | Self::Hazard)
    }

    /// The overlay a cell of this terrain shows when nothing else applies.
    #[must_use]
    pub const fn base_state(self) -> CellState {
        match self {
            Self::Open => CellState::Normal,
            Self::Wall | Self::Obstacle => CellState::Blocked,
            Self::Hazard => CellState::Danger,
        }
    }
}

/// Exclusive occupant tag of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellEntity {
    /// Nobody here.
    #[default]
    None,
    /// The player.
    Player,
    /// A live enemy.
    Enemy,
    /// An infected ally (or the infected remains of a fresh kill).
    AllyInfected,
}

/// Display overlay of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    /// Nothing special.
    #[default]
    Normal,
    /// Impassable terrain.
    Blocked,
    /// Hazardous terrain.
    Danger,
    /// Drops were rolled here.
    Loot,
}

/// One board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameCell {
    /// Static terrain.
    pub terrain: Terrain,
    /// Current occupant.
    pub entity: CellEntity,
    /// Optional overlay; `None` means the terrain's base state.
    pub state: Option<CellState>,
}

impl GameCell {
    /// Create an unoccupied cell of the given terrain.
    #[must_use]
    pub const fn with_terrain(terrain: Terrain) -> Self {
        Self {
            terrain,
            entity: CellEntity::None,
            state: None,
        }
    }

    /// The overlay to display, falling back to the terrain's base state.
    #[must_use]
    pub fn display_state(&self) -> CellState {
        self.state.unwrap_or_else(|| self.terrain.base_state())
    }
}

/// The game board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    bounds: Bounds,
    /// Cell data stored in row-major order.
    cells: Vec<GameCell>,
}

impl Grid {
    /// Create an all-open board.
    ///
    /// Non-positive dimensions yield an empty board; callers are expected to
    /// validate rules first.
    #[must_use]
    pub fn new(bounds: Bounds) -> Self {
        let count = (bounds.rows.max(0) as usize) * (bounds.cols.max(0) as usize);
        Self {
            bounds,
            cells: vec![GameCell::default(); count],
        }
    }

    /// Board dimensions.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        self.bounds
            .contains(pos)
            .then(|| (pos.row as usize) * (self.bounds.cols as usize) + (pos.col as usize))
    }

    /// Get a cell. Returns `None` if out of bounds.
    #[must_use]
    pub fn cell(&self, pos: GridPos) -> Option<&GameCell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// Terrain at a position; `None` if out of bounds.
    #[must_use]
    pub fn terrain(&self, pos: GridPos) -> Option<Terrain> {
        self.cell(pos).map(|c| c.terrain)
    }

    /// Occupant tag at a position; `None` if out of bounds.
    #[must_use]
    pub fn entity(&self, pos: GridPos) -> Option<CellEntity> {
        self.cell(pos).map(|c| c.entity)
    }

    /// Returns true if the position is on the board and its terrain is walkable.
    #[must_use]
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.terrain(pos).is_some_and(Terrain::is_walkable)
    }

    /// Set terrain at a position. Returns `false` if out of bounds.
    pub fn set_terrain(&mut self, pos: GridPos, terrain: Terrain) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i].terrain = terrain;
                true
            }
            None => false,
        }
    }

    /// Set the occupant tag at a position. Returns `false` if out of bounds.
    pub fn set_entity(&mut self, pos: GridPos, entity: CellEntity) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i].entity = entity;
                true
            }
            None => false,
        }
    }

    /// Set or clear the overlay at a position. Returns `false` if out of bounds.
    pub fn set_state(&mut self, pos: GridPos, state: Option<CellState>) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i].state = state;
                true
            }
            None => false,
        }
    }

    /// Iterate `(position, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &GameCell)> {
        let cols = self.bounds.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (GridPos::new(i as i32 / cols, i as i32 % cols), cell))
    }
}
