//! Error types for grid and world operations.

use evogrid_data::CellState;
use thiserror::Error;

/// Failures of bounds-checked grid operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Coordinate outside `[0, size) x [0, size)`.
    #[error("coordinate ({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds { x: i32, y: i32, size: u16 },

    /// No empty cell is left to sample.
    #[error("grid is full: no empty cell available")]
    GridFull,

    /// Walls and radioactive cells only accept an explicit reset.
    #[error("cell ({x}, {y}) holds {state:?} and cannot be overwritten")]
    Protected { x: i32, y: i32, state: CellState },

    /// An organism cell can only be claimed by its current owner.
    #[error("cell ({x}, {y}) is already owned by another organism")]
    Occupied { x: i32, y: i32 },
}

/// Errors surfaced by the world driver.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SimError {
    /// True when the world ran out of room and population growth stopped.
    #[must_use]
    pub fn is_grid_full(&self) -> bool {
        matches!(self, SimError::Grid(GridError::GridFull))
    }
}

pub type SimResult<T> = std::result::Result<T, SimError>;
