use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Snapshot size {found:?} does not match board size {expected:?}")]
    InvalidDimensions { expected: Coord2, found: Coord2 },
    #[error("Cell {coords:?} already carried a value that the snapshot changes")]
    InconsistentUpdate { coords: Coord2 },
    #[error("Tile value {value} at {coords:?} is outside -1..=8")]
    InvalidTileValue { coords: Coord2, value: i8 },
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, SolverError>;
