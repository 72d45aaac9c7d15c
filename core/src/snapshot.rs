use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Sentinel tile value marking an externally flagged mine.
pub const FLAGGED_TILE: i8 = -1;

/// One partial view of the board as delivered by the collaborator after a
/// click: `None` is a hidden cell, `0..=8` a revealed mine count, and
/// [`FLAGGED_TILE`] a flagged mine. Any other value is rejected up front.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    size: Coord2,
    tiles: Array2<Option<i8>>,
}

impl Snapshot {
    pub fn new(tiles: Array2<Option<i8>>) -> Result<Self> {
        let dim = tiles.dim();
        let size = (
            Coord::try_from(dim.0).map_err(|_| SolverError::InvalidCoords)?,
            Coord::try_from(dim.1).map_err(|_| SolverError::InvalidCoords)?,
        );

        for x in 0..size.0 {
            for y in 0..size.1 {
                let coords = (x, y);
                if let Some(value) = tiles[coords.to_nd_index()] {
                    if !(FLAGGED_TILE..=8).contains(&value) {
                        return Err(SolverError::InvalidTileValue { coords, value });
                    }
                }
            }
        }

        Ok(Self { size, tiles })
    }

    /// Builds a snapshot from row-major input, the shape the upstream API
    /// uses (`rows[y][x]`). This is the only place the axis order flips.
    pub fn from_rows(rows: &[Vec<Option<i8>>]) -> Result<Self> {
        let height = Coord::try_from(rows.len()).map_err(|_| SolverError::InvalidCoords)?;
        let width = rows.first().map_or(0, Vec::len);
        let width = Coord::try_from(width).map_err(|_| SolverError::InvalidCoords)?;

        for row in rows {
            if row.len() != usize::from(width) {
                return Err(SolverError::InvalidDimensions {
                    expected: (width, height),
                    found: (
                        Coord::try_from(row.len()).unwrap_or(Coord::MAX),
                        height,
                    ),
                });
            }
        }

        let tiles = Array2::from_shape_fn((usize::from(width), usize::from(height)), |(x, y)| {
            rows[y][x]
        });
        Self::new(tiles)
    }

    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub fn tile(&self, coords: Coord2) -> Option<i8> {
        self.tiles[coords.to_nd_index()]
    }

    /// Decodes one tile into the cell state it asserts.
    pub fn cell(&self, coords: Coord2) -> Cell {
        match self.tile(coords) {
            None => Cell::Hidden,
            Some(FLAGGED_TILE) => Cell::Flagged,
            Some(count) => Cell::Revealed(count as u8),
        }
    }
}
