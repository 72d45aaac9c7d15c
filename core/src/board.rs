use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MergeOutcome {
    NoChange,
    Updated,
}

impl MergeOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Updated => true,
        }
    }
}

/// Accumulated view of one puzzle instance.
///
/// Created all-`Hidden` and only ever moved forward by merging snapshots;
/// a merge either applies completely or not at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    size: Coord2,
    cells: Array2<Cell>,
}

impl Board {
    pub fn new((w, h): Coord2) -> Self {
        let size = (w.clamp(1, Coord::MAX), h.clamp(1, Coord::MAX));
        Self {
            size,
            cells: Array2::default(size.to_nd_index()),
        }
    }

    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn cell(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.size.0 && coords.1 < self.size.1 {
            Ok(coords)
        } else {
            Err(SolverError::InvalidCoords)
        }
    }

    /// True while no cell has been revealed or flagged yet.
    pub fn is_untouched(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_hidden())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        let (w, h) = self.size;
        (0..w).flat_map(move |x| (0..h).map(move |y| ((x, y), self.cell((x, y)))))
    }

    pub fn hidden_count(&self) -> CellCount {
        self.count(Cell::is_hidden)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.count(Cell::is_revealed)
    }

    pub fn flagged_count(&self) -> CellCount {
        self.count(Cell::is_flagged)
    }

    /// Merges a fresh snapshot into the board.
    ///
    /// A cell newly carrying a value becomes `Revealed`/`Flagged`. A cell
    /// that already carried a value must assert the same value again or be
    /// absent from the snapshot; anything else is an [`SolverError::InconsistentUpdate`]
    /// and leaves the board untouched. Validation runs before any mutation.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<MergeOutcome> {
        if snapshot.size() != self.size {
            return Err(SolverError::InvalidDimensions {
                expected: self.size,
                found: snapshot.size(),
            });
        }

        for (coords, current) in self.iter() {
            let incoming = snapshot.cell(coords);
            let compatible = match (current, incoming) {
                (Cell::Hidden, _) => true,
                // Absence carries no information about an already-known cell.
                (_, Cell::Hidden) => true,
                (current, incoming) => current == incoming,
            };
            if !compatible {
                return Err(SolverError::InconsistentUpdate { coords });
            }
        }

        let mut updated = false;
        let (w, h) = self.size;
        for x in 0..w {
            for y in 0..h {
                let coords = (x, y);
                let incoming = snapshot.cell(coords);
                if self.cell(coords).is_hidden() && !incoming.is_hidden() {
                    self.cells[coords.to_nd_index()] = incoming;
                    updated = true;
                }
            }
        }

        Ok(if updated {
            MergeOutcome::Updated
        } else {
            MergeOutcome::NoChange
        })
    }

    fn count(&self, pred: impl Fn(Cell) -> bool) -> CellCount {
        self.cells
            .iter()
            .filter(|&&cell| pred(cell))
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }
}
