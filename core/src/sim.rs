use alloc::collections::{BTreeSet, VecDeque};
use core::num::Saturating;
use core::ops::BitOr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimState {
    Ready,
    Active,
    Won,
    Lost,
}

impl SimState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::Ready
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Local stand-in for the remote game: plays one [`MineLayout`] with the
/// usual reveal/flood-fill semantics and exports the player-visible view as
/// a [`Snapshot`], exactly the collaborator role the engine expects.
#[derive(Clone, Debug)]
pub struct SimGame {
    layout: MineLayout,
    neighbors: NeighborIndex,
    view: Array2<Cell>,
    revealed_count: Saturating<CellCount>,
    state: SimState,
    triggered_mine: Option<Coord2>,
}

impl SimGame {
    pub fn new(layout: MineLayout) -> Self {
        let size = layout.size();
        Self {
            layout,
            neighbors: NeighborIndex::new(size),
            view: Array2::default(size.to_nd_index()),
            revealed_count: Saturating(0),
            state: Default::default(),
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.layout.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.layout.mine_count()
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.view[coords.to_nd_index()]
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.layout.contains_mine(coords)
    }

    /// The player-visible view in wire shape: what the collaborator would
    /// deliver after the last click.
    pub fn snapshot(&self) -> Snapshot {
        let (w, h) = self.size();
        let tiles = Array2::from_shape_fn((usize::from(w), usize::from(h)), |(x, y)| {
            match self.view[[x, y]] {
                Cell::Hidden => None,
                Cell::Revealed(count) => Some(count as i8),
                Cell::Flagged => Some(FLAGGED_TILE),
            }
        });
        Snapshot::new(tiles).expect("simulated view is always well-formed")
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use MarkOutcome::*;

        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        Ok(match self.view[coords.to_nd_index()] {
            Cell::Hidden => {
                self.view[coords.to_nd_index()] = Cell::Flagged;
                Changed
            }
            Cell::Flagged => {
                self.view[coords.to_nd_index()] = Cell::Hidden;
                Changed
            }
            Cell::Revealed(_) => NoChange,
        })
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        if matches!(self.view[coords.to_nd_index()], Cell::Hidden) {
            Ok(self.reveal_single_cell(coords))
        } else {
            Ok(RevealOutcome::NoChange)
        }
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        if self.layout.contains_mine(coords) {
            self.triggered_mine = Some(coords);
            self.state = SimState::Lost;
            return RevealOutcome::HitMine;
        }

        let adjacent_mines = self.layout.adjacent_mine_count(&self.neighbors, coords);
        self.view[coords.to_nd_index()] = Cell::Revealed(adjacent_mines);
        self.revealed_count += 1;

        if adjacent_mines == 0 {
            let mut visited = BTreeSet::from([coords]);
            let mut to_visit: VecDeque<_> = self
                .neighbors
                .neighbors(coords)
                .iter()
                .copied()
                .filter(|&pos| matches!(self.view[pos.to_nd_index()], Cell::Hidden))
                .collect();

            while let Some(visit_coords) = to_visit.pop_front() {
                if !visited.insert(visit_coords) {
                    continue;
                }

                if !matches!(self.view[visit_coords.to_nd_index()], Cell::Hidden) {
                    continue;
                }

                let visit_adjacent_mines =
                    self.layout.adjacent_mine_count(&self.neighbors, visit_coords);
                self.view[visit_coords.to_nd_index()] = Cell::Revealed(visit_adjacent_mines);
                self.revealed_count += 1;

                if visit_adjacent_mines == 0 {
                    to_visit.extend(
                        self.neighbors
                            .neighbors(visit_coords)
                            .iter()
                            .copied()
                            .filter(|&pos| matches!(self.view[pos.to_nd_index()], Cell::Hidden))
                            .filter(|pos| !visited.contains(pos)),
                    );
                }
            }
        }

        if self.revealed_count == Saturating(self.layout.safe_cell_count()) {
            self.state = SimState::Won;
            RevealOutcome::Won
        } else {
            self.mark_started();
            RevealOutcome::Revealed
        }
    }

    fn mark_started(&mut self) {
        if matches!(self.state, SimState::Ready) {
            self.state = SimState::Active;
        }
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (w, h) = self.size();
        if coords.0 < w && coords.1 < h {
            Ok(coords)
        } else {
            Err(SolverError::InvalidCoords)
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(SolverError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_cell() {
        let mut game = SimGame::new(layout((2, 2), &[(0, 0)]));

        let outcome = game.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(game.state(), SimState::Lost);
        assert_eq!(game.triggered_mine(), Some((0, 0)));
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut game = SimGame::new(layout((3, 3), &[(2, 2)]));

        let outcome = game.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(game.cell_at((0, 0)), Cell::Revealed(0));
        assert_eq!(game.cell_at((1, 1)), Cell::Revealed(1));
        assert_eq!(game.cell_at((2, 2)), Cell::Hidden);
    }

    #[test]
    fn winning_reveals_transition_to_won_state() {
        let mut game = SimGame::new(layout((2, 1), &[(0, 0)]));

        assert_eq!(game.reveal((1, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(game.state(), SimState::Won);
        assert!(game.is_finished());
    }

    #[test]
    fn finished_games_accept_no_further_moves() {
        let mut game = SimGame::new(layout((2, 2), &[(0, 0)]));
        game.reveal((0, 0)).unwrap();

        assert_eq!(game.reveal((1, 1)), Err(SolverError::AlreadyEnded));
        assert_eq!(game.toggle_flag((1, 1)), Err(SolverError::AlreadyEnded));
    }

    #[test]
    fn snapshot_reflects_the_visible_view() {
        let mut game = SimGame::new(layout((2, 2), &[(0, 0)]));
        game.reveal((1, 1)).unwrap();
        game.toggle_flag((0, 0)).unwrap();

        let snapshot = game.snapshot();

        assert_eq!(snapshot.cell((1, 1)), Cell::Revealed(1));
        assert_eq!(snapshot.cell((0, 0)), Cell::Flagged);
        assert_eq!(snapshot.cell((1, 0)), Cell::Hidden);
    }

    #[test]
    fn snapshot_merges_into_a_board() {
        let mut game = SimGame::new(layout((3, 3), &[(2, 2)]));
        game.reveal((0, 0)).unwrap();

        let mut board = Board::new(game.size());
        let outcome = board.apply_snapshot(&game.snapshot()).unwrap();

        assert!(outcome.has_update());
        assert_eq!(board.cell((1, 1)), Cell::Revealed(1));
        assert_eq!(board.cell((2, 2)), Cell::Hidden);
    }
}
