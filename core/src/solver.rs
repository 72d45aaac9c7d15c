use alloc::vec::Vec;
use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::analysis;
use crate::*;

/// How a recommended coordinate was arrived at, so callers can tell
/// certainty from gambling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveBasis {
    /// First click on an untouched board.
    Opening,
    /// Member of the deduced safe set.
    ProvenSafe,
    /// Lowest-risk guess; may still hit a mine.
    BestGuess,
}

impl MoveBasis {
    pub const fn is_certain(self) -> bool {
        matches!(self, Self::Opening | Self::ProvenSafe)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub coords: Coord2,
    pub basis: MoveBasis,
}

/// Stateless solver for one board geometry.
///
/// Owns the cached [`NeighborIndex`] (a pure function of the size) and the
/// deduction config, nothing else: every query is a pure function of the
/// board passed in, so one `Solver` can serve any number of independent
/// games of the same size.
#[derive(Clone, Debug)]
pub struct Solver {
    neighbors: NeighborIndex,
    config: DeduceConfig,
}

impl Solver {
    pub fn new(size: Coord2) -> Self {
        Self::with_config(size, DeduceConfig::default())
    }

    pub fn with_config(size: Coord2, config: DeduceConfig) -> Self {
        Self {
            neighbors: NeighborIndex::new(size),
            config,
        }
    }

    pub const fn size(&self) -> Coord2 {
        self.neighbors.size()
    }

    pub const fn neighbor_index(&self) -> &NeighborIndex {
        &self.neighbors
    }

    pub fn deduce(&self, board: &Board) -> Result<Deduction> {
        self.check_size(board)?;
        Ok(analysis::deduce(board, &self.neighbors, self.config))
    }

    pub fn risk_map(&self, board: &Board) -> Result<RiskMap> {
        self.check_size(board)?;
        let deduction = analysis::deduce(board, &self.neighbors, self.config);
        Ok(analysis::estimate(board, &self.neighbors, &deduction))
    }

    /// Recommends the next cell to click, or `None` when nothing clickable
    /// remains (the terminal state, not an error).
    pub fn next_move(&self, board: &Board) -> Result<Option<Move>> {
        self.check_size(board)?;

        if board.is_untouched() {
            let (w, h) = board.size();
            return Ok(Some(Move {
                coords: (w / 2, h / 2),
                basis: MoveBasis::Opening,
            }));
        }

        let deduction = analysis::deduce(board, &self.neighbors, self.config);
        if let Some(coords) = self.best_safe(board, &deduction) {
            return Ok(Some(Move {
                coords,
                basis: MoveBasis::ProvenSafe,
            }));
        }

        let risk = analysis::estimate(board, &self.neighbors, &deduction);
        Ok(self.best_guess(&risk).map(|coords| Move {
            coords,
            basis: MoveBasis::BestGuess,
        }))
    }

    /// Full candidate ranking, best first: the proven-safe cells when any
    /// exist, otherwise every undetermined cell by ascending risk.
    pub fn ranked_moves(&self, board: &Board) -> Result<Vec<(Coord2, f64)>> {
        self.check_size(board)?;

        let deduction = analysis::deduce(board, &self.neighbors, self.config);
        if !deduction.safe.is_empty() {
            let mut ranked: Vec<(Coord2, f64)> = deduction
                .safe
                .iter()
                .map(|&coords| (coords, self.frontier_pressure(board, coords)))
                .collect();
            ranked.sort_by(|&(a, score_a), &(b, score_b)| {
                self.safe_order(board, (a, score_a), (b, score_b))
            });
            return Ok(ranked);
        }

        let risk = analysis::estimate(board, &self.neighbors, &deduction);
        let mut ranked: Vec<(Coord2, f64)> = risk.iter().collect();
        ranked.sort_by(|&a, &b| self.guess_order(a, b));
        Ok(ranked)
    }

    fn best_safe(&self, board: &Board, deduction: &Deduction) -> Option<Coord2> {
        deduction
            .safe
            .iter()
            .copied()
            .map(|coords| (coords, self.frontier_pressure(board, coords)))
            .min_by(|&a, &b| self.safe_order(board, a, b))
            .map(|(coords, _)| coords)
    }

    fn best_guess(&self, risk: &RiskMap) -> Option<Coord2> {
        risk.iter()
            .min_by(|&a, &b| self.guess_order(a, b))
            .map(|(coords, _)| coords)
    }

    // Safe cells bordering an open zero region expand the frontier fastest;
    // after that, lower pressure, then lexicographic order.
    fn safe_order(
        &self,
        board: &Board,
        (a, score_a): (Coord2, f64),
        (b, score_b): (Coord2, f64),
    ) -> Ordering {
        let zero_a = self.touches_zero(board, a);
        let zero_b = self.touches_zero(board, b);
        zero_b
            .cmp(&zero_a)
            .then_with(|| score_a.total_cmp(&score_b))
            .then_with(|| a.cmp(&b))
    }

    // Guesses prefer the lowest score, then structurally smaller
    // neighborhoods (edges and corners), then lexicographic order.
    fn guess_order(&self, (a, score_a): (Coord2, f64), (b, score_b): (Coord2, f64)) -> Ordering {
        score_a
            .total_cmp(&score_b)
            .then_with(|| {
                self.neighbors
                    .neighbor_count(a)
                    .cmp(&self.neighbors.neighbor_count(b))
            })
            .then_with(|| a.cmp(&b))
    }

    fn touches_zero(&self, board: &Board, coords: Coord2) -> bool {
        self.neighbors
            .neighbors(coords)
            .iter()
            .any(|&pos| board.cell(pos) == Cell::Revealed(0))
    }

    // Raw accumulated constraint pressure around one cell, ignoring the
    // deduction outcome: used to order equally-safe candidates.
    fn frontier_pressure(&self, board: &Board, coords: Coord2) -> f64 {
        let mut pressure = 0.0;
        for &clue in self.neighbors.neighbors(coords) {
            let Cell::Revealed(value) = board.cell(clue) else {
                continue;
            };

            let mut unresolved = 0u8;
            let mut flagged = 0i16;
            for &pos in self.neighbors.neighbors(clue) {
                match board.cell(pos) {
                    Cell::Hidden => unresolved += 1,
                    Cell::Flagged => flagged += 1,
                    Cell::Revealed(_) => {}
                }
            }

            let remaining = i16::from(value) - flagged;
            if remaining > 0 && unresolved > 0 {
                pressure += f64::from(remaining) / f64::from(unresolved);
            }
        }
        pressure
    }

    fn check_size(&self, board: &Board) -> Result<()> {
        if board.size() == self.size() {
            Ok(())
        } else {
            Err(SolverError::InvalidDimensions {
                expected: self.size(),
                found: board.size(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn board(rows: &[Vec<Option<i8>>]) -> Board {
        let snapshot = Snapshot::from_rows(rows).unwrap();
        let mut board = Board::new(snapshot.size());
        board.apply_snapshot(&snapshot).unwrap();
        board
    }

    #[test]
    fn untouched_board_opens_at_the_center() {
        let board = Board::new((10, 10));
        let solver = Solver::new((10, 10));

        let chosen = solver.next_move(&board).unwrap().unwrap();

        assert_eq!(chosen.coords, (5, 5));
        assert_eq!(chosen.basis, MoveBasis::Opening);
    }

    #[test]
    fn proven_safe_cells_win_over_guesses() {
        let board = board(&[
            vec![Some(0), None, None],
            vec![None, None, None],
            vec![None, None, None],
        ]);
        let solver = Solver::new((3, 3));

        let chosen = solver.next_move(&board).unwrap().unwrap();

        assert_eq!(chosen.basis, MoveBasis::ProvenSafe);
        // All three neighbors of the zero touch it; the lexicographically
        // smallest wins.
        assert_eq!(chosen.coords, (0, 1));
    }

    #[test]
    fn guesses_prefer_low_risk_then_lexicographic_order() {
        let board = board(&[
            vec![Some(1), None, None],
            vec![None, None, None],
            vec![None, None, None],
        ]);
        let solver = Solver::new((3, 3));

        let chosen = solver.next_move(&board).unwrap().unwrap();

        // The frontier cells carry 1/3 from the clue, below the neutral
        // baseline of the unconstrained interior, so an informed guess wins;
        // (0,1) and (1,0) tie on score and ring size, so lexicographic
        // order decides.
        assert_eq!(chosen.basis, MoveBasis::BestGuess);
        assert_eq!(chosen.coords, (0, 1));
    }

    #[test]
    fn no_clickable_cell_means_no_move() {
        // The lone hidden neighbor of the 1 is a proven mine.
        let board = board(&[vec![Some(1), None]]);
        let solver = Solver::new((2, 1));

        assert_eq!(solver.next_move(&board).unwrap(), None);
    }

    #[test]
    fn recommendations_are_deterministic() {
        let board = board(&[
            vec![Some(1), None, None],
            vec![None, None, None],
            vec![None, None, None],
        ]);
        let solver = Solver::new((3, 3));

        assert_eq!(
            solver.next_move(&board).unwrap(),
            solver.next_move(&board).unwrap()
        );
        assert_eq!(
            solver.ranked_moves(&board).unwrap(),
            solver.ranked_moves(&board).unwrap()
        );
    }

    #[test]
    fn ranked_moves_lists_all_safe_cells_first_branch() {
        let board = board(&[
            vec![Some(0), None, None],
            vec![None, None, None],
            vec![None, None, None],
        ]);
        let solver = Solver::new((3, 3));

        let ranked = solver.ranked_moves(&board).unwrap();

        let cells: Vec<Coord2> = ranked.iter().map(|&(coords, _)| coords).collect();
        assert_eq!(cells.len(), 3);
        assert!(cells.contains(&(1, 0)));
        assert!(cells.contains(&(0, 1)));
        assert!(cells.contains(&(1, 1)));
    }

    #[test]
    fn ranked_moves_orders_guesses_by_risk() {
        let board = board(&[
            vec![Some(2), None, None],
            vec![None, None, None],
            vec![None, None, None],
        ]);
        let solver = Solver::new((3, 3));

        let ranked = solver.ranked_moves(&board).unwrap();

        let scores: Vec<f64> = ranked.iter().map(|&(_, score)| score).collect();
        assert!(scores.windows(2).all(|pair| pair[0] <= pair[1]));
        // The heavily constrained cells rank last.
        assert_eq!(ranked.last().map(|&(coords, _)| coords), Some((1, 1)));
    }

    #[test]
    fn mismatched_board_size_is_rejected() {
        let solver = Solver::new((5, 5));
        let board = Board::new((4, 4));

        assert!(matches!(
            solver.next_move(&board),
            Err(SolverError::InvalidDimensions { .. })
        ));
    }
}
