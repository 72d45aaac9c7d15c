use alloc::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::constraints::view_clue;
use crate::*;

/// Score given to hidden cells with no revealed neighbor to judge them by.
pub const NEUTRAL_BASELINE: f64 = 0.5;

/// Downward adjustment for cells missing part of their neighbor ring,
/// scaled over the full ring of 8. Kept below 1/8 so no constrained cell
/// can be adjusted down to zero.
pub const EDGE_BIAS: f64 = 0.1;

/// Unnormalized risk scores for the undetermined frontier.
///
/// Each score accumulates `remaining / |unresolved|` over every constraint
/// that sees the cell; it is an additive pressure measure, not a calibrated
/// probability, and can exceed 1.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskMap {
    scores: BTreeMap<Coord2, f64>,
}

impl RiskMap {
    pub fn score(&self, coords: Coord2) -> Option<f64> {
        self.scores.get(&coords).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, f64)> + '_ {
        self.scores.iter().map(|(&coords, &score)| (coords, score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Scores every hidden cell the deduction left undetermined.
///
/// Panics if `neighbors` was built for a different geometry than `board`.
pub fn estimate(board: &Board, neighbors: &NeighborIndex, deduction: &Deduction) -> RiskMap {
    assert_eq!(
        board.size(),
        neighbors.size(),
        "neighbor index geometry must match the board"
    );

    let mut scores: BTreeMap<Coord2, f64> = BTreeMap::new();
    for (coords, cell) in board.iter() {
        if cell.is_hidden() && !deduction.contains(coords) {
            scores.insert(coords, 0.0);
        }
    }

    for (coords, cell) in board.iter() {
        let Cell::Revealed(value) = cell else { continue };
        let view = view_clue(board, neighbors, coords, value, deduction);
        if view.remaining <= 0 || view.unresolved.is_empty() {
            continue;
        }

        let share = f64::from(view.remaining) / view.unresolved.len() as f64;
        for pos in &view.unresolved {
            if let Some(score) = scores.get_mut(pos) {
                *score += share;
            }
        }
    }

    for (&coords, score) in scores.iter_mut() {
        let touched = neighbors
            .neighbors(coords)
            .iter()
            .any(|&pos| board.cell(pos).is_revealed());
        if !touched {
            *score = NEUTRAL_BASELINE;
        }

        let ring = neighbors.neighbor_count(coords);
        *score -= EDGE_BIAS * f64::from(8 - ring) / 8.0;
    }

    RiskMap { scores }
}
