use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// Whether `deduce` applies the equal-excess branch of the pairwise rule.
///
/// The branch declares the shared region of two overlapping constraints safe
/// whenever both constraints need the same number of mines and their
/// exclusive regions have the same nonzero size. That is how the classic
/// 1-2-1 reading falls out of the pairwise rule, but it is not a generally
/// valid deduction: two 1-clues sharing a single cell can both be satisfied
/// by a mine in exactly that shared cell. `Ignore` restricts `deduce` to
/// the provably sound rules; callers treating the safe set as zero-risk
/// should prefer it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EqualExcessRule {
    Apply,
    Ignore,
}

impl Default for EqualExcessRule {
    fn default() -> Self {
        Self::Apply
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeduceConfig {
    pub equal_excess_rule: EqualExcessRule,
}

/// Disjoint sets of hidden coordinates proven safe or proven mined.
///
/// Both sets only ever contain currently hidden, unflagged cells; flags feed
/// the deduction as assumed mines but are never reported back.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deduction {
    pub safe: BTreeSet<Coord2>,
    pub mines: BTreeSet<Coord2>,
}

impl Deduction {
    pub fn is_empty(&self) -> bool {
        self.safe.is_empty() && self.mines.is_empty()
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.safe.contains(&coords) || self.mines.contains(&coords)
    }
}

/// One revealed count cell, seen relative to the current deduction state:
/// `unresolved` are its hidden, unflagged, not-yet-determined neighbors and
/// `remaining` is its count minus every flagged or inferred-mine neighbor.
pub(crate) struct ClueView {
    pub(crate) unresolved: BTreeSet<Coord2>,
    pub(crate) remaining: i16,
}

pub(crate) fn view_clue(
    board: &Board,
    neighbors: &NeighborIndex,
    coords: Coord2,
    value: u8,
    deduction: &Deduction,
) -> ClueView {
    let mut unresolved = BTreeSet::new();
    let mut assumed = 0i16;

    for &pos in neighbors.neighbors(coords) {
        match board.cell(pos) {
            Cell::Flagged => assumed += 1,
            Cell::Revealed(_) => {}
            Cell::Hidden if deduction.mines.contains(&pos) => assumed += 1,
            Cell::Hidden if deduction.safe.contains(&pos) => {}
            Cell::Hidden => {
                unresolved.insert(pos);
            }
        }
    }

    ClueView {
        unresolved,
        remaining: i16::from(value) - assumed,
    }
}

/// Runs the single-constraint and pairwise subset-difference rules to a
/// fixed point and returns the proven sets.
///
/// Pure function of the passed-in board; the result carries no state over
/// from any earlier call. Panics if `neighbors` was built for a different
/// geometry than `board`.
pub fn deduce(board: &Board, neighbors: &NeighborIndex, config: DeduceConfig) -> Deduction {
    assert_eq!(
        board.size(),
        neighbors.size(),
        "neighbor index geometry must match the board"
    );

    let mut deduction = Deduction::default();

    let mut clues: Vec<(Coord2, u8)> = Vec::new();
    let mut clue_values: BTreeMap<Coord2, u8> = BTreeMap::new();
    for (coords, cell) in board.iter() {
        if let Cell::Revealed(value) = cell {
            clues.push((coords, value));
            clue_values.insert(coords, value);
        }
    }

    let mut passes = 0u32;
    loop {
        let mut changed = false;
        passes += 1;

        for &(coords, value) in &clues {
            changed |= apply_single_constraint(
                board,
                neighbors,
                coords,
                value,
                &mut deduction,
                passes == 1,
            );
        }

        for &(coords, value) in &clues {
            changed |= apply_pairwise(
                board,
                neighbors,
                coords,
                value,
                &clue_values,
                config,
                &mut deduction,
            );
        }

        assert!(
            deduction.safe.is_disjoint(&deduction.mines),
            "deduction pass produced overlapping safe and mine sets"
        );

        if !changed {
            break;
        }
    }

    log::debug!(
        "deduction fixed point after {} passes: {} safe, {} mines",
        passes,
        deduction.safe.len(),
        deduction.mines.len()
    );

    deduction
}

fn apply_single_constraint(
    board: &Board,
    neighbors: &NeighborIndex,
    coords: Coord2,
    value: u8,
    deduction: &mut Deduction,
    first_pass: bool,
) -> bool {
    let view = view_clue(board, neighbors, coords, value, deduction);

    if view.remaining < 0 || view.remaining > view.unresolved.len() as i16 {
        // The board claims to be a consistent view; a clue that cannot be
        // satisfied is the collaborator's bug, not ours. Skip it.
        if first_pass {
            log::warn!(
                "clue {} at {:?} cannot be satisfied by its {} unresolved neighbors",
                value,
                coords,
                view.unresolved.len()
            );
        }
        return false;
    }

    if view.unresolved.is_empty() {
        return false;
    }

    let mut changed = false;
    if view.remaining == 0 {
        for pos in view.unresolved {
            changed |= deduction.safe.insert(pos);
        }
    } else if view.remaining == view.unresolved.len() as i16 {
        for pos in view.unresolved {
            changed |= deduction.mines.insert(pos);
        }
    }
    changed
}

fn apply_pairwise(
    board: &Board,
    neighbors: &NeighborIndex,
    coords: Coord2,
    value: u8,
    clue_values: &BTreeMap<Coord2, u8>,
    config: DeduceConfig,
    deduction: &mut Deduction,
) -> bool {
    let mut changed = false;

    // Two clues can only share unresolved neighbors when their centers are
    // within Chebyshev distance 2. Enumerating lexicographically-later
    // partners visits each unordered pair exactly once.
    for (dx, dy) in PAIR_OFFSETS {
        let other = (
            coords.0.checked_add_signed(dx),
            coords.1.checked_add_signed(dy),
        );
        let (Some(ox), Some(oy)) = other else { continue };
        let other = (ox, oy);
        let Some(&other_value) = clue_values.get(&other) else {
            continue;
        };

        changed |= apply_pair(
            board,
            neighbors,
            (coords, value),
            (other, other_value),
            config,
            deduction,
        );
    }

    changed
}

// (dx, dy) with dy > 0, plus the dy == 0 half-row: the lexicographically
// later half of the 5x5 box around a clue.
const PAIR_OFFSETS: [(i8, i8); 12] = [
    (1, 0),
    (2, 0),
    (-2, 1),
    (-1, 1),
    (0, 1),
    (1, 1),
    (2, 1),
    (-2, 2),
    (-1, 2),
    (0, 2),
    (1, 2),
    (2, 2),
];

fn apply_pair(
    board: &Board,
    neighbors: &NeighborIndex,
    (c1, v1): (Coord2, u8),
    (c2, v2): (Coord2, u8),
    config: DeduceConfig,
    deduction: &mut Deduction,
) -> bool {
    let first = view_clue(board, neighbors, c1, v1, deduction);
    let second = view_clue(board, neighbors, c2, v2, deduction);

    if first.unresolved.is_empty()
        || second.unresolved.is_empty()
        || first.remaining < 0
        || second.remaining < 0
    {
        return false;
    }

    let only_in_first: BTreeSet<Coord2> = first
        .unresolved
        .difference(&second.unresolved)
        .copied()
        .collect();
    let only_in_second: BTreeSet<Coord2> = second
        .unresolved
        .difference(&first.unresolved)
        .copied()
        .collect();

    let overlaps = only_in_first.len() < first.unresolved.len();
    if !overlaps {
        return false;
    }

    let mut changed = false;
    if only_in_second.is_empty()
        && !only_in_first.is_empty()
        && first.remaining - second.remaining == only_in_first.len() as i16
    {
        // The excess mines the first clue still needs can only sit in the
        // cells the second clue does not see.
        for pos in only_in_first {
            changed |= deduction.mines.insert(pos);
        }
    } else if only_in_first.is_empty()
        && !only_in_second.is_empty()
        && second.remaining - first.remaining == only_in_second.len() as i16
    {
        for pos in only_in_second {
            changed |= deduction.mines.insert(pos);
        }
    } else if matches!(config.equal_excess_rule, EqualExcessRule::Apply)
        && first.remaining == second.remaining
        && !only_in_first.is_empty()
        && only_in_first.len() == only_in_second.len()
    {
        for pos in first.unresolved.intersection(&second.unresolved) {
            changed |= deduction.safe.insert(*pos);
        }
    }

    changed
}
