//! Property suite driving the solver against simulated games with known
//! ground truth.

use desmina_core::*;

const SIZES: [(Coord2, CellCount); 4] = [((5, 5), 4), ((8, 8), 10), ((10, 10), 12), ((9, 7), 9)];

fn seeded_game(seed: u64) -> (MineLayout, SimGame, Coord2) {
    let (size, mines) = SIZES[(seed % SIZES.len() as u64) as usize];
    let start = (size.0 / 2, size.1 / 2);
    let layout = RandomLayoutGenerator::new(seed, start, StartTile::SimpleSafe)
        .generate(GameConfig::new(size, mines));
    let game = SimGame::new(layout.clone());
    (layout, game, start)
}

fn sound_solver(size: Coord2) -> Solver {
    Solver::with_config(
        size,
        DeduceConfig {
            equal_excess_rule: EqualExcessRule::Ignore,
        },
    )
}

fn assert_sound(layout: &MineLayout, deduction: &Deduction, seed: u64) {
    for &coords in &deduction.safe {
        assert!(
            !layout.contains_mine(coords),
            "seed {seed}: {coords:?} deduced safe but carries a mine"
        );
    }
    for &coords in &deduction.mines {
        assert!(
            layout.contains_mine(coords),
            "seed {seed}: {coords:?} deduced mined but is clear"
        );
    }
    assert!(deduction.safe.is_disjoint(&deduction.mines));
}

// Test-only cheat: consult the ground truth for any clear hidden cell so a
// stalled game can keep producing fresh deduction inputs.
fn reveal_some_clear_cell(layout: &MineLayout, game: &mut SimGame) -> bool {
    let (w, h) = layout.size();
    for x in 0..w {
        for y in 0..h {
            let coords = (x, y);
            if game.cell_at(coords).is_hidden() && !layout.contains_mine(coords) {
                game.reveal(coords).unwrap();
                return true;
            }
        }
    }
    false
}

#[test]
fn deduction_is_sound_on_consistent_boards() {
    for seed in 0..48 {
        let (layout, mut game, start) = seeded_game(seed);
        let solver = sound_solver(layout.size());
        let mut board = Board::new(layout.size());

        game.reveal(start).unwrap();

        loop {
            board.apply_snapshot(&game.snapshot()).unwrap();
            let deduction = solver.deduce(&board).unwrap();

            assert_sound(&layout, &deduction, seed);
            assert_zero_rule(&board, &solver, &deduction, seed);
            assert_saturation_rule(&board, &solver, &deduction, seed);

            // A second run on the unchanged board must not move.
            assert_eq!(deduction, solver.deduce(&board).unwrap());

            if game.is_finished() {
                break;
            }

            let mut progressed = false;
            for &coords in &deduction.safe {
                if game.is_finished() {
                    break;
                }
                if game.cell_at(coords).is_hidden() {
                    game.reveal(coords).unwrap();
                    progressed = true;
                }
            }
            if game.is_finished() {
                break;
            }
            if !progressed && !reveal_some_clear_cell(&layout, &mut game) {
                break;
            }
        }

        assert_eq!(game.state(), SimState::Won, "seed {seed}");
    }
}

fn assert_zero_rule(board: &Board, solver: &Solver, deduction: &Deduction, seed: u64) {
    for (coords, cell) in board.iter() {
        if cell != Cell::Revealed(0) {
            continue;
        }
        for &pos in solver.neighbor_index().neighbors(coords) {
            if board.cell(pos).is_hidden() {
                assert!(
                    deduction.safe.contains(&pos),
                    "seed {seed}: zero clue at {coords:?} left {pos:?} undetermined"
                );
            }
        }
    }
}

fn assert_saturation_rule(board: &Board, solver: &Solver, deduction: &Deduction, seed: u64) {
    for (coords, cell) in board.iter() {
        let Cell::Revealed(value) = cell else { continue };
        let hidden: Vec<Coord2> = solver
            .neighbor_index()
            .neighbors(coords)
            .iter()
            .copied()
            .filter(|&pos| board.cell(pos).is_hidden())
            .collect();
        if value > 0 && hidden.len() == usize::from(value) {
            for pos in hidden {
                assert!(
                    deduction.mines.contains(&pos),
                    "seed {seed}: saturated clue at {coords:?} left {pos:?} undetermined"
                );
            }
        }
    }
}

#[test]
fn flagging_inferred_mines_keeps_deduction_sound() {
    for seed in 0..24 {
        let (layout, mut game, start) = seeded_game(seed);
        let solver = sound_solver(layout.size());
        let mut board = Board::new(layout.size());

        game.reveal(start).unwrap();

        loop {
            board.apply_snapshot(&game.snapshot()).unwrap();
            let deduction = solver.deduce(&board).unwrap();
            assert_sound(&layout, &deduction, seed);

            if game.is_finished() {
                break;
            }

            // Flag what the engine proved mined, like the upstream bot did,
            // so later snapshots exercise the flag-handling paths.
            for &coords in &deduction.mines {
                if game.cell_at(coords).is_hidden() {
                    game.toggle_flag(coords).unwrap();
                }
            }

            let mut progressed = false;
            for &coords in &deduction.safe {
                if game.is_finished() {
                    break;
                }
                if game.cell_at(coords).is_hidden() {
                    game.reveal(coords).unwrap();
                    progressed = true;
                }
            }
            if game.is_finished() {
                break;
            }
            if !progressed && !reveal_some_clear_cell(&layout, &mut game) {
                break;
            }
        }

        assert_eq!(game.state(), SimState::Won, "seed {seed}");
    }
}

#[test]
fn solver_plays_full_games_within_the_move_bound() {
    for seed in 0..32 {
        let (layout, mut game, _) = seeded_game(seed);
        let solver = Solver::new(layout.size());
        let mut board = Board::new(layout.size());
        let move_bound = usize::from(layout.total_cells());

        let mut moves = 0usize;
        while !game.is_finished() {
            board.apply_snapshot(&game.snapshot()).unwrap();
            let Some(chosen) = solver.next_move(&board).unwrap() else {
                break;
            };

            assert!(
                game.cell_at(chosen.coords).is_hidden(),
                "seed {seed}: move {chosen:?} targets a non-hidden cell"
            );
            game.reveal(chosen.coords).unwrap();

            moves += 1;
            assert!(moves <= move_bound, "seed {seed}: game did not terminate");
        }
    }
}

#[test]
fn identical_seeds_reproduce_identical_games() {
    for seed in [3, 17, 29] {
        let record = |seed: u64| -> Vec<Move> {
            let (layout, mut game, _) = seeded_game(seed);
            let solver = Solver::new(layout.size());
            let mut board = Board::new(layout.size());
            let mut moves = Vec::new();

            while !game.is_finished() {
                board.apply_snapshot(&game.snapshot()).unwrap();
                let Some(chosen) = solver.next_move(&board).unwrap() else {
                    break;
                };
                moves.push(chosen);
                game.reveal(chosen.coords).unwrap();
            }
            moves
        };

        assert_eq!(record(seed), record(seed));
    }
}
