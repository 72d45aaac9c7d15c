use alloc::vec::Vec;
use ndarray::Array2;

use super::*;

/// Seeded placement that can optionally keep the starting tile safe or even
/// zero, but other than that is purely random.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
    start: Coord2,
    start_tile: StartTile,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64, start: Coord2, start_tile: StartTile) -> Self {
        Self {
            seed,
            start,
            start_tile,
        }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;
        use StartTile::*;

        let config = GameConfig::new(config.size, config.mines);
        let total_cells = config.total_cells();

        let actual_start_tile = match self.start_tile {
            Random => Random,
            SimpleSafe | AlwaysZero if config.mines + 1 > total_cells => {
                log::warn!("Cannot make start tile safe, fallback to random");
                Random
            }
            SimpleSafe => SimpleSafe,
            AlwaysZero if config.mines + 9 > total_cells => {
                log::warn!("Cannot make start tile zero, fallback to simple safe");
                SimpleSafe
            }
            AlwaysZero => AlwaysZero,
        };

        let neighbors = NeighborIndex::new(config.size);
        let start = (
            self.start.0.clamp(0, config.size.0 - 1),
            self.start.1.clamp(0, config.size.1 - 1),
        );

        let mut protected: Vec<Coord2> = Vec::new();
        match actual_start_tile {
            Random => {}
            SimpleSafe => protected.push(start),
            AlwaysZero => {
                protected.push(start);
                protected.extend(neighbors.neighbors(start));
            }
        }

        let (w, h) = config.size;
        let mut candidates: Vec<Coord2> = Vec::with_capacity(usize::from(total_cells));
        for x in 0..w {
            for y in 0..h {
                if !protected.contains(&(x, y)) {
                    candidates.push((x, y));
                }
            }
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let wanted = usize::from(config.mines).min(candidates.len());
        for chosen in rand::seq::index::sample(&mut rng, candidates.len(), wanted) {
            mine_mask[candidates[chosen].to_nd_index()] = true;
        }

        let layout = MineLayout::from_mine_mask(mine_mask);
        if layout.mine_count() != config.mines {
            log::warn!(
                "Generated layout count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines
            );
        }
        layout
    }
}
