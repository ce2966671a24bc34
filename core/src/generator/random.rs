use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Purely random placement: draws positions uniformly and rejects duplicates until the
/// configured mine count is reached.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: GameConfig) -> Board {
        let (rows, cols) = config.size;
        log::debug!(
            "Generating {}x{} board with {} mines, seed: {}",
            rows,
            cols,
            config.mines,
            self.seed
        );

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut mines_placed: CellCount = 0;
        let mut rejected = 0usize;

        // `GameConfig` keeps at least one safe cell, so this terminates
        while mines_placed < config.mines {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));
            let tile = &mut mines[coords.to_nd_index()];
            if *tile {
                rejected += 1;
                continue;
            }
            *tile = true;
            mines_placed += 1;
        }
        log::trace!("Mine placement rejected {} duplicate draws", rejected);

        Board::from_mine_mask(config.size, &mines)
            .expect("mine count matches a validated configuration")
    }
}
