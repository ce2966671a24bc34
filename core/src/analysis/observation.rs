use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a player can see of a game, detached from the game itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub size: Coord2,
    pub mine_count: CellCount,
    pub revealed: Array2<Option<u8>>,
    pub flags: Array2<bool>,
    pub exploded: Option<Coord2>,
}

impl Observation {
    pub fn new(
        size: Coord2,
        mine_count: CellCount,
        revealed: Array2<Option<u8>>,
        flags: Array2<bool>,
    ) -> Result<Self> {
        let obs = Self {
            size,
            mine_count,
            revealed,
            flags,
            exploded: None,
        };
        obs.validate()?;
        Ok(obs)
    }

    pub fn from_game(game: &Game) -> Self {
        let size = game.size();
        let mut revealed = Array2::from_elem(size.to_nd_index(), None);
        let mut flags = Array2::from_elem(size.to_nd_index(), false);

        for coords in iter_positions(size) {
            match game.cell_at(coords) {
                EngineCell::Hidden | EngineCell::Exploded => {}
                EngineCell::Revealed(count) => revealed[coords.to_nd_index()] = Some(count),
                EngineCell::Flagged => flags[coords.to_nd_index()] = true,
            }
        }

        Self {
            size,
            mine_count: game.total_mines(),
            revealed,
            flags,
            exploded: game.exploded(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = GameError::InvalidConfiguration {
            rows: self.size.0,
            cols: self.size.1,
            mines: self.mine_count,
        };

        let expected = (self.size.0 as usize, self.size.1 as usize);
        if self.revealed.dim() != expected || self.flags.dim() != expected {
            return Err(invalid);
        }

        GameConfig::new(self.size, self.mine_count)?;

        // flags only ever sit on hidden cells
        let flagged_revealed = self
            .revealed
            .iter()
            .zip(self.flags.iter())
            .any(|(revealed, &flagged)| revealed.is_some() && flagged);
        if flagged_revealed {
            return Err(invalid);
        }

        Ok(())
    }

    pub fn clue_at(&self, coords: Coord2) -> Option<u8> {
        self.revealed[coords.to_nd_index()]
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flags[coords.to_nd_index()]
    }

    pub fn is_hidden_unflagged(&self, coords: Coord2) -> bool {
        self.clue_at(coords).is_none()
            && !self.is_flagged(coords)
            && self.exploded != Some(coords)
    }

    pub fn flag_count(&self) -> usize {
        self.flags.iter().filter(|&&flagged| flagged).count()
    }

    /// Configured mines minus placed flags, negative when over-flagged.
    pub fn mines_remaining(&self) -> isize {
        self.mine_count as isize - self.flag_count() as isize
    }

    /// Hidden, unflagged cells in row-major order.
    pub fn hidden_unflagged(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_positions(self.size).filter(|&coords| self.is_hidden_unflagged(coords))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.revealed.iter_neighbors(coords)
    }
}
