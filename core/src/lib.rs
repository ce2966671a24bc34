#![no_std]

extern crate alloc;

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use analysis::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use solver::*;
pub use tile::*;
pub use types::*;

mod analysis;
mod engine;
mod error;
mod generator;
mod solver;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    /// Validates the shape of a game, at least one safe cell must remain.
    pub fn new((rows, cols): Coord2, mines: CellCount) -> Result<Self> {
        if rows == 0 || cols == 0 || mines >= mult(rows, cols) {
            return Err(GameError::InvalidConfiguration { rows, cols, mines });
        }
        Ok(Self {
            size: (rows, cols),
            mines,
        })
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

/// Ground truth of a game: where the mines are and every other cell's count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<GroundCell>,
    config: GameConfig,
}

impl Board {
    /// Builds a board from an explicit mine list, duplicates count once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &(row, col) in mine_coords {
            if row >= size.0 || col >= size.1 {
                return Err(GameError::OutOfBounds { row, col });
            }
            mine_mask[(row, col).to_nd_index()] = true;
        }

        Self::from_mine_mask(size, &mine_mask)
    }

    pub(crate) fn from_mine_mask(size: Coord2, mine_mask: &Array2<bool>) -> Result<Self> {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count();
        let config = GameConfig::new(
            size,
            CellCount::try_from(mine_count).unwrap_or(CellCount::MAX),
        )?;

        let mut cells = Array2::default(size.to_nd_index());
        for coords in iter_positions(size) {
            cells[coords.to_nd_index()] = if mine_mask[coords.to_nd_index()] {
                GroundCell::Mine
            } else {
                let adjacent = mine_mask
                    .iter_neighbors(coords)
                    .filter(|&pos| mine_mask[pos.to_nd_index()])
                    .count();
                GroundCell::Clear(adjacent as u8)
            };
        }

        Ok(Self { cells, config })
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.size();
        let (row, col) = coords;
        if row < rows && col < cols {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds { row, col })
        }
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.config.safe_cells()
    }

    pub fn total_cells(&self) -> CellCount {
        self.config.total_cells()
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords].is_mine()
    }

    pub fn cell_at(&self, coords: Coord2) -> GroundCell {
        self[coords]
    }

    /// Mine positions in row-major order.
    pub fn mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_positions(self.size()).filter(|&pos| self.contains_mine(pos))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }
}

impl Index<Coord2> for Board {
    type Output = GroundCell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    /// Target was flagged, already revealed, or already exploded.
    Ignored,
    Safe,
    Mine,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_empty_dimensions() {
        assert_eq!(
            GameConfig::new((0, 5), 0),
            Err(GameError::InvalidConfiguration {
                rows: 0,
                cols: 5,
                mines: 0
            })
        );
        assert!(GameConfig::new((5, 0), 0).is_err());
    }

    #[test]
    fn config_rejects_full_board_without_clamping() {
        assert!(GameConfig::new((3, 3), 9).is_err());
        assert!(GameConfig::new((3, 3), 200).is_err());
        assert_eq!(GameConfig::new((3, 3), 8).unwrap().mines, 8);
    }

    #[test]
    fn config_allows_mine_free_board() {
        let config = GameConfig::new((1, 1), 0).unwrap();

        assert_eq!(config.total_cells(), 1);
        assert_eq!(config.safe_cells(), 1);
    }

    #[test]
    fn board_counts_adjacent_mines() {
        let board = Board::from_mine_coords((3, 3), &[(1, 1)]).unwrap();

        assert_eq!(board.mine_count(), 1);
        assert_eq!(board[(1, 1)], GroundCell::Mine);
        for pos in iter_positions((3, 3)).filter(|&pos| pos != (1, 1)) {
            assert_eq!(board[pos], GroundCell::Clear(1));
        }
    }

    #[test]
    fn board_rejects_out_of_range_mine() {
        assert_eq!(
            Board::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::OutOfBounds { row: 2, col: 0 })
        );
    }

    #[test]
    fn board_rejects_all_mine_layout() {
        assert!(Board::from_mine_coords((1, 2), &[(0, 0), (0, 1)]).is_err());
    }

    #[test]
    fn board_validates_coords() {
        let board = Board::from_mine_coords((2, 3), &[]).unwrap();

        assert_eq!(board.validate_coords((1, 2)), Ok((1, 2)));
        assert_eq!(
            board.validate_coords((1, 3)),
            Err(GameError::OutOfBounds { row: 1, col: 3 })
        );
    }
}
