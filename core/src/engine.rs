use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::InProgress
    }
}

/// A single game: the immutable board plus everything the player has uncovered or flagged.
///
/// The engine never refuses moves once a mine is hit, deciding when a game is over is up to
/// whoever drives it. [`Game::state`] reports what happened so far.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    visibility: Array2<EngineCell>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    exploded: Option<Coord2>,
}

impl Game {
    pub fn new(board: Board) -> Self {
        let size = board.size();
        Self {
            board,
            visibility: Array2::default(size.to_nd_index()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            exploded: None,
        }
    }

    /// Starts a game on a freshly generated random board.
    pub fn generate(config: GameConfig, seed: u64) -> Self {
        Self::new(RandomBoardGenerator::new(seed).generate(config))
    }

    pub fn state(&self) -> GameState {
        if self.exploded.is_some() {
            GameState::Lost
        } else if self.is_won() {
            GameState::Won
        } else {
            GameState::InProgress
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// Every safe cell is revealed, flags play no part in this.
    pub fn is_won(&self) -> bool {
        self.revealed_count == Saturating(self.board.safe_cell_count())
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.board.mine_count()
    }

    /// Configured mines minus placed flags, negative when over-flagged.
    pub fn mines_remaining(&self) -> isize {
        (self.board.mine_count() as isize) - (self.flagged_count.0 as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count.0
    }

    /// Panics when `coords` is outside the board, see [`Board::validate_coords`].
    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.visibility[coords.to_nd_index()]
    }

    pub fn visibility(&self) -> &Array2<EngineCell> {
        &self.visibility
    }

    /// Ground truth, for debug views only.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The mine that was hit, if any.
    pub fn exploded(&self) -> Option<Coord2> {
        self.exploded
    }

    /// Flag set in row-major order.
    pub fn flagged_cells(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells_matching(|cell| cell == EngineCell::Flagged)
    }

    /// Hidden cells that are not flagged, in row-major order.
    pub fn hidden_unflagged(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells_matching(|cell| cell == EngineCell::Hidden)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use EngineCell::*;
        use MarkOutcome::*;

        let coords = self.board.validate_coords(coords)?;

        Ok(match self.visibility[coords.to_nd_index()] {
            Hidden => {
                self.visibility[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                log::debug!("Flagged {:?}", coords);
                Changed
            }
            Flagged => {
                self.visibility[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                log::debug!("Unflagged {:?}", coords);
                Changed
            }
            Revealed(_) | Exploded => NoChange,
        })
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.board.validate_coords(coords)?;

        if matches!(self.visibility[coords.to_nd_index()], EngineCell::Hidden) {
            Ok(self.reveal_single_cell(coords))
        } else {
            log::trace!("Ignoring reveal at {:?}", coords);
            Ok(RevealOutcome::Ignored)
        }
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        let adjacent_mines = match self.board[coords] {
            GroundCell::Mine => {
                self.visibility[coords.to_nd_index()] = EngineCell::Exploded;
                self.exploded.get_or_insert(coords);
                log::debug!("Hit mine at {:?}", coords);
                return RevealOutcome::Mine;
            }
            GroundCell::Clear(count) => count,
        };

        self.open(coords, adjacent_mines);
        log::debug!("Revealed {:?}, adjacent mines: {}", coords, adjacent_mines);

        if adjacent_mines == 0 {
            let mut visited = BTreeSet::from([coords]);
            let mut to_visit: Vec<_> = self.unrevealed_neighbors(coords, &visited);
            log::trace!(
                "Starting flood fill from {:?}, initial neighbors: {:?}",
                coords,
                to_visit
            );

            while let Some(visit_coords) = to_visit.pop() {
                if !visited.insert(visit_coords) {
                    continue;
                }

                if !self.visibility[visit_coords.to_nd_index()].is_unrevealed() {
                    continue;
                }

                // only neighbors of zero cells are queued, they are never mines
                let GroundCell::Clear(visit_adjacent_mines) = self.board[visit_coords] else {
                    continue;
                };

                self.open(visit_coords, visit_adjacent_mines);
                log::trace!(
                    "Flood revealed {:?}, adjacent mines: {}",
                    visit_coords,
                    visit_adjacent_mines
                );

                if visit_adjacent_mines == 0 {
                    let next = self.unrevealed_neighbors(visit_coords, &visited);
                    to_visit.extend(next);
                }
            }
        }

        RevealOutcome::Safe
    }

    /// Marks a safe cell revealed, dropping any flag it carried.
    fn open(&mut self, coords: Coord2, adjacent_mines: u8) {
        let cell = &mut self.visibility[coords.to_nd_index()];
        if *cell == EngineCell::Flagged {
            self.flagged_count -= 1;
            log::debug!("Flood fill cleared flag at {:?}", coords);
        }
        *cell = EngineCell::Revealed(adjacent_mines);
        self.revealed_count += 1;
    }

    fn unrevealed_neighbors(&self, coords: Coord2, visited: &BTreeSet<Coord2>) -> Vec<Coord2> {
        self.board
            .iter_neighbors(coords)
            .filter(|&pos| self.visibility[pos.to_nd_index()].is_unrevealed())
            .filter(|pos| !visited.contains(pos))
            .collect()
    }

    fn cells_matching(
        &self,
        predicate: impl Fn(EngineCell) -> bool + 'static,
    ) -> impl Iterator<Item = Coord2> + '_ {
        iter_positions(self.size()).filter(move |&pos| predicate(self.cell_at(pos)))
    }
}
