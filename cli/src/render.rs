use std::fmt;
use std::time::Duration;

use sweepbot_core::*;

/// Player view: `.` hidden, `F` flag, `*` exploded mine, blank for zero.
pub fn visible(game: &Game) -> String {
    grid(game.size(), |pos| match game.cell_at(pos) {
        EngineCell::Hidden => '.',
        EngineCell::Flagged => 'F',
        EngineCell::Exploded => '*',
        EngineCell::Revealed(0) => ' ',
        EngineCell::Revealed(count) => digit(count),
    })
}

/// Debug view of where the mines really are.
pub fn ground_truth(board: &Board) -> String {
    grid(board.size(), |pos| match board[pos] {
        GroundCell::Mine => 'M',
        GroundCell::Clear(count) => digit(count),
    })
}

pub fn status(game: &Game, elapsed: Duration) -> String {
    format!(
        "Mines remaining: {}  Time: {}s",
        game.mines_remaining(),
        elapsed.as_secs()
    )
}

fn digit(count: u8) -> char {
    char::from_digit(count.into(), 10).unwrap_or('?')
}

fn grid(size: Coord2, cell: impl Fn(Coord2) -> char) -> String {
    Grid { size, cell }.to_string()
}

/// Cells laid out with column numbers on top and row numbers on the left.
struct Grid<F> {
    size: Coord2,
    cell: F,
}

impl<F: Fn(Coord2) -> char> fmt::Display for Grid<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.size;

        f.write_str("    ")?;
        for col in 0..cols {
            write!(f, "{col:>2} ")?;
        }
        writeln!(f)?;
        writeln!(f, "   {}", "-".repeat(usize::from(cols) * 3 + 1))?;

        for row in 0..rows {
            write!(f, "{row:>2} | ")?;
            for col in 0..cols {
                write!(f, "{}  ", (self.cell)((row, col)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
