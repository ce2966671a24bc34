use core::fmt;

use serde::{Deserialize, Serialize};

/// Ground truth of a single cell, fixed when the board is built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundCell {
    Mine,
    /// Number of mines among the up-to-8 neighbors.
    Clear(u8),
}

impl GroundCell {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

impl Default for GroundCell {
    fn default() -> Self {
        Self::Clear(0)
    }
}

impl fmt::Display for GroundCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mine => f.write_str("M"),
            Self::Clear(count) => write!(f, "{count}"),
        }
    }
}

/// Canonical player-visible state stored by the gameplay engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCell {
    Hidden,
    Flagged,
    Revealed(u8),
    /// A mine that was revealed, only ever reached by hitting it.
    Exploded,
}

impl EngineCell {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }

    pub const fn clue(self) -> Option<u8> {
        match self {
            Self::Revealed(count) => Some(count),
            _ => None,
        }
    }
}

impl Default for EngineCell {
    fn default() -> Self {
        Self::Hidden
    }
}
