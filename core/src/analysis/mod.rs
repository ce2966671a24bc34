use core::fmt;

use serde::{Deserialize, Serialize};

pub use constraints::*;
pub use observation::*;

mod constraints;
mod observation;

/// Why a move was chosen, from certain to heuristic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Justification {
    /// The clue already has as many flags around it as its number.
    FlagsSatisfied,
    /// Flags plus hidden neighbors add up to exactly the clue's number.
    CapacityExhausted,
    /// No deduction applied, the cell was picked by estimated mine probability.
    MinimumProbability,
}

impl Justification {
    pub const fn is_certain(self) -> bool {
        !matches!(self, Self::MinimumProbability)
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FlagsSatisfied => "all surrounding mines already flagged",
            Self::CapacityExhausted => "all surrounding hidden cells must be mines",
            Self::MinimumProbability => "minimum estimated mine probability",
        })
    }
}
