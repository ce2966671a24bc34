use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Justification, Observation};
use crate::*;

pub type Neighbors = SmallVec<[Coord2; 8]>;

/// A revealed number together with the unknowns around it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueConstraint {
    pub clue: Coord2,
    pub value: u8,
    /// Hidden neighbors that are not flagged.
    pub hidden: Neighbors,
    pub flagged: Neighbors,
}

impl ClueConstraint {
    /// What this clue alone proves about its hidden neighbors.
    pub fn justification(&self) -> Option<Justification> {
        if self.hidden.is_empty() {
            return None;
        }

        let value = usize::from(self.value);
        if self.flagged.len() == value {
            Some(Justification::FlagsSatisfied)
        } else if self.flagged.len() + self.hidden.len() == value {
            Some(Justification::CapacityExhausted)
        } else {
            None
        }
    }
}

/// Collects every revealed clue from 1 to 8 in row-major order.
pub fn scan_clues(obs: &Observation) -> Vec<ClueConstraint> {
    let mut constraints = Vec::new();

    for clue in iter_positions(obs.size) {
        let Some(value @ 1..=8) = obs.clue_at(clue) else {
            continue;
        };

        let mut hidden = Neighbors::new();
        let mut flagged = Neighbors::new();
        for neighbor in obs.iter_neighbors(clue) {
            if obs.is_flagged(neighbor) {
                flagged.push(neighbor);
            } else if obs.is_hidden_unflagged(neighbor) {
                hidden.push(neighbor);
            }
        }

        constraints.push(ClueConstraint {
            clue,
            value,
            hidden,
            flagged,
        });
    }

    constraints
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub coords: Coord2,
    /// The clue that proved it.
    pub clue: Coord2,
    pub justification: Justification,
}

/// Certain moves, each list in the order the clues were scanned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    pub safe: Vec<Deduction>,
    pub mines: Vec<Deduction>,
}

impl Deductions {
    pub fn from_constraints(constraints: &[ClueConstraint]) -> Self {
        let mut deductions = Self::default();

        for constraint in constraints {
            let Some(justification) = constraint.justification() else {
                continue;
            };

            let target = match justification {
                Justification::FlagsSatisfied => &mut deductions.safe,
                _ => &mut deductions.mines,
            };
            for &coords in &constraint.hidden {
                if target.iter().all(|known| known.coords != coords) {
                    target.push(Deduction {
                        coords,
                        clue: constraint.clue,
                        justification,
                    });
                }
            }
        }

        deductions
    }

    pub fn is_empty(&self) -> bool {
        self.safe.is_empty() && self.mines.is_empty()
    }

    /// The move to play next, safe reveals always take precedence over flags.
    pub fn first(&self) -> Option<&Deduction> {
        self.safe.first().or_else(|| self.mines.first())
    }

    /// Cells proven both safe and mined, only possible when some flag is wrong.
    pub fn conflicts(&self) -> Vec<Coord2> {
        self.safe
            .iter()
            .map(|deduction| deduction.coords)
            .filter(|&coords| self.mines.iter().any(|mine| mine.coords == coords))
            .collect()
    }
}

pub fn deduce(obs: &Observation) -> Deductions {
    Deductions::from_constraints(&scan_clues(obs))
}
