use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    Revealed,
    Flagged,
    Won,
    /// Nothing hidden and unflagged is left, yet the game is not won.
    Stuck,
    Lost,
}

impl StepKind {
    /// Whether the driver should stop scheduling steps.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Stuck | Self::Lost)
    }
}

/// One solver decision, with enough context for a driver to print the reasoning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub kind: StepKind,
    pub position: Option<Coord2>,
    pub justification: Option<Justification>,
    /// Clue that proved a certain move.
    pub clue: Option<Coord2>,
    /// Estimated mine probability of a guessed cell.
    pub probability: Option<f64>,
    pub rationale: String,
}

impl StepResult {
    fn terminal(kind: StepKind, rationale: String) -> Self {
        Self {
            kind,
            position: None,
            justification: None,
            clue: None,
            probability: None,
            rationale,
        }
    }
}

/// Global mine density over the cells still in play: remaining mines over hidden unflagged
/// cells. `None` when no such cell is left.
pub fn estimate_mine_probability(obs: &Observation) -> Option<f64> {
    let hidden = obs.hidden_unflagged().count();
    if hidden == 0 {
        return None;
    }
    Some(obs.mines_remaining() as f64 / hidden as f64)
}

/// Plays a game one action at a time: certain reveals first, then certain flags, then the
/// least risky guess.
#[derive(Clone, Debug)]
pub struct Solver {
    rng: SmallRng,
    last_rationale: String,
}

impl Solver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            last_rationale: String::new(),
        }
    }

    pub fn last_rationale(&self) -> &str {
        &self.last_rationale
    }

    /// Decides and applies exactly one action.
    pub fn step(&mut self, game: &mut Game) -> Result<StepResult> {
        let result = self.decide_and_apply(game)?;
        log::info!("{}", result.rationale);
        self.last_rationale.clone_from(&result.rationale);
        Ok(result)
    }

    /// Steps until a terminal result, calling `on_step` after every step including the last.
    ///
    /// Every non-terminal step reveals or flags a hidden unflagged cell, so this ends within
    /// one step per cell.
    pub fn run(
        &mut self,
        game: &mut Game,
        mut on_step: impl FnMut(&Game, &StepResult),
    ) -> Result<StepResult> {
        loop {
            let result = self.step(game)?;
            on_step(game, &result);
            if result.kind.is_terminal() {
                return Ok(result);
            }
        }
    }

    fn decide_and_apply(&mut self, game: &mut Game) -> Result<StepResult> {
        use StepKind::*;

        if game.is_won() {
            return Ok(StepResult::terminal(
                Won,
                String::from("All safe cells revealed, the game is won"),
            ));
        }

        if let Some((row, col)) = game.exploded() {
            return Ok(StepResult::terminal(
                Lost,
                format!("Game already lost at ({row}, {col})"),
            ));
        }

        let obs = Observation::from_game(game);
        let deductions = deduce(&obs);

        let conflicts = deductions.conflicts();
        if !conflicts.is_empty() {
            log::warn!(
                "Clues disagree on {:?}, some flag is wrong, safe moves take precedence",
                conflicts
            );
        }

        if let Some(&deduction) = deductions.safe.first() {
            let outcome = game.reveal(deduction.coords)?;
            return Ok(Self::certain_result(deduction, outcome));
        }

        if let Some(&deduction) = deductions.mines.first() {
            game.toggle_flag(deduction.coords)?;
            let (row, col) = deduction.coords;
            let (clue_row, clue_col) = deduction.clue;
            return Ok(StepResult {
                kind: Flagged,
                position: Some(deduction.coords),
                justification: Some(deduction.justification),
                clue: Some(deduction.clue),
                probability: None,
                rationale: format!(
                    "Flagged ({row}, {col}), certainly a mine: {} around ({clue_row}, {clue_col})",
                    deduction.justification
                ),
            });
        }

        self.guess(game, &obs)
    }

    fn certain_result(deduction: Deduction, outcome: RevealOutcome) -> StepResult {
        let (row, col) = deduction.coords;
        let (clue_row, clue_col) = deduction.clue;
        let mut rationale = format!(
            "Revealed ({row}, {col}), it is safe: {} around ({clue_row}, {clue_col})",
            deduction.justification
        );
        let kind = if outcome == RevealOutcome::Mine {
            rationale.push_str(" (hit a mine, a flag was wrong)");
            StepKind::Lost
        } else {
            StepKind::Revealed
        };

        StepResult {
            kind,
            position: Some(deduction.coords),
            justification: Some(deduction.justification),
            clue: Some(deduction.clue),
            probability: None,
            rationale,
        }
    }

    fn guess(&mut self, game: &mut Game, obs: &Observation) -> Result<StepResult> {
        let candidates: Vec<Coord2> = obs.hidden_unflagged().collect();
        let Some(probability) = estimate_mine_probability(obs) else {
            return Ok(StepResult::terminal(
                StepKind::Stuck,
                String::from("No hidden unflagged cells left, no moves left"),
            ));
        };

        // the global ratio is the same for every candidate, so they all tie for the minimum
        let coords = candidates[self.rng.random_range(0..candidates.len())];
        let (row, col) = coords;
        let mut rationale = format!(
            "Revealed ({row}, {col}), {}: {:.2}% among {} candidates",
            Justification::MinimumProbability,
            probability * 100.0,
            candidates.len()
        );

        let kind = match game.reveal(coords)? {
            RevealOutcome::Mine => {
                rationale.push_str(" (hit a mine)");
                StepKind::Lost
            }
            _ => StepKind::Revealed,
        };

        Ok(StepResult {
            kind,
            position: Some(coords),
            justification: Some(Justification::MinimumProbability),
            clue: None,
            probability: Some(probability),
            rationale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn game(size: Coord2, mines: &[Coord2]) -> Game {
        Game::new(Board::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn won_game_stops_immediately() {
        let mut game = game((1, 1), &[]);
        game.reveal((0, 0)).unwrap();

        let result = Solver::new(0).step(&mut game).unwrap();

        assert_eq!(result.kind, StepKind::Won);
        assert!(result.kind.is_terminal());
        assert_eq!(result.position, None);
    }

    #[test]
    fn single_cell_game_is_won_in_one_guess() {
        let mut game = game((1, 1), &[]);
        let mut solver = Solver::new(0);

        let first = solver.step(&mut game).unwrap();
        assert_eq!(first.kind, StepKind::Revealed);
        assert_eq!(first.probability, Some(0.0));

        assert_eq!(solver.step(&mut game).unwrap().kind, StepKind::Won);
    }

    #[test]
    fn flags_lone_hidden_neighbor_of_a_one() {
        // M 1 1 M .
        let mut game = game((1, 5), &[(0, 0), (0, 3)]);
        game.reveal((0, 1)).unwrap();
        game.reveal((0, 2)).unwrap();
        let mut solver = Solver::new(0);

        let result = solver.step(&mut game).unwrap();

        assert_eq!(result.kind, StepKind::Flagged);
        assert_eq!(result.position, Some((0, 0)));
        assert_eq!(result.clue, Some((0, 1)));
        assert_eq!(result.justification, Some(Justification::CapacityExhausted));
        assert_eq!(game.cell_at((0, 0)), EngineCell::Flagged);
        assert!(result.rationale.contains("(0, 0)"));
        assert!(result.rationale.contains("all surrounding hidden cells must be mines"));
        assert_eq!(solver.last_rationale(), result.rationale);
    }

    #[test]
    fn plays_line_to_the_end() {
        // M 1 1 M .
        let mut game = game((1, 5), &[(0, 0), (0, 3)]);
        game.reveal((0, 1)).unwrap();
        game.reveal((0, 2)).unwrap();
        let mut steps = Vec::new();

        let last = Solver::new(0)
            .run(&mut game, |_, step| steps.push(step.clone()))
            .unwrap();

        let kinds: Vec<_> = steps.iter().map(|step| (step.kind, step.position)).collect();
        assert_eq!(
            kinds,
            vec![
                (StepKind::Flagged, Some((0, 0))),
                (StepKind::Flagged, Some((0, 3))),
                (StepKind::Revealed, Some((0, 4))),
                (StepKind::Won, None),
            ]
        );
        // both mines are flagged, so the last guess is certain to be safe
        assert_eq!(steps[2].probability, Some(0.0));
        assert_eq!(last.kind, StepKind::Won);
    }

    #[test]
    fn reveals_neighbors_of_satisfied_clue() {
        let mut game = game((1, 3), &[(0, 0)]);
        game.reveal((0, 1)).unwrap();
        game.toggle_flag((0, 0)).unwrap();

        let result = Solver::new(0).step(&mut game).unwrap();

        assert_eq!(result.kind, StepKind::Revealed);
        assert_eq!(result.position, Some((0, 2)));
        assert_eq!(result.justification, Some(Justification::FlagsSatisfied));
        assert!(result.rationale.contains("all surrounding mines already flagged"));
        assert!(game.is_won());
    }

    #[test]
    fn wrong_flag_surfaces_as_loss() {
        let mut game = game((1, 3), &[(0, 2)]);
        game.reveal((0, 1)).unwrap();
        game.toggle_flag((0, 0)).unwrap();

        let result = Solver::new(0).step(&mut game).unwrap();

        assert_eq!(result.kind, StepKind::Lost);
        assert_eq!(result.position, Some((0, 2)));
        assert_eq!(game.state(), GameState::Lost);
    }

    #[test]
    fn safe_moves_win_over_conflicting_mine_moves() {
        // truth: . 1 M 1, with the first cell wrongly flagged
        let mut game = game((1, 4), &[(0, 2)]);
        game.reveal((0, 1)).unwrap();
        game.reveal((0, 3)).unwrap();
        game.toggle_flag((0, 0)).unwrap();

        let result = Solver::new(0).step(&mut game).unwrap();

        assert_eq!(result.kind, StepKind::Lost);
        assert_eq!(result.justification, Some(Justification::FlagsSatisfied));
        assert_eq!(result.position, Some((0, 2)));
    }

    #[test]
    fn guess_reports_global_ratio() {
        for seed in 0..50 {
            let mut game = game((2, 5), &[(0, 0), (1, 4)]);

            let result = Solver::new(seed).step(&mut game).unwrap();

            assert_eq!(result.probability, Some(2.0 / 10.0));
            assert_eq!(result.justification, Some(Justification::MinimumProbability));
            assert!(matches!(result.kind, StepKind::Revealed | StepKind::Lost));
            assert!(result.rationale.contains("20.00%"));
        }
    }

    #[test]
    fn guesses_spread_across_tied_cells() {
        let mut picked = alloc::collections::BTreeSet::new();
        for seed in 0..64 {
            let mut game = game((2, 5), &[(0, 0), (1, 4)]);
            picked.insert(Solver::new(seed).step(&mut game).unwrap().position.unwrap());
        }

        assert!(picked.len() > 1);
    }

    #[test]
    fn over_flagged_guess_can_hit_a_mine() {
        // every safe cell is wrongly flagged, leaving only the mine as a candidate
        let mut game = game((2, 2), &[(0, 0)]);
        for pos in [(0, 1), (1, 0), (1, 1)] {
            game.toggle_flag(pos).unwrap();
        }

        let result = Solver::new(0).step(&mut game).unwrap();

        assert_eq!(result.kind, StepKind::Lost);
        assert_eq!(result.position, Some((0, 0)));
        assert_eq!(result.probability, Some(-2.0));
        assert!(result.rationale.ends_with("(hit a mine)"));
    }

    #[test]
    fn stuck_when_everything_left_is_flagged() {
        let mut game = game((1, 3), &[(0, 0)]);
        game.toggle_flag((0, 0)).unwrap();
        game.toggle_flag((0, 1)).unwrap();
        game.toggle_flag((0, 2)).unwrap();

        let result = Solver::new(0).step(&mut game).unwrap();

        assert_eq!(result.kind, StepKind::Stuck);
        assert!(result.kind.is_terminal());
        assert_eq!(game.flagged_count(), 3);
    }

    #[test]
    fn lost_game_is_reported_without_acting() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.reveal((0, 0)).unwrap();
        let before = game.clone();

        let result = Solver::new(0).step(&mut game).unwrap();

        assert_eq!(result.kind, StepKind::Lost);
        assert_eq!(game, before);
    }

    #[test]
    fn certain_moves_agree_with_ground_truth() {
        for seed in 0..200 {
            let mut game = Game::generate(GameConfig::new((9, 9), 10).unwrap(), seed);
            let board = game.board().clone();

            Solver::new(seed)
                .run(&mut game, |_, step| {
                    let (Some(pos), Some(justification)) = (step.position, step.justification)
                    else {
                        return;
                    };
                    match justification {
                        Justification::FlagsSatisfied => assert!(!board.contains_mine(pos)),
                        Justification::CapacityExhausted => assert!(board.contains_mine(pos)),
                        Justification::MinimumProbability => {}
                    }
                })
                .unwrap();

            // deduced flags are always right, so they never clash with a later reveal
            assert!(game.flagged_cells().all(|pos| board.contains_mine(pos)));
            assert!(matches!(game.state(), GameState::Won | GameState::Lost));
        }
    }

    #[test]
    fn same_seeds_replay_the_same_game() {
        let play = |seed| {
            let mut game = Game::generate(GameConfig::new((8, 10), 15).unwrap(), seed);
            let mut transcript = Vec::new();
            Solver::new(seed)
                .run(&mut game, |_, step| transcript.push(step.rationale.clone()))
                .unwrap();
            transcript
        };

        assert_eq!(play(11), play(11));
    }
}
