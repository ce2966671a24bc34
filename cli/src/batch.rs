use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use sweepbot_core::*;

/// Outcome counts over many games.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub games: u32,
    pub won: u32,
    pub lost: u32,
    pub stuck: u32,
    pub steps: u64,
    pub guesses: u64,
}

impl Summary {
    fn record(&mut self, last: &StepResult, steps: u64, guesses: u64) {
        self.games += 1;
        self.steps += steps;
        self.guesses += guesses;
        match last.kind {
            StepKind::Won => self.won += 1,
            StepKind::Lost => self.lost += 1,
            _ => self.stuck += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            f64::from(self.won) / f64::from(self.games)
        }
    }
}

/// Plays `games` games, game `i` using `seed + i` for both board and solver.
pub fn play_many(config: GameConfig, seed: u64, games: u32) -> Result<Summary> {
    let mut summary = Summary::default();

    for index in 0..games {
        let game_seed = seed.wrapping_add(index.into());
        let mut game = Game::generate(config, game_seed);
        let mut steps = 0;
        let mut guesses = 0;

        let last = Solver::new(game_seed).run(&mut game, |_, result| {
            steps += 1;
            if result.justification.is_some_and(|why| !why.is_certain()) {
                guesses += 1;
            }
        })?;
        log::debug!("game {} (seed {}): {:?} in {} steps", index, game_seed, last.kind, steps);

        summary.record(&last, steps, guesses);
    }

    Ok(summary)
}

pub fn run(out: &mut impl Write, config: GameConfig, seed: u64, games: u32, json: bool) -> Result<()> {
    let summary = play_many(config, seed, games)?;

    if json {
        serde_json::to_writer(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        let (rows, cols) = config.size;
        writeln!(
            out,
            "{} games on {rows}x{cols} with {} mines (seeds {seed}..):",
            summary.games, config.mines
        )?;
        writeln!(
            out,
            "  won {}, lost {}, stuck {} ({:.1}% win rate)",
            summary.won,
            summary.lost,
            summary.stuck,
            summary.win_rate() * 100.0
        )?;
        writeln!(
            out,
            "  {} steps, {} of them guesses",
            summary.steps, summary.guesses
        )?;
    }

    Ok(())
}
