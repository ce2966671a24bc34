use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use sweepbot_core::*;

mod batch;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Watch a deductive solver play Minesweeper", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board height
    #[arg(short, long, default_value_t = 8)]
    rows: Coord,

    /// Board width
    #[arg(short, long, default_value_t = 10)]
    cols: Coord,

    /// Number of mines, must leave at least one safe cell
    #[arg(short, long, default_value_t = 15)]
    mines: CellCount,

    /// Force a seed instead of random, used for both the board and the solver
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pause between solver steps
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    /// Play this many games without pausing and print a summary
    #[arg(short, long)]
    games: Option<u32>,

    /// Print one JSON object per line instead of text
    #[arg(long)]
    json: bool,

    /// Print where the mines are before playing
    #[arg(long)]
    show_board: bool,
}

#[derive(Serialize)]
struct StepRecord<'a> {
    step: usize,
    #[serde(flatten)]
    result: &'a StepResult,
    mines_remaining: isize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed: {}", seed);

    let config = GameConfig::new((args.rows, args.cols), args.mines)
        .context("Could not start a game")?;

    let mut out = io::stdout().lock();
    match args.games {
        Some(games) => batch::run(&mut out, config, seed, games, args.json),
        None => play(&mut out, &args, config, seed),
    }
}

fn play(out: &mut impl Write, args: &Args, config: GameConfig, seed: u64) -> Result<()> {
    let mut game = Game::generate(config, seed);
    if args.show_board && !args.json {
        writeln!(out, "Board (debug):\n{}", render::ground_truth(game.board()))?;
    }

    let mut solver = Solver::new(seed);
    let delay = Duration::from_millis(args.delay_ms);
    let started = Instant::now();

    let mut step = 0;
    loop {
        step += 1;
        let result = solver.step(&mut game)?;

        if args.json {
            let record = StepRecord {
                step,
                result: &result,
                mines_remaining: game.mines_remaining(),
            };
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        } else {
            writeln!(out, "Step {step}: {}", result.rationale)?;
            writeln!(out, "{}", render::visible(&game))?;
            writeln!(out, "{}\n", render::status(&game, started.elapsed()))?;
        }
        out.flush()?;

        // a winning reveal ends the game without waiting for another step
        if result.kind.is_terminal() || game.is_finished() {
            break;
        }
        thread::sleep(delay);
    }

    if args.json {
        serde_json::to_writer(&mut *out, &Observation::from_game(&game))?;
        writeln!(out)?;
    } else {
        let verdict = match game.state() {
            GameState::Won => "Solver won!",
            GameState::Lost => "Solver hit a mine, game over.",
            GameState::InProgress => "No safe moves left.",
        };
        writeln!(out, "{verdict} ({step} steps, seed {seed})")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_to_string(argv: &[&str]) -> String {
        let args = Args::parse_from(argv);
        let config = GameConfig::new((args.rows, args.cols), args.mines).unwrap();
        let mut out = Vec::new();
        play(&mut out, &args, config, args.seed.unwrap()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn winning_reveal_ends_the_game() {
        let text = play_to_string(&[
            "sweepbot", "-r", "3", "-c", "3", "-m", "0", "-s", "1", "--delay-ms", "0",
        ]);

        assert_eq!(text.matches("Step ").count(), 1);
        assert!(text.trim_end().ends_with("Solver won! (1 steps, seed 1)"));
    }

    #[test]
    fn json_mode_prints_steps_then_final_view() {
        let text = play_to_string(&[
            "sweepbot", "-r", "3", "-c", "3", "-m", "0", "-s", "1", "--delay-ms", "0", "--json",
        ]);

        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["step"], 1);
        assert_eq!(lines[0]["kind"], "Revealed");
        assert_eq!(lines[0]["mines_remaining"], 0);
        assert_eq!(lines[1]["mine_count"], 0);
    }
}
