mod cli;
mod display;
mod game;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use shakmaty::Chess;
use stockfish_analyzer::{Analyzer, Evaluator, position_from_fen};

use crate::{
    cli::Cli,
    display::{TerminalProgress, format_move_history, print_possible_moves, render_board},
    game::{Command, Game, parse_command},
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let config = cli.resolve();
    if let Some(path) = &cli.save_config {
        config
            .save(path)
            .with_context(|| format!("saving config to {}", path.display()))?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let start = match &cli.fen {
        Some(fen) => position_from_fen(fen).context("--fen")?,
        None => Chess::default(),
    };

    println!("Engine: {}", config.engine_path.display());
    let depth = config
        .eval_depth
        .map_or_else(|| "dynamic".to_string(), |d| d.to_string());
    println!(
        "Threads: {}, Hash: {}MB, Skill: {}, Depth: {depth}",
        config.threads, config.hash_size, config.skill_level
    );

    let mut analyzer = Analyzer::from_config(&config).context("starting analysis session")?;
    if let Some(name) = analyzer.engine().name() {
        println!("Engine ready: {name}");
    }
    let syzygy = config.syzygy_path.display();
    if analyzer.has_tablebase() {
        println!("Syzygy tablebases loaded from {syzygy}");
    } else {
        println!("Syzygy tablebases not available at {syzygy}, using the engine only");
    }

    let mut game = Game::new(start);
    let outcome = play(&mut game, &mut analyzer);
    let final_summary = analyzer.tablebase_summary(game.position());
    let closed = analyzer.close().context("shutting down engine");

    println!("{}\n", render_board(game.position()));
    if game.is_over() {
        println!("Game Over!");
    }
    println!("{}", format_move_history(game.history()));
    if game.is_over() {
        println!("{}", game.result_text());
    }
    if let Some(summary) = final_summary {
        println!("{summary}");
    }
    outcome.and(closed)
}

/// Run the self-play loop until the game ends or the user quits.
fn play<E: Evaluator>(game: &mut Game, analyzer: &mut Analyzer<E>) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'turns: while !game.is_over() {
        let pos = game.position().clone();
        println!("{}\n", render_board(&pos));
        if let Some(summary) = analyzer.tablebase_summary(&pos) {
            println!("{summary}");
        }

        let analysis = {
            let mut progress = TerminalProgress::new();
            analyzer.analyse(&pos, &mut progress)
        };
        let analysis = match analysis {
            Ok(analysis) => analysis,
            Err(err) if err.is_engine_failure() => {
                eprintln!("Error during evaluation: {err}");
                eprintln!("Engine is no longer usable, ending the game.");
                break 'turns;
            }
            Err(err) => return Err(err.into()),
        };
        print_possible_moves(&analysis.ranking);
        if let Some(n) = analysis.ranking.forced_mate() {
            println!("\nMate in {n}");
        }
        println!(
            "\nEvaluation time: {:.2} sec (depth {})\n",
            analysis.elapsed.as_secs_f64(),
            analysis.depth
        );

        loop {
            print!("Enter your move (UCI or SAN): ");
            io::stdout().flush()?;
            let Some(line) = lines.next().transpose()? else {
                break 'turns;
            };
            match parse_command(&pos, &line) {
                Ok(Command::Quit) => {
                    println!("Exiting game...");
                    break 'turns;
                }
                Ok(Command::Play(mv)) => {
                    game.play(mv);
                    break;
                }
                Err(err) => println!("{err}\n"),
            }
        }
    }
    Ok(())
}
