// src/main.rs
// Simulation entry point: plays a full automated match and logs each turn.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use tabellone::config::GameConfig;
use tabellone::game::Game;

#[derive(Parser)]
#[command(name = "tabellone-sim", about = "Runs an automated tombola match")]
struct Args {
    /// Number of automated players (overrides the config file)
    #[arg(short, long)]
    players: Option<usize>,

    /// Cards assigned to each player (overrides the config file)
    #[arg(short, long)]
    cards: Option<usize>,

    /// Seed for a reproducible match
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the final match state as JSON to this file
    #[arg(short, long)]
    dump: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = GameConfig::load_or_default();

    let players = args.players.unwrap_or(config.bot_players);
    let cards = args.cards.unwrap_or(config.cards_per_player);
    let seed = args.seed.or(config.seed);

    let mut game = match seed {
        Some(seed) => Game::seeded(seed),
        None => Game::new(),
    };
    for index in 1..=players {
        if let Err(e) = game.add_bot(&format!("bot{index}"), cards) {
            error!("cannot register bot{index}: {e}");
            return ExitCode::FAILURE;
        }
    }
    if let Err(e) = game.start() {
        error!("cannot start match {}: {e}", game.id());
        return ExitCode::FAILURE;
    }
    info!(
        "match {} started with {players} players, {cards} cards each",
        game.id()
    );

    loop {
        let turn = match game.run_turn() {
            Ok(turn) => turn,
            Err(e) => {
                error!("turn failed: {e}");
                return ExitCode::FAILURE;
            }
        };
        let snapshot = game.snapshot();
        info!(
            "drew {} ({}/{} numbers, {:.1}%)",
            turn.number_drawn, snapshot.drawn_count, snapshot.total_numbers, snapshot.progress_percent
        );
        for record in &turn.claims {
            if record.success {
                info!(
                    "{} takes the {} on card {:016X}",
                    record.player_name, record.claim.key.rank, record.claim.key.card_id
                );
            } else {
                info!(
                    "{} claims the {} too late",
                    record.player_name, record.claim.key.rank
                );
            }
        }
        if turn.match_finished {
            if turn.tombola_detected {
                info!("tombola!");
            } else {
                info!("pouch is empty, nobody made tombola");
            }
            break;
        }
    }

    let summary = game.summary();
    match &summary.winner {
        Some(winner) => info!(
            "winner: {winner} after {} draws, {} prizes awarded",
            summary.total_draws, summary.prizes_awarded
        ),
        None => info!(
            "no winner after {} draws, {} prizes awarded",
            summary.total_draws, summary.prizes_awarded
        ),
    }

    if let Some(path) = args.dump {
        match serde_json::to_string_pretty(&game.dump_state()) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    error!("cannot write {}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
                info!("match state dumped to {}", path.display());
            }
            Err(e) => {
                error!("cannot serialize match state: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
