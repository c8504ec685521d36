//! Mischief demo binary.
//!
//! Thin presentation layer over the game core: it generates the die
//! rolls, drives turns, and prints what happened. The core itself never
//! rolls dice or renders anything.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use mischief::{
    AvatarId, ChallengeOracle, GameController, GamePhase, Language, LlmOracle, OracleConfig,
    PlayerSetup, ScriptedOracle, SpaceOutcome,
};
use rand::Rng;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            players,
            language,
            oracle_config,
            offline,
        } => run_game(players, language, oracle_config, offline).await,
        Command::Board { language } => print_board(language),
    }
}

/// Parses a "name:age:avatar" triple into a setup entry.
fn parse_player(spec: &str) -> Result<PlayerSetup> {
    let mut parts = spec.splitn(3, ':');
    let name = parts
        .next()
        .context("missing player name")?
        .to_string();
    let age: u8 = parts
        .next()
        .with_context(|| format!("missing age in '{}'", spec))?
        .parse()
        .with_context(|| format!("bad age in '{}'", spec))?;
    let avatar = match parts.next() {
        Some(raw) => AvatarId::from_str(raw)
            .map_err(|_| anyhow::anyhow!("unknown avatar in '{}'", spec))?,
        None => bail!("missing avatar in '{}'", spec),
    };
    Ok(PlayerSetup::new(name, age, avatar))
}

/// Plays a full game, printing each turn.
async fn run_game(
    players: Vec<String>,
    language: Language,
    oracle_config: Option<std::path::PathBuf>,
    offline: bool,
) -> Result<()> {
    let setups = players
        .iter()
        .map(|spec| parse_player(spec))
        .collect::<Result<Vec<_>>>()?;

    let oracle: Box<dyn ChallengeOracle> = if offline {
        Box::new(ScriptedOracle::Fixed(
            language.fallback_request_failed().to_string(),
        ))
    } else {
        let config = match oracle_config {
            Some(path) => OracleConfig::from_file(&path)
                .with_context(|| format!("loading oracle config {}", path.display()))?,
            None => OracleConfig::default(),
        };
        Box::new(LlmOracle::from_env(config))
    };

    let mut session = GameController::new(language);
    session
        .start_game(setups)
        .context("player setup rejected")?;

    info!("Game started");
    let mut rng = rand::thread_rng();

    while session.phase() == GamePhase::Playing {
        let roll = rng.gen_range(1..=6);
        let report = session.play_turn(roll, oracle.as_ref()).await?;

        let name = match session.phase() {
            GamePhase::GameOver => session
                .winner()
                .map(|w| w.name.clone())
                .unwrap_or_default(),
            _ => session
                .engine()
                .and_then(|e| e.players().get(report.player))
                .map(|p| p.name.clone())
                .unwrap_or_default(),
        };

        println!("{} rolled a {} -> space {}", name, report.roll, report.position);
        match &report.outcome {
            SpaceOutcome::Challenge { text } => println!("  challenge: {}", text),
            SpaceOutcome::Effect { message, .. } => {
                println!("  {}", message.text(language));
            }
            SpaceOutcome::Finished { winner } => {
                println!("  {} wins!", winner.name);
            }
            SpaceOutcome::Quiet => {}
        }
        if report.roll_again {
            println!("  {} rolls again", name);
        }
    }

    Ok(())
}

/// Prints the board layout.
fn print_board(language: Language) -> Result<()> {
    let board = mischief::Board::standard();
    for index in 0..board.len() {
        let space = board.space_at(index)?;
        match space.card {
            Some(card) => println!(
                "{:>2} {:?}: {}",
                index,
                space.kind,
                card.message.text(language)
            ),
            None => println!("{:>2} {:?}", index, space.kind),
        }
    }
    Ok(())
}
