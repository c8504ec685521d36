//! Command-line interface for the mischief demo binary.

use clap::{Parser, Subcommand};
use mischief::Language;

/// Mischief - board-path party game with LLM-generated challenges
#[derive(Parser, Debug)]
#[command(name = "mischief")]
#[command(about = "Turn-based board-path party game core", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a full game in the terminal with random die rolls
    Play {
        /// Players as name:age:avatar triples (2 to 6 entries)
        #[arg(short, long, value_delimiter = ',')]
        players: Vec<String>,

        /// Language for messages and challenges
        #[arg(short, long, default_value = "en")]
        language: Language,

        /// Path to an oracle config TOML file
        #[arg(long)]
        oracle_config: Option<std::path::PathBuf>,

        /// Skip the LLM oracle and use scripted challenge text
        #[arg(long)]
        offline: bool,
    },

    /// Print the board layout with its bound effects
    Board {
        /// Language for effect messages
        #[arg(short, long, default_value = "en")]
        language: Language,
    },
}
