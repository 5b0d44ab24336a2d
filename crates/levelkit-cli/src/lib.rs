//! levelkit command-line library
//!
//! Command definitions and handlers for the `levelkit` binary. Handlers write
//! to a caller supplied sink so they can be exercised without a terminal.

pub mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use levelkit_game::{Game, GameConfig};

/// Inspect the content of a Quake-family game installation
#[derive(Debug, Parser)]
#[command(
    name = "levelkit",
    version,
    author,
    about = "Inspect the content of a Quake-family game installation",
    long_about = "Mounts a game's content directories and package archives the way a level editor does and lets you list, extract, and parse what the editor would see."
)]
pub struct Cli {
    /// Game installation directory
    #[arg(short, long, env = "LEVELKIT_GAME_PATH", global = true)]
    pub game_path: Option<PathBuf>,

    /// Game configuration file (JSON)
    #[arg(short, long, env = "LEVELKIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Mod directory mounted above the default one; repeat in override order
    #[arg(short, long = "search-path", global = true)]
    pub search_paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a directory of the merged file system
    Ls {
        /// Directory to list
        #[arg(default_value = "")]
        dir: String,

        /// Include every descendant
        #[arg(short, long)]
        recursive: bool,
    },

    /// Extract a file from the merged file system
    Cat {
        /// File to extract
        path: String,

        /// Write to this file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse an entity model and summarize it
    Model {
        /// Model path (`.mdl`, `.md2` or `.bsp`)
        path: String,
    },

    /// List mod directories of the game
    Mods,

    /// Check the configured palette
    Palette,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON output
    Json,
}

impl Cli {
    /// Load the configuration and mount the game
    pub fn open_game(&self) -> Result<Game> {
        let config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("Failed to load game configuration {}", path.display()))?,
            None => quake_config(),
        };
        let game_path = self
            .game_path
            .clone()
            .context("No game path given; use --game-path or LEVELKIT_GAME_PATH")?;
        Game::with_search_paths(config, game_path, self.search_paths.clone())
            .context("Failed to mount game content")
    }
}

/// Configuration used when none is given: Quake with its standard layout
pub fn quake_config() -> GameConfig {
    GameConfig::new("Quake")
        .with_search_path("id1")
        .with_package_format("pak", "idpak")
        .with_palette("gfx/palette.lmp")
        .with_model_formats(["mdl", "md2", "bsp"])
}
