//! Command handlers

pub mod files;
pub mod game;
pub mod model;

use std::io::Write;

use anyhow::Result;
use levelkit_game::Game;
use serde::Serialize;

use crate::{Commands, OutputFormat};

/// Run `command` against `game`, writing results to `out`
pub fn handle(
    game: &Game,
    command: &Commands,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::Ls { dir, recursive } => files::handle_ls(game, dir, *recursive, format, out),
        Commands::Cat { path, output } => files::handle_cat(game, path, output.as_deref(), out),
        Commands::Model { path } => model::handle_model(game, path, format, out),
        Commands::Mods => game::handle_mods(game, format, out),
        Commands::Palette => game::handle_palette(game, format, out),
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
