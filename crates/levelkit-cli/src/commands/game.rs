//! Game level queries

use std::io::Write;

use anyhow::{Context, Result};
use levelkit_game::Game;
use serde::Serialize;

use super::write_json;
use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct ModList<'a> {
    default: &'a str,
    mods: Vec<String>,
}

/// List the game's mod directories
pub fn handle_mods(game: &Game, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let mods = game
        .available_mods()
        .with_context(|| format!("Failed to list mods in {}", game.game_path().display()))?;

    match format {
        OutputFormat::Json => write_json(
            out,
            &ModList {
                default: game.default_mod(),
                mods,
            },
        ),
        OutputFormat::Text => {
            writeln!(out, "{} (default)", game.default_mod())?;
            for name in &mods {
                writeln!(out, "{name}")?;
            }
            Ok(())
        }
    }
}

#[derive(Debug, Serialize)]
struct PaletteReport<'a> {
    path: &'a str,
    colors: usize,
}

/// Load the configured palette
pub fn handle_palette(game: &Game, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let path = &game.config().textures.palette;
    let palette = game
        .load_texture_palette()
        .with_context(|| format!("Failed to load palette {path}"))?;
    let report = PaletteReport {
        path,
        colors: palette.len(),
    };

    match format {
        OutputFormat::Json => write_json(out, &report),
        OutputFormat::Text => {
            writeln!(out, "{}: {} colors", report.path, report.colors)?;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::quake_config;
    use levelkit_test_utils::{GameTree, gray_palette};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mods() {
        let tree = GameTree::new().unwrap();
        tree.dir("id1").unwrap();
        tree.dir("quoth").unwrap();
        let game = Game::new(quake_config(), tree.path()).unwrap();

        let mut out: Vec<u8> = Vec::new();
        handle_mods(&game, OutputFormat::Text, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id1 (default)\nquoth\n");
    }

    #[test]
    fn test_palette() {
        let tree = GameTree::new().unwrap();
        tree.file("id1/gfx/palette.lmp", &gray_palette()).unwrap();
        let game = Game::new(quake_config(), tree.path()).unwrap();

        let mut out: Vec<u8> = Vec::new();
        handle_palette(&game, OutputFormat::Json, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["colors"], 256);
    }

    #[test]
    fn test_short_palette() {
        let tree = GameTree::new().unwrap();
        tree.file("id1/gfx/palette.lmp", &[0u8; 767]).unwrap();
        let game = Game::new(quake_config(), tree.path()).unwrap();
        assert!(handle_palette(&game, OutputFormat::Text, &mut Vec::<u8>::new()).is_err());
    }
}
