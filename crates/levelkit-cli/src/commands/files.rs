//! Browsing the merged file system

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use levelkit_game::Game;
use levelkit_vfs::{EntryKind, FileSystem, TypeMatcher, VfsPath};
use serde::Serialize;
use tracing::{debug, info};

use super::write_json;
use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct ListedEntry {
    path: String,
    directory: bool,
}

/// List `dir`, or everything below it when `recursive`
pub fn handle_ls(
    game: &Game,
    dir: &str,
    recursive: bool,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let fs = game.file_system();
    let dir = VfsPath::new(dir);

    let mut entries: Vec<ListedEntry> = if recursive {
        fs.find_items_recursively(&dir, &TypeMatcher::ALL)
            .with_context(|| format!("Failed to list {dir}"))?
            .into_iter()
            .map(|path| ListedEntry {
                directory: fs.directory_exists(&path),
                path: path.to_string(),
            })
            .collect()
    } else {
        fs.list_directory(&dir)
            .with_context(|| format!("Failed to list {dir}"))?
            .into_iter()
            .map(|entry| ListedEntry {
                path: entry.path.to_string(),
                directory: entry.kind == EntryKind::Directory,
            })
            .collect()
    };
    entries.sort_by_cached_key(|entry| entry.path.to_ascii_lowercase());
    debug!("Listed {} entries below {}", entries.len(), dir);

    match format {
        OutputFormat::Json => write_json(out, &entries),
        OutputFormat::Text => {
            for entry in &entries {
                let suffix = if entry.directory { "/" } else { "" };
                writeln!(out, "{}{suffix}", entry.path)?;
            }
            Ok(())
        }
    }
}

/// Copy a file out of the merged file system
pub fn handle_cat(
    game: &Game,
    path: &str,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let file = game
        .file_system()
        .open_file(&VfsPath::new(path))
        .with_context(|| format!("Failed to open {path}"))?;

    match output {
        Some(target) => {
            std::fs::write(target, &*file)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            info!("Wrote {} bytes to {}", file.len(), target.display());
        }
        None => out.write_all(&file)?,
    }
    Ok(())
}
