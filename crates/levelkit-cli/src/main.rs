use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use levelkit_cli::{Cli, commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over -v
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let game = cli.open_game()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::handle(&game, &cli.command, cli.format, &mut out)?;
    out.flush()?;
    Ok(())
}
