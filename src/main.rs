//! Mediaplay CLI
//!
//! Command-line driver for the media transport core.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use mediaplay::cli::{commands, Cli, Commands};
use mediaplay::config::PlayerConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Mediaplay v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => PlayerConfig::from_file(path)?,
        None => PlayerConfig::default(),
    };

    match cli.command {
        Some(cmd) => handle_command(cmd, config, cli.json),
        None => {
            println!("Mediaplay v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: PlayerConfig, json: bool) -> Result<()> {
    match cmd {
        Commands::Info { path } => commands::info(&path, json),
        Commands::Play { path, playback } => commands::play(&path, &playback, config, json),
        Commands::Simulate {
            duration,
            timescale,
            playback,
        } => commands::simulate(duration, timescale, &playback, config, json),
        Commands::Process {
            input,
            output,
            bass,
            mid,
            treble,
            volume,
            bit_depth,
        } => commands::process(&input, &output, [bass, mid, treble], volume, bit_depth, json),
    }
}
