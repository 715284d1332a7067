//! CLI Module
//!
//! Command-line interface for the mediaplay transport core.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Mediaplay - media transport and signal chain driver
#[derive(Parser, Debug)]
#[command(name = "mediaplay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print events and reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Player configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by the dry-run players
#[derive(Args, Debug, Clone)]
pub struct PlaybackArgs {
    /// Start at this fraction of the media (0.0 - 1.0)
    #[arg(long)]
    pub seek: Option<f64>,

    /// Playback rate (0.5 - 2.0)
    #[arg(long)]
    pub rate: Option<f32>,

    /// Stop after this many seconds of wall time
    #[arg(long = "max-secs")]
    pub max_secs: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what the loader reads from a WAV header
    #[command(name = "info")]
    Info {
        /// Path to the WAV file
        path: PathBuf,
    },

    /// Dry-run a WAV file against the wall clock, printing progress
    #[command(name = "play")]
    Play {
        /// Path to the WAV file
        path: PathBuf,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Dry-run a timeline clock without any file
    #[command(name = "simulate")]
    Simulate {
        /// Media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Timeline units per second
        #[arg(long, default_value_t = crate::engine::DEFAULT_TIMESCALE)]
        timescale: u32,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Render a WAV file through the equalizer and volume
    #[command(name = "process")]
    Process {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// Bass gain in dB
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        bass: f32,

        /// Mid gain in dB
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        mid: f32,

        /// Treble gain in dB
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        treble: f32,

        /// Master volume (0.0 - 1.0)
        #[arg(long, default_value_t = 1.0)]
        volume: f32,

        /// Output bit depth (16, 24 or 32 float)
        #[arg(long = "bit-depth", default_value_t = 16)]
        bit_depth: u16,
    },
}
