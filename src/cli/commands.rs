//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::json;

use super::PlaybackArgs;
use crate::config::PlayerConfig;
use crate::control;
use crate::dsp::{Band, SignalChainConfigurator};
use crate::engine::{format_time, read_wav, write_wav, ClockedEngine, MediaHandle, MediaLoader, WavLoader};
use crate::events::PlayerEvent;
use crate::player::{Command, MediaPlayer};

/// Upper bound on a dry run's wall time
const MAX_DRY_RUN_SECS: f64 = 24.0 * 60.0 * 60.0;

/// Show the header of a WAV file as the loader sees it.
pub fn info(path: &Path, as_json: bool) -> Result<()> {
    let media = WavLoader.load(path)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&media)?);
        return Ok(());
    }

    println!("File:        {}", path.display());
    println!("Id:          {}", media.id());
    println!("Channels:    {}", media.channels());
    if let Some(sample_rate) = media.sample_rate() {
        println!("Sample rate: {} Hz", sample_rate);
    }
    if let Some(frames) = media.total_frames() {
        println!("Frames:      {}", frames);
    }
    println!("Duration:    {}", format_time(media.duration_secs()));
    Ok(())
}

/// Dry-run a WAV file on the wall-clock engine.
pub fn play(path: &Path, playback: &PlaybackArgs, config: PlayerConfig, as_json: bool) -> Result<()> {
    let media = WavLoader.load(path)?;
    info!("Playing {} ({})", path.display(), format_time(media.duration_secs()));
    run_dry(media, playback, config, as_json)
}

/// Dry-run a timeline clock of the given length.
pub fn simulate(
    duration_secs: f64,
    timescale: u32,
    playback: &PlaybackArgs,
    config: PlayerConfig,
    as_json: bool,
) -> Result<()> {
    anyhow::ensure!(
        duration_secs.is_finite() && duration_secs >= 0.0,
        "duration must be a non-negative number of seconds"
    );
    let media = MediaHandle::video(duration_secs, timescale);
    run_dry(media, playback, config, as_json)
}

fn run_dry(media: MediaHandle, playback: &PlaybackArgs, config: PlayerConfig, as_json: bool) -> Result<()> {
    let duration = media.duration_secs();
    let mut player = MediaPlayer::new(ClockedEngine::new(), config);
    player.load(media).context("failed to load media")?;

    let mut handle = control::spawn(player)?;
    if let Some(rate) = playback.rate {
        handle.send(Command::SetRate { rate })?;
    }
    if let Some(fraction) = playback.seek {
        handle.send(Command::Seek { fraction })?;
    }
    handle.send(Command::Play)?;

    // Wall-time budget: the media at the slowest rate, plus slack
    let budget = playback
        .max_secs
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(duration * 2.0 + 1.0)
        .min(MAX_DRY_RUN_SECS);
    let deadline = Instant::now() + Duration::from_secs_f64(budget);

    loop {
        let now = Instant::now();
        if now >= deadline {
            debug!("Wall-time budget exhausted");
            break;
        }
        let Ok(event) = handle.events().recv_timeout(deadline - now) else {
            break;
        };
        print_event(&event, as_json)?;
        if event == PlayerEvent::ReachedEnd {
            break;
        }
    }

    handle.shutdown();
    Ok(())
}

fn print_event(event: &PlayerEvent, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        PlayerEvent::PositionChanged(update) => println!(
            "{} / {}  [{:>5.1}%]",
            update.position_text,
            update.duration_text,
            update.slider_fraction * 100.0
        ),
        PlayerEvent::DurationKnown { duration_text, .. } => println!("Duration: {}", duration_text),
        PlayerEvent::StateChanged { state } => println!("State: {}", state),
        PlayerEvent::ReachedEnd => println!("Reached end"),
        PlayerEvent::RateChanged { label, .. } => println!("{}", label),
        PlayerEvent::VolumeChanged { volume } => println!("Volume: {:.2}", volume),
        PlayerEvent::BandGainsChanged { labels } => println!("EQ: {}", labels.join(" / ")),
        PlayerEvent::Error { code, message } => eprintln!("Error [{}]: {}", code, message),
    }
    Ok(())
}

/// Render a WAV file through the equalizer and volume.
pub fn process(
    input: &Path,
    output: &Path,
    gains: [f32; 3],
    volume: f32,
    bit_depth: u16,
    as_json: bool,
) -> Result<()> {
    let mut buffer = read_wav(input).with_context(|| format!("reading {}", input.display()))?;
    info!(
        "Processing {} ({} ch, {} Hz)",
        input.display(),
        buffer.num_channels(),
        buffer.sample_rate
    );

    let mut chain = SignalChainConfigurator::new();
    for (band, gain) in Band::ALL.into_iter().zip(gains) {
        chain.set_band_gain(band, gain);
    }
    chain.set_master_volume(volume);
    chain.chain_mut().prepare(buffer.sample_rate);
    chain.process(&mut buffer);

    anyhow::ensure!(buffer.is_finite(), "signal chain produced non-finite samples");
    write_wav(&buffer, output, bit_depth).with_context(|| format!("writing {}", output.display()))?;

    if as_json {
        let report = json!({
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "chain": chain.chain().get_params(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let labels = chain.band_gain_labels();
        println!("EQ: {}  Volume: {:.2}", labels.join(" / "), chain.master_volume());
        println!("Written: {}", output.display());
    }
    Ok(())
}
