//! Media Player
//!
//! The single entry point for a UI surface. Commands go in, events come
//! out. Transport commands are validated against the current state; signal
//! chain commands only ever clamp. No command error escapes: each one is
//! logged and reported as [`PlayerEvent::Error`] with state unchanged.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::dsp::{Band, SignalChainConfigurator};
use crate::engine::{
    AudioBuffer, MediaHandle, MediaLoader, ProgressUpdate, RenderEngine, TickOutcome, Transport,
    TransportState,
};
use crate::error::{MediaError, Result};
use crate::events::PlayerEvent;

/// A request from the UI surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Play,
    Pause,
    Stop,
    TogglePlayPause,
    /// Scrub to a fraction of the media, `[0, 1]`
    Seek { fraction: f64 },
    /// Relative seek in seconds; negative rewinds
    SeekBy { seconds: f64 },
    /// Seek back by the configured step
    Rewind,
    /// Seek forward by the configured step
    Forward,
    SetVolume { volume: f32 },
    SetBandGain { band: Band, gain_db: f32 },
    SetRate { rate: f32 },
}

/// Transport plus signal chain behind one command surface
#[derive(Debug)]
pub struct MediaPlayer<E: RenderEngine> {
    transport: Transport<E>,
    chain: SignalChainConfigurator,
    config: PlayerConfig,
    events: Vec<PlayerEvent>,
}

impl<E: RenderEngine> MediaPlayer<E> {
    /// Create a player with the given engine and configuration
    ///
    /// Initial volume, rate and band gains come from the config.
    pub fn new(engine: E, config: PlayerConfig) -> Self {
        let config = config.normalized();
        let mut chain = SignalChainConfigurator::new();
        for (band, gain) in Band::ALL.into_iter().zip(config.initial_band_gains) {
            chain.set_band_gain(band, gain);
        }
        chain.set_master_volume(config.initial_volume);
        let rate = chain.set_playback_rate(config.initial_rate);

        let mut transport = Transport::with_publish_interval(engine, config.publish_interval());
        transport.set_playback_rate(rate);

        Self {
            transport,
            chain,
            config,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Media
    // ========================================================================

    /// Load a media handle, replacing whatever was loaded
    pub fn load(&mut self, media: MediaHandle) -> Result<()> {
        let result = self.transport.load(media);
        self.collect();
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    /// Resolve `path` with `loader`, then load it
    pub fn open(&mut self, loader: &dyn MediaLoader, path: &std::path::Path) -> Result<()> {
        match loader.load(path) {
            Ok(media) => {
                info!("[PLAYER] Opening {}", path.display());
                self.load(media)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply one UI command
    ///
    /// Failures are reported through the event outbox, never returned.
    pub fn handle(&mut self, command: Command) {
        if let Err(e) = self.apply(command) {
            self.report(&e);
        }
        self.collect();
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Play => self.transport.play(),
            Command::Pause => self.transport.pause(),
            Command::Stop => {
                self.transport.stop();
                Ok(())
            }
            Command::TogglePlayPause => self.transport.toggle_play_pause(),
            Command::Seek { fraction } => self.transport.seek(fraction),
            Command::SeekBy { seconds } => self.transport.seek_by(seconds),
            Command::Rewind => self.transport.seek_by(-self.config.seek_step_secs),
            Command::Forward => self.transport.seek_by(self.config.seek_step_secs),
            Command::SetVolume { volume } => {
                let volume = self.chain.set_master_volume(volume);
                self.events.push(PlayerEvent::VolumeChanged { volume });
                Ok(())
            }
            Command::SetBandGain { band, gain_db } => {
                self.chain.set_band_gain(band, gain_db);
                self.events.push(PlayerEvent::BandGainsChanged {
                    labels: self.chain.band_gain_labels(),
                });
                Ok(())
            }
            Command::SetRate { rate } => {
                let rate = self.chain.set_playback_rate(rate);
                self.transport.set_playback_rate(rate);
                self.events.push(PlayerEvent::RateChanged {
                    rate: rate.value(),
                    label: rate.label(),
                });
                Ok(())
            }
        }
    }

    /// Deliver one publisher tick
    pub fn on_tick(&mut self) -> TickOutcome {
        let outcome = self.transport.tick();
        self.collect();
        outcome
    }

    /// Stop everything; later commands report `NoMediaLoaded`
    pub fn shutdown(&mut self) {
        self.transport.shutdown();
        self.collect();
        info!("[PLAYER] Shut down");
    }

    /// Render a buffer through the current EQ and volume settings
    pub fn process_audio(&mut self, buffer: &mut AudioBuffer) {
        self.chain.process(buffer);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Take every event queued since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.collect();
        std::mem::take(&mut self.events)
    }

    pub fn publisher_active(&self) -> bool {
        self.transport.publisher().is_active()
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn snapshot(&self) -> ProgressUpdate {
        self.transport.snapshot()
    }

    pub fn transport(&self) -> &Transport<E> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport<E> {
        &mut self.transport
    }

    pub fn chain(&self) -> &SignalChainConfigurator {
        &self.chain
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    fn collect(&mut self) {
        let pending = self.transport.drain_events();
        self.events.extend(pending);
    }

    fn report(&mut self, error: &MediaError) {
        warn!("[PLAYER] {} ({})", error, error.error_code());
        self.collect();
        self.events.push(PlayerEvent::Error {
            code: error.error_code().to_string(),
            message: error.to_string(),
        });
    }
}
