//! Transport State Machine
//!
//! Owns the playback state, the canonical position and the anchor of the
//! current render segment. It is the only writer of position: the progress
//! publisher reads through [`Transport::publish_tick`], and the seek
//! controller goes through [`Transport::reposition`].
//!
//! State transitions:
//! - Idle --load--> Paused(0)
//! - Paused/Idle --play--> Playing
//! - Playing --pause--> Paused(at rendered position)
//! - Any --stop--> Idle(0)
//! - Any --seek--> Seeking --> Playing if it was playing, else Paused
//! - Playing --end of media--> Paused(at duration)

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::dsp::PlaybackRate;
use crate::engine::clock::ClockSource;
use crate::engine::media::MediaHandle;
use crate::engine::progress::{
    ProgressPublisher, ProgressUpdate, TickOutcome, TickToken, DEFAULT_PUBLISH_INTERVAL,
};
use crate::engine::render::RenderEngine;
use crate::error::{MediaError, Result};
use crate::events::PlayerEvent;

/// Transport states representing the current playback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// Nothing loaded, or reset by stop (initial state)
    #[default]
    Idle,
    /// Media is actively rendering
    Playing,
    /// Rendering halted at a known position
    Paused,
    /// A seek is re-anchoring the render segment
    Seeking,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Idle => write!(f, "Idle"),
            TransportState::Playing => write!(f, "Playing"),
            TransportState::Paused => write!(f, "Paused"),
            TransportState::Seeking => write!(f, "Seeking"),
        }
    }
}

/// Playback transport bound to one render engine
#[derive(Debug)]
pub struct Transport<E: RenderEngine> {
    engine: E,
    media: Option<MediaHandle>,
    state: TransportState,

    /// Canonical position in clock units; authoritative unless playing
    position: u64,

    /// Position at which the current render segment was scheduled
    anchor: u64,

    /// Rate captured for the next play, applied to the engine only while playing
    rate: PlaybackRate,

    publisher: ProgressPublisher,
    events: Vec<PlayerEvent>,
}

impl<E: RenderEngine> Transport<E> {
    /// Create an idle transport publishing every 100 ms
    ///
    /// # Example
    /// ```
    /// use mediaplay::engine::{ManualEngine, Transport, TransportState};
    /// let transport = Transport::new(ManualEngine::new());
    /// assert_eq!(transport.state(), TransportState::Idle);
    /// ```
    pub fn new(engine: E) -> Self {
        Self::with_publish_interval(engine, DEFAULT_PUBLISH_INTERVAL)
    }

    pub fn with_publish_interval(engine: E, interval: Duration) -> Self {
        Self {
            engine,
            media: None,
            state: TransportState::Idle,
            position: 0,
            anchor: 0,
            rate: PlaybackRate::NORMAL,
            publisher: ProgressPublisher::new(interval),
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Media
    // ========================================================================

    /// Replace the current media
    ///
    /// On engine failure the previous media is gone and the transport is Idle.
    pub fn load(&mut self, media: MediaHandle) -> Result<()> {
        self.engine.stop();
        self.publisher.cancel();
        self.position = 0;
        self.anchor = 0;
        self.media = None;

        if let Err(e) = self.engine.load(&media) {
            warn!("[TRANSPORT] Engine rejected media: {}", e);
            self.set_state(TransportState::Idle);
            return Err(e);
        }

        let clock = *media.clock();
        info!(
            "[TRANSPORT] Loaded media {} ({:.3}s)",
            media.id(),
            clock.duration_secs()
        );
        self.media = Some(media);
        self.set_state(TransportState::Paused);

        let update = ProgressUpdate::at(&clock, 0);
        self.emit(PlayerEvent::DurationKnown {
            duration_secs: update.duration_secs,
            duration_text: update.duration_text.clone(),
        });
        self.emit(PlayerEvent::PositionChanged(update));
        Ok(())
    }

    pub fn media(&self) -> Option<&MediaHandle> {
        self.media.as_ref()
    }

    pub fn clock(&self) -> Option<&ClockSource> {
        self.media.as_ref().map(|m| m.clock())
    }

    fn require_clock(&self) -> Result<ClockSource> {
        self.clock().copied().ok_or(MediaError::NoMediaLoaded)
    }

    // ========================================================================
    // Transport Controls
    // ========================================================================

    /// Start or resume playback from the current position
    ///
    /// Playback that already reached the end starts over from zero.
    pub fn play(&mut self) -> Result<()> {
        let clock = self.require_clock()?;

        if self.state == TransportState::Playing {
            debug!("[TRANSPORT] Already playing");
            return Ok(());
        }

        if !self.engine.is_running() {
            self.engine.start().map_err(|e| {
                warn!("[TRANSPORT] Engine start failed, staying {}: {}", self.state, e);
                e
            })?;
        }

        if clock.is_at_end(self.position) {
            self.position = 0;
        }

        self.anchor = self.position;
        self.engine.schedule_from_offset(self.anchor);
        self.engine.set_rate(self.rate.value());
        self.engine.play();
        self.set_state(TransportState::Playing);
        self.publisher.start();

        debug!(
            "[TRANSPORT] Play from {:.3}s at x{:.1}",
            clock.to_seconds(self.anchor),
            self.rate.value()
        );
        Ok(())
    }

    /// Pause playback at the rendered position
    ///
    /// No-op unless playing.
    pub fn pause(&mut self) -> Result<()> {
        let clock = self.require_clock()?;

        if self.state != TransportState::Playing {
            debug!("[TRANSPORT] Pause ignored while {}", self.state);
            return Ok(());
        }

        self.position = clock.position_from(self.anchor, self.engine.rendered_since_schedule());
        self.engine.pause();
        self.anchor = self.position;
        self.publisher.cancel();
        self.set_state(TransportState::Paused);

        debug!("[TRANSPORT] Paused at {:.3}s", clock.to_seconds(self.position));
        Ok(())
    }

    /// Halt playback and reset the position to zero
    ///
    /// Valid from any state. This is a hard reset, not pause-in-place.
    pub fn stop(&mut self) {
        self.engine.stop();
        self.publisher.cancel();
        self.position = 0;
        self.anchor = 0;
        self.set_state(TransportState::Idle);

        let duration_secs = self.clock().map(|c| c.duration_secs()).unwrap_or(0.0);
        self.emit(PlayerEvent::PositionChanged(ProgressUpdate::cleared(duration_secs)));
        debug!("[TRANSPORT] Stopped, position reset to 0");
    }

    /// Pause when playing, play otherwise
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.state == TransportState::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Change the playback rate
    ///
    /// Applied to the engine immediately only while playing; otherwise kept
    /// and applied by the next `play()`.
    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.rate = rate;
        if self.state == TransportState::Playing {
            self.engine.set_rate(rate.value());
        }
        debug!("[TRANSPORT] Rate set to x{:.1}", rate.value());
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.rate
    }

    /// Tear down: stop rendering and invalidate the publisher for good
    ///
    /// Media is released, so every later command reports `NoMediaLoaded`
    /// and every later tick is stale.
    pub fn shutdown(&mut self) {
        self.engine.stop();
        self.publisher.invalidate();
        self.media = None;
        self.position = 0;
        self.anchor = 0;
        self.set_state(TransportState::Idle);
        debug!("[TRANSPORT] Shut down");
    }

    // ========================================================================
    // Seek Support
    // ========================================================================

    /// Move playback to `target` (clock units) as one atomic step
    ///
    /// The transport sits in Seeking while the engine is rescheduled, so no
    /// publish tick can observe a half-updated anchor. Playing resumes from
    /// the target; any other state lands in Paused.
    pub(crate) fn reposition(&mut self, target: u64) -> Result<()> {
        let clock = self.require_clock()?;
        let target = clock.clamp(target);
        let prior = self.state;
        let resume = prior == TransportState::Playing;

        self.state = TransportState::Seeking;
        self.engine.schedule_from_offset(target);
        self.anchor = target;
        self.position = target;
        if resume {
            self.engine.set_rate(self.rate.value());
            self.engine.play();
        }

        let next = if resume {
            TransportState::Playing
        } else {
            TransportState::Paused
        };
        self.state = next;
        if prior != next {
            self.emit(PlayerEvent::StateChanged { state: next });
        }
        self.emit(PlayerEvent::PositionChanged(ProgressUpdate::at(&clock, target)));

        debug!(
            "[TRANSPORT] Seek to {:.3}s ({} -> {})",
            clock.to_seconds(target),
            prior,
            next
        );
        Ok(())
    }

    // ========================================================================
    // Progress Publishing
    // ========================================================================

    /// Deliver one publisher tick
    ///
    /// Stale tokens and ticks after teardown do nothing. While seeking the
    /// tick is suppressed without reading the clock.
    pub fn publish_tick(&mut self, token: TickToken) -> TickOutcome {
        if !self.publisher.accepts(token) {
            return TickOutcome::Stale;
        }
        match self.state {
            TransportState::Seeking => return TickOutcome::Suppressed,
            TransportState::Playing => {}
            TransportState::Idle | TransportState::Paused => return TickOutcome::Stale,
        }
        let Some(clock) = self.clock().copied() else {
            return TickOutcome::Stale;
        };

        let sampled = clock.position_from(self.anchor, self.engine.rendered_since_schedule());
        if clock.is_at_end(sampled) {
            return TickOutcome::Completed(self.finish_at_end(&clock));
        }

        let update = ProgressUpdate::at(&clock, sampled);
        self.emit(PlayerEvent::PositionChanged(update.clone()));
        TickOutcome::Published(update)
    }

    /// Deliver a tick for the current activation, if there is one
    pub fn tick(&mut self) -> TickOutcome {
        match self.publisher.token() {
            Some(token) => self.publish_tick(token),
            None => TickOutcome::Stale,
        }
    }

    /// Natural completion: Paused at full duration, publisher stopped
    fn finish_at_end(&mut self, clock: &ClockSource) -> ProgressUpdate {
        self.engine.pause();
        self.publisher.cancel();
        self.position = clock.duration_units();
        self.anchor = self.position;
        self.set_state(TransportState::Paused);

        let update = ProgressUpdate::completed(clock);
        self.emit(PlayerEvent::PositionChanged(update.clone()));
        self.emit(PlayerEvent::ReachedEnd);
        info!("[TRANSPORT] Reached end at {:.3}s", clock.duration_secs());
        update
    }

    pub fn publisher(&self) -> &ProgressPublisher {
        &self.publisher
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    /// Current position in clock units, clamped to the media duration
    pub fn position(&self) -> u64 {
        match (self.state, self.clock()) {
            (TransportState::Playing, Some(clock)) => {
                clock.position_from(self.anchor, self.engine.rendered_since_schedule())
            }
            (_, Some(clock)) => clock.clamp(self.position),
            (_, None) => 0,
        }
    }

    pub fn position_secs(&self) -> f64 {
        self.clock()
            .map(|clock| clock.to_seconds(self.position()))
            .unwrap_or(0.0)
    }

    /// Formatted snapshot of the current position
    pub fn snapshot(&self) -> ProgressUpdate {
        match self.clock() {
            Some(clock) => ProgressUpdate::at(clock, self.position()),
            None => ProgressUpdate::cleared(0.0),
        }
    }

    pub fn anchor(&self) -> u64 {
        self.anchor
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == TransportState::Paused
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransportState::Idle
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.events.push(event);
    }

    fn set_state(&mut self, state: TransportState) {
        if self.state != state {
            debug!("[TRANSPORT] {} -> {}", self.state, state);
            self.state = state;
            self.emit(PlayerEvent::StateChanged { state });
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
