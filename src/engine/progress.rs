//! Progress Publisher
//!
//! A periodic sampler that turns the transport's position into UI-ready
//! snapshots. It is active only while playing. Each activation is stamped
//! with a generation number ([`TickToken`]); cancelling bumps the generation
//! so any tick already in flight is recognised as stale and ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::clock::ClockSource;

/// Default interval between publish ticks
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(100);

/// Format seconds as `MM:SS`
///
/// Minutes are not wrapped at 60. Non-finite or negative input formats as
/// `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Immutable position snapshot handed to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub position_text: String,
    pub duration_text: String,
    pub slider_fraction: f64,
    pub position_secs: f64,
    pub duration_secs: f64,
}

impl ProgressUpdate {
    /// Snapshot of `position` on `clock`
    pub fn at(clock: &ClockSource, position: u64) -> Self {
        let position = clock.clamp(position);
        let position_secs = clock.to_seconds(position);
        let duration_secs = clock.duration_secs();
        Self {
            position_text: format_time(position_secs),
            duration_text: format_time(duration_secs),
            slider_fraction: clock.fraction(position),
            position_secs,
            duration_secs,
        }
    }

    /// Snapshot shown once playback reaches the end
    pub fn completed(clock: &ClockSource) -> Self {
        let mut update = Self::at(clock, clock.duration_units());
        update.position_text = update.duration_text.clone();
        update.slider_fraction = 1.0;
        update
    }

    /// Snapshot shown when nothing is loaded or after a hard reset
    pub fn cleared(duration_secs: f64) -> Self {
        Self {
            position_text: format_time(0.0),
            duration_text: format_time(duration_secs),
            slider_fraction: 0.0,
            position_secs: 0.0,
            duration_secs,
        }
    }
}

/// Identifies one publisher activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickToken(u64);

/// Result of delivering a tick to the transport
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The token was cancelled, or the transport was torn down
    Stale,
    /// A seek is in progress; nothing was read
    Suppressed,
    /// A position update was emitted
    Published(ProgressUpdate),
    /// Playback reached the end; the publisher has stopped
    Completed(ProgressUpdate),
}

/// Schedule state of the periodic sampler
#[derive(Debug, Clone)]
pub struct ProgressPublisher {
    interval: Duration,
    generation: u64,
    active: bool,
    alive: bool,
}

impl ProgressPublisher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            active: false,
            alive: true,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begin a new activation, invalidating any previous token
    ///
    /// Returns `None` after [`ProgressPublisher::invalidate`].
    pub fn start(&mut self) -> Option<TickToken> {
        if !self.alive {
            return None;
        }
        self.generation += 1;
        self.active = true;
        Some(TickToken(self.generation))
    }

    /// Cancel the current activation. Idempotent.
    pub fn cancel(&mut self) {
        if self.active {
            self.generation += 1;
            self.active = false;
        }
    }

    /// Permanently stop the publisher (transport teardown)
    pub fn invalidate(&mut self) {
        self.cancel();
        self.alive = false;
    }

    /// Token of the current activation, if any
    pub fn token(&self) -> Option<TickToken> {
        (self.alive && self.active).then_some(TickToken(self.generation))
    }

    pub fn is_active(&self) -> bool {
        self.token().is_some()
    }

    /// Check a tick against the current activation
    pub fn accepts(&self, token: TickToken) -> bool {
        self.token() == Some(token)
    }
}

impl Default for ProgressPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLISH_INTERVAL)
    }
}
