//! Clock Sources
//!
//! A clock source answers "how much of the media has played" in its own
//! native units: rendered sample frames for audio, timeline units at a fixed
//! timescale for video. The render engine only ever reports units rendered
//! since the last schedule, so absolute position is always
//! `anchor + rendered`, clamped to the media duration.

use serde::{Deserialize, Serialize};

/// Timescale used for timeline clocks when none is given (600 units/second)
pub const DEFAULT_TIMESCALE: u32 = 600;

/// Native position measure of a loaded media resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClockSource {
    /// Frame-accurate clock driven by rendered audio samples
    FrameAccurate { sample_rate: u32, total_frames: u64 },
    /// Continuous timeline position expressed at a timescale
    Timeline { timescale: u32, duration_units: u64 },
}

impl ClockSource {
    /// Frame-accurate clock for `total_frames` at `sample_rate`
    pub fn frames(sample_rate: u32, total_frames: u64) -> Self {
        ClockSource::FrameAccurate {
            sample_rate: sample_rate.max(1),
            total_frames,
        }
    }

    /// Timeline clock covering `duration_secs` at `timescale` units/second
    pub fn timeline(duration_secs: f64, timescale: u32) -> Self {
        let timescale = timescale.max(1);
        let duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        ClockSource::Timeline {
            timescale,
            duration_units: (duration_secs * timescale as f64).round() as u64,
        }
    }

    /// Native units per second of media
    pub fn units_per_second(&self) -> u32 {
        match *self {
            ClockSource::FrameAccurate { sample_rate, .. } => sample_rate,
            ClockSource::Timeline { timescale, .. } => timescale,
        }
    }

    /// Media duration in native units
    pub fn duration_units(&self) -> u64 {
        match *self {
            ClockSource::FrameAccurate { total_frames, .. } => total_frames,
            ClockSource::Timeline { duration_units, .. } => duration_units,
        }
    }

    /// Media duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.to_seconds(self.duration_units())
    }

    /// Convert native units to seconds
    pub fn to_seconds(&self, units: u64) -> f64 {
        units as f64 / self.units_per_second() as f64
    }

    /// Convert seconds to native units, clamped to `[0, duration]`
    pub fn units_at(&self, seconds: f64) -> u64 {
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        let units = (seconds * self.units_per_second() as f64).round();
        self.clamp(units as u64)
    }

    /// Clamp a position to `[0, duration]`
    pub fn clamp(&self, units: u64) -> u64 {
        units.min(self.duration_units())
    }

    /// Absolute position from an anchor and the units rendered since it
    pub fn position_from(&self, anchor: u64, rendered_since_anchor: u64) -> u64 {
        self.clamp(anchor.saturating_add(rendered_since_anchor))
    }

    /// Normalized `[0, 1]` progress for a position; zero-length media reports 0
    pub fn fraction(&self, units: u64) -> f64 {
        let duration = self.duration_units();
        if duration == 0 {
            return 0.0;
        }
        (self.clamp(units) as f64 / duration as f64).clamp(0.0, 1.0)
    }

    /// True once `units` has reached the end of the media
    pub fn is_at_end(&self, units: u64) -> bool {
        units >= self.duration_units()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_clock_conversion() {
        let clock = ClockSource::frames(48000, 48000 * 120);
        assert_eq!(clock.units_per_second(), 48000);
        assert_relative_eq!(clock.duration_secs(), 120.0);
        assert_eq!(clock.units_at(60.0), 48000 * 60);
        assert_relative_eq!(clock.to_seconds(24000), 0.5);
    }

    #[test]
    fn test_timeline_clock_conversion() {
        let clock = ClockSource::timeline(596.5, DEFAULT_TIMESCALE);
        assert_eq!(clock.duration_units(), 357_900);
        assert_relative_eq!(clock.duration_secs(), 596.5);
    }

    #[test]
    fn test_timeline_rejects_non_finite_duration() {
        let clock = ClockSource::timeline(f64::NAN, 600);
        assert_eq!(clock.duration_units(), 0);
        let clock = ClockSource::timeline(-3.0, 600);
        assert_eq!(clock.duration_units(), 0);
    }

    #[test]
    fn test_position_is_clamped_to_duration() {
        let clock = ClockSource::frames(44100, 1000);
        assert_eq!(clock.position_from(900, 50), 950);
        assert_eq!(clock.position_from(900, 500), 1000);
        assert_eq!(clock.position_from(u64::MAX, 1), 1000);
    }

    #[test]
    fn test_units_at_clamps_negative_and_overflow() {
        let clock = ClockSource::frames(100, 1000);
        assert_eq!(clock.units_at(-5.0), 0);
        assert_eq!(clock.units_at(f64::INFINITY), 0);
        assert_eq!(clock.units_at(50.0), 1000);
    }

    #[test]
    fn test_fraction() {
        let clock = ClockSource::frames(100, 1000);
        assert_relative_eq!(clock.fraction(250), 0.25);
        assert_relative_eq!(clock.fraction(5000), 1.0);

        let empty = ClockSource::frames(100, 0);
        assert_eq!(empty.fraction(0), 0.0);
        assert!(empty.is_at_end(0));
    }

    #[test]
    fn test_zero_rate_is_guarded() {
        let clock = ClockSource::frames(0, 10);
        assert_eq!(clock.units_per_second(), 1);
    }
}
