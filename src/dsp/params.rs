//! Clamped UI parameters
//!
//! Slider and stepper inputs are clamped into range, never rejected.
//! NaN falls back to the parameter's default.

use serde::{Deserialize, Serialize};

pub const MIN_BAND_GAIN_DB: f32 = -12.0;
pub const MAX_BAND_GAIN_DB: f32 = 12.0;

pub const MIN_VOLUME: f32 = 0.0;
pub const MAX_VOLUME: f32 = 1.0;

pub const MIN_PLAYBACK_RATE: f32 = 0.5;
pub const MAX_PLAYBACK_RATE: f32 = 2.0;

/// Clamp `value` into `[min, max]`, mapping NaN to `fallback`
#[inline]
pub fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Clamp an equalizer band gain to `[-12, 12]` dB
#[inline]
pub fn clamp_band_gain(db: f32) -> f32 {
    clamp_or(db, MIN_BAND_GAIN_DB, MAX_BAND_GAIN_DB, 0.0)
}

/// Playback speed multiplier in `[0.5, 2.0]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackRate(f32);

impl PlaybackRate {
    pub const NORMAL: PlaybackRate = PlaybackRate(1.0);

    pub fn new(rate: f32) -> Self {
        Self(clamp_or(rate, MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Stepper label, e.g. `Speed x1.5`
    pub fn label(self) -> String {
        format!("Speed x{:.1}", self.0)
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Master output volume, linear in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f32);

impl Volume {
    pub const FULL: Volume = Volume(1.0);

    pub fn new(volume: f32) -> Self {
        Self(clamp_or(volume, MIN_VOLUME, MAX_VOLUME, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(99.0 => 12.0 ; "above range")]
    #[test_case(-99.0 => -12.0 ; "below range")]
    #[test_case(4.5 => 4.5 ; "in range")]
    #[test_case(f32::NAN => 0.0 ; "nan")]
    fn test_band_gain_clamp(db: f32) -> f32 {
        clamp_band_gain(db)
    }

    #[test_case(0.1 => 0.5 ; "too slow")]
    #[test_case(3.0 => 2.0 ; "too fast")]
    #[test_case(1.5 => 1.5 ; "in range")]
    #[test_case(f32::NAN => 1.0 ; "nan")]
    fn test_rate_clamp(rate: f32) -> f32 {
        PlaybackRate::new(rate).value()
    }

    #[test_case(-0.2 => 0.0 ; "negative")]
    #[test_case(1.7 => 1.0 ; "too loud")]
    #[test_case(0.25 => 0.25 ; "in range")]
    fn test_volume_clamp(volume: f32) -> f32 {
        Volume::new(volume).value()
    }

    #[test]
    fn test_rate_label() {
        assert_eq!(PlaybackRate::new(1.0).label(), "Speed x1.0");
        assert_eq!(PlaybackRate::new(0.5).label(), "Speed x0.5");
    }
}
