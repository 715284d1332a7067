//! Output Signal Chain
//!
//! Three-band equalizer and master volume, plus the clamped parameter types
//! the UI drives them with. All stages implement the `Effect` trait.

mod chain;
mod configurator;
mod effect;
mod eq;
mod gain;
mod params;

pub use chain::SignalChain;
pub use configurator::SignalChainConfigurator;
pub use effect::Effect;
pub use eq::{bandwidth_to_q, Band, EqualizerBand, FilterShape, ThreeBandEq, DEFAULT_BANDWIDTH_OCTAVES};
pub use gain::MasterVolume;
pub use params::{
    clamp_band_gain, clamp_or, PlaybackRate, Volume, MAX_BAND_GAIN_DB, MAX_PLAYBACK_RATE,
    MAX_VOLUME, MIN_BAND_GAIN_DB, MIN_PLAYBACK_RATE, MIN_VOLUME,
};
