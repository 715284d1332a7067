//! Signal Chain Configurator
//!
//! Applies UI slider values to the signal chain. Inputs are clamped, never
//! rejected, and nothing here touches transport state. Playback rate is only
//! clamped and labelled here; the transport decides when the engine sees it.

use log::debug;

use super::eq::Band;
use super::params::PlaybackRate;
use super::SignalChain;
use crate::engine::AudioBuffer;

/// Owner of the output chain's user-facing parameters
#[derive(Debug, Clone, Default)]
pub struct SignalChainConfigurator {
    chain: SignalChain,
    rate: PlaybackRate,
}

impl SignalChainConfigurator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a band gain, clamped to `[-12, 12]` dB. Returns the stored value.
    pub fn set_band_gain(&mut self, band: Band, gain_db: f32) -> f32 {
        let stored = self.chain.eq_mut().set_gain(band, gain_db);
        debug!("[CHAIN] {:?} gain {:.1} dB", band, stored);
        stored
    }

    pub fn band_gain(&self, band: Band) -> f32 {
        self.chain.eq().gain(band)
    }

    /// Set the master volume, clamped to `[0, 1]`. Returns the stored value.
    pub fn set_master_volume(&mut self, volume: f32) -> f32 {
        let stored = self.chain.volume_mut().set_volume(volume);
        debug!("[CHAIN] Volume {:.2}", stored);
        stored
    }

    pub fn master_volume(&self) -> f32 {
        self.chain.volume().volume()
    }

    /// Clamp a playback rate to `[0.5, 2.0]` and remember it
    pub fn set_playback_rate(&mut self, rate: f32) -> PlaybackRate {
        self.rate = PlaybackRate::new(rate);
        self.rate
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.rate
    }

    /// Gain labels for bass, mid and treble, e.g. `"-3.5 dB"`
    pub fn band_gain_labels(&self) -> [String; 3] {
        Band::ALL.map(|band| format!("{:.1} dB", self.band_gain(band)))
    }

    /// Render a buffer through the chain
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        self.chain.process(buffer);
    }

    pub fn chain(&self) -> &SignalChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut SignalChain {
        &mut self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_band_gain_round_trip_and_labels() {
        let mut config = SignalChainConfigurator::new();
        assert_eq!(config.set_band_gain(Band::Bass, 99.0), 12.0);
        assert_eq!(config.set_band_gain(Band::Mid, -3.5), -3.5);
        assert_eq!(config.set_band_gain(Band::Treble, -99.0), -12.0);

        assert_eq!(
            config.band_gain_labels(),
            ["12.0 dB".to_string(), "-3.5 dB".to_string(), "-12.0 dB".to_string()]
        );
    }

    #[test]
    fn test_default_labels_are_flat() {
        let config = SignalChainConfigurator::new();
        assert_eq!(config.band_gain_labels(), ["0.0 dB", "0.0 dB", "0.0 dB"].map(String::from));
    }

    #[test]
    fn test_rate_and_volume_clamp() {
        let mut config = SignalChainConfigurator::new();
        assert_eq!(config.set_playback_rate(4.0).value(), 2.0);
        assert_eq!(config.playback_rate().label(), "Speed x2.0");
        assert_eq!(config.set_master_volume(2.0), 1.0);
        assert_eq!(config.master_volume(), 1.0);
    }
}
