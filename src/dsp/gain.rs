//! Master volume stage
//!
//! Linear output gain applied after the equalizer.

use super::params::Volume;
use super::Effect;
use crate::engine::{linear_to_db, AudioBuffer};
use serde_json::{json, Value};

/// Linear output volume in `[0, 1]`
///
/// # Example
/// ```
/// use mediaplay::dsp::MasterVolume;
/// use mediaplay::engine::generate_test_tone;
/// use mediaplay::dsp::Effect;
///
/// let mut volume = MasterVolume::new(0.5);
/// let mut buffer = generate_test_tone(440.0, 0.1, 48000);
/// let before = buffer.rms(0);
/// volume.process(&mut buffer);
/// assert!((buffer.rms(0) - before * 0.5).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct MasterVolume {
    volume: Volume,
    enabled: bool,
}

impl MasterVolume {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: Volume::new(volume),
            enabled: true,
        }
    }

    /// Set the volume, clamped to `[0, 1]`. Returns the stored value.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = Volume::new(volume);
        self.volume.value()
    }

    pub fn volume(&self) -> f32 {
        self.volume.value()
    }
}

impl Default for MasterVolume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Effect for MasterVolume {
    fn process(&mut self, buffer: &mut AudioBuffer) {
        if !self.enabled {
            return;
        }

        let gain = self.volume.value();
        // Unity gain optimization
        if (gain - 1.0).abs() < f32::EPSILON {
            return;
        }

        for channel in 0..buffer.num_channels() {
            for sample in buffer.channel_mut(channel).iter_mut() {
                *sample *= gain;
            }
        }
    }

    fn prepare(&mut self, _sample_rate: u32) {}

    fn reset(&mut self) {}

    fn effect_type(&self) -> &'static str {
        "master-volume"
    }

    fn display_name(&self) -> &'static str {
        "Volume"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn get_params(&self) -> Value {
        let db = linear_to_db(self.volume.value());
        json!({
            "volume": self.volume.value(),
            // JSON has no -inf; silence reports null
            "volume_db": db.is_finite().then_some(db),
            "enabled": self.enabled,
        })
    }
}
