//! Output signal chain
//!
//! Fixed order: equalizer, then master volume.

use super::{Effect, MasterVolume, ThreeBandEq};
use crate::engine::AudioBuffer;
use serde_json::Value;

/// Equalizer followed by master volume
#[derive(Debug, Clone, Default)]
pub struct SignalChain {
    eq: ThreeBandEq,
    volume: MasterVolume,
}

impl SignalChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare all stages for a sample rate
    pub fn prepare(&mut self, sample_rate: u32) {
        self.eq.prepare(sample_rate);
        self.volume.prepare(sample_rate);
    }

    /// Reset all stages
    pub fn reset(&mut self) {
        self.eq.reset();
        self.volume.reset();
    }

    /// Process a buffer through every stage in order
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        self.eq.process(buffer);
        self.volume.process(buffer);
    }

    pub fn eq(&self) -> &ThreeBandEq {
        &self.eq
    }

    pub fn eq_mut(&mut self) -> &mut ThreeBandEq {
        &mut self.eq
    }

    pub fn volume(&self) -> &MasterVolume {
        &self.volume
    }

    pub fn volume_mut(&mut self) -> &mut MasterVolume {
        &mut self.volume
    }

    /// Stages in processing order
    pub fn stages(&self) -> [&dyn Effect; 2] {
        [&self.eq as &dyn Effect, &self.volume]
    }

    /// Parameters of every stage, keyed by effect type
    pub fn get_params(&self) -> Value {
        let mut params = serde_json::Map::new();
        for stage in self.stages() {
            params.insert(stage.effect_type().to_string(), stage.get_params());
        }
        Value::Object(params)
    }
}
