//! Effect trait definition
//!
//! Stages of the output signal chain. Each processes an [`AudioBuffer`] in
//! place and reports its parameters as JSON for display.

use crate::engine::AudioBuffer;
use serde_json::Value;

/// Base trait for signal chain stages
pub trait Effect: Send + std::fmt::Debug {
    /// Process audio buffer in-place
    fn process(&mut self, buffer: &mut AudioBuffer);

    /// Prepare for a new sample rate
    fn prepare(&mut self, sample_rate: u32);

    /// Clear internal state such as filter history
    fn reset(&mut self);

    /// Effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Current parameters as JSON
    fn get_params(&self) -> Value;
}
