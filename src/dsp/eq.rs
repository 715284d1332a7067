//! Three-band equalizer
//!
//! Fixed bass / mid / treble bands built from cascaded biquad filters.
//! Only band gains change at runtime; shape, frequency and bandwidth are
//! set once when the chain is built.

use super::params::clamp_band_gain;
use super::Effect;
use crate::engine::AudioBuffer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::f64::consts::{LN_2, PI};

/// Bandwidth of every band, in octaves
pub const DEFAULT_BANDWIDTH_OCTAVES: f32 = 1.0;

/// Filter shape of an EQ band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterShape {
    /// Boost/cut below the corner frequency
    LowShelf,
    /// Bell curve boost/cut around the center frequency
    Parametric,
    /// Boost/cut above the corner frequency
    HighShelf,
}

/// The three fixed bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Bass,
    Mid,
    Treble,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Bass, Band::Mid, Band::Treble];

    pub fn index(self) -> usize {
        match self {
            Band::Bass => 0,
            Band::Mid => 1,
            Band::Treble => 2,
        }
    }
}

/// Convert a bandwidth in octaves to a filter Q
///
/// `Q = 1 / (2 sinh(ln2 / 2 * bw))`; one octave gives Q ≈ 1.414.
#[inline]
pub fn bandwidth_to_q(octaves: f32) -> f64 {
    let bw = (octaves as f64).max(0.01);
    1.0 / (2.0 * (LN_2 / 2.0 * bw).sinh())
}

/// Biquad filter coefficients, normalized by a0
#[derive(Debug, Clone, Copy)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    const UNITY: BiquadCoeffs = BiquadCoeffs {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Audio EQ Cookbook (RBJ) coefficients
    fn calculate(shape: FilterShape, sample_rate: f64, frequency: f64, gain_db: f64, q: f64) -> Self {
        // Keep the corner below Nyquist; no band fits at very low rates
        let nyquist = sample_rate / 2.0 - 1.0;
        if nyquist < 20.0 {
            return Self::UNITY;
        }
        let freq = frequency.clamp(20.0, nyquist);

        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        let a = 10.0_f64.powf(gain_db / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match shape {
            FilterShape::Parametric => (
                1.0 + alpha * a,
                -2.0 * cos_w0,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_w0,
                1.0 - alpha / a,
            ),
            FilterShape::LowShelf => {
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    (a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                )
            }
            FilterShape::HighShelf => {
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    (a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                )
            }
        };

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Biquad history for one channel
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    /// Direct Form I
    #[inline]
    fn process(&mut self, input: f64, c: &BiquadCoeffs) -> f64 {
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

/// One equalizer band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualizerBand {
    pub filter_shape: FilterShape,
    /// Center or corner frequency in Hz
    pub center_frequency: f32,
    /// Width in octaves
    pub bandwidth: f32,
    /// Gain in dB, `[-12, 12]`
    pub gain_db: f32,
}

impl EqualizerBand {
    fn new(filter_shape: FilterShape, center_frequency: f32) -> Self {
        Self {
            filter_shape,
            center_frequency,
            bandwidth: DEFAULT_BANDWIDTH_OCTAVES,
            gain_db: 0.0,
        }
    }

    /// A band at 0 dB leaves the signal untouched
    pub fn is_bypass(&self) -> bool {
        self.gain_db.abs() < 0.01
    }
}

#[derive(Debug, Clone)]
struct BandFilter {
    coeffs: BiquadCoeffs,
    states: Vec<BiquadState>,
}

/// Bass, mid and treble bands in series
#[derive(Debug, Clone)]
pub struct ThreeBandEq {
    bands: [EqualizerBand; 3],
    filters: [BandFilter; 3],
    sample_rate: u32,
    enabled: bool,
    coeffs_dirty: bool,
}

impl ThreeBandEq {
    /// Bass low shelf at 100 Hz, mid parametric at 1 kHz, treble high shelf
    /// at 8 kHz; all flat
    pub fn new() -> Self {
        let filter = BandFilter {
            coeffs: BiquadCoeffs::UNITY,
            states: Vec::new(),
        };
        Self {
            bands: [
                EqualizerBand::new(FilterShape::LowShelf, 100.0),
                EqualizerBand::new(FilterShape::Parametric, 1000.0),
                EqualizerBand::new(FilterShape::HighShelf, 8000.0),
            ],
            filters: [filter.clone(), filter.clone(), filter],
            sample_rate: 48000,
            enabled: true,
            coeffs_dirty: true,
        }
    }

    /// Set one band's gain, clamped to `[-12, 12]` dB. Returns the stored value.
    pub fn set_gain(&mut self, band: Band, gain_db: f32) -> f32 {
        let gain_db = clamp_band_gain(gain_db);
        self.bands[band.index()].gain_db = gain_db;
        self.coeffs_dirty = true;
        gain_db
    }

    pub fn gain(&self, band: Band) -> f32 {
        self.bands[band.index()].gain_db
    }

    pub fn band(&self, band: Band) -> &EqualizerBand {
        &self.bands[band.index()]
    }

    pub fn bands(&self) -> &[EqualizerBand; 3] {
        &self.bands
    }

    fn update_coefficients(&mut self) {
        if !self.coeffs_dirty {
            return;
        }
        let sample_rate = self.sample_rate as f64;
        for (band, filter) in self.bands.iter().zip(self.filters.iter_mut()) {
            filter.coeffs = if band.is_bypass() {
                BiquadCoeffs::UNITY
            } else {
                BiquadCoeffs::calculate(
                    band.filter_shape,
                    sample_rate,
                    band.center_frequency as f64,
                    band.gain_db as f64,
                    bandwidth_to_q(band.bandwidth),
                )
            };
        }
        self.coeffs_dirty = false;
    }
}

impl Default for ThreeBandEq {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for ThreeBandEq {
    fn process(&mut self, buffer: &mut AudioBuffer) {
        if !self.enabled || self.bands.iter().all(EqualizerBand::is_bypass) {
            return;
        }
        if buffer.sample_rate != self.sample_rate {
            self.prepare(buffer.sample_rate);
        }
        self.update_coefficients();

        let num_channels = buffer.num_channels();
        for (band, filter) in self.bands.iter().zip(self.filters.iter_mut()) {
            if band.is_bypass() {
                continue;
            }
            filter.states.resize_with(num_channels, BiquadState::default);
            for (channel, state) in filter.states.iter_mut().enumerate().take(num_channels) {
                for sample in buffer.channel_mut(channel).iter_mut() {
                    *sample = state.process(*sample as f64, &filter.coeffs) as f32;
                }
            }
        }
    }

    fn prepare(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.coeffs_dirty = true;
        self.reset();
    }

    fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.states.iter_mut().for_each(|s| *s = BiquadState::default());
        }
    }

    fn effect_type(&self) -> &'static str {
        "three-band-eq"
    }

    fn display_name(&self) -> &'static str {
        "Equalizer"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn get_params(&self) -> Value {
        json!({
            "bands": self.bands,
            "enabled": self.enabled,
        })
    }
}
