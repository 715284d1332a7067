//! Player configuration
//!
//! Loaded from JSON. Every field has a default, so a partial file is valid.
//! Out-of-range values are clamped by [`PlayerConfig::normalized`] rather
//! than rejected, matching how slider input is treated.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dsp::{clamp_band_gain, PlaybackRate, Volume};
use crate::engine::DEFAULT_RENDER_QUANTUM;
use crate::error::{MediaError, Result};

const MIN_PUBLISH_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Interval between progress updates while playing
    pub publish_interval_ms: u64,
    /// Step used by the rewind / forward controls
    pub seek_step_secs: f64,
    pub initial_volume: f32,
    pub initial_rate: f32,
    /// Bass, mid and treble gain in dB
    pub initial_band_gains: [f32; 3],
    /// Frames per render callback for the manual engine
    pub render_quantum: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            publish_interval_ms: 100,
            seek_step_secs: 5.0,
            initial_volume: 1.0,
            initial_rate: 1.0,
            initial_band_gains: [0.0; 3],
            render_quantum: DEFAULT_RENDER_QUANTUM,
        }
    }
}

impl PlayerConfig {
    /// Load from a JSON file and normalize
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MediaError::Config {
                reason: format!("config file not found: {}", path.display()),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let config: PlayerConfig = serde_json::from_reader(reader).map_err(|e| MediaError::Config {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(config.normalized())
    }

    /// Write as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Clamp every field into its valid range
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        self.publish_interval_ms = self.publish_interval_ms.max(MIN_PUBLISH_INTERVAL_MS);
        if !self.seek_step_secs.is_finite() || self.seek_step_secs <= 0.0 {
            self.seek_step_secs = defaults.seek_step_secs;
        }
        self.initial_volume = Volume::new(self.initial_volume).value();
        self.initial_rate = PlaybackRate::new(self.initial_rate).value();
        self.initial_band_gains = self.initial_band_gains.map(clamp_band_gain);
        self.render_quantum = self.render_quantum.max(1);
        self
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.publish_interval(), Duration::from_millis(100));
        assert_eq!(config.seek_step_secs, 5.0);
        assert_eq!(config.render_quantum, 512);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("player.json");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{ "publish_interval_ms": 250 }}"#).unwrap();

        let config = PlayerConfig::from_file(&path).unwrap();
        assert_eq!(
            config,
            PlayerConfig {
                publish_interval_ms: 250,
                ..PlayerConfig::default()
            }
        );
    }

    #[test]
    fn test_normalized_clamps() {
        let config = PlayerConfig {
            publish_interval_ms: 0,
            seek_step_secs: -1.0,
            initial_volume: 3.0,
            initial_rate: 0.1,
            initial_band_gains: [40.0, -40.0, 2.0],
            render_quantum: 0,
        }
        .normalized();

        assert_eq!(config.publish_interval_ms, 10);
        assert_eq!(config.seek_step_secs, 5.0);
        assert_eq!(config.initial_volume, 1.0);
        assert_eq!(config.initial_rate, 0.5);
        assert_eq!(config.initial_band_gains, [12.0, -12.0, 2.0]);
        assert_eq!(config.render_quantum, 1);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("player.json");
        let config = PlayerConfig {
            seek_step_secs: 10.0,
            ..PlayerConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(PlayerConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let dir = tempdir().unwrap();
        let missing = PlayerConfig::from_file(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.error_code(), "CONFIG_ERROR");

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let invalid = PlayerConfig::from_file(&path).unwrap_err();
        assert_eq!(invalid.error_code(), "CONFIG_ERROR");
    }
}
