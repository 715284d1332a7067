//! Media handles and loaders
//!
//! A [`MediaHandle`] is the immutable description of a playable resource:
//! its identity, where it came from, and the clock that measures it. It is
//! created at load time and replaced as a whole when new media is loaded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::clock::ClockSource;
use crate::error::Result;

/// Opaque reference to a playable media resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaHandle {
    id: Uuid,
    source: Option<PathBuf>,
    channels: u16,
    clock: ClockSource,
}

impl MediaHandle {
    /// Audio media measured by a frame-accurate clock
    pub fn audio(total_frames: u64, sample_rate: u32, channels: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: None,
            channels,
            clock: ClockSource::frames(sample_rate, total_frames),
        }
    }

    /// Video (or any time-based) media measured on a timeline
    pub fn video(duration_secs: f64, timescale: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: None,
            channels: 2,
            clock: ClockSource::timeline(duration_secs, timescale),
        }
    }

    /// Attach the path this media was loaded from
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn clock(&self) -> &ClockSource {
        &self.clock
    }

    /// Total frames for audio media
    pub fn total_frames(&self) -> Option<u64> {
        match self.clock {
            ClockSource::FrameAccurate { total_frames, .. } => Some(total_frames),
            ClockSource::Timeline { .. } => None,
        }
    }

    /// Sample rate for audio media
    pub fn sample_rate(&self) -> Option<u32> {
        match self.clock {
            ClockSource::FrameAccurate { sample_rate, .. } => Some(sample_rate),
            ClockSource::Timeline { .. } => None,
        }
    }

    /// Timescale for timeline media
    pub fn timescale(&self) -> Option<u32> {
        match self.clock {
            ClockSource::Timeline { timescale, .. } => Some(timescale),
            ClockSource::FrameAccurate { .. } => None,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.clock.duration_secs()
    }
}

/// Produces media handles from a path
///
/// Implementations fail with `MediaNotFound` when nothing exists at the path
/// and `DecodeError` when the resource cannot be understood.
pub trait MediaLoader {
    fn load(&self, path: &Path) -> Result<MediaHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_handle_attributes() {
        let media = MediaHandle::audio(441_000, 44100, 2).with_source("sample.wav");
        assert_eq!(media.total_frames(), Some(441_000));
        assert_eq!(media.sample_rate(), Some(44100));
        assert_eq!(media.timescale(), None);
        assert_eq!(media.duration_secs(), 10.0);
        assert_eq!(media.source(), Some(Path::new("sample.wav")));
    }

    #[test]
    fn test_video_handle_attributes() {
        let media = MediaHandle::video(120.0, 600);
        assert_eq!(media.timescale(), Some(600));
        assert_eq!(media.total_frames(), None);
        assert_eq!(media.clock().duration_units(), 72_000);
    }

    #[test]
    fn test_each_handle_has_unique_id() {
        let a = MediaHandle::audio(10, 10, 1);
        let b = MediaHandle::audio(10, 10, 1);
        assert_ne!(a.id(), b.id());
    }
}
