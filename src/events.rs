//! Events emitted to the UI surface
//!
//! The core owns playback state; the UI only ever receives these
//! immutable values.

use serde::{Deserialize, Serialize};

use crate::engine::progress::ProgressUpdate;
use crate::engine::transport::TransportState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// New media finished loading
    DurationKnown { duration_secs: f64, duration_text: String },
    StateChanged { state: TransportState },
    PositionChanged(ProgressUpdate),
    /// Playback ran to the end of the media
    ReachedEnd,
    /// Bass, mid and treble gain labels
    BandGainsChanged { labels: [String; 3] },
    VolumeChanged { volume: f32 },
    RateChanged { rate: f32, label: String },
    /// A command failed; state is unchanged
    Error { code: String, message: String },
}

impl PlayerEvent {
    pub fn is_position(&self) -> bool {
        matches!(self, PlayerEvent::PositionChanged(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_event_tag() {
        let json = serde_json::to_value(PlayerEvent::StateChanged {
            state: TransportState::Playing,
        })
        .unwrap();
        assert_eq!(json["event"], "state_changed");
        assert_eq!(json["state"], "playing");

        let json = serde_json::to_value(PlayerEvent::ReachedEnd).unwrap();
        assert_eq!(json["event"], "reached_end");
    }

    #[test]
    fn test_position_event_flattens_update() {
        let event = PlayerEvent::PositionChanged(ProgressUpdate::cleared(90.0));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "position_changed");
        assert_eq!(json["duration_text"], "01:30");
        assert!(event.is_position());
    }
}
