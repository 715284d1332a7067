//! Seek Controller
//!
//! Converts a scrub gesture or a relative step into a target position and
//! re-anchors the transport there. Both clock variants go through the same
//! path; only the unit conversion differs.

use log::debug;

use crate::engine::clock::ClockSource;
use crate::engine::render::RenderEngine;
use crate::engine::transport::Transport;
use crate::error::{MediaError, Result};

/// Clamp a scrub fraction to `[0, 1]`; NaN maps to 0
#[inline]
pub fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Target position for a scrub fraction: `round(f * duration)`
pub fn scrub_target(clock: &ClockSource, fraction: f64) -> u64 {
    let fraction = clamp_fraction(fraction);
    let target = (fraction * clock.duration_units() as f64).round() as u64;
    clock.clamp(target)
}

/// Target position `seconds` away from `from`, clamped to the media
pub fn step_target(clock: &ClockSource, from: u64, seconds: f64) -> u64 {
    if !seconds.is_finite() {
        return clock.clamp(from);
    }
    let delta = (seconds.abs() * clock.units_per_second() as f64).round() as u64;
    if seconds < 0.0 {
        from.saturating_sub(delta)
    } else {
        clock.clamp(from.saturating_add(delta))
    }
}

impl<E: RenderEngine> Transport<E> {
    /// Jump to a scrub fraction of the media
    ///
    /// Playing media keeps playing from the target; otherwise the transport
    /// ends up Paused there. Zero-length media ignores the seek.
    ///
    /// # Example
    /// ```
    /// use mediaplay::engine::{ManualEngine, MediaHandle, Transport};
    /// let mut transport = Transport::new(ManualEngine::new());
    /// transport.load(MediaHandle::video(120.0, 600)).unwrap();
    /// transport.seek(0.5).unwrap();
    /// assert_eq!(transport.position_secs(), 60.0);
    /// ```
    pub fn seek(&mut self, fraction: f64) -> Result<()> {
        let clock = self.clock().copied().ok_or(MediaError::NoMediaLoaded)?;
        if clock.duration_units() == 0 {
            debug!("[SEEK] Ignored on zero-length media");
            return Ok(());
        }
        self.reposition(scrub_target(&clock, fraction))
    }

    /// Move forward (positive) or back (negative) from the live position
    pub fn seek_by(&mut self, seconds: f64) -> Result<()> {
        let clock = self.clock().copied().ok_or(MediaError::NoMediaLoaded)?;
        if clock.duration_units() == 0 {
            return Ok(());
        }
        let target = step_target(&clock, self.position(), seconds);
        self.reposition(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::media::MediaHandle;
    use crate::engine::progress::TickOutcome;
    use crate::engine::render::{ManualEngine, RenderHandle};
    use crate::engine::transport::TransportState;
    use crate::events::PlayerEvent;
    use approx::assert_relative_eq;
    use std::time::Duration;

    const RATE: u32 = 48000;

    fn loaded(seconds: u64) -> (Transport<ManualEngine>, RenderHandle) {
        let engine = ManualEngine::with_quantum(480);
        let handle = engine.render_handle();
        let mut transport = Transport::new(engine);
        transport
            .load(MediaHandle::audio(seconds * RATE as u64, RATE, 2))
            .unwrap();
        transport.drain_events();
        (transport, handle)
    }

    #[test]
    fn test_clamp_fraction() {
        assert_eq!(clamp_fraction(-0.5), 0.0);
        assert_eq!(clamp_fraction(1.5), 1.0);
        assert_eq!(clamp_fraction(f64::NAN), 0.0);
        assert_eq!(clamp_fraction(0.25), 0.25);
    }

    #[test]
    fn test_scrub_target_rounds() {
        let clock = ClockSource::frames(10, 3);
        assert_eq!(scrub_target(&clock, 0.5), 2);
        assert_eq!(scrub_target(&clock, 2.0), 3);
    }

    #[test]
    fn test_step_target_clamps_both_ends() {
        let clock = ClockSource::timeline(10.0, 600);
        assert_eq!(step_target(&clock, 600, -5.0), 0);
        assert_eq!(step_target(&clock, 5400, 5.0), 6000);
        assert_eq!(step_target(&clock, 600, 5.0), 3600);
        assert_eq!(step_target(&clock, 600, f64::NAN), 600);
    }

    #[test]
    fn test_seek_while_paused_stays_paused() {
        let (mut transport, handle) = loaded(120);
        transport.seek(0.5).unwrap();

        assert_eq!(transport.state(), TransportState::Paused);
        assert_eq!(transport.position(), 60 * RATE as u64);
        assert_eq!(transport.anchor(), 60 * RATE as u64);
        assert!(!handle.is_rendering());
    }

    #[test]
    fn test_seek_while_playing_keeps_playing() {
        let (mut transport, handle) = loaded(120);
        transport.play().unwrap();
        handle.render(RATE as u64 * 10);

        transport.seek(0.25).unwrap();
        assert!(transport.is_playing());
        assert!(handle.is_rendering());
        assert_eq!(handle.rendered(), 0);
        assert_eq!(transport.position(), 30 * RATE as u64);
    }

    #[test]
    fn test_seek_then_play_then_tick() {
        let (mut transport, handle) = loaded(120);
        transport.seek(0.5).unwrap();
        transport.play().unwrap();
        handle.render_for(Duration::from_millis(100));

        match transport.tick() {
            TickOutcome::Published(update) => {
                assert_relative_eq!(update.position_secs, 60.1);
                assert_relative_eq!(update.slider_fraction, 60.1 / 120.0);
                assert_eq!(update.position_text, "01:00");
            }
            other => panic!("expected a published update, got {:?}", other),
        }
    }

    #[test]
    fn test_seek_past_end_equals_seek_to_end() {
        let (mut a, _ha) = loaded(30);
        let (mut b, _hb) = loaded(30);
        a.seek(1.5).unwrap();
        b.seek(1.0).unwrap();
        assert_eq!(a.position(), b.position());
        assert_eq!(a.position(), 30 * RATE as u64);
    }

    #[test]
    fn test_seek_to_end_while_playing_completes_on_next_tick() {
        let (mut transport, _handle) = loaded(30);
        transport.play().unwrap();
        transport.seek(1.0).unwrap();

        assert!(matches!(transport.tick(), TickOutcome::Completed(_)));
        assert!(transport.is_paused());
        assert_eq!(transport.position(), 30 * RATE as u64);
    }

    #[test]
    fn test_seek_without_media_fails() {
        let mut transport = Transport::new(ManualEngine::new());
        assert!(matches!(transport.seek(0.5), Err(MediaError::NoMediaLoaded)));
        assert!(matches!(transport.seek_by(5.0), Err(MediaError::NoMediaLoaded)));
    }

    #[test]
    fn test_seek_on_zero_length_media_is_ignored() {
        let mut transport = Transport::new(ManualEngine::new());
        transport.load(MediaHandle::video(0.0, 600)).unwrap();
        transport.drain_events();

        transport.seek(0.7).unwrap();
        assert_eq!(transport.position(), 0);
        assert!(transport.drain_events().is_empty());
    }

    #[test]
    fn test_seek_emits_one_position_update_and_no_seeking_state() {
        let (mut transport, _handle) = loaded(60);
        transport.play().unwrap();
        transport.drain_events();

        transport.seek(0.5).unwrap();
        let events = transport.drain_events();
        assert_eq!(events.iter().filter(|e| e.is_position()).count(), 1);
        assert!(!events.contains(&PlayerEvent::StateChanged {
            state: TransportState::Seeking
        }));
    }

    #[test]
    fn test_seek_from_idle_lands_paused() {
        let (mut transport, _handle) = loaded(60);
        transport.stop();
        transport.seek(0.5).unwrap();
        assert_eq!(transport.state(), TransportState::Paused);
    }

    #[test]
    fn test_seek_by_uses_live_position() {
        let (mut transport, handle) = loaded(60);
        transport.play().unwrap();
        handle.render(RATE as u64 * 10);

        transport.seek_by(5.0).unwrap();
        assert_eq!(transport.position(), 15 * RATE as u64);

        transport.seek_by(-30.0).unwrap();
        assert_eq!(transport.position(), 0);
        assert!(transport.is_playing());
    }
}
