//! Integration Tests
//!
//! End-to-end tests for the transport, seek and publish path, driven through
//! the player command surface with a manually clocked engine.

use std::time::Duration;

use approx::assert_relative_eq;
use test_case::test_case;

use mediaplay::engine::{ManualEngine, MediaHandle, RenderHandle, TickOutcome, TransportState};
use mediaplay::{Command, MediaPlayer, PlayerConfig, PlayerEvent};

const SAMPLE_RATE: u32 = 48000;
const QUANTUM: u64 = 512;
const TICK: Duration = Duration::from_millis(100);

/// Helper to build a player with one audio file of `seconds` loaded
fn audio_player(seconds: u64) -> (MediaPlayer<ManualEngine>, RenderHandle) {
    let engine = ManualEngine::with_quantum(QUANTUM);
    let handle = engine.render_handle();
    let mut player = MediaPlayer::new(engine, PlayerConfig::default());
    player
        .load(MediaHandle::audio(seconds * SAMPLE_RATE as u64, SAMPLE_RATE, 2))
        .unwrap();
    player.drain_events();
    (player, handle)
}

/// Helper to build a player with a timeline clock of `seconds` loaded
fn video_player(seconds: f64) -> (MediaPlayer<ManualEngine>, RenderHandle) {
    let engine = ManualEngine::new();
    let handle = engine.render_handle();
    let mut player = MediaPlayer::new(engine, PlayerConfig::default());
    player.load(MediaHandle::video(seconds, 600)).unwrap();
    player.drain_events();
    (player, handle)
}

/// One publisher period: render for 100 ms, then tick
fn step(player: &mut MediaPlayer<ManualEngine>, handle: &RenderHandle) -> TickOutcome {
    handle.render_for(TICK);
    player.on_tick()
}

// === Seek Scenarios ===

#[test]
fn test_seek_half_then_play_one_tick() {
    let (mut player, handle) = audio_player(120);

    player.handle(Command::Seek { fraction: 0.5 });
    assert_relative_eq!(player.transport().position_secs(), 60.0);

    player.handle(Command::Play);
    match step(&mut player, &handle) {
        TickOutcome::Published(update) => {
            assert_relative_eq!(update.position_secs, 60.1, epsilon = 1e-9);
            assert_relative_eq!(update.slider_fraction, 0.5008, epsilon = 1e-4);
            assert_eq!(update.position_text, "01:00");
            assert_eq!(update.duration_text, "02:00");
        }
        other => panic!("expected a published update, got {:?}", other),
    }
}

#[test_case(0.0 ; "start")]
#[test_case(0.1 ; "tenth")]
#[test_case(0.333 ; "third")]
#[test_case(0.5 ; "half")]
#[test_case(0.999 ; "almost end")]
#[test_case(1.0 ; "end")]
fn test_seek_lands_within_one_quantum(fraction: f64) {
    let (mut player, _handle) = audio_player(90);
    let duration = 90 * SAMPLE_RATE as u64;

    player.handle(Command::Seek { fraction });
    let expected = fraction * duration as f64;
    let actual = player.transport().position() as f64;
    assert!(
        (actual - expected).abs() <= QUANTUM as f64,
        "seek({}) landed at {}, expected ~{}",
        fraction,
        actual,
        expected
    );
}

#[test]
fn test_out_of_range_seek_matches_end() {
    let (mut a, _ha) = audio_player(30);
    let (mut b, _hb) = audio_player(30);
    a.handle(Command::Seek { fraction: 1.5 });
    b.handle(Command::Seek { fraction: 1.0 });
    assert_eq!(a.transport().position(), b.transport().position());

    a.handle(Command::Seek { fraction: -2.0 });
    assert_eq!(a.transport().position(), 0);
}

#[test]
fn test_no_publish_while_seeking() {
    let (mut player, handle) = audio_player(60);
    player.handle(Command::Play);
    step(&mut player, &handle);
    player.drain_events();

    // A seek is a single step on the owner thread; the only position
    // update it produces is the post-seek one
    player.handle(Command::Seek { fraction: 0.75 });
    let events = player.drain_events();
    let positions: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PlayerEvent::PositionChanged(update) => Some(update.position_secs),
            _ => None,
        })
        .collect();
    assert_eq!(positions, vec![45.0]);
    assert_eq!(player.state(), TransportState::Playing);
}

// === Completion ===

#[test]
fn test_completion_fires_exactly_once() {
    let (mut player, handle) = audio_player(120);
    player.handle(Command::Seek {
        fraction: 118.0 / 120.0,
    });
    player.handle(Command::Play);
    player.drain_events();

    let mut completed = 0;
    let mut published_after_completion = 0;
    for _ in 0..30 {
        match step(&mut player, &handle) {
            TickOutcome::Completed(update) => {
                completed += 1;
                assert_eq!(update.position_text, "02:00");
                assert_eq!(update.slider_fraction, 1.0);
            }
            TickOutcome::Published(_) if completed > 0 => published_after_completion += 1,
            _ => {}
        }
    }

    assert_eq!(completed, 1);
    assert_eq!(published_after_completion, 0);
    assert_eq!(player.state(), TransportState::Paused);
    assert_eq!(player.transport().position(), 120 * SAMPLE_RATE as u64);
    assert!(!player.publisher_active());

    let events = player.drain_events();
    let reached = events.iter().filter(|e| **e == PlayerEvent::ReachedEnd).count();
    assert_eq!(reached, 1);
}

#[test]
fn test_completion_on_timeline_clock() {
    let (mut player, handle) = video_player(1.0);
    player.handle(Command::Play);

    let outcomes: Vec<_> = (0..15).map(|_| step(&mut player, &handle)).collect();
    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, TickOutcome::Completed(_)))
        .count();
    assert_eq!(completed, 1);
    assert_relative_eq!(player.transport().position_secs(), 1.0);
}

// === Pause / Resume / Stop ===

#[test]
fn test_play_pause_play_resumes() {
    let (mut player, handle) = audio_player(60);
    player.handle(Command::Play);
    for _ in 0..10 {
        step(&mut player, &handle);
    }
    player.handle(Command::Pause);
    let paused_at = player.transport().position();
    assert_relative_eq!(player.transport().position_secs(), 1.0);

    player.handle(Command::Play);
    assert_eq!(player.transport().anchor(), paused_at);
    step(&mut player, &handle);
    assert_relative_eq!(player.transport().position_secs(), 1.1, epsilon = 1e-9);
}

#[test]
fn test_stop_always_resets() {
    for setup in [Command::Play, Command::Pause, Command::Seek { fraction: 0.4 }] {
        let (mut player, handle) = audio_player(60);
        player.handle(setup);
        step(&mut player, &handle);

        player.handle(Command::Stop);
        assert_eq!(player.state(), TransportState::Idle);
        assert_eq!(player.transport().position(), 0);
        assert_eq!(player.snapshot().position_text, "00:00");
    }
}

#[test]
fn test_late_ticks_are_ignored() {
    let (mut player, handle) = audio_player(60);
    player.handle(Command::Play);
    let token = player.transport().publisher().token().unwrap();

    player.handle(Command::Pause);
    player.drain_events();
    handle.render_for(TICK);
    assert_eq!(player.transport_mut().publish_tick(token), TickOutcome::Stale);

    player.handle(Command::Play);
    player.handle(Command::Stop);
    player.drain_events();
    assert_eq!(player.on_tick(), TickOutcome::Stale);

    player.handle(Command::Play);
    player.shutdown();
    player.drain_events();
    assert_eq!(player.on_tick(), TickOutcome::Stale);
    assert!(player.drain_events().is_empty());
}

// === Rate ===

#[test]
fn test_rate_while_paused_applies_on_play() {
    let (mut player, handle) = audio_player(60);
    player.handle(Command::SetRate { rate: 2.0 });
    assert_eq!(handle.rate(), 1.0);

    player.handle(Command::Play);
    step(&mut player, &handle);
    assert_relative_eq!(player.transport().position_secs(), 0.2, epsilon = 1e-9);
}

// === Errors ===

#[test]
fn test_engine_start_failure_is_not_retried() {
    let (mut player, handle) = audio_player(10);
    handle.fail_next_start();

    player.handle(Command::Play);
    assert_eq!(player.state(), TransportState::Paused);
    assert!(!player.publisher_active());
    let events = player.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        PlayerEvent::Error { code, .. } if code == "ENGINE_START_ERROR"
    )));

    player.handle(Command::Play);
    assert_eq!(player.state(), TransportState::Playing);
}

#[test]
fn test_no_media_for_transport_commands() {
    let mut player = MediaPlayer::new(ManualEngine::new(), PlayerConfig::default());
    for cmd in [
        Command::Play,
        Command::Pause,
        Command::TogglePlayPause,
        Command::Seek { fraction: 0.5 },
        Command::SeekBy { seconds: 5.0 },
    ] {
        player.handle(cmd);
    }
    let codes: Vec<_> = player
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            PlayerEvent::Error { code, .. } => Some(code),
            _ => None,
        })
        .collect();
    assert_eq!(codes, vec!["NO_MEDIA_LOADED"; 5]);
    assert_eq!(player.state(), TransportState::Idle);
}
