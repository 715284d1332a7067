//! Mediaplay - Media Transport Core
//!
//! Tracks playback position, drives play / pause / seek / stop, and keeps a
//! UI-facing progress signal in step with the render clock. Also owns the
//! output signal chain (three-band EQ and master volume).
//!
//! # Architecture
//!
//! Position is never stored as a running total. It is always derived as
//! `anchor + units rendered since the anchor`, clamped to the media
//! duration, so seeks and rate changes cannot drift:
//! - `engine`: clock sources, render engines, transport, seek, publisher
//! - `dsp`: signal chain and its clamped parameters
//! - `player`: command surface routing to transport or signal chain
//! - `control`: owner thread driving commands and publish ticks

pub mod cli;
pub mod config;
pub mod control;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod events;
pub mod player;

pub use config::PlayerConfig;
pub use error::{MediaError, Result};
pub use events::PlayerEvent;
pub use player::{Command, MediaPlayer};
