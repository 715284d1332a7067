//! Playback Engine Module
//!
//! Everything that decides where playback is:
//! - Clock sources and media handles
//! - Render engine seam
//! - Transport state machine and seek controller
//! - Progress publishing
//! - WAV I/O

pub mod buffer;
pub mod clock;
pub mod io;
pub mod media;
pub mod progress;
pub mod render;
pub mod seek;
pub mod transport;

pub use buffer::{db_to_linear, generate_test_tone, linear_to_db, AudioBuffer};
pub use clock::{ClockSource, DEFAULT_TIMESCALE};
pub use io::{read_wav, write_wav, WavLoader};
pub use media::{MediaHandle, MediaLoader};
pub use progress::{
    format_time, ProgressPublisher, ProgressUpdate, TickOutcome, TickToken,
    DEFAULT_PUBLISH_INTERVAL,
};
pub use render::{ClockedEngine, ManualEngine, RenderEngine, RenderHandle, DEFAULT_RENDER_QUANTUM};
pub use seek::{clamp_fraction, scrub_target, step_target};
pub use transport::{Transport, TransportState};
