//! Render engine seam
//!
//! The transport never touches audio data. It tells the engine where to
//! start a segment and reads back one number: units rendered since that
//! schedule. Two engines live here:
//! - [`ManualEngine`]: rendering advances only when a [`RenderHandle`] says
//!   so, one quantum at a time. Deterministic; used by tests and embedders
//!   that own their own audio callback.
//! - [`ClockedEngine`]: rendering advances with wall-clock time. Used by the
//!   dry-run CLI player.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::media::MediaHandle;
use crate::error::{MediaError, Result};

/// Default render quantum in frames
pub const DEFAULT_RENDER_QUANTUM: u64 = 512;

/// Playback backend driven by the transport
pub trait RenderEngine {
    /// Prepare for new media, discarding any scheduled segment
    fn load(&mut self, media: &MediaHandle) -> Result<()>;

    /// Bring the output device up. Idempotent once running.
    fn start(&mut self) -> Result<()>;

    fn is_running(&self) -> bool;

    /// Halt the current segment and schedule a new one beginning at `offset`
    ///
    /// Resets the rendered counter to zero. Rendering does not begin until
    /// [`RenderEngine::play`].
    fn schedule_from_offset(&mut self, offset: u64);

    /// Begin or resume rendering the scheduled segment
    fn play(&mut self);

    /// Stop rendering, keeping the rendered counter
    fn pause(&mut self);

    /// Stop rendering and drop the scheduled segment
    fn stop(&mut self);

    /// Native units rendered since the last schedule
    fn rendered_since_schedule(&self) -> u64;

    /// Rendering speed multiplier
    fn set_rate(&mut self, rate: f32);
}

// ============================================================================
// Manual Engine
// ============================================================================

/// State shared between the engine (owner side) and its render handle
#[derive(Debug)]
struct RenderShared {
    rendered: AtomicU64,
    segment_len: AtomicU64,
    rendering: AtomicBool,
    rate_bits: AtomicU32,
    units_per_second: AtomicU32,
    quantum: AtomicU64,
    fail_next_start: AtomicBool,
}

/// Engine whose render clock is advanced explicitly
#[derive(Debug)]
pub struct ManualEngine {
    shared: Arc<RenderShared>,
    running: bool,
    duration_units: u64,
}

impl ManualEngine {
    pub fn new() -> Self {
        Self::with_quantum(DEFAULT_RENDER_QUANTUM)
    }

    pub fn with_quantum(quantum: u64) -> Self {
        Self {
            shared: Arc::new(RenderShared {
                rendered: AtomicU64::new(0),
                segment_len: AtomicU64::new(0),
                rendering: AtomicBool::new(false),
                rate_bits: AtomicU32::new(1.0_f32.to_bits()),
                units_per_second: AtomicU32::new(1),
                quantum: AtomicU64::new(quantum.max(1)),
                fail_next_start: AtomicBool::new(false),
            }),
            running: false,
            duration_units: 0,
        }
    }

    /// Handle for the side that plays the role of the render callback
    pub fn render_handle(&self) -> RenderHandle {
        RenderHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for ManualEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for ManualEngine {
    fn load(&mut self, media: &MediaHandle) -> Result<()> {
        self.stop();
        let clock = media.clock();
        self.duration_units = clock.duration_units();
        self.shared
            .units_per_second
            .store(clock.units_per_second(), Ordering::Release);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }
        if self.shared.fail_next_start.swap(false, Ordering::AcqRel) {
            return Err(MediaError::EngineStart {
                reason: "output device busy".to_string(),
            });
        }
        self.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn schedule_from_offset(&mut self, offset: u64) {
        self.shared.rendering.store(false, Ordering::Release);
        self.shared.rendered.store(0, Ordering::Release);
        self.shared
            .segment_len
            .store(self.duration_units.saturating_sub(offset), Ordering::Release);
    }

    fn play(&mut self) {
        if self.running {
            self.shared.rendering.store(true, Ordering::Release);
        }
    }

    fn pause(&mut self) {
        self.shared.rendering.store(false, Ordering::Release);
    }

    fn stop(&mut self) {
        self.shared.rendering.store(false, Ordering::Release);
        self.shared.rendered.store(0, Ordering::Release);
        self.shared.segment_len.store(0, Ordering::Release);
    }

    fn rendered_since_schedule(&self) -> u64 {
        self.shared.rendered.load(Ordering::Acquire)
    }

    fn set_rate(&mut self, rate: f32) {
        self.shared.rate_bits.store(rate.to_bits(), Ordering::Release);
    }
}

/// Render-callback side of a [`ManualEngine`]
#[derive(Debug, Clone)]
pub struct RenderHandle {
    shared: Arc<RenderShared>,
}

impl RenderHandle {
    /// Render up to `units` of the scheduled segment
    ///
    /// Returns the units actually rendered: zero while paused or stopped,
    /// fewer than asked once the segment runs out.
    pub fn render(&self, units: u64) -> u64 {
        if !self.shared.rendering.load(Ordering::Acquire) {
            return 0;
        }
        let limit = self.shared.segment_len.load(Ordering::Acquire);
        let previous = self
            .shared
            .rendered
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |done| {
                Some(done.saturating_add(units).min(limit))
            })
            .unwrap_or(limit);
        previous.saturating_add(units).min(limit) - previous.min(limit)
    }

    /// Render `count` whole quanta
    pub fn render_quanta(&self, count: u64) -> u64 {
        let quantum = self.shared.quantum.load(Ordering::Acquire);
        self.render(quantum.saturating_mul(count))
    }

    /// Render as much media as `elapsed` wall time covers at the current rate
    pub fn render_for(&self, elapsed: Duration) -> u64 {
        let units_per_second = self.shared.units_per_second.load(Ordering::Acquire) as f64;
        let rate = self.rate() as f64;
        let units = (elapsed.as_secs_f64() * units_per_second * rate).round() as u64;
        self.render(units)
    }

    /// Make the next `start()` fail with `EngineStartError`
    pub fn fail_next_start(&self) {
        self.shared.fail_next_start.store(true, Ordering::Release);
    }

    pub fn is_rendering(&self) -> bool {
        self.shared.rendering.load(Ordering::Acquire)
    }

    pub fn rendered(&self) -> u64 {
        self.shared.rendered.load(Ordering::Acquire)
    }

    pub fn rate(&self) -> f32 {
        f32::from_bits(self.shared.rate_bits.load(Ordering::Acquire))
    }

    pub fn quantum(&self) -> u64 {
        self.shared.quantum.load(Ordering::Acquire)
    }
}

// ============================================================================
// Clocked Engine
// ============================================================================

/// Engine whose render clock follows wall-clock time
#[derive(Debug)]
pub struct ClockedEngine {
    units_per_second: f64,
    duration_units: u64,
    segment_len: u64,
    rate: f64,
    running: bool,
    /// Units rendered before the current play span
    accumulated: f64,
    playing_since: Option<Instant>,
}

impl ClockedEngine {
    pub fn new() -> Self {
        Self {
            units_per_second: 1.0,
            duration_units: 0,
            segment_len: 0,
            rate: 1.0,
            running: false,
            accumulated: 0.0,
            playing_since: None,
        }
    }

    fn fold_elapsed(&mut self) {
        if let Some(since) = self.playing_since.take() {
            self.accumulated += since.elapsed().as_secs_f64() * self.units_per_second * self.rate;
            self.playing_since = Some(Instant::now());
        }
    }
}

impl Default for ClockedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for ClockedEngine {
    fn load(&mut self, media: &MediaHandle) -> Result<()> {
        self.stop();
        let clock = media.clock();
        self.units_per_second = clock.units_per_second() as f64;
        self.duration_units = clock.duration_units();
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn schedule_from_offset(&mut self, offset: u64) {
        self.playing_since = None;
        self.accumulated = 0.0;
        self.segment_len = self.duration_units.saturating_sub(offset);
    }

    fn play(&mut self) {
        if self.running && self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.fold_elapsed();
        self.playing_since = None;
    }

    fn stop(&mut self) {
        self.playing_since = None;
        self.accumulated = 0.0;
        self.segment_len = 0;
    }

    fn rendered_since_schedule(&self) -> u64 {
        let live = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64() * self.units_per_second * self.rate)
            .unwrap_or(0.0);
        ((self.accumulated + live) as u64).min(self.segment_len)
    }

    fn set_rate(&mut self, rate: f32) {
        self.fold_elapsed();
        self.rate = rate as f64;
    }
}
