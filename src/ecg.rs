//! # ECG Trace Synthesis Module
//!
//! Maintains the scrolling trace buffer shown in ECG mode. The buffer holds
//! one vertical offset per pixel column, oldest first, and always matches
//! the canvas width.
//!
//! ## Throttling
//! The trace scrolls one column every `scroll_divisor` frames, so scroll
//! speed does not depend on the display refresh rate. On held frames the
//! buffer is untouched and the caller redraws it as is.
//!
//! ## Jitter
//! Each new column gets a small uniform perturbation to look like analog
//! sensor noise. It is drawn fresh per column and never fed back into the
//! beat scheduler.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Frames per scroll step
pub const DEFAULT_SCROLL_DIVISOR: u32 = 2;

/// Peak jitter in pixels
pub const JITTER_AMPLITUDE: f64 = 1.5;

/// Scrolling trace, one offset per pixel column
pub type EcgBuffer = VecDeque<f64>;

/// What a call to `tick` did to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Width changed; buffer reset to baseline
    Resized,
    /// Oldest column dropped, new column appended
    Advanced,
    /// Throttled frame; buffer unchanged
    Held,
}

pub struct EcgSynthesizer {
    buffer: EcgBuffer,
    scroll_divisor: u32,
    frames_since_advance: u32,
    jitter_amplitude: f64,
    rng: StdRng,
}

impl EcgSynthesizer {
    pub fn new(scroll_divisor: u32) -> Self {
        Self::with_rng(scroll_divisor, JITTER_AMPLITUDE, StdRng::from_entropy())
    }

    pub fn with_rng(scroll_divisor: u32, jitter_amplitude: f64, rng: StdRng) -> Self {
        Self {
            buffer: EcgBuffer::new(),
            scroll_divisor: scroll_divisor.max(1),
            frames_since_advance: 0,
            jitter_amplitude: jitter_amplitude.abs(),
            rng,
        }
    }

    pub fn samples(&self) -> &EcgBuffer {
        &self.buffer
    }

    pub fn scroll_divisor(&self) -> u32 {
        self.scroll_divisor
    }

    /// Advance with a precomputed beat offset.
    pub fn tick(&mut self, canvas_width: usize, beat_offset: f64) -> TickOutcome {
        self.tick_with(canvas_width, || beat_offset)
    }

    /// Advance, asking for the beat offset only when the buffer actually
    /// scrolls this frame.
    pub fn tick_with<F>(&mut self, canvas_width: usize, next_offset: F) -> TickOutcome
    where
        F: FnOnce() -> f64,
    {
        if self.buffer.len() != canvas_width {
            log::debug!(
                "ECG buffer resized from {} to {} columns",
                self.buffer.len(),
                canvas_width
            );
            self.buffer.clear();
            self.buffer.resize(canvas_width, 0.0);
            self.frames_since_advance = 0;
            return TickOutcome::Resized;
        }

        if canvas_width == 0 {
            return TickOutcome::Held;
        }

        self.frames_since_advance += 1;
        if self.frames_since_advance < self.scroll_divisor {
            return TickOutcome::Held;
        }
        self.frames_since_advance = 0;

        let offset = next_offset() + self.jitter();
        self.buffer.pop_front();
        self.buffer.push_back(offset);
        TickOutcome::Advanced
    }

    fn jitter(&mut self) -> f64 {
        if self.jitter_amplitude == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.jitter_amplitude..=self.jitter_amplitude)
    }
}
