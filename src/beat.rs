//! # Beat Scheduling Module
//!
//! Decides when a synthetic heartbeat starts and which template sample to
//! emit on each step. Beat cadence follows the current BPM; a beat that has
//! started always runs through the full template unless the signal drops.
//!
//! ## Template
//! `WAVEFORM_TEMPLATE` is one stylised beat (P wave, QRS complex, T wave)
//! in fixed units where the R peak is `TEMPLATE_PEAK`. It is scaled to the
//! canvas at emit time so the peak spans 90% of the canvas height.

/// One heartbeat: P wave, QRS complex, T wave
pub const WAVEFORM_TEMPLATE: [f64; 15] = [
    0.0, 1.0, 2.5, 1.0, 0.0, // P
    -1.0, 25.0, -2.0, // QRS
    0.0, 2.0, 4.0, 5.0, 3.0, 1.0, 0.0, // T
];

/// Template amplitude unit corresponding to the R peak
pub const TEMPLATE_PEAK: f64 = 25.0;

/// Share of the canvas height covered by the R peak
const PEAK_HEIGHT_RATIO: f64 = 0.9;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Minimum time between beat starts for the given BPM, `None` without signal
pub fn beat_interval_ms(bpm: u32) -> Option<f64> {
    if bpm == 0 {
        None
    } else {
        Some(MS_PER_MINUTE / bpm as f64)
    }
}

/// Pixel scale applied to template units for a canvas of this height
pub fn template_scale(canvas_height: f64) -> f64 {
    canvas_height * PEAK_HEIGHT_RATIO / TEMPLATE_PEAK
}

/// Where the scheduler is within the current beat
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BeatPhase {
    pub active: bool,
    pub step_index: usize,
    pub last_beat_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BeatScheduler {
    phase: BeatPhase,
}

impl BeatScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BeatPhase {
        self.phase
    }

    /// Drop any beat in progress and return to baseline.
    pub fn cancel(&mut self) {
        self.phase.active = false;
        self.phase.step_index = 0;
    }

    /// Start a beat if the scheduler is idle and strictly more than one beat
    /// interval has passed since the previous start. Without a signal any
    /// beat in progress is cancelled instead.
    ///
    /// Safe to call on every frame; it never emits a sample.
    pub fn arm(&mut self, bpm: u32, connected: bool, now_ms: f64) {
        let interval = match beat_interval_ms(bpm) {
            Some(interval) if connected => interval,
            _ => {
                self.cancel();
                return;
            }
        };

        if !self.phase.active && now_ms - self.phase.last_beat_ms > interval {
            self.phase.active = true;
            self.phase.step_index = 0;
            self.phase.last_beat_ms = now_ms;
        }
    }

    /// Advance one step and return the vertical offset in pixels for it.
    ///
    /// Arms a beat first when one is due, so BPM changes apply from the next
    /// beat on. Losing the signal cancels an in-flight beat immediately.
    pub fn step(&mut self, bpm: u32, connected: bool, now_ms: f64, canvas_height: f64) -> f64 {
        self.arm(bpm, connected, now_ms);
        if !self.phase.active {
            return 0.0;
        }

        let offset = WAVEFORM_TEMPLATE[self.phase.step_index] * template_scale(canvas_height);
        self.phase.step_index += 1;
        if self.phase.step_index >= WAVEFORM_TEMPLATE.len() {
            self.cancel();
        }
        offset
    }
}
