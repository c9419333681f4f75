//! # Render Loop Module
//!
//! Owns all overlay state and draws one frame at a time onto a
//! `DrawingSurface`. The loop is driven from outside (the UI subscription
//! calls `frame` on every tick); this type only decides what a frame does.
//!
//! ## Ownership
//! `OverlayState` is written only through `on_heart_rate_sample` (BPM,
//! connection, history) and `set_mode` / `apply_theme` (mode and stroke).
//! Pollers never hold a reference to it; they send `OverlayUpdate` values to
//! the owner, which applies them between frames.
//!
//! ## Frame Policy
//! Every drawn frame clears the surface and strokes the full trace. In ECG
//! mode the trace itself scrolls only every `scroll_divisor` frames, and the
//! beat scheduler is stepped on those frames only, so a beat always lands in
//! the buffer in full. Beat starts are checked on every frame, and a lost
//! signal cancels the beat as soon as the sample arrives, in either mode.

use crate::beat::BeatScheduler;
use crate::ecg::EcgSynthesizer;
use crate::history::{HeartRateSample, SampleHistory};
use crate::surface::{DrawingSurface, StrokeStyle};
use crate::theme::{RenderConfig, ThemeConfig, WaveformMode};
use crate::trend;

// Baseline of the ECG trace as a share of the canvas height, measured from
// the top. Leaves room for the R peak, which spans 90% of the height.
const ECG_BASELINE_RATIO: f64 = 0.9;

/// Message from the pollers to the state owner
#[derive(Debug, Clone)]
pub enum OverlayUpdate {
    HeartRate(HeartRateSample),
    Theme(ThemeConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Everything a frame reads
#[derive(Debug, Clone)]
pub struct OverlayState {
    pub bpm: u32,
    pub connected: bool,
    pub mode: WaveformMode,
    pub render: RenderConfig,
    pub show_waveform: bool,
    pub history: SampleHistory,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            bpm: 0,
            connected: false,
            mode: WaveformMode::default(),
            render: RenderConfig::default(),
            show_waveform: true,
            history: SampleHistory::new(),
        }
    }
}

pub struct RenderLoop {
    state: OverlayState,
    loop_state: LoopState,
    scheduler: BeatScheduler,
    ecg: EcgSynthesizer,
}

impl RenderLoop {
    pub fn new(scroll_divisor: u32) -> Self {
        Self::with_synthesizer(EcgSynthesizer::new(scroll_divisor))
    }

    pub fn with_synthesizer(ecg: EcgSynthesizer) -> Self {
        Self {
            state: OverlayState::default(),
            loop_state: LoopState::Idle,
            scheduler: BeatScheduler::new(),
            ecg,
        }
    }

    /// Start drawing frames. Returns `false` if the loop was already running.
    pub fn start(&mut self) -> bool {
        if self.loop_state == LoopState::Running {
            log::debug!("Render loop already running");
            return false;
        }
        log::info!("Render loop started");
        self.loop_state = LoopState::Running;
        true
    }

    /// Stop drawing frames; `start` resumes with all state intact.
    pub fn stop(&mut self) {
        if self.loop_state == LoopState::Running {
            log::info!("Render loop stopped");
        }
        self.loop_state = LoopState::Idle;
    }

    pub fn is_running(&self) -> bool {
        self.loop_state == LoopState::Running
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn scheduler(&self) -> &BeatScheduler {
        &self.scheduler
    }

    pub fn set_mode(&mut self, mode: WaveformMode) {
        if self.state.mode != mode {
            log::debug!("Waveform mode {:?} -> {:?}", self.state.mode, mode);
        }
        self.state.mode = mode;
    }

    pub fn on_heart_rate_sample(&mut self, sample: HeartRateSample) {
        self.state.bpm = sample.bpm();
        self.state.connected = sample.connected;
        if self.state.bpm == 0 || !self.state.connected {
            self.scheduler.cancel();
        }
        self.state.history.append(sample);
    }

    pub fn apply_theme(&mut self, theme: &ThemeConfig) {
        self.set_mode(theme.mode);
        self.state.render = theme.render_config();
        self.state.show_waveform = theme.show_waveform;
    }

    pub fn apply(&mut self, update: OverlayUpdate) {
        match update {
            OverlayUpdate::HeartRate(sample) => self.on_heart_rate_sample(sample),
            OverlayUpdate::Theme(theme) => self.apply_theme(&theme),
        }
    }

    /// Draw one frame. Hidden or zero-sized surfaces are left untouched.
    pub fn frame<S: DrawingSurface + ?Sized>(&mut self, surface: &mut S, now_ms: f64) {
        if !self.is_running() || !self.state.show_waveform || !surface.is_visible() {
            return;
        }
        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            return;
        }

        surface.clear();
        let style = StrokeStyle {
            color: self.state.render.stroke,
            width: self.state.render.line_width,
        };
        match self.state.mode {
            WaveformMode::Ecg => self.draw_ecg(surface, width, height, now_ms, &style),
            WaveformMode::Trend => self.draw_trend(surface, width, height, &style),
        }
    }

    fn draw_ecg<S: DrawingSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        width: u32,
        height: u32,
        now_ms: f64,
        style: &StrokeStyle,
    ) {
        let Self { state, scheduler, ecg, .. } = self;
        let height = height as f64;

        // Beats may start on held frames too; they are emitted on the next scroll
        scheduler.arm(state.bpm, state.connected, now_ms);
        ecg.tick_with(width as usize, || {
            scheduler.step(state.bpm, state.connected, now_ms, height)
        });

        let baseline = height * ECG_BASELINE_RATIO;
        surface.begin_path();
        for (x, offset) in ecg.samples().iter().enumerate() {
            let y = baseline - offset;
            if x == 0 {
                surface.move_to(0.0, y);
            } else {
                surface.line_to(x as f64, y);
            }
        }
        surface.stroke(style);
    }

    fn draw_trend<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        width: u32,
        height: u32,
        style: &StrokeStyle,
    ) {
        let curve = trend::normalize(self.state.history.snapshot(), width as f64, height as f64);
        surface.begin_path();
        for op in curve.path() {
            surface.path_op(op);
        }
        surface.stroke(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat::{template_scale, WAVEFORM_TEMPLATE};
    use crate::ecg::DEFAULT_SCROLL_DIVISOR;
    use crate::surface::{DisplayList, DrawOp, PathOp};
    use crate::theme::{resolve, Rgb};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME_MS: f64 = 16.0;

    fn quiet_loop() -> RenderLoop {
        let ecg = EcgSynthesizer::with_rng(DEFAULT_SCROLL_DIVISOR, 0.0, StdRng::seed_from_u64(1));
        let mut render = RenderLoop::with_synthesizer(ecg);
        render.start();
        render
    }

    fn path_points(list: &DisplayList) -> Vec<(f64, f64)> {
        list.ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Path(PathOp::MoveTo(x, y)) | DrawOp::Path(PathOp::LineTo(x, y)) => {
                    Some((*x, *y))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut render = RenderLoop::new(2);
        assert!(!render.is_running());
        assert!(render.start());
        assert!(!render.start());
        assert!(render.is_running());

        render.stop();
        assert!(!render.is_running());
        assert!(render.start());
    }

    #[test]
    fn test_idle_loop_draws_nothing() {
        let mut render = RenderLoop::new(2);
        let mut list = DisplayList::new(100, 50);
        render.frame(&mut list, 0.0);
        assert!(list.ops().is_empty());
    }

    #[test]
    fn test_hidden_or_empty_surface_skipped() {
        let mut render = quiet_loop();

        let mut hidden = DisplayList::new(100, 50);
        hidden.set_visible(false);
        render.frame(&mut hidden, 0.0);
        assert!(hidden.ops().is_empty());

        let mut empty = DisplayList::new(0, 0);
        render.frame(&mut empty, 0.0);
        assert!(empty.ops().is_empty());
    }

    #[test]
    fn test_hidden_waveform_theme_skips_drawing() {
        let mut render = quiet_loop();
        render.apply_theme(&resolve("minimal"));

        let mut list = DisplayList::new(100, 50);
        render.frame(&mut list, 0.0);
        assert!(list.ops().is_empty());
    }

    #[test]
    fn test_ecg_frame_clears_then_strokes_full_width() {
        let mut render = quiet_loop();
        render.apply_theme(&resolve("retro"));

        let mut list = DisplayList::new(120, 100);
        render.frame(&mut list, 0.0);

        assert_eq!(list.ops().first(), Some(&DrawOp::Clear));
        assert_eq!(
            list.ops().last(),
            Some(&DrawOp::Stroke(StrokeStyle {
                color: Rgb(0x33, 0xff, 0x33),
                width: 2.0
            }))
        );
        let points = path_points(&list);
        assert_eq!(points.len(), 120);
        assert!(points.iter().all(|&(_, y)| y == 90.0));
    }

    #[test]
    fn test_ecg_beat_scrolls_in_at_half_frame_rate() {
        let mut render = quiet_loop();
        render.on_heart_rate_sample(HeartRateSample::new(60, true));

        let width = 200u32;
        let height = 100u32;
        let mut list = DisplayList::new(width, height);
        let mut t = 0.0;

        // Size the buffer, then run past the first beat interval
        render.frame(&mut list, t);
        while !render.scheduler().phase().active {
            t += FRAME_MS;
            render.frame(&mut list, t);
        }

        // One template step per two frames
        let template_frames = WAVEFORM_TEMPLATE.len() as u32 * DEFAULT_SCROLL_DIVISOR;
        for _ in 1..template_frames {
            t += FRAME_MS;
            render.frame(&mut list, t);
        }
        assert!(!render.scheduler().phase().active);

        let scale = template_scale(height as f64);
        let points = path_points(&list);
        let tail: Vec<f64> = points[points.len() - WAVEFORM_TEMPLATE.len()..]
            .iter()
            .map(|&(_, y)| 90.0 - y)
            .collect();
        for (got, expected) in tail.iter().zip(WAVEFORM_TEMPLATE.iter()) {
            assert!((got - expected * scale).abs() < 1e-9);
        }
    }

    #[test]
    fn test_disconnect_returns_trace_to_baseline() {
        let mut render = quiet_loop();
        render.on_heart_rate_sample(HeartRateSample::new(120, true));

        let mut list = DisplayList::new(50, 100);
        let mut t = 0.0;
        render.frame(&mut list, t);
        while !render.scheduler().phase().active {
            t += FRAME_MS;
            render.frame(&mut list, t);
        }

        render.on_heart_rate_sample(HeartRateSample::disconnected());
        assert_eq!(render.state().bpm, 0);
        assert!(!render.state().connected);

        for _ in 0..2 {
            t += FRAME_MS;
            render.frame(&mut list, t);
        }
        assert!(!render.scheduler().phase().active);
        let last = path_points(&list).last().copied().unwrap();
        assert_eq!(last.1, 90.0);
    }

    #[test]
    fn test_beat_arms_on_held_frame() {
        let mut render = quiet_loop();
        render.on_heart_rate_sample(HeartRateSample::new(60, true));
        let mut list = DisplayList::new(50, 100);

        // Frame 0 sizes the buffer; odd frames after it are held
        for n in 0..63 {
            render.frame(&mut list, n as f64 * FRAME_MS);
        }
        assert!(!render.scheduler().phase().active);

        // t = 1008 is the first frame past the interval, and it is held
        render.frame(&mut list, 63.0 * FRAME_MS);
        let phase = render.scheduler().phase();
        assert!(phase.active);
        assert_eq!(phase.step_index, 0);
        assert_eq!(phase.last_beat_ms, 1008.0);

        render.frame(&mut list, 64.0 * FRAME_MS);
        assert_eq!(render.scheduler().phase().step_index, 1);
    }

    #[test]
    fn test_disconnect_cancels_beat_before_held_frame() {
        let mut render = quiet_loop();
        render.on_heart_rate_sample(HeartRateSample::new(60, true));
        let mut list = DisplayList::new(50, 100);

        for n in 0..=64 {
            render.frame(&mut list, n as f64 * FRAME_MS);
        }
        assert!(render.scheduler().phase().active);

        render.on_heart_rate_sample(HeartRateSample::disconnected());
        assert!(!render.scheduler().phase().active);

        // Frame 65 is held: the beat must already be gone
        render.frame(&mut list, 65.0 * FRAME_MS);
        let phase = render.scheduler().phase();
        assert!(!phase.active);
        assert_eq!(phase.step_index, 0);
    }

    #[test]
    fn test_disconnect_in_trend_mode_cancels_beat() {
        let mut render = quiet_loop();
        render.on_heart_rate_sample(HeartRateSample::new(60, true));
        let mut list = DisplayList::new(50, 100);

        for n in 0..=64 {
            render.frame(&mut list, n as f64 * FRAME_MS);
        }
        assert!(render.scheduler().phase().active);

        render.set_mode(WaveformMode::Trend);
        render.frame(&mut list, 65.0 * FRAME_MS);
        render.on_heart_rate_sample(HeartRateSample::disconnected());
        assert!(!render.scheduler().phase().active);

        render.frame(&mut list, 66.0 * FRAME_MS);
        assert!(!render.scheduler().phase().active);

        // Back in ECG mode the trace stays on the baseline
        render.set_mode(WaveformMode::Ecg);
        render.frame(&mut list, 67.0 * FRAME_MS);
        render.frame(&mut list, 68.0 * FRAME_MS);
        assert!(!render.scheduler().phase().active);
        assert_eq!(path_points(&list).last().map(|p| p.1), Some(90.0));
    }

    #[test]
    fn test_trend_mode_draws_smoothed_history() {
        let mut render = quiet_loop();
        render.set_mode(WaveformMode::Trend);
        for bpm in [60, 62, 58, 61, 75] {
            render.on_heart_rate_sample(HeartRateSample::new(bpm, true));
        }

        let mut list = DisplayList::new(100, 100);
        render.frame(&mut list, 0.0);

        let ops = list.ops();
        assert_eq!(ops[0], DrawOp::Clear);
        assert_eq!(ops[1], DrawOp::BeginPath);
        assert!(matches!(ops[2], DrawOp::Path(PathOp::MoveTo(..))));
        let quads = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Path(PathOp::QuadTo(..))))
            .count();
        assert_eq!(quads, 3);
        assert!(matches!(ops.last(), Some(DrawOp::Stroke(_))));
    }

    #[test]
    fn test_mode_switch_applies_next_frame() {
        let mut render = quiet_loop();
        for _ in 0..3 {
            render.on_heart_rate_sample(HeartRateSample::new(70, true));
        }
        let mut list = DisplayList::new(100, 100);

        render.frame(&mut list, 0.0);
        assert_eq!(path_points(&list).len(), 100);

        render.apply(OverlayUpdate::Theme(resolve("nature")));
        render.frame(&mut list, FRAME_MS);
        assert!(list
            .ops()
            .iter()
            .any(|op| matches!(op, DrawOp::Path(PathOp::QuadTo(..)))));
    }

    #[test]
    fn test_updates_are_last_write_wins() {
        let mut render = quiet_loop();
        render.apply(OverlayUpdate::HeartRate(HeartRateSample::new(80, true)));
        render.apply(OverlayUpdate::HeartRate(HeartRateSample::new(95, true)));

        assert_eq!(render.state().bpm, 95);
        assert_eq!(render.state().history.snapshot(), &[80, 95]);
    }
}
