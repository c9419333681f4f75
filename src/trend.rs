//! # Trend Normalization Module
//!
//! Turns the BPM history into on-canvas coordinates for the trend graph.
//!
//! ## Scaling
//! The vertical range follows the data but never shrinks below `MIN_RANGE`
//! BPM, so a steady heart rate does not get stretched into a noisy line.
//! Narrow ranges are re-centred on their midpoint; an all-zero history is
//! shown as `[0, MIN_RANGE]`.
//!
//! ## Smoothing
//! Consecutive points are joined with quadratic segments that pass through
//! the midpoints between samples, using each sample as the control point.

use crate::history::BpmSliceExt;
use crate::surface::PathOp;

/// Smallest vertical span shown, in BPM
pub const MIN_RANGE: f64 = 30.0;

// Top and bottom padding as a share of the canvas height
const PADDING_RATIO: f64 = 0.1;
const SPAN_RATIO: f64 = 1.0 - 2.0 * PADDING_RATIO;

/// BPM values mapped to the bottom and top of the drawable band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendRange {
    pub min: f64,
    pub max: f64,
}

impl TrendRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the range, 0 at `min`, 1 at `max`
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendCurve {
    pub range: TrendRange,
    pub points: Vec<(f64, f64)>,
}

impl TrendCurve {
    pub fn path(&self) -> Vec<PathOp> {
        smooth_path(&self.points)
    }
}

pub fn display_range(values: &[u32]) -> TrendRange {
    let (min, max) = match values.min_max_value() {
        Some((min, max)) => (min as f64, max as f64),
        None => (0.0, 0.0),
    };

    if max - min >= MIN_RANGE {
        return TrendRange { min, max };
    }

    let mid = (min + max) / 2.0;
    if mid == 0.0 {
        // All-zero history: start at 0 rather than showing negative BPM
        return TrendRange {
            min: 0.0,
            max: MIN_RANGE,
        };
    }
    TrendRange {
        min: mid - MIN_RANGE / 2.0,
        max: mid + MIN_RANGE / 2.0,
    }
}

/// Screen Y for a normalized value; screen Y grows downwards
fn to_screen_y(normalized: f64, height: f64) -> f64 {
    height - (normalized * height * SPAN_RATIO + height * PADDING_RATIO)
}

pub fn normalize(values: &[u32], width: f64, height: f64) -> TrendCurve {
    let range = display_range(values);
    let x_step = if values.len() > 1 {
        width / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points = values
        .iter()
        .enumerate()
        .map(|(i, &bpm)| {
            let x = i as f64 * x_step;
            (x, to_screen_y(range.normalize(bpm as f64), height))
        })
        .collect();

    TrendCurve { range, points }
}

/// Midpoint-smoothed path through `points`
pub fn smooth_path(points: &[(f64, f64)]) -> Vec<PathOp> {
    let Some(&(x0, y0)) = points.first() else {
        return Vec::new();
    };

    let mut ops = Vec::with_capacity(points.len() + 1);
    ops.push(PathOp::MoveTo(x0, y0));

    if points.len() < 2 {
        return ops;
    }

    for i in 1..points.len() - 1 {
        let (cx, cy) = points[i];
        let (nx, ny) = points[i + 1];
        ops.push(PathOp::QuadTo(cx, cy, (cx + nx) / 2.0, (cy + ny) / 2.0));
    }

    let (lx, ly) = points[points.len() - 1];
    ops.push(PathOp::LineTo(lx, ly));
    ops
}
