//! # Drawing Surface Module
//!
//! The 2D stroke contract the render loop draws through, plus `DisplayList`,
//! a surface that records a frame so it can be replayed later onto the real
//! backend (the plotters chart widget draws from `&self` only).

use crate::theme::Rgb;

/// Stroke parameters resolved from the active theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgb,
    pub width: f64,
}

/// One path construction command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Control point, then end point
    QuadTo(f64, f64, f64, f64),
}

pub trait DrawingSurface {
    /// Pixel size as `(width, height)`
    fn size(&self) -> (u32, u32);

    fn is_visible(&self) -> bool {
        true
    }

    /// Wipe the whole surface
    fn clear(&mut self);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);
    fn stroke(&mut self, style: &StrokeStyle);

    fn path_op(&mut self, op: PathOp) {
        match op {
            PathOp::MoveTo(x, y) => self.move_to(x, y),
            PathOp::LineTo(x, y) => self.line_to(x, y),
            PathOp::QuadTo(cx, cy, x, y) => self.quadratic_curve_to(cx, cy, x, y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    BeginPath,
    Path(PathOp),
    Stroke(StrokeStyle),
}

/// Recorded frame. Clearing discards everything recorded so far, so the list
/// only ever holds the latest frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    width: u32,
    height: u32,
    visible: bool,
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            visible: true,
            ops: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Hiding the list also drops the recorded frame, so nothing stale is
    /// replayed when it is shown again.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.reset();
        }
    }

    /// Forget the recorded frame without recording a clear
    pub fn reset(&mut self) {
        self.ops.clear();
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn replay<S: DrawingSurface + ?Sized>(&self, target: &mut S) {
        for op in &self.ops {
            match op {
                DrawOp::Clear => target.clear(),
                DrawOp::BeginPath => target.begin_path(),
                DrawOp::Path(path) => target.path_op(*path),
                DrawOp::Stroke(style) => target.stroke(style),
            }
        }
    }
}

impl DrawingSurface for DisplayList {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::Path(PathOp::MoveTo(x, y)));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::Path(PathOp::LineTo(x, y)));
    }

    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.ops.push(DrawOp::Path(PathOp::QuadTo(cx, cy, x, y)));
    }

    fn stroke(&mut self, style: &StrokeStyle) {
        self.ops.push(DrawOp::Stroke(*style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> StrokeStyle {
        StrokeStyle {
            color: Rgb(255, 0, 0),
            width: 2.0,
        }
    }

    #[test]
    fn test_clear_drops_previous_frame() {
        let mut list = DisplayList::new(100, 50);
        list.clear();
        list.begin_path();
        list.move_to(0.0, 0.0);
        list.line_to(10.0, 10.0);
        list.stroke(&style());

        list.clear();
        assert_eq!(list.ops(), &[DrawOp::Clear]);
    }

    #[test]
    fn test_replay_reproduces_ops() {
        let mut list = DisplayList::new(100, 50);
        list.clear();
        list.begin_path();
        list.move_to(1.0, 2.0);
        list.quadratic_curve_to(3.0, 4.0, 5.0, 6.0);
        list.stroke(&style());

        let mut copy = DisplayList::new(100, 50);
        list.replay(&mut copy);
        assert_eq!(copy.ops(), list.ops());
    }

    #[test]
    fn test_hiding_drops_recorded_frame() {
        let mut list = DisplayList::new(100, 50);
        list.clear();
        list.begin_path();
        list.move_to(0.0, 0.0);
        list.stroke(&style());

        list.set_visible(true);
        assert_eq!(list.ops().len(), 4);

        list.set_visible(false);
        assert!(list.ops().is_empty());

        list.set_visible(true);
        let mut target = DisplayList::new(100, 50);
        list.replay(&mut target);
        assert!(target.ops().is_empty());
    }

    #[test]
    fn test_size_and_visibility() {
        let mut list = DisplayList::default();
        assert_eq!(list.size(), (0, 0));
        assert!(!list.is_visible());

        list.resize(350, 150);
        list.set_visible(true);
        assert_eq!(list.size(), (350, 150));
        assert!(list.is_visible());
    }
}
