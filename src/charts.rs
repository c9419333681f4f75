use crate::app::{Message, OverlayApp};
use crate::surface::{DrawingSurface, StrokeStyle};
use crate::theme::Rgb;
use plotters::chart::ChartBuilder;
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::element::PathElement;
use plotters::style::{Color, RGBColor};
use plotters_iced::{Chart, DrawingBackend};

// Line segments per quadratic curve
const CURVE_SEGMENTS: usize = 12;

/// Overlay backdrop behind the trace
pub const BACKGROUND: RGBColor = RGBColor(18, 18, 24);

fn to_rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// `DrawingSurface` over a plotters drawing area.
///
/// Paths are collected as polylines; quadratic curves are flattened on the
/// way in. Drawing failures are logged and otherwise ignored.
pub struct PlottersSurface<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    background: RGBColor,
    subpaths: Vec<Vec<(f64, f64)>>,
}

impl<'a, DB: DrawingBackend> PlottersSurface<'a, DB> {
    pub fn new(area: &'a DrawingArea<DB, Shift>, background: RGBColor) -> Self {
        Self {
            area,
            background,
            subpaths: Vec::new(),
        }
    }

    fn cursor(&self) -> Option<(f64, f64)> {
        self.subpaths.last().and_then(|path| path.last().copied())
    }
}

impl<'a, DB: DrawingBackend> DrawingSurface for PlottersSurface<'a, DB> {
    fn size(&self) -> (u32, u32) {
        self.area.dim_in_pixel()
    }

    fn clear(&mut self) {
        if let Err(e) = self.area.fill(&self.background) {
            log::warn!("Failed to clear overlay: {:?}", e);
        }
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(vec![(x, y)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        match self.subpaths.last_mut() {
            Some(path) => path.push((x, y)),
            None => self.move_to(x, y),
        }
    }

    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        let (x0, y0) = match self.cursor() {
            Some(start) => start,
            None => {
                self.move_to(cx, cy);
                (cx, cy)
            }
        };

        for step in 1..=CURVE_SEGMENTS {
            let t = step as f64 / CURVE_SEGMENTS as f64;
            let u = 1.0 - t;
            let px = u * u * x0 + 2.0 * u * t * cx + t * t * x;
            let py = u * u * y0 + 2.0 * u * t * cy + t * t * y;
            self.line_to(px, py);
        }
    }

    fn stroke(&mut self, style: &StrokeStyle) {
        let width = style.width.round().max(1.0) as u32;
        let shape = to_rgb(style.color).stroke_width(width);

        for path in &self.subpaths {
            if path.len() < 2 {
                continue;
            }
            let coords: Vec<(i32, i32)> = path
                .iter()
                .map(|&(x, y)| (x.round() as i32, y.round() as i32))
                .collect();
            if let Err(e) = self.area.draw(&PathElement::new(coords, shape)) {
                log::warn!("Failed to stroke overlay path: {:?}", e);
            }
        }
    }
}

// Waveform chart
pub struct WaveformChart<'a> {
    pub state: &'a OverlayApp,
}

impl<'a> Chart<Message> for WaveformChart<'a> {
    type State = ();

    // Unused: the whole area is drawn in `draw_chart` without axes
    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, _builder: ChartBuilder<DB>) {}

    fn draw_chart<DB: DrawingBackend>(&self, _state: &Self::State, root: DrawingArea<DB, Shift>) {
        let (width, height) = root.dim_in_pixel();
        self.state.report_canvas_size(width, height);

        let mut surface = PlottersSurface::new(&root, BACKGROUND);
        self.state.display().replay(&mut surface);
    }
}
