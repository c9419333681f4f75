//! # Theme Resolution Module
//!
//! Turns the theme string published by the server into a `ThemeConfig`.
//!
//! ## Resolution Order
//! 1. A string holding a well-formed JSON object is an override: its fields
//!    are layered over the preset it names (or `default`).
//! 2. Otherwise the string is a preset tag looked up in `PRESETS`.
//! 3. Unknown tags resolve to the `default` preset.

use serde::{Deserialize, Serialize};

/// Which visualisation the render loop draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformMode {
    #[default]
    Ecg,
    Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rgb` or `#rrggbb`
    pub fn parse(value: &str) -> Option<Rgb> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => None,
        }
    }
}

const DEFAULT_STROKE: Rgb = Rgb(0xff, 0x3b, 0x5c);
const DEFAULT_LINE_WIDTH: f64 = 2.0;

/// Stroke settings consumed by the render loop each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub stroke: Rgb,
    pub line_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_STROKE,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// Fully resolved theme
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeConfig {
    pub mode: WaveformMode,
    pub stroke_color: String,
    pub line_width: f64,
    pub show_waveform: bool,
}

impl ThemeConfig {
    pub fn render_config(&self) -> RenderConfig {
        let stroke = Rgb::parse(&self.stroke_color).unwrap_or_else(|| {
            log::warn!("Unrecognised stroke colour {:?}, using default", self.stroke_color);
            DEFAULT_STROKE
        });
        let line_width = if self.line_width.is_finite() && self.line_width > 0.0 {
            self.line_width
        } else {
            DEFAULT_LINE_WIDTH
        };
        RenderConfig { stroke, line_width }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        PRESETS[0].to_config()
    }
}

struct Preset {
    tag: &'static str,
    mode: WaveformMode,
    stroke_color: &'static str,
    line_width: f64,
    show_waveform: bool,
}

impl Preset {
    fn to_config(&self) -> ThemeConfig {
        ThemeConfig {
            mode: self.mode,
            stroke_color: self.stroke_color.to_string(),
            line_width: self.line_width,
            show_waveform: self.show_waveform,
        }
    }
}

// First entry is the fallback
const PRESETS: &[Preset] = &[
    Preset { tag: "default", mode: WaveformMode::Ecg, stroke_color: "#ff3b5c", line_width: 2.0, show_waveform: true },
    Preset { tag: "cyberpunk", mode: WaveformMode::Ecg, stroke_color: "#00f0ff", line_width: 2.5, show_waveform: true },
    Preset { tag: "retro", mode: WaveformMode::Ecg, stroke_color: "#33ff33", line_width: 2.0, show_waveform: true },
    Preset { tag: "nature", mode: WaveformMode::Trend, stroke_color: "#6abf69", line_width: 2.0, show_waveform: true },
    Preset { tag: "minimal", mode: WaveformMode::Trend, stroke_color: "#ffffff", line_width: 1.5, show_waveform: false },
];

fn preset(tag: &str) -> Option<&'static Preset> {
    let tag = tag.trim();
    PRESETS.iter().find(|p| p.tag.eq_ignore_ascii_case(tag))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeOverride {
    preset: Option<String>,
    mode: Option<WaveformMode>,
    stroke_color: Option<String>,
    line_width: Option<f64>,
    show_waveform: Option<bool>,
}

impl ThemeOverride {
    fn apply(self) -> ThemeConfig {
        let mut config = self
            .preset
            .as_deref()
            .and_then(preset)
            .map(Preset::to_config)
            .unwrap_or_default();

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(color) = self.stroke_color {
            config.stroke_color = color;
        }
        if let Some(width) = self.line_width {
            config.line_width = width;
        }
        if let Some(show) = self.show_waveform {
            config.show_waveform = show;
        }
        config
    }
}

pub fn resolve(theme: &str) -> ThemeConfig {
    let trimmed = theme.trim();
    if trimmed.starts_with('{') {
        match serde_json::from_str::<ThemeOverride>(trimmed) {
            Ok(theme_override) => return theme_override.apply(),
            Err(e) => log::warn!("Ignoring malformed theme JSON: {}", e),
        }
    }

    match preset(trimmed) {
        Some(p) => p.to_config(),
        None => {
            log::debug!("Unknown theme {:?}, using default", trimmed);
            ThemeConfig::default()
        }
    }
}
