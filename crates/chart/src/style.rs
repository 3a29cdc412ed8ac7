//! Colors and line styles for chart series.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const ORANGE: Self = Self::new(255, 165, 0);
    pub const DARK_RED: Self = Self::new(139, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const GRID: Self = Self::new(176, 176, 176);

    /// `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Stroke pattern of a series line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// SVG `stroke-dasharray` value, `None` for solid lines
    pub fn dasharray(&self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some("8,4"),
            LineStyle::Dotted => Some("2,3"),
        }
    }
}

/// How one series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: Rgb,
    pub line_width: f64,
    pub line_style: LineStyle,
}

impl SeriesStyle {
    pub const fn solid(color: Rgb) -> Self {
        Self {
            color,
            line_width: 2.0,
            line_style: LineStyle::Solid,
        }
    }

    /// Style of the start-year series
    pub const START: Self = Self::solid(Rgb::ORANGE);
    /// Style of the end-year series
    pub const END: Self = Self::solid(Rgb::DARK_RED);
}
