//! # landshift chart
//!
//! Turns a pair of directional count vectors into a radar chart.
//!
//! Each series is normalized to percentages of its own total, laid out on
//! the eight compass bearings of the shared direction table and closed back
//! onto its first point. [`compare`] returns a [`RadarChart`] value; writing
//! it out (for example with [`RadarChart::to_svg`]) is left to the caller.

pub mod distribution;
pub mod radar;
pub mod style;
mod svg;

pub use distribution::PercentDistribution;
pub use radar::{
    class_name, compare, series_label, title_for, AxisTick, ChartOptions, RadarChart, RadialTick,
    Series,
};
pub use style::{LineStyle, Rgb, SeriesStyle};
