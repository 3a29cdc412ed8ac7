//! Radar chart comparing two directional distributions

use crate::distribution::PercentDistribution;
use crate::style::SeriesStyle;
use landshift_core::{Direction, DirectionCounts, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of radial grid ticks, zero included
pub const RADIAL_TICKS: usize = 5;

/// Options for [`compare`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Chart title, may contain `\n` for a second line
    pub title: String,
    /// Legend entry of the start series
    pub start_label: String,
    /// Legend entry of the end series
    pub end_label: String,
    pub start_style: SeriesStyle,
    pub end_style: SeriesStyle,
    /// Draw an all-zero series instead of failing when a count vector sums
    /// to zero
    pub zero_fill_empty: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: String::from("Class Percentage Change"),
            start_label: String::from("Start Year"),
            end_label: String::from("End Year"),
            start_style: SeriesStyle::START,
            end_style: SeriesStyle::END,
            zero_fill_empty: false,
        }
    }
}

/// Display name of a land-cover class code
pub fn class_name(code: i64) -> String {
    match code {
        2 => String::from("Urban"),
        other => format!("Class {other}"),
    }
}

/// `"{class} Class Percentage Change\n{area}, {state}"`
pub fn title_for(class: &str, area: &str, state: &str) -> String {
    format!("{class} Class Percentage Change\n{area}, {state}")
}

/// `"{class} {year}"`
pub fn series_label(class: &str, year: &str) -> String {
    format!("{class} {year}")
}

/// One closed polygon of the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub style: SeriesStyle,
    pub distribution: PercentDistribution,
    /// (bearing, percent) pairs, first point repeated at the end
    pub points: Vec<(f64, f64)>,
}

impl Series {
    fn new(label: &str, style: SeriesStyle, distribution: PercentDistribution) -> Self {
        Self {
            label: label.to_string(),
            style,
            points: distribution.closed_loop(),
            distribution,
        }
    }
}

/// Angular tick at a direction bearing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub angle: f64,
    pub label: String,
}

/// Radial grid circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialTick {
    pub value: f64,
    pub label: String,
}

/// A fully laid-out radar chart.
///
/// Angles are compass bearings in radians (0 at North, clockwise), radii are
/// percentages. Rendering to a concrete format is done by
/// [`to_svg`](RadarChart::to_svg).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarChart {
    pub title: String,
    pub series: Vec<Series>,
    pub x_ticks: Vec<AxisTick>,
    pub radial_ticks: Vec<RadialTick>,
    /// Outermost radial value
    pub r_max: f64,
}

impl RadarChart {
    pub fn start(&self) -> &Series {
        &self.series[0]
    }

    pub fn end(&self) -> &Series {
        &self.series[1]
    }
}

/// Build the start/end comparison chart.
///
/// Each count vector is normalized by its own total.
///
/// # Errors
/// [`landshift_core::Error::EmptyDistribution`] when a vector sums to zero,
/// unless `options.zero_fill_empty` is set.
pub fn compare(
    counts_start: &DirectionCounts,
    counts_end: &DirectionCounts,
    options: &ChartOptions,
) -> Result<RadarChart> {
    let normalize = |counts: &DirectionCounts, series: &str| {
        if options.zero_fill_empty {
            Ok(PercentDistribution::from_counts_or_zero(counts))
        } else {
            PercentDistribution::from_counts(counts, series)
        }
    };
    let start = normalize(counts_start, &options.start_label)?;
    let end = normalize(counts_end, &options.end_label)?;

    let r_max = start.max().max(end.max());
    let radial_ticks = radial_ticks(r_max);
    let x_ticks = Direction::ALL
        .iter()
        .map(|d| AxisTick {
            angle: d.bearing(),
            label: d.name().to_string(),
        })
        .collect();

    debug!(
        "Radar chart '{}': max share {:.2}%",
        options.title.replace('\n', " "),
        r_max
    );

    Ok(RadarChart {
        title: options.title.clone(),
        series: vec![
            Series::new(&options.start_label, options.start_style, start),
            Series::new(&options.end_label, options.end_style, end),
        ],
        x_ticks,
        radial_ticks,
        r_max,
    })
}

fn radial_ticks(r_max: f64) -> Vec<RadialTick> {
    let step = r_max / (RADIAL_TICKS - 1) as f64;
    (0..RADIAL_TICKS)
        .map(|i| {
            let value = i as f64 * step;
            RadialTick {
                value,
                label: format!("{}%", value.trunc() as i64),
            }
        })
        .collect()
}
