//! SVG rendering of [`RadarChart`]

use crate::radar::RadarChart;
use crate::style::{Rgb, SeriesStyle};
use std::fmt::Write;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 660.0;
const CENTER_X: f64 = 320.0;
const CENTER_Y: f64 = 360.0;
const RADIUS: f64 = 230.0;

impl RadarChart {
    /// Render as a standalone SVG document.
    ///
    /// Bearing 0 (North) points up and bearings increase clockwise. The
    /// legend sits in the upper right corner.
    pub fn to_svg(&self) -> String {
        let scale = if self.r_max > 0.0 { RADIUS / self.r_max } else { 0.0 };
        let mut body = String::new();

        // Radial grid
        for tick in &self.radial_ticks {
            let r = tick.value * scale;
            let _ = write!(
                body,
                r##"  <circle cx="{CENTER_X:.1}" cy="{CENTER_Y:.1}" r="{r:.2}" fill="none" stroke="{grid}" stroke-width="0.8"/>
  <text x="{x:.2}" y="{y:.2}" font-size="10" fill="#6b7280">{label}</text>
"##,
                grid = Rgb::GRID,
                x = CENTER_X + 4.0,
                y = CENTER_Y - r - 2.0,
                label = escape(&tick.label),
            );
        }

        // Spokes and direction labels
        for tick in &self.x_ticks {
            let (x, y) = polar(tick.angle, RADIUS);
            let (lx, ly) = polar(tick.angle, RADIUS + 18.0);
            let _ = write!(
                body,
                r##"  <line x1="{CENTER_X:.1}" y1="{CENTER_Y:.1}" x2="{x:.2}" y2="{y:.2}" stroke="{grid}" stroke-width="0.8"/>
  <text x="{lx:.2}" y="{ly:.2}" text-anchor="middle" dominant-baseline="middle" font-size="13">{label}</text>
"##,
                grid = Rgb::GRID,
                label = escape(&tick.label),
            );
        }

        for series in &self.series {
            let path = series
                .points
                .iter()
                .enumerate()
                .map(|(i, &(angle, value))| {
                    let (x, y) = polar(angle, value * scale);
                    format!("{}{x:.2},{y:.2}", if i == 0 { "M" } else { "L" })
                })
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(
                body,
                r##"  <path d="{path}" fill="none" {stroke}/>"##,
                stroke = stroke_attributes(&series.style),
            );
        }

        let _ = write!(body, "{}", self.legend());

        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">
  <rect width="100%" height="100%" fill="white"/>
{title}{body}</svg>
"##,
            title = self.title_element(),
        )
    }

    fn title_element(&self) -> String {
        let mut out = String::from(
            r##"  <text x="320" y="28" text-anchor="middle" font-size="16" font-weight="600">"##,
        );
        for (i, line) in self.title.lines().enumerate() {
            let dy = if i == 0 { "0" } else { "1.2em" };
            let _ = write!(out, r#"<tspan x="320" dy="{dy}">{}</tspan>"#, escape(line));
        }
        out.push_str("</text>\n");
        out
    }

    fn legend(&self) -> String {
        let right = WIDTH - 16.0;
        let mut out = String::new();
        for (i, series) in self.series.iter().enumerate() {
            let y = 80.0 + i as f64 * 20.0;
            let _ = write!(
                out,
                r##"  <line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" {stroke}/>
  <text x="{tx:.1}" y="{ty:.1}" text-anchor="end" font-size="12">{label}</text>
"##,
                x1 = right - 24.0,
                x2 = right,
                tx = right - 30.0,
                ty = y + 4.0,
                stroke = stroke_attributes(&series.style),
                label = escape(&series.label),
            );
        }
        out
    }
}

/// Canvas position of a (bearing, radius) pair
fn polar(angle: f64, r: f64) -> (f64, f64) {
    (CENTER_X + r * angle.sin(), CENTER_Y - r * angle.cos())
}

fn stroke_attributes(style: &SeriesStyle) -> String {
    let mut attrs = format!(
        r#"stroke="{}" stroke-width="{}""#,
        style.color, style.line_width
    );
    if let Some(dash) = style.line_style.dasharray() {
        let _ = write!(attrs, r#" stroke-dasharray="{dash}""#);
    }
    attrs
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
