//! Sector windows around the mask center

use landshift_core::{Error, Result, DIRECTIONS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Which part of the rolled mask is counted for each direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectorWindow {
    /// Per axis: positive delta counts past the center, negative delta
    /// counts before it, zero delta counts the center line. The eight
    /// windows and the center cell partition the grid.
    ///
    /// Its counts match neither the `[cy.., cx..]` quadrant ([`LowerRight`])
    /// nor the whole-array sum ([`Full`]); pick one of those to reproduce
    /// results computed that way.
    ///
    /// [`LowerRight`]: SectorWindow::LowerRight
    /// [`Full`]: SectorWindow::Full
    #[default]
    Directional,
    /// `[cy.., cx..]` for every direction
    LowerRight,
    /// The whole rolled mask for every direction
    Full,
}

impl SectorWindow {
    pub fn name(&self) -> &'static str {
        match self {
            SectorWindow::Directional => "directional",
            SectorWindow::LowerRight => "lower-right",
            SectorWindow::Full => "full",
        }
    }
}

impl fmt::Display for SectorWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SectorWindow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "directional" => Ok(SectorWindow::Directional),
            "lower-right" => Ok(SectorWindow::LowerRight),
            "full" => Ok(SectorWindow::Full),
            other => Err(Error::InvalidParameter {
                name: "window",
                value: other.to_string(),
                reason: "expected 'directional', 'lower-right' or 'full'".to_string(),
            }),
        }
    }
}

/// Center and per-direction count windows for one grid shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorLayout {
    rows: usize,
    cols: usize,
    center: (usize, usize),
    windows: [(Range<usize>, Range<usize>); 8],
}

impl SectorLayout {
    pub fn new(rows: usize, cols: usize, window: SectorWindow) -> Self {
        let center = (rows / 2, cols / 2);
        let windows = DIRECTIONS.map(|step| match window {
            SectorWindow::Directional => (
                axis_range(step.row_delta, center.0, rows),
                axis_range(step.col_delta, center.1, cols),
            ),
            SectorWindow::LowerRight => (center.0..rows, center.1..cols),
            SectorWindow::Full => (0..rows, 0..cols),
        });

        Self {
            rows,
            cols,
            center,
            windows,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// `(height / 2, width / 2)`
    pub fn center(&self) -> (usize, usize) {
        self.center
    }

    /// Row and column ranges counted for the direction at table index `i`
    pub fn window(&self, i: usize) -> (Range<usize>, Range<usize>) {
        self.windows[i].clone()
    }
}

fn axis_range(delta: isize, center: usize, len: usize) -> Range<usize> {
    if len == 0 {
        return 0..0;
    }
    match delta.signum() {
        1 => (center + 1).min(len)..len,
        -1 => 0..center,
        _ => center..center + 1,
    }
}
