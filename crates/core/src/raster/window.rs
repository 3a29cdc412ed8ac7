//! Rectangular pixel windows

use serde::{Deserialize, Serialize};

/// A rectangular block of pixels inside a raster: top-left offset plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelWindow {
    pub row_off: usize,
    pub col_off: usize,
    pub rows: usize,
    pub cols: usize,
}

impl PixelWindow {
    pub fn new(row_off: usize, col_off: usize, rows: usize, cols: usize) -> Self {
        Self { row_off, col_off, rows, cols }
    }

    /// A window with zero extent
    pub fn empty() -> Self {
        Self::default()
    }

    /// Window covering a whole `rows x cols` raster
    pub fn full(rows: usize, cols: usize) -> Self {
        Self::new(0, 0, rows, cols)
    }

    /// True when the window has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether the window lies within a raster of `rows x cols`
    pub fn fits(&self, rows: usize, cols: usize) -> bool {
        self.row_off + self.rows <= rows && self.col_off + self.cols <= cols
    }
}
