//! Directional aggregation of class-presence masks
//!
//! For every entry of the shared direction table the mask is rolled
//! cyclically by the entry's (row, col) deltas and the present pixels inside
//! that direction's sector window are counted. Rolling is never
//! materialized: the window is read through the shifted index
//! `mask[(r - dr) mod h][(c - dc) mod w]`.

mod sector;

pub use sector::{SectorLayout, SectorWindow};

use crate::clip::{ClassMask, MASK_PRESENT};
use landshift_core::{Algorithm, DirectionCounts, Error, Result, DIRECTIONS};
use ndarray::{Array2, ArrayView2};
use tracing::debug;

/// Directional count algorithm
#[derive(Debug, Clone, Default)]
pub struct DirectionalCount;

impl Algorithm for DirectionalCount {
    type Input = ClassMask;
    type Output = DirectionCounts;
    type Params = SectorWindow;
    type Error = Error;

    fn name(&self) -> &'static str {
        "DirectionalCount"
    }

    fn description(&self) -> &'static str {
        "Count class pixels in eight compass sectors around the mask center"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        Ok(aggregate(&input, params))
    }
}

/// Cyclic shift: `out[r][c] = mask[(r - dr) mod h][(c - dc) mod w]`
pub fn roll<T: Copy>(mask: ArrayView2<'_, T>, row_delta: isize, col_delta: isize) -> Array2<T> {
    let (rows, cols) = mask.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let sr = shifted(r, row_delta, rows);
        let sc = shifted(c, col_delta, cols);
        mask[(sr, sc)]
    })
}

fn shifted(index: usize, delta: isize, len: usize) -> usize {
    (index as isize - delta).rem_euclid(len as isize) as usize
}

/// Eight directional counts of `mask` in table order
pub fn aggregate(mask: &ClassMask, window: SectorWindow) -> DirectionCounts {
    aggregate_view(mask.view(), window)
}

/// [`aggregate`] on a raw 0/1 array
pub fn aggregate_view(mask: ArrayView2<'_, u8>, window: SectorWindow) -> DirectionCounts {
    let (rows, cols) = mask.dim();
    let layout = SectorLayout::new(rows, cols, window);
    let counts = count_with_layout(mask, &layout);
    debug!("Directional counts ({}): {:?}", window, counts.as_array());
    counts
}

/// Counts for a start/end pair of masks sharing one center.
///
/// # Errors
/// [`Error::ShapeMismatch`] when the masks differ in shape; nothing is
/// counted in that case.
pub fn aggregate_pair(
    start: &ClassMask,
    end: &ClassMask,
    window: SectorWindow,
) -> Result<(DirectionCounts, DirectionCounts)> {
    let (er, ec) = start.shape();
    let (ar, ac) = end.shape();
    if (er, ec) != (ar, ac) {
        return Err(Error::ShapeMismatch { er, ec, ar, ac });
    }

    let layout = SectorLayout::new(er, ec, window);
    let counts_start = count_with_layout(start.view(), &layout);
    let counts_end = count_with_layout(end.view(), &layout);

    debug!(
        "Directional counts ({}) around {:?}: start {:?}, end {:?}",
        window,
        layout.center(),
        counts_start.as_array(),
        counts_end.as_array()
    );

    Ok((counts_start, counts_end))
}

fn count_with_layout(mask: ArrayView2<'_, u8>, layout: &SectorLayout) -> DirectionCounts {
    let (rows, cols) = mask.dim();
    let mut counts = [0u64; 8];
    if rows == 0 || cols == 0 {
        return DirectionCounts::new(counts);
    }

    for (i, step) in DIRECTIONS.iter().enumerate() {
        let (row_range, col_range) = layout.window(i);
        let mut n = 0u64;
        for r in row_range {
            let sr = shifted(r, step.row_delta, rows);
            for c in col_range.clone() {
                let sc = shifted(c, step.col_delta, cols);
                if mask[(sr, sc)] == MASK_PRESENT {
                    n += 1;
                }
            }
        }
        counts[i] = n;
    }

    DirectionCounts::new(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::MASK_NODATA;
    use landshift_core::{Direction, GeoTransform};
    use ndarray::{array, s};

    fn mask(data: Array2<u8>) -> ClassMask {
        ClassMask::from_array(data, GeoTransform::default()).unwrap()
    }

    fn reference_mask() -> ClassMask {
        mask(array![
            [0, 0, 0, 0, 1],
            [0, 1, 0, 0, 0],
            [0, 0, 1, MASK_NODATA, 0],
            [0, 1, 1, 0, 0],
            [1, 0, 0, 0, 0],
        ])
    }

    #[test]
    fn roll_matches_definition() {
        let a = array![[1, 2, 3], [4, 5, 6]];
        assert_eq!(roll(a.view(), 1, 0), array![[4, 5, 6], [1, 2, 3]]);
        assert_eq!(roll(a.view(), 0, -1), array![[2, 3, 1], [5, 6, 4]]);
        assert_eq!(roll(a.view(), -1, 1), array![[6, 4, 5], [3, 1, 2]]);
    }

    #[test]
    fn golden_all_ones_4x4() {
        let ones = mask(Array2::from_elem((4, 4), 1));
        assert_eq!(
            aggregate(&ones, SectorWindow::Directional).as_array(),
            &[2, 2, 1, 1, 1, 2, 2, 4]
        );
        assert_eq!(aggregate(&ones, SectorWindow::LowerRight).as_array(), &[4; 8]);
        assert_eq!(aggregate(&ones, SectorWindow::Full).as_array(), &[16; 8]);
    }

    #[test]
    fn uniform_mask_sums_to_total_minus_center() {
        for (rows, cols) in [(3, 3), (4, 7), (10, 5)] {
            let ones = mask(Array2::from_elem((rows, cols), 1));
            let counts = aggregate(&ones, SectorWindow::Directional);
            assert_eq!(counts.total(), (rows * cols - 1) as u64);
        }
    }

    #[test]
    fn reference_mask_counts() {
        let m = reference_mask();
        assert_eq!(
            aggregate(&m, SectorWindow::Directional).as_array(),
            &[1, 3, 2, 2, 1, 1, 1, 2]
        );
        assert_eq!(
            aggregate(&m, SectorWindow::LowerRight).as_array(),
            &[1, 0, 2, 4, 3, 2, 2, 2]
        );
        // Rolling keeps every pixel, nodata never counts
        assert_eq!(aggregate(&m, SectorWindow::Full).as_array(), &[6; 8]);
    }

    #[test]
    fn default_window_differs_from_quadrant_and_full() {
        let m = reference_mask();
        let directional = aggregate(&m, SectorWindow::default());
        assert_ne!(directional, aggregate(&m, SectorWindow::LowerRight));
        assert_ne!(directional, aggregate(&m, SectorWindow::Full));

        // Positive deltas start past the center, the quadrant includes it
        let ones = mask(Array2::from_elem((4, 4), 1));
        let se = Direction::SE.index();
        assert_eq!(aggregate(&ones, SectorWindow::Directional).as_array()[se], 1);
        assert_eq!(aggregate(&ones, SectorWindow::LowerRight).as_array()[se], 4);
    }

    #[test]
    fn counting_matches_materialized_roll() {
        let m = reference_mask();
        let layout = SectorLayout::new(5, 5, SectorWindow::Directional);
        let counts = aggregate(&m, SectorWindow::Directional);
        for (i, step) in DIRECTIONS.iter().enumerate() {
            let rolled = roll(m.view(), step.row_delta, step.col_delta);
            let (rr, cr) = layout.window(i);
            let expected = rolled
                .slice(s![rr, cr])
                .iter()
                .filter(|&&v| v == MASK_PRESENT)
                .count() as u64;
            assert_eq!(counts.as_array()[i], expected, "{}", step.direction);
        }
    }

    #[test]
    fn center_pixel_reaches_every_sector() {
        let mut data = Array2::zeros((4, 4));
        data[(2, 2)] = MASK_PRESENT;
        assert_eq!(aggregate(&mask(data), SectorWindow::Directional).as_array(), &[1; 8]);

        let mut data = Array2::zeros((4, 4));
        data[(0, 0)] = MASK_PRESENT;
        assert_eq!(aggregate(&mask(data), SectorWindow::Directional).as_array(), &[0; 8]);
    }

    #[test]
    fn empty_and_absent_masks() {
        let zeros = mask(Array2::zeros((5, 6)));
        assert_eq!(aggregate(&zeros, SectorWindow::Directional).as_array(), &[0; 8]);
        let empty = mask(Array2::zeros((0, 4)));
        assert_eq!(aggregate(&empty, SectorWindow::Full).as_array(), &[0; 8]);
    }

    #[test]
    fn pair_agrees_with_single() {
        let a = reference_mask();
        let b = mask(Array2::from_elem((5, 5), 1));
        for window in [SectorWindow::Directional, SectorWindow::LowerRight, SectorWindow::Full] {
            let (ca, cb) = aggregate_pair(&a, &b, window).unwrap();
            assert_eq!(ca, aggregate(&a, window));
            assert_eq!(cb, aggregate(&b, window));
        }
    }

    #[test]
    fn pair_shape_mismatch() {
        let a = mask(Array2::zeros((4, 4)));
        let b = mask(Array2::zeros((4, 5)));
        match aggregate_pair(&a, &b, SectorWindow::Directional) {
            Err(Error::ShapeMismatch { er, ec, ar, ac }) => {
                assert_eq!((er, ec, ar, ac), (4, 4, 4, 5));
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn algorithm_trait() {
        let ones = mask(Array2::from_elem((4, 4), 1));
        let counts = DirectionalCount.execute_default(ones).unwrap();
        assert_eq!(counts.total(), 15);
    }
}
