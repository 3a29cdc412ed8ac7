//! Scanline polygon rasterization
//!
//! Rings are mapped into pixel space first, so rotated or south-up
//! transforms need no special handling. A pixel is inside when its center
//! falls inside the polygon under the even-odd rule or lies on an edge.

use geo::MultiPolygon;
use landshift_core::GeoTransform;
use ndarray::Array2;

/// Inside flags for a `rows x cols` grid georeferenced by `transform`.
pub(crate) fn rasterize(
    geometry: &MultiPolygon<f64>,
    transform: &GeoTransform,
    rows: usize,
    cols: usize,
) -> Array2<bool> {
    let mut inside = Array2::from_elem((rows, cols), false);
    if rows == 0 || cols == 0 {
        return inside;
    }

    let rings: Vec<Vec<(f64, f64)>> = geometry
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
        .map(|ring| {
            ring.coords()
                .map(|c| transform.geo_to_pixel(c.x, c.y))
                .collect()
        })
        .collect();

    let mut crossings: Vec<f64> = Vec::new();
    let mut spans: Vec<(f64, f64)> = Vec::new();

    for row in 0..rows {
        let y = row as f64 + 0.5;
        crossings.clear();
        spans.clear();

        for ring in &rings {
            for edge in ring.windows(2) {
                let (x0, y0) = edge[0];
                let (x1, y1) = edge[1];
                if (y0 > y) != (y1 > y) {
                    crossings.push(x0 + (y - y0) * (x1 - x0) / (y1 - y0));
                } else if y0 == y && y1 == y {
                    // Horizontal edge lying on the scanline
                    spans.push((x0.min(x1), x0.max(x1)));
                }
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        spans.extend(crossings.chunks_exact(2).map(|pair| (pair[0], pair[1])));

        for &(x_start, x_end) in &spans {
            // Pixel centers sit at col + 0.5
            let first = (x_start - 0.5).ceil().max(0.0);
            let last = (x_end - 0.5).floor().min(cols as f64 - 1.0);
            if last < first {
                continue;
            }
            for col in first as usize..=last as usize {
                inside[(row, col)] = true;
            }
        }
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn unit_transform(rows: usize) -> GeoTransform {
        GeoTransform::new(0.0, rows as f64, 1.0, -1.0)
    }

    fn as_grid(inside: &Array2<bool>) -> Vec<String> {
        inside
            .rows()
            .into_iter()
            .map(|r| r.iter().map(|&b| if b { '#' } else { '.' }).collect())
            .collect()
    }

    #[test]
    fn square_covers_its_pixels() {
        let poly = polygon![
            (x: 1.0, y: 1.0), (x: 4.0, y: 1.0), (x: 4.0, y: 4.0), (x: 1.0, y: 4.0), (x: 1.0, y: 1.0),
        ];
        let inside = rasterize(&MultiPolygon::new(vec![poly]), &unit_transform(5), 5, 5);
        assert_eq!(
            as_grid(&inside),
            vec![".....", ".###.", ".###.", ".###.", "....."]
        );
    }

    #[test]
    fn triangle_uses_pixel_centers() {
        // Hypotenuse from (0,0) to (4,4): centers strictly below it are in,
        // centers on it count as boundary.
        let poly = polygon![
            (x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 0.0),
        ];
        let inside = rasterize(&MultiPolygon::new(vec![poly]), &unit_transform(4), 4, 4);
        assert_eq!(as_grid(&inside), vec!["...#", "..##", ".###", "####"]);
    }

    #[test]
    fn holes_are_excluded() {
        let poly = polygon!(
            exterior: [
                (x: 0.0, y: 0.0), (x: 5.0, y: 0.0), (x: 5.0, y: 5.0), (x: 0.0, y: 5.0), (x: 0.0, y: 0.0),
            ],
            interiors: [
                [(x: 2.0, y: 2.0), (x: 3.0, y: 2.0), (x: 3.0, y: 3.0), (x: 2.0, y: 3.0), (x: 2.0, y: 2.0)]
            ]
        );
        let inside = rasterize(&MultiPolygon::new(vec![poly]), &unit_transform(5), 5, 5);
        assert_eq!(inside.iter().filter(|&&b| b).count(), 24);
        assert!(!inside[(2, 2)]);
    }

    #[test]
    fn multipolygon_parts_and_clamping() {
        let left = polygon![
            (x: -3.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 2.0), (x: -3.0, y: 2.0), (x: -3.0, y: 0.0),
        ];
        let right = polygon![
            (x: 3.0, y: 0.0), (x: 9.0, y: 0.0), (x: 9.0, y: 1.0), (x: 3.0, y: 1.0), (x: 3.0, y: 0.0),
        ];
        let inside = rasterize(&MultiPolygon::new(vec![left, right]), &unit_transform(2), 2, 4);
        assert_eq!(as_grid(&inside), vec!["#...", "#..#"]);
    }

    #[test]
    fn empty_grid() {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let inside = rasterize(&MultiPolygon::new(vec![poly]), &unit_transform(0), 0, 3);
        assert_eq!(inside.dim(), (0, 3));
    }
}
