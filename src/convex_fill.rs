//! Floating-point convex polygon filler.
//!
//! Fills one convex polygon given with sub-pixel vertices plus an integer
//! and a fractional translation. Two edges are walked from the topmost
//! vertex, one forward and one backward around the ring, interpolating x
//! per scanline. A pixel is covered when its centre lies on or right of the
//! left boundary and strictly left of the right boundary.

use crate::basics::{iceil, Span};
use crate::error::{with_capacity, Result};
use crate::poly_edge::PolyVertex;
use crate::span_sink::{Pen, SpanSink};

/// Tolerance for matching a scanline to a vertex's y.
pub const EPSILON: f64 = 1e-6;

#[inline]
fn is_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Index of the topmost vertex, and the first and last scanline covered.
fn poly_y_bounds(points: &[PolyVertex], yftrans: f64) -> (usize, i32, i32) {
    let mut imin = 0;
    let mut ymin = points[0].y;
    let mut ymax = points[0].y;
    for (i, p) in points.iter().enumerate().skip(1) {
        if p.y < ymin {
            imin = i;
            ymin = p.y;
        }
        if p.y > ymax {
            ymax = p.y;
        }
    }
    (imin, iceil(ymin + yftrans), iceil(ymax + yftrans - 1.0))
}

/// Fill the convex polygon `points`, translated by
/// `(xtrans + xftrans, ytrans + yftrans)`.
///
/// Fewer than three points, or a polygon thinner than one scanline, draws
/// nothing. All spans go to the sink in one sorted batch.
#[allow(clippy::too_many_arguments)]
pub fn fill_convex_polygon(
    sink: &mut dyn SpanSink,
    pen: Pen,
    points: &[PolyVertex],
    xtrans: i32,
    ytrans: i32,
    xftrans: f64,
    yftrans: f64,
) -> Result<()> {
    let count = points.len();
    if count < 3 {
        return Ok(());
    }
    let (imin, ymin, ymax) = poly_y_bounds(points, yftrans);
    let rows = ymax - ymin + 1;
    if rows <= 0 {
        return Ok(());
    }

    let mut spans: Vec<Span> = with_capacity(rows as usize, "convex polygon spans")?;
    let mut marked: Vec<u8> = with_capacity(count, "convex polygon vertices")?;
    marked.resize(count, 0);

    let mut nextleft = imin;
    let mut nextright = imin;
    let (mut xl, mut xr, mut ml, mut mr) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    let mut y = iceil(points[nextleft].y + yftrans);

    while y <= ymax {
        let yf = y as f64;
        let mut advanced = false;

        // Add a left edge if we need to. The start vertex is shared by both
        // chains, so the right chain may visit a vertex one more time.
        let vy = points[nextleft].y + yftrans;
        if (yf > vy || is_equal(yf, vy)) && marked[nextleft] < 1 {
            marked[nextleft] += 1;
            let left = nextleft;
            nextleft = if nextleft + 1 >= count { 0 } else { nextleft + 1 };
            let dy = points[nextleft].y - points[left].y;
            if dy != 0.0 {
                ml = (points[nextleft].x - points[left].x) / dy;
                let dy = yf - (points[left].y + yftrans);
                xl = (points[left].x + xftrans) + ml * dy.max(0.0);
            }
            advanced = true;
        }

        // Add a right edge if we need to
        let vy = points[nextright].y + yftrans;
        if (yf > vy || is_equal(yf, vy)) && marked[nextright] < 2 {
            marked[nextright] += 1;
            let right = nextright;
            nextright = if nextright == 0 { count - 1 } else { nextright - 1 };
            let dy = points[nextright].y - points[right].y;
            if dy != 0.0 {
                mr = (points[nextright].x - points[right].x) / dy;
                let dy = yf - (points[right].y + yftrans);
                xr = (points[right].x + xftrans) + mr * dy.max(0.0);
            }
            advanced = true;
        }

        // Generate scans while there is both a left and a right edge
        let i = (points[nextleft].y.min(points[nextright].y) + yftrans) - yf;
        if i < EPSILON {
            if (marked[nextleft] != 0 && marked[nextright] != 0) || !advanced {
                break;
            }
            continue;
        }
        let mut j = (i as i32).max(1);
        while j > 0 {
            let cxl = iceil(xl);
            let cxr = iceil(xr);
            if xl < xr {
                spans.push(Span::new(y + ytrans, cxl + xtrans, cxr - cxl));
            } else {
                spans.push(Span::new(y + ytrans, cxr + xtrans, cxl - cxr));
            }
            y += 1;
            xl += ml;
            xr += mr;
            j -= 1;
        }
    }

    if !spans.is_empty() {
        sink.fill_spans(&spans, true, pen);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span_sink::SpanRecorder;
    use std::collections::BTreeSet;

    fn poly(list: &[(f64, f64)]) -> Vec<PolyVertex> {
        list.iter().map(|&(x, y)| PolyVertex::new(x, y)).collect()
    }

    fn fill(points: &[PolyVertex]) -> SpanRecorder {
        let mut rec = SpanRecorder::new();
        fill_convex_polygon(&mut rec, Pen::Foreground, points, 0, 0, 0.0, 0.0).unwrap();
        rec
    }

    /// Pixel centres strictly inside every edge, for polygons with no
    /// centre on a boundary.
    fn half_plane_pixels(points: &[PolyVertex]) -> BTreeSet<(i32, i32)> {
        let n = points.len();
        let area: f64 = (0..n)
            .map(|i| {
                let (a, b) = (points[i], points[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        let xmin = points.iter().map(|p| p.x).fold(f64::MAX, f64::min).floor() as i32 - 1;
        let xmax = points.iter().map(|p| p.x).fold(f64::MIN, f64::max).ceil() as i32 + 1;
        let ymin = points.iter().map(|p| p.y).fold(f64::MAX, f64::min).floor() as i32 - 1;
        let ymax = points.iter().map(|p| p.y).fold(f64::MIN, f64::max).ceil() as i32 + 1;
        let mut set = BTreeSet::new();
        for y in ymin..=ymax {
            for x in xmin..=xmax {
                let inside = (0..n).all(|i| {
                    let (a, b) = (points[i], points[(i + 1) % n]);
                    let c = (b.x - a.x) * (y as f64 - a.y) - (b.y - a.y) * (x as f64 - a.x);
                    if area > 0.0 {
                        c > 0.0
                    } else {
                        c < 0.0
                    }
                });
                if inside {
                    set.insert((x, y));
                }
            }
        }
        set
    }

    #[test]
    fn test_coverage_matches_half_planes() {
        let shapes = [
            poly(&[(0.3, 0.2), (10.7, 2.4), (8.1, 9.6), (1.9, 7.3)]),
            poly(&[(0.3, 0.2), (1.9, 7.3), (8.1, 9.6), (10.7, 2.4)]),
            poly(&[(5.5, -3.25), (12.1, 4.3), (-2.2, 6.6)]),
            poly(&[(0.5, 0.5), (6.5, 0.5), (6.5, 4.5), (0.5, 4.5)]),
        ];
        for shape in &shapes {
            let rec = fill(shape);
            let got: BTreeSet<(i32, i32)> = rec.pixels(Pen::Foreground).into_iter().collect();
            let expected = half_plane_pixels(shape);
            assert!(!expected.is_empty());
            assert_eq!(got, expected, "polygon {:?}", shape);
            assert_eq!(rec.max_overdraw(), 1);
        }
    }

    #[test]
    fn test_integer_rectangle() {
        let rec = fill(&poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)]));
        assert_eq!(
            rec.spans(Pen::Foreground),
            vec![Span::new(0, 0, 4), Span::new(1, 0, 4), Span::new(2, 0, 4)]
        );
        assert_eq!(rec.batches().len(), 1);
        assert!(rec.batches()[0].sorted);
    }

    #[test]
    fn test_translation() {
        let shape = poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)]);
        let mut rec = SpanRecorder::new();
        fill_convex_polygon(&mut rec, Pen::Foreground, &shape, 10, 20, 0.5, 0.5).unwrap();
        // Shifted by half a pixel: columns 11..15 (centres 11..14 inside
        // [10.5, 14.5)), rows 21..23.
        assert_eq!(
            rec.spans(Pen::Foreground),
            vec![Span::new(21, 11, 4), Span::new(22, 11, 4), Span::new(23, 11, 4)]
        );
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(fill(&poly(&[(0.0, 0.0), (5.0, 5.0)])).batches().is_empty());
        // Thinner than one scanline
        assert!(fill(&poly(&[(0.0, 0.2), (5.0, 0.3), (2.0, 0.6)])).batches().is_empty());
    }
}
