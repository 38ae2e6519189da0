//! Drawing entry points.
//!
//! These pick the rasterizer for a [`LineGc`]: one-pixel Bresenham paths
//! for width zero, stroked polygons otherwise, each in a solid and a dashed
//! flavour.

use crate::basics::Point;
use crate::convex_fill::fill_convex_polygon;
use crate::error::Result;
use crate::gc::{LineGc, LineStyle};
use crate::poly_edge::PolyVertex;
use crate::polygon_fill::fill_general_polygon;
use crate::span_sink::{Pen, SpanSink};
use crate::wide_line::{wide_dash, wide_line};
use crate::zero_line::{zero_dash_line, zero_line};

/// Shape hint for [`fill_polygon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonShape {
    /// Anything, including self-intersecting outlines.
    #[default]
    Complex,
    /// The caller promises the outline is convex.
    Convex,
}

/// Stroke the polyline `points` with `gc`.
pub fn poly_line(sink: &mut dyn SpanSink, gc: &LineGc, points: &[Point]) -> Result<()> {
    log::debug!(
        "poly_line: {} points, width {}, {:?}, {:?} caps, {:?} joins",
        points.len(),
        gc.line_width(),
        gc.line_style(),
        gc.cap_style(),
        gc.join_style()
    );
    let thin = gc.line_width() == 0;
    match (thin, gc.line_style()) {
        (true, LineStyle::Solid) => zero_line(sink, gc, points),
        (true, _) => zero_dash_line(sink, gc, points),
        (false, LineStyle::Solid) => wide_line(sink, gc, points),
        (false, _) => wide_dash(sink, gc, points),
    }
}

/// Stroke every `(start, end)` pair as its own two-point polyline. The dash
/// pattern restarts at the offset for every segment.
pub fn poly_segment(sink: &mut dyn SpanSink, gc: &LineGc, segments: &[(Point, Point)]) -> Result<()> {
    log::debug!("poly_segment: {} segments", segments.len());
    for &(start, end) in segments {
        poly_line(sink, gc, &[start, end])?;
    }
    Ok(())
}

/// Fill the closed polygon `points` with the fill rule of `gc`.
pub fn fill_polygon(
    sink: &mut dyn SpanSink,
    gc: &LineGc,
    shape: PolygonShape,
    points: &[Point],
) -> Result<()> {
    log::debug!(
        "fill_polygon: {} points, {:?}, {:?}",
        points.len(),
        shape,
        gc.fill_rule()
    );
    match shape {
        PolygonShape::Complex => fill_general_polygon(sink, Pen::Foreground, gc.fill_rule(), points),
        PolygonShape::Convex => {
            let vertices: Vec<PolyVertex> = points
                .iter()
                .map(|p| PolyVertex::new(p.x as f64, p.y as f64))
                .collect();
            fill_convex_polygon(sink, Pen::Foreground, &vertices, 0, 0, 0.0, 0.0)
        }
    }
}

/// Fill, or outline, the polygon `points`. The outline is closed back to
/// the first point.
pub fn draw_polygon(
    sink: &mut dyn SpanSink,
    gc: &LineGc,
    filled: bool,
    points: &[Point],
) -> Result<()> {
    if filled {
        return fill_polygon(sink, gc, PolygonShape::Complex, points);
    }
    let Some(&first) = points.first() else {
        return Ok(());
    };
    let mut closed = Vec::with_capacity(points.len() + 1);
    closed.extend_from_slice(points);
    closed.push(first);
    poly_line(sink, gc, &closed)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{FillingRule, Span};
    use crate::dash::DashPattern;
    use crate::gc::{CapStyle, Rop};
    use crate::span_sink::{PixelSurface, SpanRecorder};

    fn pts(list: &[(i32, i32)]) -> Vec<Point> {
        list.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn test_dispatch_by_width_and_style() {
        let line = pts(&[(0, 0), (20, 0)]);
        let dashes = DashPattern::new(&[5, 5]).unwrap();

        let mut rec = SpanRecorder::new();
        poly_line(&mut rec, &LineGc::new(), &line).unwrap();
        assert_eq!(rec.spans(Pen::Foreground), vec![Span::new(0, 0, 21)]);

        let mut rec = SpanRecorder::new();
        let gc = LineGc::new()
            .with_line_style(LineStyle::OnOffDash)
            .with_dashes(dashes.clone(), 0);
        poly_line(&mut rec, &gc, &line).unwrap();
        assert_eq!(rec.pixels(Pen::Foreground).len(), 11);

        let mut rec = SpanRecorder::new();
        poly_line(&mut rec, &LineGc::new().with_line_width(3), &line).unwrap();
        assert_eq!(rec.pixels(Pen::Foreground).len(), 60);

        let mut rec = SpanRecorder::new();
        let gc = gc.with_line_width(3);
        poly_line(&mut rec, &gc, &line).unwrap();
        assert_eq!(rec.pixels(Pen::Foreground).len(), 30);
    }

    #[test]
    fn test_segments_restart_dashes() {
        let gc = LineGc::new()
            .with_line_width(1)
            .with_line_style(LineStyle::OnOffDash)
            .with_dashes(DashPattern::new(&[3, 3]).unwrap(), 0);
        let mut rec = SpanRecorder::new();
        let segs = [
            (Point::new(0, 0), Point::new(4, 0)),
            (Point::new(0, 5), Point::new(4, 5)),
        ];
        poly_segment(&mut rec, &gc, &segs).unwrap();
        assert_eq!(
            rec.spans(Pen::Foreground),
            vec![Span::new(0, 0, 3), Span::new(5, 0, 3)]
        );
    }

    #[test]
    fn test_fill_polygon_shapes_agree_on_convex_input() {
        let quad = pts(&[(2, 1), (12, 3), (9, 11), (1, 8)]);
        let mut general = SpanRecorder::new();
        fill_polygon(&mut general, &LineGc::new(), PolygonShape::Complex, &quad).unwrap();
        let mut convex = SpanRecorder::new();
        fill_polygon(&mut convex, &LineGc::new(), PolygonShape::Convex, &quad).unwrap();
        assert!(!general.pixels(Pen::Foreground).is_empty());
        assert_eq!(general.pixels(Pen::Foreground), convex.pixels(Pen::Foreground));
    }

    #[test]
    fn test_fill_rule_comes_from_gc() {
        let star = pts(&[(50, 0), (79, 90), (2, 35), (98, 35), (21, 90)]);
        let mut gc = LineGc::new();
        gc.set_fill_rule(FillingRule::EvenOdd);
        let mut rec = SpanRecorder::new();
        fill_polygon(&mut rec, &gc, PolygonShape::Complex, &star).unwrap();
        assert!(!rec.coverage(Pen::Foreground).contains_key(&(50, 50)));
    }

    #[test]
    fn test_outline_is_closed() {
        let mut rec = SpanRecorder::new();
        let tri = pts(&[(0, 0), (10, 0), (10, 10)]);
        draw_polygon(&mut rec, &LineGc::new(), false, &tri).unwrap();
        let cov = rec.coverage(Pen::Foreground);
        // The closing edge runs back along the diagonal.
        assert!(cov.contains_key(&(5, 5)));
        assert_eq!(rec.max_overdraw(), 1);
        let mut none = SpanRecorder::new();
        draw_polygon(&mut none, &LineGc::new(), false, &[]).unwrap();
        assert!(none.batches().is_empty());
    }

    #[test]
    fn test_xor_stroke_on_surface() {
        let mut surface = PixelSurface::new(40, 40, Rop::Xor);
        surface.set_colors(0xff, 0);
        let gc = LineGc::new()
            .with_line_width(5)
            .with_cap_style(CapStyle::Round)
            .with_rop(Rop::Xor);
        let path = pts(&[(5, 5), (30, 8), (20, 30)]);
        poly_line(&mut surface, &gc, &path).unwrap();
        assert!(surface.data().iter().all(|&p| p == 0 || p == 0xff));
        assert!(surface.data().iter().any(|&p| p == 0xff));
        // Drawing twice restores the destination
        poly_line(&mut surface, &gc, &path).unwrap();
        assert!(surface.data().iter().all(|&p| p == 0));
    }
}
