//! Wide and dashed line stroking.
//!
//! A polyline is stroked segment by segment. Every segment is a convex quad
//! (or an axis-aligned rectangle) and reports a [`LineFace`] at each end;
//! consecutive faces are stitched with a join, free ends get a cap. Pieces
//! go straight to the sink, or, when the raster operation cannot tolerate
//! a pixel being painted twice, into a pair of [`SpanGroup`]s that are
//! flattened once the whole polyline is done.

use crate::basics::{iceil, ifloor, Point, Span};
use crate::dash::DashPhase;
use crate::error::{with_capacity, Result};
use crate::gc::{CapStyle, JoinStyle, LineGc, LineStyle};
use crate::poly_edge::{
    build_edge, build_poly, fill_poly_helper, rect_spans, ConvexEdges, PolyEdge, PolySlope,
    PolyVertex,
};
use crate::span_group::SpanGroup;
use crate::span_sink::{Pen, SpanSink};
use crate::zero_line::zero_dash_line;

/// Squared secant of half the smallest angle that still gets a miter
/// (about 11 degrees). Sharper joins are beveled.
pub const SQSECANT: f64 = 108.856472512142;

/// Row sentinel for a clip edge that never starts.
const NO_EDGE_ROW: i32 = 65536;

// ============================================================================
// LineFace
// ============================================================================

/// One end of a stroked segment.
///
/// `(x, y)` is the integer endpoint, `(dx, dy)` the direction pointing into
/// the segment, `(xa, ya)` the offset from the endpoint to one corner of the
/// stroke and `k` the line constant of the stroke's side through it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineFace {
    pub xa: f64,
    pub ya: f64,
    pub dx: i32,
    pub dy: i32,
    pub x: i32,
    pub y: i32,
    pub k: f64,
}

// ============================================================================
// SpanData / StrokeOutput
// ============================================================================

/// Foreground and background span groups for exactly-once painting.
#[derive(Debug, Clone, Default)]
pub struct SpanData {
    pub fg: SpanGroup,
    pub bg: SpanGroup,
}

impl SpanData {
    /// Span groups for a polyline of `npt` points, or `None` when pieces
    /// can be painted directly.
    ///
    /// Grouping is only needed when the raster operation is careful and
    /// pieces can actually overlap: three or more points, or round caps.
    pub fn setup(gc: &LineGc, npt: usize) -> Option<SpanData> {
        if (npt < 3 && gc.cap_style() != CapStyle::Round) || !gc.rop().is_careful() {
            return None;
        }
        Some(SpanData::default())
    }

    /// File `spans` under `pen`. A piece takes its pixels away from the
    /// other group; foreground pieces only do so for double dashes.
    pub fn append(&mut self, pen: Pen, spans: Vec<Span>, double_dash: bool) -> Result<()> {
        match pen {
            Pen::Foreground => {
                let other = if double_dash { Some(&mut self.bg) } else { None };
                self.fg.append_spans(other, spans)
            }
            Pen::Background => self.bg.append_spans(Some(&mut self.fg), spans),
        }
    }

    /// Flush the background group, then the foreground group, each with
    /// every pixel painted once.
    pub fn cleanup(&mut self, sink: &mut dyn SpanSink, double_dash: bool) -> Result<()> {
        let bg = if double_dash {
            self.bg.fill_unique(sink, Pen::Background)
        } else {
            self.bg.clear();
            Ok(())
        };
        let fg = self.fg.fill_unique(sink, Pen::Foreground);
        bg.and(fg)
    }
}

/// Destination of every stroke piece for one polyline.
pub struct StrokeOutput<'a> {
    sink: &'a mut dyn SpanSink,
    gc: &'a LineGc,
    span_data: Option<SpanData>,
}

impl<'a> StrokeOutput<'a> {
    pub fn new(sink: &'a mut dyn SpanSink, gc: &'a LineGc, npt: usize) -> Self {
        Self {
            sink,
            gc,
            span_data: SpanData::setup(gc, npt),
        }
    }

    /// Always paint directly, whatever the raster operation.
    pub fn direct(sink: &'a mut dyn SpanSink, gc: &'a LineGc) -> Self {
        Self {
            sink,
            gc,
            span_data: None,
        }
    }

    pub fn gc(&self) -> &LineGc {
        self.gc
    }

    /// `true` when pieces reach the sink as soon as they are built.
    pub fn is_direct(&self) -> bool {
        self.span_data.is_none()
    }

    pub fn emit(&mut self, pen: Pen, spans: Vec<Span>) -> Result<()> {
        let double_dash = self.gc.line_style() == LineStyle::DoubleDash;
        match &mut self.span_data {
            Some(data) => data.append(pen, spans, double_dash),
            None => {
                if !spans.is_empty() {
                    self.sink.fill_spans(&spans, true, pen);
                }
                Ok(())
            }
        }
    }

    /// Paint whatever was grouped.
    pub fn finish(mut self) -> Result<()> {
        let double_dash = self.gc.line_style() == LineStyle::DoubleDash;
        match self.span_data.take() {
            Some(mut data) => data.cleanup(self.sink, double_dash),
            None => Ok(()),
        }
    }
}

fn fill_poly(out: &mut StrokeOutput, pen: Pen, edges: &ConvexEdges) -> Result<()> {
    let spans = fill_poly_helper(edges.top, edges.height, &edges.left, &edges.right)?;
    out.emit(pen, spans)
}

fn fill_rect(out: &mut StrokeOutput, pen: Pen, x: i32, y: i32, w: i32, h: i32) -> Result<()> {
    let spans = rect_spans(x, y, w, h)?;
    out.emit(pen, spans)
}

/// A single pixel, always painted directly.
fn line_one_point(out: &mut StrokeOutput, pen: Pen, x: i32, y: i32) {
    out.sink.fill_spans(&[Span::new(y, x, 1)], true, pen);
}

// ============================================================================
// Segments
// ============================================================================

/// Stroke the segment `(x1, y1) -> (x2, y2)` and fill in both faces.
///
/// Segments are always rasterized top to bottom; `left_face` still ends up
/// describing `(x1, y1)`. A projecting end is extended by half the line
/// width.
#[allow(clippy::too_many_arguments)]
pub fn wide_segment(
    out: &mut StrokeOutput,
    pen: Pen,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    project_left: bool,
    project_right: bool,
    left_face: &mut LineFace,
    right_face: &mut LineFace,
) -> Result<()> {
    let lw = out.gc.line_width();

    // Draw top-to-bottom always
    let swap = y2 < y1 || (y2 == y1 && x2 < x1);
    let (x1, y1, x2, y2, project_left, project_right, left_face, right_face) = if swap {
        (x2, y2, x1, y1, project_right, project_left, right_face, left_face)
    } else {
        (x1, y1, x2, y2, project_left, project_right, left_face, right_face)
    };

    let dy = y2 - y1;
    let dx = x2 - x1;
    let signdx = if dx < 0 { -1 } else { 1 };

    left_face.x = x1;
    left_face.y = y1;
    left_face.dx = dx;
    left_face.dy = dy;

    right_face.x = x2;
    right_face.y = y2;
    right_face.dx = -dx;
    right_face.dy = -dy;

    if dy == 0 {
        right_face.xa = 0.0;
        right_face.ya = lw as f64 / 2.0;
        right_face.k = -(lw as f64 * dx as f64) / 2.0;
        left_face.xa = 0.0;
        left_face.ya = -right_face.ya;
        left_face.k = right_face.k;
        let mut x = x1;
        if project_left {
            x -= lw >> 1;
        }
        let y = y1 - (lw >> 1);
        let mut w = x2 - x;
        if project_right {
            w += (lw + 1) >> 1;
        }
        return fill_rect(out, pen, x, y, w, lw);
    }

    if dx == 0 {
        left_face.xa = lw as f64 / 2.0;
        left_face.ya = 0.0;
        left_face.k = lw as f64 * dy as f64 / 2.0;
        right_face.xa = -left_face.xa;
        right_face.ya = 0.0;
        right_face.k = left_face.k;
        let mut y = y1;
        if project_left {
            y -= lw >> 1;
        }
        let x = x1 - (lw >> 1);
        let mut h = y2 - y;
        if project_right {
            h += (lw + 1) >> 1;
        }
        return fill_rect(out, pen, x, y, lw, h);
    }

    let l = lw as f64 / 2.0;
    let big_l = (dx as f64).hypot(dy as f64);
    let r = l / big_l;

    // Coord of upper bound at integral y
    let mut ya = -r * dx as f64;
    let mut xa = r * dy as f64;

    let (project_xoff, project_yoff) = if project_left || project_right {
        (-ya, xa)
    } else {
        (0.0, 0.0)
    };

    // xa * dy - ya * dx
    let mut k = l * big_l;

    left_face.xa = xa;
    left_face.ya = ya;
    left_face.k = k;
    right_face.xa = -xa;
    right_face.ya = -ya;
    right_face.k = k;

    let (mut right, righty) = if project_left {
        build_edge(xa - project_xoff, ya - project_yoff, k, dx, dy, x1, y1, false)
    } else {
        build_edge(xa, ya, k, dx, dy, x1, y1, false)
    };

    // Coord of lower bound at integral y
    ya = -ya;
    xa = -xa;
    k = -k;

    let (mut left, lefty) = if project_left {
        build_edge(xa - project_xoff, ya - project_yoff, k, dx, dy, x1, y1, true)
    } else {
        build_edge(xa, ya, k, dx, dy, x1, y1, true)
    };

    // Coord of top face at integral y
    if signdx > 0 {
        ya = -ya;
        xa = -xa;
    }

    let (mut top, topy) = if project_left {
        let xap = xa - project_xoff;
        let yap = ya - project_yoff;
        build_edge(xap, yap, xap * dx as f64 + yap * dy as f64, -dy, dx, x1, y1, dx > 0)
    } else {
        build_edge(xa, ya, 0.0, -dy, dx, x1, y1, dx > 0)
    };

    // Coord of bottom face at integral y
    let ((mut bottom, bottomy), maxy) = if project_right {
        let xap = xa + project_xoff;
        let yap = ya + project_yoff;
        (
            build_edge(xap, yap, xap * dx as f64 + yap * dy as f64, -dy, dx, x2, y2, dx < 0),
            -ya + project_yoff,
        )
    } else {
        (build_edge(xa, ya, 0.0, -dy, dx, x2, y2, dx < 0), -ya)
    };

    let finaly = iceil(maxy) + y2;

    if dx < 0 {
        left.height = bottomy - lefty;
        right.height = finaly - righty;
        top.height = righty - topy;
    } else {
        right.height = bottomy - righty;
        left.height = finaly - lefty;
        top.height = lefty - topy;
    }
    bottom.height = finaly - bottomy;

    let (lefts, rights) = if dx < 0 {
        ([left, bottom], [top, right])
    } else {
        ([top, left], [right, bottom])
    };
    let spans = fill_poly_helper(topy, bottom.height + bottomy - topy, &lefts, &rights)?;
    out.emit(pen, spans)
}

// ============================================================================
// Joins
// ============================================================================

/// Join the segment ending at `right` to the one starting at `left`.
///
/// Both faces describe the shared vertex. They may be flipped in place.
pub fn line_join(
    out: &mut StrokeOutput,
    pen: Pen,
    left: &mut LineFace,
    right: &mut LineFace,
) -> Result<()> {
    let mut join_style = out.gc.join_style();
    let lw = out.gc.line_width();
    let mut denom = 0.0;

    if lw == 1 && out.is_direct() {
        // Lines going in the same direction have no join
        if (left.dx >= 0) == (right.dx <= 0) {
            return Ok(());
        }
        if join_style != JoinStyle::Round {
            denom = -left.dx as f64 * right.dy as f64 + right.dx as f64 * left.dy as f64;
            if denom == 0.0 {
                return Ok(());
            }
        }
        if join_style != JoinStyle::Miter {
            line_one_point(out, pen, left.x, left.y);
            return Ok(());
        }
    } else {
        if join_style == JoinStyle::Round {
            return line_arc(out, pen, Some(left), Some(right), 0.0, 0.0, true);
        }
        denom = -left.dx as f64 * right.dy as f64 + right.dx as f64 * left.dy as f64;
        if denom == 0.0 {
            return Ok(());
        }
    }

    let swapslopes = if denom > 0.0 {
        left.xa = -left.xa;
        left.ya = -left.ya;
        left.dx = -left.dx;
        left.dy = -left.dy;
        false
    } else {
        right.xa = -right.xa;
        right.ya = -right.ya;
        right.dx = -right.dx;
        right.dy = -right.dy;
        true
    };

    let mut vertices = [PolyVertex::default(); 4];
    let mut slopes = [PolySlope::default(); 4];

    vertices[0] = PolyVertex::new(right.xa, right.ya);
    slopes[0] = PolySlope::new(-right.dy, right.dx, 0.0);

    vertices[1] = PolyVertex::new(0.0, 0.0);
    slopes[1] = PolySlope::new(left.dy, -left.dx, 0.0);

    vertices[2] = PolyVertex::new(left.xa, left.ya);

    let (mut mx, mut my) = (0.0, 0.0);
    if join_style == JoinStyle::Miter {
        my = (left.dy as f64 * (right.xa * right.dy as f64 - right.ya * right.dx as f64)
            - right.dy as f64 * (left.xa * left.dy as f64 - left.ya * left.dx as f64))
            / denom;
        mx = if left.dy != 0 {
            left.xa + (my - left.ya) * left.dx as f64 / left.dy as f64
        } else {
            right.xa + (my - right.ya) * right.dx as f64 / right.dy as f64
        };
        // Check miter limit
        if (mx * mx + my * my) * 4.0 > SQSECANT * lw as f64 * lw as f64 {
            log::trace!("miter at ({}, {}) exceeds limit, beveling", left.x, left.y);
            join_style = JoinStyle::Bevel;
        }
    }

    let edgecount = if join_style == JoinStyle::Miter {
        let sign = if swapslopes { -1 } else { 1 };
        slopes[2] = PolySlope::new(sign * left.dx, sign * left.dy, sign as f64 * left.k);
        vertices[3] = PolyVertex::new(mx, my);
        slopes[3] = PolySlope::new(sign * right.dx, sign * right.dy, sign as f64 * right.k);
        4
    } else {
        let dx = right.xa - left.xa;
        let dy = right.ya - left.ya;
        let scale = dx.abs().max(dy.abs());
        let sdx = ((dx * 65536.0) / scale) as i32;
        let sdy = ((dy * 65536.0) / scale) as i32;
        let k = ((left.xa + right.xa) * sdy as f64 - (left.ya + right.ya) * sdx as f64) / 2.0;
        slopes[2] = PolySlope::new(sdx, sdy, k);
        3
    };

    let edges = build_poly(&vertices[..edgecount], &slopes[..edgecount], left.x, left.y);
    fill_poly(out, pen, &edges)
}

// ============================================================================
// Round arcs
// ============================================================================

/// A disc of diameter `lw` centred on an integer pixel, by the midpoint
/// circle algorithm. Spans come out top to bottom.
pub fn line_arc_i(lw: i32, xorg: i32, yorg: i32) -> Result<Vec<Span>> {
    let mut spans: Vec<Span> = with_capacity(lw.max(1) as usize, "arc spans")?;
    if lw <= 1 {
        spans.push(Span::new(yorg, xorg, 1));
        return Ok(spans);
    }
    let mut bottom: Vec<Span> = with_capacity((lw >> 1) as usize + 1, "arc spans")?;
    let mut y = (lw >> 1) + 1;
    let mut e = if lw & 1 != 0 { -((y << 2) + 3) } else { -(y << 3) };
    let mut ex = -4;
    let mut x = 0;
    while y != 0 {
        e += (y << 3) - 4;
        while e >= 0 {
            x += 1;
            ex = -((x << 3) + 4);
            e += ex;
        }
        y -= 1;
        let mut slw = (x << 1) + 1;
        if e == ex && slw > 1 {
            slw -= 1;
        }
        spans.push(Span::new(yorg - y, xorg - x, slw));
        if y != 0 && (slw > 1 || e != ex) {
            bottom.push(Span::new(yorg + y, xorg - x, slw));
        }
    }
    spans.extend(bottom.into_iter().rev());
    Ok(spans)
}

/// Clip the row `[xcl, xcr]` against `edge` if it is active on `ybase`,
/// then step the edge.
#[inline]
fn clip_step_edge(
    ybase: i32,
    edgey: &mut i32,
    edge: &mut PolyEdge,
    edgeleft: bool,
    xcl: &mut i32,
    xcr: &mut i32,
) {
    if ybase != *edgey {
        return;
    }
    if edgeleft {
        if edge.x > *xcl {
            *xcl = edge.x;
        }
    } else if edge.x < *xcr {
        *xcr = edge.x;
    }
    *edgey += 1;
    edge.step();
}

/// A disc of diameter `lw` centred anywhere, clipped by up to two edges.
///
/// An edge with `dy < 0` does not clip. A left edge keeps pixels on or
/// right of it, a right edge pixels on or left of it.
#[allow(clippy::too_many_arguments)]
pub fn line_arc_d(
    lw: i32,
    xorg: f64,
    yorg: f64,
    edge1: &mut PolyEdge,
    mut edgey1: i32,
    edgeleft1: bool,
    edge2: &mut PolyEdge,
    mut edgey2: i32,
    edgeleft2: bool,
) -> Result<Vec<Span>> {
    let mut spans: Vec<Span> = with_capacity(lw.max(1) as usize + 1, "arc spans")?;

    let xbase = ifloor(xorg);
    let x0 = xorg - xbase as f64;
    let mut ybase = iceil(yorg);
    let y0 = yorg - ybase as f64;
    let xlk = x0 + x0 + 1.0;
    let xrk = x0 + x0 - 1.0;
    let yk = y0 + y0 - 1.0;
    let radius = lw as f64 / 2.0;
    let mut y = ifloor(radius - y0 + 1.0);
    ybase -= y;
    let mut ymin = ybase;
    let mut ymax = NO_EDGE_ROW;

    let mut edge1_is_min = false;
    let ymin1 = edgey1;
    if edge1.dy >= 0 {
        if edge1.dy == 0 {
            if edgeleft1 {
                edge1_is_min = true;
            } else {
                ymax = edgey1;
            }
            edgey1 = NO_EDGE_ROW;
        } else if (edge1.signdx < 0) == edgeleft1 {
            edge1_is_min = true;
        }
    }
    let mut edge2_is_min = false;
    let ymin2 = edgey2;
    if edge2.dy >= 0 {
        if edge2.dy == 0 {
            if edgeleft2 {
                edge2_is_min = true;
            } else {
                ymax = edgey2;
            }
            edgey2 = NO_EDGE_ROW;
        } else if (edge2.signdx < 0) == edgeleft2 {
            edge2_is_min = true;
        }
    }
    if edge1_is_min {
        ymin = ymin1;
        if edge2_is_min && ymin1 > ymin2 {
            ymin = ymin2;
        }
    } else if edge2_is_min {
        ymin = ymin2;
    }

    let mut el = radius * radius - ((y as f64 + y0) * (y as f64 + y0)) - (x0 * x0);
    let mut er = el + xrk;
    let mut xl = 1;
    let mut xr = 0;
    if x0 < 0.5 {
        xl = 0;
        el -= xlk;
    }

    // Top half
    let mut boty = if y0 < -0.5 { 1 } else { 0 };
    if ybase + y - boty > ymax {
        boty = ymax - ybase - y;
    }
    while y > boty {
        let k = (y << 1) as f64 + yk;
        er += k;
        while er > 0.0 {
            xr += 1;
            er += xrk - (xr << 1) as f64;
        }
        el += k;
        while el >= 0.0 {
            xl -= 1;
            el += (xl << 1) as f64 - xlk;
        }
        y -= 1;
        ybase += 1;
        if ybase < ymin {
            continue;
        }
        let mut xcl = xl + xbase;
        let mut xcr = xr + xbase;
        clip_step_edge(ybase, &mut edgey1, edge1, edgeleft1, &mut xcl, &mut xcr);
        clip_step_edge(ybase, &mut edgey2, edge2, edgeleft2, &mut xcl, &mut xcr);
        if xcr >= xcl {
            spans.push(Span::new(ybase, xcl, xcr - xcl + 1));
        }
    }

    // Bottom half
    er = xrk - (xr << 1) as f64 - er;
    el = (xl << 1) as f64 - xlk - el;
    boty = ifloor(-y0 - radius + 1.0);
    if ybase + y - boty > ymax {
        boty = ymax - ybase - y;
    }
    while y > boty {
        let k = (y << 1) as f64 + yk;
        er -= k;
        while er >= 0.0 && xr >= 0 {
            xr -= 1;
            er += xrk - (xr << 1) as f64;
        }
        el -= k;
        while el > 0.0 && xl <= 0 {
            xl += 1;
            el += (xl << 1) as f64 - xlk;
        }
        y -= 1;
        ybase += 1;
        if ybase < ymin {
            continue;
        }
        let mut xcl = xl + xbase;
        let mut xcr = xr + xbase;
        clip_step_edge(ybase, &mut edgey1, edge1, edgeleft1, &mut xcl, &mut xcr);
        clip_step_edge(ybase, &mut edgey2, edge2, edgeleft2, &mut xcl, &mut xcr);
        if xcr >= xcl {
            spans.push(Span::new(ybase, xcl, xcr - xcl + 1));
        }
    }
    Ok(spans)
}

/// A clip edge with its first row and side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcClip {
    pub edge: PolyEdge,
    pub y: i32,
    pub left: bool,
}

impl Default for ArcClip {
    fn default() -> Self {
        Self {
            edge: PolyEdge {
                dy: -1,
                ..Default::default()
            },
            y: NO_EDGE_ROW,
            left: false,
        }
    }
}

/// Horizontal clip edge, parked far to the left.
fn horizontal_clip(y: i32, left: bool) -> ArcClip {
    ArcClip {
        edge: PolyEdge {
            height: 0,
            x: -32767,
            stepx: 0,
            signdx: 0,
            e: -1,
            dy: 0,
            dx: 0,
        },
        y,
        left,
    }
}

/// The clip edge running along `face`'s side of a round join.
pub fn round_join_face(face: &LineFace) -> ArcClip {
    let mut dx = -face.dy;
    let mut dy = face.dx;
    let mut xa = face.xa;
    let mut ya = face.ya;
    let mut left = true;
    if ya > 0.0 {
        ya = 0.0;
        xa = 0.0;
    }
    if dy < 0 || (dy == 0 && dx > 0) {
        dx = -dx;
        dy = -dy;
        left = !left;
    }
    if dx == 0 && dy == 0 {
        dy = 1;
    }
    if dy == 0 {
        return horizontal_clip(iceil(face.ya) + face.y, !left);
    }
    let (mut edge, y) = build_edge(xa, ya, 0.0, dx, dy, face.x, face.y, !left);
    edge.height = 32767;
    ArcClip { edge, y, left: !left }
}

/// Clip edges for a round join between `left` and `right`. The face on
/// the outside of the turn is flipped in place.
pub fn round_join_clip(left: &mut LineFace, right: &mut LineFace) -> (ArcClip, ArcClip) {
    let denom = -left.dx as f64 * right.dy as f64 + right.dx as f64 * left.dy as f64;
    if denom >= 0.0 {
        left.xa = -left.xa;
        left.ya = -left.ya;
    } else {
        right.xa = -right.xa;
        right.ya = -right.ya;
    }
    (round_join_face(left), round_join_face(right))
}

/// The clip edge cutting a round cap off along `face`.
pub fn round_cap_clip(face: &LineFace, is_int: bool) -> ArcClip {
    let mut dx = -face.dy;
    let mut dy = face.dx;
    let mut xa = face.xa;
    let mut ya = face.ya;
    let k = if is_int { 0.0 } else { face.k };
    let mut left = true;
    if dy < 0 || (dy == 0 && dx > 0) {
        dx = -dx;
        dy = -dy;
        xa = -xa;
        ya = -ya;
        left = !left;
    }
    if dx == 0 && dy == 0 {
        dy = 1;
    }
    if dy == 0 {
        return horizontal_clip(iceil(face.ya) + face.y, !left);
    }
    let (mut edge, y) = build_edge(xa, ya, k, dx, dy, face.x, face.y, !left);
    edge.height = 32767;
    ArcClip { edge, y, left: !left }
}

/// Whether round pieces must be clipped against their neighbours.
fn arc_needs_clip(gc: &LineGc) -> bool {
    let cap = gc.cap_style();
    let join = gc.join_style();
    ((gc.line_style() != LineStyle::Solid || gc.line_width() > 2)
        && cap == CapStyle::Round
        && join != JoinStyle::Round)
        || (join == JoinStyle::Round && matches!(cap, CapStyle::Butt | CapStyle::NotLast))
}

/// A round cap or join.
///
/// With `is_int` the arc is centred on the integer point of whichever face
/// is given; otherwise on `(xorg, yorg)`. Depending on the line style the
/// arc is clipped by the given faces.
pub fn line_arc(
    out: &mut StrokeOutput,
    pen: Pen,
    left_face: Option<&mut LineFace>,
    right_face: Option<&mut LineFace>,
    xorg: f64,
    yorg: f64,
    is_int: bool,
) -> Result<()> {
    let lw = out.gc.line_width();
    let (xorgi, yorgi) = match (&left_face, &right_face) {
        (Some(f), _) | (None, Some(f)) if is_int => (f.x, f.y),
        _ => (0, 0),
    };
    let mut clip1 = ArcClip::default();
    let mut clip2 = ArcClip::default();
    let (mut xorg, mut yorg, mut is_int) = (xorg, yorg, is_int);

    if arc_needs_clip(out.gc) {
        if is_int {
            xorg = xorgi as f64;
            yorg = yorgi as f64;
        }
        match (left_face, right_face) {
            (Some(l), Some(r)) => {
                let (c1, c2) = round_join_clip(l, r);
                clip1 = c1;
                clip2 = c2;
            }
            (Some(l), None) => clip1 = round_cap_clip(l, is_int),
            (None, Some(r)) => clip2 = round_cap_clip(r, is_int),
            (None, None) => {}
        }
        is_int = false;
    }

    let spans = if is_int {
        line_arc_i(lw, xorgi, yorgi)?
    } else {
        line_arc_d(
            lw,
            xorg,
            yorg,
            &mut clip1.edge,
            clip1.y,
            clip1.left,
            &mut clip2.edge,
            clip2.y,
            clip2.left,
        )?
    };
    out.emit(pen, spans)
}

// ============================================================================
// Projecting caps
// ============================================================================

/// A square cap extending half the line width past `face`'s endpoint.
///
/// `is_left` selects whether `face` starts (true) or ends the segment.
pub fn line_projecting_cap(
    out: &mut StrokeOutput,
    pen: Pen,
    face: &LineFace,
    is_left: bool,
) -> Result<()> {
    let lw = out.gc.line_width();
    let xorgi = face.x;
    let yorgi = face.y;
    let dx = face.dx;
    let dy = face.dy;
    let mut k = face.k;

    if dy == 0 {
        let mut left = PolyEdge {
            height: lw,
            x: xorgi,
            stepx: 0,
            signdx: 1,
            e: -lw,
            dx: 0,
            dy: lw,
        };
        if is_left {
            left.x -= lw >> 1;
        }
        let mut right = left;
        right.x = xorgi;
        if !is_left {
            right.x += (lw + 1) >> 1;
        }
        let spans = fill_poly_helper(yorgi - (lw >> 1), lw, &[left], &[right])?;
        return out.emit(pen, spans);
    }

    if dx == 0 {
        let mut topy = yorgi;
        let mut bottomy = yorgi + dy;
        if is_left {
            topy -= lw >> 1;
        } else {
            bottomy += lw >> 1;
        }
        let left = PolyEdge {
            height: bottomy - topy,
            x: xorgi - (lw >> 1),
            stepx: 0,
            signdx: 1,
            e: -dy,
            dx,
            dy,
        };
        let right = PolyEdge {
            x: left.x + (lw - 1),
            ..left
        };
        let spans = fill_poly_helper(topy, bottomy - topy, &[left], &[right])?;
        return out.emit(pen, spans);
    }

    let mut xa = face.xa;
    let mut ya = face.ya;
    let project_xoff = -ya;
    let project_yoff = xa;

    let (right, left, top, bottom, maxy) = if is_left {
        let right = build_edge(xa, ya, k, dx, dy, xorgi, yorgi, false);

        xa = -xa;
        ya = -ya;
        k = -k;
        let left = build_edge(
            xa - project_xoff,
            ya - project_yoff,
            k,
            dx,
            dy,
            xorgi,
            yorgi,
            true,
        );
        if dx > 0 {
            ya = -ya;
            xa = -xa;
        }
        let xap = xa - project_xoff;
        let yap = ya - project_yoff;
        let top = build_edge(
            xap,
            yap,
            xap * dx as f64 + yap * dy as f64,
            -dy,
            dx,
            xorgi,
            yorgi,
            dx > 0,
        );
        let bottom = build_edge(xa, ya, 0.0, -dy, dx, xorgi, yorgi, dx < 0);
        (right, left, top, bottom, -ya)
    } else {
        let right = build_edge(
            xa - project_xoff,
            ya - project_yoff,
            k,
            dx,
            dy,
            xorgi,
            yorgi,
            false,
        );

        xa = -xa;
        ya = -ya;
        k = -k;
        let left = build_edge(xa, ya, k, dx, dy, xorgi, yorgi, true);
        if dx > 0 {
            ya = -ya;
            xa = -xa;
        }
        let xap = xa - project_xoff;
        let yap = ya - project_yoff;
        let top = build_edge(xa, ya, 0.0, -dy, dx, xorgi, yorgi, dx > 0);
        let bottom = build_edge(
            xap,
            yap,
            xap * dx as f64 + yap * dy as f64,
            -dy,
            dx,
            xorgi,
            yorgi,
            dx < 0,
        );
        (right, left, top, bottom, -ya + project_yoff)
    };
    let ((mut right, righty), (mut left, lefty)) = (right, left);
    let ((mut top, topy), (mut bottom, bottomy)) = (top, bottom);

    let finaly = iceil(maxy) + yorgi;
    if dx < 0 {
        left.height = bottomy - lefty;
        right.height = finaly - righty;
        top.height = righty - topy;
    } else {
        right.height = bottomy - righty;
        left.height = finaly - lefty;
        top.height = lefty - topy;
    }
    bottom.height = finaly - bottomy;

    let (lefts, rights) = if dx < 0 {
        ([left, bottom], [top, right])
    } else {
        ([top, left], [right, bottom])
    };
    let spans = fill_poly_helper(topy, bottom.height + bottomy - topy, &lefts, &rights)?;
    out.emit(pen, spans)
}

// ============================================================================
// Solid wide lines
// ============================================================================

/// Stroke a solid polyline of positive width.
///
/// A polyline whose last point equals its first is closed with a join
/// instead of two caps. A polyline whose points all coincide still draws a
/// dot.
pub fn wide_line(sink: &mut dyn SpanSink, gc: &LineGc, points: &[Point]) -> Result<()> {
    let npt = points.len();
    if npt == 0 {
        return Ok(());
    }
    let mut out = StrokeOutput::new(sink, gc, npt);
    let pen = Pen::Foreground;
    let cap = gc.cap_style();
    let lw = gc.line_width();

    let mut x2 = points[0].x;
    let mut y2 = points[0].y;
    let self_join = npt > 1 && points[0] == points[npt - 1];
    let mut project_left = cap == CapStyle::Projecting && !self_join;
    let mut project_right = false;
    let mut first = true;
    let mut something_drawn = false;

    let mut left_face = LineFace::default();
    let mut right_face = LineFace::default();
    let mut prev_right_face = LineFace::default();
    let mut first_face = LineFace::default();

    for (i, p) in points.iter().enumerate().skip(1) {
        let is_last = i + 1 == npt;
        let (x1, y1) = (x2, y2);
        x2 = p.x;
        y2 = p.y;
        if x1 != x2 || y1 != y2 {
            something_drawn = true;
            if is_last && cap == CapStyle::Projecting && !self_join {
                project_right = true;
            }
            wide_segment(
                &mut out,
                pen,
                x1,
                y1,
                x2,
                y2,
                project_left,
                project_right,
                &mut left_face,
                &mut right_face,
            )?;
            if first {
                if self_join {
                    first_face = left_face;
                } else if cap == CapStyle::Round {
                    if lw == 1 && out.is_direct() {
                        line_one_point(&mut out, pen, x1, y1);
                    } else {
                        line_arc(&mut out, pen, Some(&mut left_face), None, 0.0, 0.0, true)?;
                    }
                }
            } else {
                line_join(&mut out, pen, &mut left_face, &mut prev_right_face)?;
            }
            prev_right_face = right_face;
            first = false;
            project_left = false;
        }
        if is_last && something_drawn {
            if self_join {
                line_join(&mut out, pen, &mut first_face, &mut right_face)?;
            } else if cap == CapStyle::Round {
                if lw == 1 && out.is_direct() {
                    line_one_point(&mut out, pen, x2, y2);
                } else {
                    line_arc(&mut out, pen, None, Some(&mut right_face), 0.0, 0.0, true)?;
                }
            }
        }
    }

    // Every point coincides: still draw something
    if !something_drawn {
        let project = cap == CapStyle::Projecting;
        wide_segment(
            &mut out,
            pen,
            x2,
            y2,
            x2,
            y2,
            project,
            project,
            &mut left_face,
            &mut right_face,
        )?;
        if cap == CapStyle::Round {
            line_arc(&mut out, pen, Some(&mut left_face), None, 0.0, 0.0, true)?;
            right_face.dx = -1;
            line_arc(&mut out, pen, None, Some(&mut right_face), 0.0, 0.0, true)?;
        }
    }
    out.finish()
}

// ============================================================================
// Dashed wide lines
// ============================================================================

const V_TOP: usize = 0;
const V_RIGHT: usize = 1;
const V_BOTTOM: usize = 2;
const V_LEFT: usize = 3;

/// Stroke one segment of a dashed polyline starting at dash `phase`,
/// advancing the phase by the segment's length.
///
/// Every dash run is a quad cut out of the segment. With on-off dashes the
/// caps are repeated at each run boundary.
#[allow(clippy::too_many_arguments)]
pub fn wide_dash_segment(
    out: &mut StrokeOutput,
    phase: &mut DashPhase,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    project_left: bool,
    project_right: bool,
    left_face: &mut LineFace,
    right_face: &mut LineFace,
) -> Result<()> {
    let gc = out.gc;
    let dashes = gc.dashes();
    let style = gc.line_style();
    let cap = gc.cap_style();
    let on_off = style == LineStyle::OnOffDash;
    let double = style == LineStyle::DoubleDash;

    let dx = x2 - x1;
    let dy = y2 - y1;
    let fdx = dx as f64;
    let fdy = dy as f64;
    let mut dash_index = phase.index;
    let mut dash_remain = dashes.run(dash_index) as i64 - phase.offset as i64;

    let l = gc.line_width() as f64 / 2.0;
    let (big_l, rdx, rdy) = if dx == 0 {
        if dy < 0 {
            (-fdy, 0.0, -l)
        } else {
            (fdy, 0.0, l)
        }
    } else if dy == 0 {
        if dx < 0 {
            (-fdx, -l, 0.0)
        } else {
            (fdx, l, 0.0)
        }
    } else {
        let big_l = fdx.hypot(fdy);
        let r = l / big_l;
        (big_l, r * fdx, r * fdy)
    };
    let k = l * big_l;
    let mut l_remain = big_l;

    // Positions are described for dx, dy > 0; nothing depends on it.
    let mut slopes = [
        PolySlope::new(dx, dy, k),
        PolySlope::new(-dy, dx, 0.0),
        PolySlope::new(-dx, -dy, k),
        PolySlope::new(dy, -dx, 0.0),
    ];
    let mut vertices = [
        PolyVertex::new(rdy, -rdx),
        PolyVertex::new(rdy, -rdx),
        PolyVertex::new(-rdy, rdx),
        PolyVertex::new(-rdy, rdx),
    ];

    if project_left {
        vertices[V_TOP].x -= rdx;
        vertices[V_TOP].y -= rdy;
        vertices[V_LEFT].x -= rdx;
        vertices[V_LEFT].y -= rdy;
        slopes[V_LEFT].k = rdx * fdx + rdy * fdy;
    }

    let mut lcenterx = x1 as f64;
    let mut lcentery = y1 as f64;
    let mut rcenterx = 0.0;
    let mut rcentery = 0.0;

    let mut lcap_face = LineFace::default();
    let mut rcap_face = LineFace::default();
    if cap == CapStyle::Round {
        lcap_face.dx = dx;
        lcap_face.dy = dy;
        lcap_face.x = x1;
        lcap_face.y = y1;

        rcap_face.dx = -dx;
        rcap_face.dy = -dy;
        rcap_face.x = x1;
        rcap_face.y = y1;
    }

    let side_k = |v: PolyVertex, s: PolySlope| v.x * s.dy as f64 - v.y * s.dx as f64;
    let pen_for = |index: usize| {
        if index & 1 != 0 {
            Pen::Background
        } else {
            Pen::Foreground
        }
    };

    let mut first = true;
    while l_remain > dash_remain as f64 {
        let dash_dx = (dash_remain as f64 * fdx) / big_l;
        let dash_dy = (dash_remain as f64 * fdy) / big_l;

        rcenterx = lcenterx + dash_dx;
        rcentery = lcentery + dash_dy;

        vertices[V_RIGHT].x += dash_dx;
        vertices[V_RIGHT].y += dash_dy;
        vertices[V_BOTTOM].x += dash_dx;
        vertices[V_BOTTOM].y += dash_dy;

        slopes[V_RIGHT].k = vertices[V_RIGHT].x * fdx + vertices[V_RIGHT].y * fdy;

        if double || dash_index & 1 == 0 {
            let saved = (vertices[V_RIGHT], vertices[V_BOTTOM], slopes[V_RIGHT].k);
            if on_off && cap == CapStyle::Projecting {
                if !first {
                    vertices[V_TOP].x -= rdx;
                    vertices[V_TOP].y -= rdy;
                    vertices[V_LEFT].x -= rdx;
                    vertices[V_LEFT].y -= rdy;
                    slopes[V_LEFT].k = side_k(vertices[V_LEFT], slopes[V_LEFT]);
                }
                vertices[V_RIGHT].x += rdx;
                vertices[V_RIGHT].y += rdy;
                vertices[V_BOTTOM].x += rdx;
                vertices[V_BOTTOM].y += rdy;
                slopes[V_RIGHT].k = side_k(vertices[V_RIGHT], slopes[V_RIGHT]);
            }
            let edges = build_poly(&vertices, &slopes, x1, y1);
            let pen = pen_for(dash_index);
            fill_poly(out, pen, &edges)?;

            if on_off {
                match cap {
                    CapStyle::Projecting => {
                        vertices[V_RIGHT] = saved.0;
                        vertices[V_BOTTOM] = saved.1;
                        slopes[V_RIGHT].k = saved.2;
                    }
                    CapStyle::Round => {
                        if !first {
                            if dx < 0 {
                                lcap_face.xa = -vertices[V_LEFT].x;
                                lcap_face.ya = -vertices[V_LEFT].y;
                                lcap_face.k = slopes[V_LEFT].k;
                            } else {
                                lcap_face.xa = vertices[V_TOP].x;
                                lcap_face.ya = vertices[V_TOP].y;
                                lcap_face.k = -slopes[V_LEFT].k;
                            }
                            line_arc(out, pen, Some(&mut lcap_face), None, lcenterx, lcentery, false)?;
                        }
                        if dx < 0 {
                            rcap_face.xa = vertices[V_BOTTOM].x;
                            rcap_face.ya = vertices[V_BOTTOM].y;
                            rcap_face.k = slopes[V_RIGHT].k;
                        } else {
                            rcap_face.xa = -vertices[V_RIGHT].x;
                            rcap_face.ya = -vertices[V_RIGHT].y;
                            rcap_face.k = -slopes[V_RIGHT].k;
                        }
                        line_arc(out, pen, None, Some(&mut rcap_face), rcenterx, rcentery, false)?;
                    }
                    _ => {}
                }
            }
        }
        l_remain -= dash_remain as f64;
        dash_index = dashes.next_index(dash_index);
        dash_remain = dashes.run(dash_index) as i64;

        lcenterx = rcenterx;
        lcentery = rcentery;

        vertices[V_TOP] = vertices[V_RIGHT];
        vertices[V_LEFT] = vertices[V_BOTTOM];
        slopes[V_LEFT].k = -slopes[V_RIGHT].k;
        first = false;
    }

    if double || dash_index & 1 == 0 {
        vertices[V_TOP].x -= fdx;
        vertices[V_TOP].y -= fdy;
        vertices[V_LEFT].x -= fdx;
        vertices[V_LEFT].y -= fdy;

        vertices[V_RIGHT] = PolyVertex::new(rdy, -rdx);
        vertices[V_BOTTOM] = PolyVertex::new(-rdy, rdx);

        if project_right {
            vertices[V_RIGHT].x += rdx;
            vertices[V_RIGHT].y += rdy;
            vertices[V_BOTTOM].x += rdx;
            vertices[V_BOTTOM].y += rdy;
            slopes[V_RIGHT].k = side_k(vertices[V_RIGHT], slopes[V_RIGHT]);
        } else {
            slopes[V_RIGHT].k = 0.0;
        }

        if !first && on_off && cap == CapStyle::Projecting {
            vertices[V_TOP].x -= rdx;
            vertices[V_TOP].y -= rdy;
            vertices[V_LEFT].x -= rdx;
            vertices[V_LEFT].y -= rdy;
            slopes[V_LEFT].k = side_k(vertices[V_LEFT], slopes[V_LEFT]);
        } else {
            slopes[V_LEFT].k += fdx * fdx + fdy * fdy;
        }

        let edges = build_poly(&vertices, &slopes, x2, y2);
        let pen = pen_for(dash_index);
        fill_poly(out, pen, &edges)?;

        if !first && on_off && cap == CapStyle::Round {
            lcap_face.x = x2;
            lcap_face.y = y2;
            if dx < 0 {
                lcap_face.xa = -vertices[V_LEFT].x;
                lcap_face.ya = -vertices[V_LEFT].y;
                lcap_face.k = slopes[V_LEFT].k;
            } else {
                lcap_face.xa = vertices[V_TOP].x;
                lcap_face.ya = vertices[V_TOP].y;
                lcap_face.k = -slopes[V_LEFT].k;
            }
            line_arc(out, pen, Some(&mut lcap_face), None, rcenterx, rcentery, false)?;
        }
    }

    dash_remain = (dash_remain as f64 - l_remain) as i64;
    if dash_remain == 0 {
        dash_index = dashes.next_index(dash_index);
        dash_remain = dashes.run(dash_index) as i64;
    }

    *left_face = LineFace {
        x: x1,
        y: y1,
        dx,
        dy,
        xa: rdy,
        ya: -rdx,
        k,
    };
    *right_face = LineFace {
        x: x2,
        y: y2,
        dx: -dx,
        dy: -dy,
        xa: -rdy,
        ya: rdx,
        k,
    };

    phase.index = dash_index;
    phase.offset = (dashes.run(dash_index) as i64 - dash_remain) as u32;
    Ok(())
}

/// Stroke a dashed polyline of positive width. Width zero falls back to
/// the one-pixel dashed line.
///
/// Joins and caps take the pen of the dash run they touch. A closed on-off
/// polyline that ends in a gap gets a cap glued to its start instead.
pub fn wide_dash(sink: &mut dyn SpanSink, gc: &LineGc, points: &[Point]) -> Result<()> {
    if gc.line_width() == 0 {
        return zero_dash_line(sink, gc, points);
    }
    let npt = points.len();
    if npt == 0 {
        return Ok(());
    }
    let mut out = StrokeOutput::new(sink, gc, npt);
    let style = gc.line_style();
    let cap = gc.cap_style();
    let double = style == LineStyle::DoubleDash;
    let on_off = style == LineStyle::OnOffDash;

    let mut x2 = points[0].x;
    let mut y2 = points[0].y;
    let self_join = points[0] == points[npt - 1];
    let mut project_left = cap == CapStyle::Projecting && !self_join;
    let mut project_right = false;
    let mut phase = gc.dashes().phase_at(gc.dash_offset() as u64);

    let mut first = true;
    let mut something_drawn = false;
    let mut end_is_fg = false;
    let mut first_is_fg = false;
    let mut prev_is_fg = false;

    let mut left_face = LineFace::default();
    let mut right_face = LineFace::default();
    let mut prev_right_face = LineFace::default();
    let mut first_face = LineFace::default();

    for (i, p) in points.iter().enumerate().skip(1) {
        let is_last = i + 1 == npt;
        let (x1, y1) = (x2, y2);
        x2 = p.x;
        y2 = p.y;
        if x1 != x2 || y1 != y2 {
            something_drawn = true;
            if is_last && cap == CapStyle::Projecting && (!self_join || !first_is_fg) {
                project_right = true;
            }
            let prev_dash_index = phase.index;
            wide_dash_segment(
                &mut out,
                &mut phase,
                x1,
                y1,
                x2,
                y2,
                project_left,
                project_right,
                &mut left_face,
                &mut right_face,
            )?;
            let start_is_fg = prev_dash_index & 1 == 0;
            end_is_fg = (phase.index & 1 == 1) ^ (phase.offset != 0);
            if double || start_is_fg {
                let pen = if start_is_fg {
                    Pen::Foreground
                } else {
                    Pen::Background
                };
                if first || (on_off && !prev_is_fg) {
                    if first && self_join {
                        first_face = left_face;
                        first_is_fg = start_is_fg;
                    } else if cap == CapStyle::Round {
                        line_arc(&mut out, pen, Some(&mut left_face), None, 0.0, 0.0, true)?;
                    }
                } else {
                    line_join(&mut out, pen, &mut left_face, &mut prev_right_face)?;
                }
            }
            prev_right_face = right_face;
            prev_is_fg = end_is_fg;
            first = false;
            project_left = false;
        }
        if is_last && something_drawn {
            if double || end_is_fg {
                let pen = if end_is_fg {
                    Pen::Foreground
                } else {
                    Pen::Background
                };
                if self_join && (double || first_is_fg) {
                    line_join(&mut out, pen, &mut first_face, &mut right_face)?;
                } else if cap == CapStyle::Round {
                    line_arc(&mut out, pen, None, Some(&mut right_face), 0.0, 0.0, true)?;
                }
            } else if self_join && first_is_fg {
                // Ended in a gap: glue a cap to the start of the line
                match cap {
                    CapStyle::Projecting => {
                        line_projecting_cap(&mut out, Pen::Foreground, &first_face, true)?
                    }
                    CapStyle::Round => line_arc(
                        &mut out,
                        Pen::Foreground,
                        Some(&mut first_face),
                        None,
                        0.0,
                        0.0,
                        true,
                    )?,
                    _ => {}
                }
            }
        }
    }

    // Every point coincides: draw a dot in the pen of the current dash
    if !something_drawn && (double || phase.is_on()) {
        let pen = if phase.is_on() {
            Pen::Foreground
        } else {
            Pen::Background
        };
        match cap {
            CapStyle::Round => {
                line_arc(&mut out, pen, None, None, x2 as f64, y2 as f64, false)?;
            }
            CapStyle::Projecting => {
                let lw = gc.line_width();
                fill_rect(&mut out, pen, x2 - (lw >> 1), y2 - (lw >> 1), lw, lw)?;
            }
            _ => {}
        }
    }
    out.finish()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dash::DashPattern;
    use crate::gc::Rop;
    use crate::span_sink::SpanRecorder;
    use std::collections::BTreeSet;

    fn pts(list: &[(i32, i32)]) -> Vec<Point> {
        list.iter().map(|&p| p.into()).collect()
    }

    fn stroke(gc: &LineGc, points: &[(i32, i32)]) -> SpanRecorder {
        let mut rec = SpanRecorder::new();
        if gc.line_style() == LineStyle::Solid {
            wide_line(&mut rec, gc, &pts(points)).unwrap();
        } else {
            wide_dash(&mut rec, gc, &pts(points)).unwrap();
        }
        rec
    }

    fn pixel_set(rec: &SpanRecorder, pen: Pen) -> BTreeSet<(i32, i32)> {
        rec.pixels(pen).into_iter().collect()
    }

    fn disc_5_at_10() -> Vec<Span> {
        vec![
            Span::new(8, 9, 3),
            Span::new(9, 8, 5),
            Span::new(10, 8, 5),
            Span::new(11, 8, 5),
            Span::new(12, 9, 3),
        ]
    }

    #[test]
    fn test_horizontal_butt_segment() {
        let gc = LineGc::new().with_line_width(3);
        let rec = stroke(&gc, &[(0, 0), (10, 0)]);
        assert_eq!(
            rec.spans(Pen::Foreground),
            vec![Span::new(-1, 0, 10), Span::new(0, 0, 10), Span::new(1, 0, 10)]
        );
    }

    #[test]
    fn test_segment_direction_does_not_matter() {
        let gc = LineGc::new().with_line_width(5);
        let fwd = stroke(&gc, &[(3, 2), (40, 17)]);
        let rev = stroke(&gc, &[(40, 17), (3, 2)]);
        assert_eq!(pixel_set(&fwd, Pen::Foreground), pixel_set(&rev, Pen::Foreground));
        assert!(!fwd.spans(Pen::Foreground).is_empty());
    }

    #[test]
    fn test_vertical_projecting_segment() {
        let gc = LineGc::new()
            .with_line_width(4)
            .with_cap_style(CapStyle::Projecting);
        let rec = stroke(&gc, &[(5, 0), (5, 10)]);
        let expected: Vec<Span> = (-2..12).map(|y| Span::new(y, 3, 4)).collect();
        assert_eq!(rec.spans(Pen::Foreground), expected);
    }

    #[test]
    fn test_faces_describe_both_ends() {
        let gc = LineGc::new().with_line_width(4);
        let mut rec = SpanRecorder::new();
        let mut out = StrokeOutput::direct(&mut rec, &gc);
        let mut left = LineFace::default();
        let mut right = LineFace::default();
        wide_segment(&mut out, Pen::Foreground, 30, 20, 0, 5, false, false, &mut left, &mut right)
            .unwrap();
        assert_eq!((left.x, left.y, left.dx, left.dy), (30, 20, -30, -15));
        assert_eq!((right.x, right.y, right.dx, right.dy), (0, 5, 30, 15));
        assert_eq!(left.k, right.k);
    }

    #[test]
    fn test_axis_face_slope_does_not_overflow() {
        let gc = LineGc::new().with_line_width(70_000);
        let mut rows = 0usize;
        let mut count = |spans: &[Span], _sorted: bool, _pen: Pen| rows += spans.len();
        let mut out = StrokeOutput::direct(&mut count, &gc);
        let mut left = LineFace::default();
        let mut right = LineFace::default();
        wide_segment(&mut out, Pen::Foreground, 0, 0, 40_000, 0, false, false, &mut left, &mut right)
            .unwrap();
        assert_eq!(right.k, -1.4e9);
        wide_segment(&mut out, Pen::Foreground, 0, 0, 0, 40_000, false, false, &mut left, &mut right)
            .unwrap();
        assert_eq!(left.k, 1.4e9);
        drop(out);
        assert_eq!(rows, 70_000 + 40_000);
    }

    #[test]
    fn test_integer_disc() {
        assert_eq!(line_arc_i(5, 10, 10).unwrap(), disc_5_at_10());
        assert_eq!(line_arc_i(1, 3, 4).unwrap(), vec![Span::new(4, 3, 1)]);
        let even = line_arc_i(4, 0, 0).unwrap();
        assert_eq!(even.len(), 4);
        assert!(even.windows(2).all(|w| w[0].y < w[1].y));
    }

    #[test]
    fn test_unclipped_float_disc() {
        let mut none1 = ArcClip::default();
        let mut none2 = ArcClip::default();
        let spans = line_arc_d(
            5,
            10.0,
            10.0,
            &mut none1.edge,
            none1.y,
            none1.left,
            &mut none2.edge,
            none2.y,
            none2.left,
        )
        .unwrap();
        assert_eq!(spans, disc_5_at_10());
    }

    #[test]
    fn test_round_dot_from_coincident_points() {
        let gc = LineGc::new()
            .with_line_width(5)
            .with_cap_style(CapStyle::Round);
        let rec = stroke(&gc, &[(10, 10), (10, 10)]);
        assert_eq!(rec.max_overdraw(), 1);
        let expected: BTreeSet<(i32, i32)> = disc_5_at_10()
            .iter()
            .flat_map(|s| (s.x..s.x_end()).map(move |x| (x, s.y)))
            .collect();
        assert_eq!(pixel_set(&rec, Pen::Foreground), expected);
    }

    #[test]
    fn test_coincident_butt_points_draw_nothing_visible() {
        let gc = LineGc::new().with_line_width(5);
        let rec = stroke(&gc, &[(10, 10), (10, 10), (10, 10)]);
        assert!(rec.spans(Pen::Foreground).is_empty());
    }

    #[test]
    fn test_sharp_miter_falls_back_to_bevel() {
        let sharp = [(0, 0), (100, 0), (0, 6)];
        let miter = LineGc::new().with_line_width(8);
        let bevel = miter.clone().with_join_style(JoinStyle::Bevel);
        assert_eq!(
            stroke(&miter, &sharp).spans(Pen::Foreground),
            stroke(&bevel, &sharp).spans(Pen::Foreground)
        );
    }

    #[test]
    fn test_right_angle_miter_extends_bevel() {
        let corner = [(0, 0), (20, 0), (20, 20)];
        let miter = LineGc::new().with_line_width(6);
        let bevel = miter.clone().with_join_style(JoinStyle::Bevel);
        let m = pixel_set(&stroke(&miter, &corner), Pen::Foreground);
        let b = pixel_set(&stroke(&bevel, &corner), Pen::Foreground);
        assert!(b.is_subset(&m));
        assert!(m.len() > b.len());
    }

    #[test]
    fn test_careful_rop_paints_each_pixel_once() {
        let path = [(10, 10), (40, 12), (25, 40), (5, 30)];
        for join in [JoinStyle::Miter, JoinStyle::Round, JoinStyle::Bevel] {
            let base = LineGc::new()
                .with_line_width(7)
                .with_cap_style(CapStyle::Round)
                .with_join_style(join);
            let copy = stroke(&base, &path);
            let xor = stroke(&base.clone().with_rop(Rop::Xor), &path);
            if join == JoinStyle::Round {
                assert!(copy.max_overdraw() > 1);
            }
            assert_eq!(xor.max_overdraw(), 1, "{:?}", join);
            assert_eq!(
                pixel_set(&copy, Pen::Foreground),
                pixel_set(&xor, Pen::Foreground)
            );
        }
    }

    #[test]
    fn test_closed_polyline_gets_corner_join() {
        let square = [(0, 0), (20, 0), (20, 20), (0, 20), (0, 0)];
        let gc = LineGc::new().with_line_width(4).with_rop(Rop::Xor);
        let closed = stroke(&gc, &square);
        assert_eq!(closed.max_overdraw(), 1);
        assert!(closed.coverage(Pen::Foreground).contains_key(&(-1, -1)));
        assert!(closed.coverage(Pen::Foreground).contains_key(&(21, 21)));
    }

    #[test]
    fn test_span_data_setup() {
        let xor = LineGc::new().with_rop(Rop::Xor);
        assert!(SpanData::setup(&LineGc::new(), 10).is_none());
        assert!(SpanData::setup(&xor, 2).is_none());
        assert!(SpanData::setup(&xor, 3).is_some());
        assert!(SpanData::setup(&xor.with_cap_style(CapStyle::Round), 2).is_some());
    }

    #[test]
    fn test_span_data_background_yields_to_foreground() {
        let mut data = SpanData::default();
        data.append(Pen::Foreground, vec![Span::new(0, 0, 10)], true)
            .unwrap();
        data.append(Pen::Background, vec![Span::new(0, 5, 10)], true)
            .unwrap();
        let mut rec = SpanRecorder::new();
        data.cleanup(&mut rec, true).unwrap();
        assert_eq!(rec.spans(Pen::Foreground), vec![Span::new(0, 0, 5)]);
        assert_eq!(rec.spans(Pen::Background), vec![Span::new(0, 5, 10)]);
        assert_eq!(rec.batches()[0].pen, Pen::Background);
    }

    fn dashed(style: LineStyle, lw: i32, dashes: &[u32]) -> LineGc {
        LineGc::new()
            .with_line_width(lw)
            .with_line_style(style)
            .with_dashes(DashPattern::new(dashes).unwrap(), 0)
    }

    #[test]
    fn test_on_off_dashes() {
        let gc = dashed(LineStyle::OnOffDash, 1, &[5, 5]);
        let rec = stroke(&gc, &[(0, 0), (20, 0)]);
        assert_eq!(
            rec.spans(Pen::Foreground),
            vec![Span::new(0, 0, 5), Span::new(0, 10, 5)]
        );
        assert!(rec.spans(Pen::Background).is_empty());
    }

    #[test]
    fn test_double_dashes_fill_gaps_with_background() {
        let gc = dashed(LineStyle::DoubleDash, 1, &[5, 5]);
        let rec = stroke(&gc, &[(0, 0), (20, 0)]);
        assert_eq!(
            rec.spans(Pen::Foreground),
            vec![Span::new(0, 0, 5), Span::new(0, 10, 5)]
        );
        assert_eq!(
            rec.spans(Pen::Background),
            vec![Span::new(0, 5, 5), Span::new(0, 15, 5)]
        );
    }

    #[test]
    fn test_wide_dashes_cover_line_width() {
        let gc = dashed(LineStyle::OnOffDash, 3, &[5, 5]);
        let rec = stroke(&gc, &[(0, 0), (20, 0)]);
        let rows: BTreeSet<i32> = rec.spans(Pen::Foreground).iter().map(|s| s.y).collect();
        assert_eq!(rows, [-1, 0, 1].into_iter().collect());
        let xs: BTreeSet<(i32, i32)> = rec
            .spans(Pen::Foreground)
            .iter()
            .map(|s| (s.x, s.width))
            .collect();
        assert_eq!(xs, [(0, 5), (10, 5)].into_iter().collect());
    }

    #[test]
    fn test_on_off_round_caps_at_every_dash() {
        let gc = dashed(LineStyle::OnOffDash, 5, &[6, 6]).with_cap_style(CapStyle::Round);
        let rec = stroke(&gc, &[(0, 20), (20, 20)]);
        let pixels = pixel_set(&rec, Pen::Foreground);
        for y in 19..=21 {
            let row: BTreeSet<i32> = pixels.iter().filter(|p| p.1 == y).map(|p| p.0).collect();
            let expected: BTreeSet<i32> = (-2..=8).chain(10..=20).collect();
            assert_eq!(row, expected, "row {}", y);
        }
        for y in [18, 22] {
            for x in [-2, 8, 9, 10, 20] {
                assert!(!pixels.contains(&(x, y)), "({}, {}) is outside the caps", x, y);
            }
        }
        assert!(pixels.iter().all(|p| (18..=22).contains(&p.1)));
        assert!(rec.spans(Pen::Background).is_empty());
    }

    #[test]
    fn test_on_off_projecting_caps_extend_every_dash() {
        let gc = dashed(LineStyle::OnOffDash, 4, &[6, 6]).with_cap_style(CapStyle::Projecting);
        let rec = stroke(&gc, &[(0, 0), (20, 0)]);
        let mut spans = rec.spans(Pen::Foreground);
        spans.sort_by_key(|s| (s.y, s.x));
        let expected: Vec<Span> = (-2..=1)
            .flat_map(|y| [Span::new(y, -2, 10), Span::new(y, 10, 10)])
            .collect();
        assert_eq!(spans, expected);
    }

    #[test]
    fn test_closed_dash_ending_in_gap_glues_start_cap() {
        // Perimeter 80 ends two pixels into an off run
        let square = [(0, 0), (20, 0), (20, 20), (0, 20), (0, 0)];
        for (cap, glue_only) in [(CapStyle::Projecting, (-2, -2)), (CapStyle::Round, (-1, -1))] {
            let gc = dashed(LineStyle::OnOffDash, 4, &[6, 6])
                .with_cap_style(cap)
                .with_rop(Rop::Xor);
            let rec = stroke(&gc, &square);
            assert_eq!(rec.max_overdraw(), 1, "{:?}", cap);
            assert!(pixel_set(&rec, Pen::Foreground).contains(&glue_only), "{:?}", cap);

            // Butt caps glue nothing
            let rec = stroke(&gc.with_cap_style(CapStyle::Butt), &square);
            assert!(!pixel_set(&rec, Pen::Foreground).contains(&glue_only), "{:?}", cap);
        }
    }

    #[test]
    fn test_dash_phase_advances_by_segment_length() {
        let gc = dashed(LineStyle::OnOffDash, 2, &[5, 5]);
        let mut rec = SpanRecorder::new();
        let mut out = StrokeOutput::direct(&mut rec, &gc);
        let mut phase = DashPhase::default();
        let (mut left, mut right) = (LineFace::default(), LineFace::default());
        wide_dash_segment(&mut out, &mut phase, 0, 0, 7, 0, false, false, &mut left, &mut right)
            .unwrap();
        assert_eq!(phase, DashPhase { index: 1, offset: 2 });
        wide_dash_segment(&mut out, &mut phase, 7, 0, 7, 3, false, false, &mut left, &mut right)
            .unwrap();
        assert_eq!(phase, DashPhase { index: 0, offset: 0 });
    }

    #[test]
    fn test_double_dash_careful_rop_paints_each_pixel_once() {
        let gc = dashed(LineStyle::DoubleDash, 5, &[7, 3])
            .with_cap_style(CapStyle::Round)
            .with_rop(Rop::Xor);
        let rec = stroke(&gc, &[(0, 0), (30, 10), (10, 35), (0, 0)]);
        assert_eq!(rec.max_overdraw(), 1);
        assert!(!rec.spans(Pen::Foreground).is_empty());
        assert!(!rec.spans(Pen::Background).is_empty());
    }

    #[test]
    fn test_dashed_dot_uses_current_pen() {
        let round = dashed(LineStyle::OnOffDash, 5, &[4, 4]).with_cap_style(CapStyle::Round);
        let rec = stroke(&round, &[(10, 10)]);
        assert_eq!(rec.spans(Pen::Foreground), disc_5_at_10());

        let square = dashed(LineStyle::DoubleDash, 5, &[4, 4])
            .with_cap_style(CapStyle::Projecting)
            .with_dashes(DashPattern::new(&[4, 4]).unwrap(), 5);
        let rec = stroke(&square, &[(10, 10), (10, 10)]);
        assert!(rec.spans(Pen::Foreground).is_empty());
        let expected: Vec<Span> = (8..13).map(|y| Span::new(y, 8, 5)).collect();
        assert_eq!(rec.spans(Pen::Background), expected);
    }

    #[test]
    fn test_zero_width_dash_falls_back() {
        let gc = dashed(LineStyle::OnOffDash, 0, &[3, 2]);
        let mut a = SpanRecorder::new();
        let mut b = SpanRecorder::new();
        let points = pts(&[(0, 0), (10, 4)]);
        wide_dash(&mut a, &gc, &points).unwrap();
        zero_dash_line(&mut b, &gc, &points).unwrap();
        assert_eq!(a.batches(), b.batches());
    }
}
