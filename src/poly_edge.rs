//! Integer edge walkers for convex pieces of a stroke.
//!
//! A stroke is cut into small convex polygons (segment quads, join wedges,
//! cap extensions, dash runs). Each one is described by sub-pixel vertices
//! and per-side slopes, turned into a left and a right chain of
//! [`PolyEdge`]s, and walked one scanline at a time by
//! [`fill_poly_helper`].
//!
//! Every edge starts at the ceiling of its real intercept: a pixel belongs
//! to the shape when its centre is on or inside the boundary.

use crate::basics::{iceil, Span};
use crate::error::{with_capacity, Result};

// ============================================================================
// Types
// ============================================================================

/// An incremental, Bresenham-style edge.
///
/// `e` is biased by `-dy` so a step only has to test `e > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolyEdge {
    /// Number of scanlines the edge stays active for.
    pub height: i32,
    pub x: i32,
    pub stepx: i32,
    pub signdx: i32,
    pub e: i32,
    pub dy: i32,
    pub dx: i32,
}

impl PolyEdge {
    /// Advance one scanline.
    #[inline]
    pub fn step(&mut self) {
        self.x += self.stepx;
        self.e += self.dx;
        if self.e > 0 {
            self.x += self.signdx;
            self.e -= self.dy;
        }
    }
}

/// A sub-pixel vertex, relative to an integer origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolyVertex {
    pub x: f64,
    pub y: f64,
}

impl PolyVertex {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Direction of the side leaving a vertex, with its implicit-line
/// constant `k = x * dy - y * dx`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolySlope {
    pub dx: i32,
    pub dy: i32,
    pub k: f64,
}

impl PolySlope {
    pub const fn new(dx: i32, dy: i32, k: f64) -> Self {
        Self { dx, dy, k }
    }
}

/// Left and right edge chains of a convex polygon.
#[derive(Debug, Clone, Default)]
pub struct ConvexEdges {
    pub left: Vec<PolyEdge>,
    pub right: Vec<PolyEdge>,
    /// First scanline covered.
    pub top: i32,
    /// Number of scanlines from `top` to the bottom vertex.
    pub height: i32,
}

// ============================================================================
// Edge construction
// ============================================================================

/// Build the edge through `(x0, y0)` with direction `(dx, dy)` and line
/// constant `k`, offset by the integer origin `(xi, yi)`.
///
/// The direction is normalized to `dy >= 0`. Left edges start one pixel to
/// the right of the intercept so spans cover `[left.x, right.x]`. Returns
/// the edge (with `height` left at zero) and the first scanline it is
/// active on.
#[allow(clippy::too_many_arguments)]
pub fn build_edge(
    _x0: f64,
    y0: f64,
    k: f64,
    dx: i32,
    dy: i32,
    xi: i32,
    yi: i32,
    left: bool,
) -> (PolyEdge, i32) {
    let (mut dx, mut dy, mut k) = (dx, dy, k);
    if dy < 0 {
        dy = -dy;
        dx = -dx;
        k = -k;
    }

    let y = iceil(y0);
    let xady = iceil(k) + y * dx;

    let x = if xady <= 0 {
        -(-xady / dy) - 1
    } else {
        (xady - 1) / dy
    };

    let mut e = xady - x * dy;

    let mut edge = PolyEdge::default();
    if dx >= 0 {
        edge.signdx = 1;
        edge.stepx = dx / dy;
        edge.dx = dx % dy;
    } else {
        edge.signdx = -1;
        edge.stepx = -(-dx / dy);
        edge.dx = -dx % dy;
        e = dy - e + 1;
    }
    edge.dy = dy;
    edge.x = x + left as i32 + xi;
    edge.e = e - dy;
    (edge, y + yi)
}

#[inline]
fn step_around(v: usize, incr: isize, max: usize) -> usize {
    let n = v as isize + incr;
    if n < 0 {
        max - 1
    } else if n as usize == max {
        0
    } else {
        n as usize
    }
}

/// Split a convex vertex ring into left and right edge chains.
///
/// `slopes[i]` describes the side leaving `vertices[i]`. Horizontal sides
/// contribute no edge. Every edge's height runs to the start of the next
/// edge on its chain, the last one to the bottom vertex's row.
pub fn build_poly(vertices: &[PolyVertex], slopes: &[PolySlope], xi: i32, yi: i32) -> ConvexEdges {
    let count = vertices.len().min(slopes.len());
    if count == 0 {
        return ConvexEdges::default();
    }

    // Find the top of the polygon
    let mut miny = vertices[0].y;
    let mut maxy = miny;
    let mut top = 0;
    let mut bottom = 0;
    for (i, v) in vertices.iter().enumerate().take(count).skip(1) {
        if v.y < miny {
            top = i;
            miny = v.y;
        }
        if v.y >= maxy {
            bottom = i;
            maxy = v.y;
        }
    }

    let mut clockwise: isize = 1;
    let mut slopeoff: isize = 0;
    let j = step_around(top, -1, count);
    if slopes[j].dy as i64 * slopes[top].dx as i64 > slopes[top].dy as i64 * slopes[j].dx as i64 {
        clockwise = -1;
        slopeoff = -1;
    }

    let bottomy = iceil(maxy) + yi;
    let mut topy = 0;
    let mut lasty = 0;

    let mut right: Vec<PolyEdge> = Vec::with_capacity(count);
    let mut s = step_around(top, slopeoff, count);
    let mut i = top;
    while i != bottom {
        if slopes[s].dy != 0 {
            let (edge, y) = build_edge(
                vertices[i].x,
                vertices[i].y,
                slopes[s].k,
                slopes[s].dx,
                slopes[s].dy,
                xi,
                yi,
                false,
            );
            match right.last_mut() {
                Some(prev) => prev.height = y - lasty,
                None => topy = y,
            }
            right.push(edge);
            lasty = y;
        }
        i = step_around(i, clockwise, count);
        s = step_around(s, clockwise, count);
    }
    if let Some(last) = right.last_mut() {
        last.height = bottomy - lasty;
    }

    let slopeoff = if slopeoff == 0 { -1 } else { 0 };
    let mut left: Vec<PolyEdge> = Vec::with_capacity(count);
    let mut s = step_around(top, slopeoff, count);
    let mut i = top;
    while i != bottom {
        if slopes[s].dy != 0 {
            let (edge, y) = build_edge(
                vertices[i].x,
                vertices[i].y,
                slopes[s].k,
                slopes[s].dx,
                slopes[s].dy,
                xi,
                yi,
                true,
            );
            if let Some(prev) = left.last_mut() {
                prev.height = y - lasty;
            }
            left.push(edge);
            lasty = y;
        }
        i = step_around(i, -clockwise, count);
        s = step_around(s, -clockwise, count);
    }
    if let Some(last) = left.last_mut() {
        last.height = bottomy - lasty;
    }

    ConvexEdges {
        left,
        right,
        top: topy,
        height: bottomy - topy,
    }
}

// ============================================================================
// Span walkers
// ============================================================================

/// Walk a left and a right edge chain from row `y`, emitting
/// `[left.x, right.x]` on every row where the chains do not cross.
pub fn fill_poly_helper(
    mut y: i32,
    overall_height: i32,
    left: &[PolyEdge],
    right: &[PolyEdge],
) -> Result<Vec<Span>> {
    let mut spans: Vec<Span> = with_capacity(overall_height.max(0) as usize, "polygon spans")?;

    let mut left_iter = left.iter();
    let mut right_iter = right.iter();
    let mut left_remaining = left.len();
    let mut right_remaining = right.len();
    let mut l = PolyEdge::default();
    let mut r = PolyEdge::default();
    let mut left_height = 0;
    let mut right_height = 0;

    while (left_remaining != 0 || left_height != 0) && (right_remaining != 0 || right_height != 0) {
        if left_height == 0 {
            if let Some(edge) = left_iter.next() {
                l = *edge;
                left_height = l.height;
                left_remaining -= 1;
            }
        }
        if right_height == 0 {
            if let Some(edge) = right_iter.next() {
                r = *edge;
                right_height = r.height;
                right_remaining -= 1;
            }
        }

        let mut height = left_height.min(right_height);
        left_height -= height;
        right_height -= height;

        while height > 0 {
            height -= 1;
            if r.x >= l.x {
                spans.push(Span::new(y, l.x, r.x - l.x + 1));
            }
            y += 1;
            l.step();
            r.step();
        }
    }
    Ok(spans)
}

/// The spans of the axis-aligned rectangle `[x, x + w) x [y, y + h)`.
pub fn rect_spans(x: i32, y: i32, w: i32, h: i32) -> Result<Vec<Span>> {
    let mut spans: Vec<Span> = with_capacity(h.max(0) as usize, "rectangle spans")?;
    spans.extend((y..y + h.max(0)).map(|row| Span::new(row, x, w)));
    Ok(spans)
}

// ============================================================================
// Tests
// ============================================================================
