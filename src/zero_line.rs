//! Zero-width ("thin") polylines.
//!
//! Lines of width zero skip the face and join machinery and are drawn as
//! one-pixel Bresenham paths. The error term carries a per-octant bias so a
//! segment covers the same pixels whichever end it is drawn from.

use crate::basics::{Point, Span};
use crate::error::{try_reserve, Result};
use crate::gc::{CapStyle, LineGc, LineStyle};
use crate::span_sink::{Pen, SpanSink};

// ============================================================================
// Octants
// ============================================================================

pub const XDECREASING: u32 = 4;
pub const YDECREASING: u32 = 2;
pub const YMAJOR: u32 = 1;

pub const OCTANT1: u32 = 1 << YDECREASING;
pub const OCTANT2: u32 = 1 << (YDECREASING | YMAJOR);
pub const OCTANT3: u32 = 1 << (XDECREASING | YDECREASING | YMAJOR);
pub const OCTANT4: u32 = 1 << (XDECREASING | YDECREASING);
pub const OCTANT5: u32 = 1 << XDECREASING;
pub const OCTANT6: u32 = 1 << (XDECREASING | YMAJOR);
pub const OCTANT7: u32 = 1 << YMAJOR;
pub const OCTANT8: u32 = 1;

/// Octants in which an exact midpoint does not step the minor axis.
pub const DEFAULT_ZERO_LINE_BIAS: u32 = OCTANT2 | OCTANT3 | OCTANT4 | OCTANT5;

/// Visit every pixel of the segment `p1 -> p2` except `p2` itself.
///
/// The walk is along the major axis; the minor axis steps when the error
/// term is non-negative.
pub fn bresenham_segment<F>(p1: Point, p2: Point, bias: u32, mut plot: F) -> Result<()>
where
    F: FnMut(i32, i32) -> Result<()>,
{
    let mut octant = 0;
    let mut adx = p2.x - p1.x;
    let mut sx = 1;
    if adx < 0 {
        adx = -adx;
        sx = -1;
        octant |= XDECREASING;
    }
    let mut ady = p2.y - p1.y;
    let mut sy = 1;
    if ady < 0 {
        ady = -ady;
        sy = -1;
        octant |= YDECREASING;
    }
    let x_major = adx > ady;
    let (dmaj, dmin) = if x_major { (adx, ady) } else { (ady, adx) };
    if !x_major {
        octant |= YMAJOR;
    }

    let e1 = dmin << 1;
    let e2 = e1 - (dmaj << 1);
    let mut e = e1 - dmaj - ((bias >> octant) & 1) as i32;

    let (mut x, mut y) = (p1.x, p1.y);
    for _ in 0..dmaj {
        plot(x, y)?;
        if e >= 0 {
            if x_major {
                y += sy;
            } else {
                x += sx;
            }
            e += e2;
        } else {
            e += e1;
        }
        if x_major {
            x += sx;
        } else {
            y += sy;
        }
    }
    Ok(())
}

// ============================================================================
// Span runs
// ============================================================================

/// Collects pixels into horizontal runs, one list per pen.
#[derive(Debug, Default)]
struct RunBuilder {
    fg: Vec<Span>,
    bg: Vec<Span>,
}

impl RunBuilder {
    fn push(&mut self, x: i32, y: i32, pen: Pen) -> Result<()> {
        let list = match pen {
            Pen::Foreground => &mut self.fg,
            Pen::Background => &mut self.bg,
        };
        if let Some(last) = list.last_mut() {
            if last.y == y {
                if x == last.x_end() {
                    last.width += 1;
                    return Ok(());
                }
                if x == last.x - 1 {
                    last.x -= 1;
                    last.width += 1;
                    return Ok(());
                }
            }
        }
        if list.len() == list.capacity() {
            try_reserve(list, 16, "thin line spans")?;
        }
        list.push(Span::new(y, x, 1));
        Ok(())
    }

    fn flush(self, sink: &mut dyn SpanSink) {
        if !self.bg.is_empty() {
            sink.fill_spans(&self.bg, false, Pen::Background);
        }
        if !self.fg.is_empty() {
            sink.fill_spans(&self.fg, false, Pen::Foreground);
        }
    }
}

/// Whether the final point of the polyline gets its own pixel.
///
/// A lone point and a pair of coincident points both make a dot.
fn paints_last_point(gc: &LineGc, points: &[Point]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => {
            gc.cap_style() != CapStyle::NotLast && (first != last || points.len() <= 2)
        }
        _ => false,
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Draw a solid zero-width polyline.
///
/// Each segment omits its end pixel, which is the next segment's start.
/// The final point is painted unless the cap style is
/// [`CapStyle::NotLast`] or the polyline closes on its first point. A
/// single point paints one pixel.
pub fn zero_line(sink: &mut dyn SpanSink, gc: &LineGc, points: &[Point]) -> Result<()> {
    if points.is_empty() {
        return Ok(());
    }
    let mut runs = RunBuilder::default();
    for pair in points.windows(2) {
        bresenham_segment(pair[0], pair[1], DEFAULT_ZERO_LINE_BIAS, |x, y| {
            runs.push(x, y, Pen::Foreground)
        })?;
    }
    if paints_last_point(gc, points) {
        if let Some(last) = points.last() {
            runs.push(last.x, last.y, Pen::Foreground)?;
        }
    }
    runs.flush(sink);
    Ok(())
}

/// Draw a dashed zero-width polyline.
///
/// The dash phase advances one unit per pixel along the major axis and
/// carries over from segment to segment. Odd runs are skipped for
/// [`LineStyle::OnOffDash`] and painted with the background pen for
/// [`LineStyle::DoubleDash`].
pub fn zero_dash_line(sink: &mut dyn SpanSink, gc: &LineGc, points: &[Point]) -> Result<()> {
    if points.is_empty() {
        return Ok(());
    }
    let dashes = gc.dashes();
    let double = gc.line_style() == LineStyle::DoubleDash;
    let mut phase = dashes.phase_at(gc.dash_offset() as u64);
    let mut runs = RunBuilder::default();

    for pair in points.windows(2) {
        bresenham_segment(pair[0], pair[1], DEFAULT_ZERO_LINE_BIAS, |x, y| {
            let on = phase.is_on();
            dashes.step(1, &mut phase);
            if on {
                runs.push(x, y, Pen::Foreground)
            } else if double {
                runs.push(x, y, Pen::Background)
            } else {
                Ok(())
            }
        })?;
    }
    if paints_last_point(gc, points) {
        if let Some(last) = points.last() {
            if phase.is_on() {
                runs.push(last.x, last.y, Pen::Foreground)?;
            } else if double {
                runs.push(last.x, last.y, Pen::Background)?;
            }
        }
    }
    runs.flush(sink);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
