//! General polygon scan conversion.
//!
//! Handles arbitrary (concave, self-intersecting) integer polygons with
//! either filling rule. The polygon is implicitly closed.

use crate::basics::{FillingRule, Point, Span};
use crate::edge_table::{ActiveEdgeTable, EdgeTable};
use crate::error::{with_capacity, Result};
use crate::span_sink::{Pen, SpanSink};

/// Spans are handed to the sink in batches of this many.
pub const NUM_PTS_TO_BUFFER: usize = 200;

/// Fixed-size span buffer flushed to the sink whenever it fills.
struct SpanBuffer<'a> {
    sink: &'a mut dyn SpanSink,
    pen: Pen,
    spans: Vec<Span>,
}

impl<'a> SpanBuffer<'a> {
    fn new(sink: &'a mut dyn SpanSink, pen: Pen) -> Result<Self> {
        Ok(Self {
            sink,
            pen,
            spans: with_capacity(NUM_PTS_TO_BUFFER, "polygon span buffer")?,
        })
    }

    #[inline]
    fn push(&mut self, span: Span) {
        self.spans.push(span);
        if self.spans.len() == NUM_PTS_TO_BUFFER {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.sink.fill_spans(&self.spans, true, self.pen);
            self.spans.clear();
        }
    }
}

/// Scan convert the closed polygon `points` with `rule`.
///
/// Fewer than three points draw nothing. Every buffer is reserved before
/// the first span is emitted, so an allocation failure leaves the sink
/// untouched.
pub fn fill_general_polygon(
    sink: &mut dyn SpanSink,
    pen: Pen,
    rule: FillingRule,
    points: &[Point],
) -> Result<()> {
    if points.len() < 3 {
        return Ok(());
    }

    let mut et = EdgeTable::new(points)?;
    let mut aet = ActiveEdgeTable::new(et.entries.len())?;
    let mut out = SpanBuffer::new(sink, pen)?;
    if et.is_empty() {
        return Ok(());
    }
    log::trace!(
        "fill_general_polygon: {} edges, rows {}..{}, {:?}",
        et.entries.len(),
        et.ymin,
        et.ymax,
        rule
    );

    let buckets = core::mem::take(&mut et.scanlines);
    let mut next_bucket = buckets.iter().peekable();
    let mut fix_winding = false;

    for y in et.ymin..et.ymax {
        if let Some(bucket) = next_bucket.next_if(|b| b.scanline == y) {
            aet.load(&bucket.edges, &et.entries)?;
            if rule == FillingRule::NonZero {
                aet.compute_winding(&et.entries);
            }
        }

        match rule {
            FillingRule::EvenOdd => {
                for pair in aet.edges().chunks_exact(2) {
                    let x1 = et.entries[pair[0]].bres.minor;
                    let x2 = et.entries[pair[1]].bres.minor;
                    out.push(Span::new(y, x1, x2 - x1));
                }
            }
            FillingRule::NonZero => {
                for pair in aet.winding().chunks_exact(2) {
                    let x1 = et.entries[pair[0]].bres.minor;
                    let x2 = et.entries[pair[1]].bres.minor;
                    out.push(Span::new(y, x1, x2 - x1));
                }
            }
        }

        if aet.advance(y, &mut et.entries) {
            fix_winding = true;
        }
        let changed = aet.insertion_sort(&et.entries);
        if rule == FillingRule::NonZero && (changed || fix_winding) {
            aet.compute_winding(&et.entries);
            fix_winding = false;
        }
    }
    out.flush();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
