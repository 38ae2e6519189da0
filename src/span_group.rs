//! Span groups: accumulating, subtracting and de-duplicating span sets.
//!
//! A stroked shape is rasterized piece by piece (segments, joins, caps,
//! dash runs) and neighbouring pieces overlap. When the raster operation is
//! not idempotent every pixel must be painted exactly once, so the pieces
//! are gathered into a [`SpanGroup`] and flattened by
//! [`SpanGroup::fill_unique`] before anything reaches the sink.

use crate::basics::Span;
use crate::error::{try_reserve, with_capacity, Result};
use crate::span_sink::{Pen, SpanSink};

/// Extra slots reserved when a subtraction splits a span in two.
const SPLIT_EXTRA: usize = 8;

// ============================================================================
// SpanGroup
// ============================================================================

/// An unordered collection of span sets with cached row bounds.
///
/// Each set is ordered by increasing `y`; spans within a row need not be
/// sorted by `x`.
#[derive(Debug, Clone)]
pub struct SpanGroup {
    sets: Vec<Vec<Span>>,
    ymin: i32,
    ymax: i32,
}

impl SpanGroup {
    pub fn new() -> Self {
        Self {
            sets: Vec::new(),
            ymin: i32::MAX,
            ymax: i32::MIN,
        }
    }

    /// Number of span sets owned by the group.
    pub fn count(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn ymin(&self) -> i32 {
        self.ymin
    }

    pub fn ymax(&self) -> i32 {
        self.ymax
    }

    pub fn sets(&self) -> &[Vec<Span>] {
        &self.sets
    }

    /// Drop every set and reset the bounds.
    pub fn clear(&mut self) {
        self.sets.clear();
        self.ymin = i32::MAX;
        self.ymax = i32::MIN;
    }

    /// Take ownership of `spans` (ordered by increasing `y`).
    ///
    /// When `other` is given and its rows overlap the new spans, the pixels
    /// the new spans cover are removed from `other`, so whichever group
    /// received a pixel last owns it.
    pub fn append_spans(&mut self, other: Option<&mut SpanGroup>, spans: Vec<Span>) -> Result<()> {
        let (first, last) = match (spans.first(), spans.last()) {
            (Some(f), Some(l)) => (f.y, l.y),
            _ => return Ok(()),
        };
        if self.sets.len() == self.sets.capacity() {
            let wanted = self.sets.len() + 8;
            try_reserve(&mut self.sets, wanted, "span group")?;
        }
        if first < self.ymin {
            self.ymin = first;
        }
        if last > self.ymax {
            self.ymax = last;
        }
        if let Some(other) = other {
            if other.ymin <= last && first <= other.ymax {
                other.subtract_spans(&spans)?;
            }
        }
        self.sets.push(spans);
        Ok(())
    }

    /// Remove from every set the pixels covered by `sub`.
    ///
    /// `sub` must be ordered by increasing `y`. A span may be kept, removed,
    /// trimmed on either side, or split in two when `sub` falls strictly
    /// inside it.
    pub fn subtract_spans(&mut self, sub: &[Span]) -> Result<()> {
        let (sub_min, sub_max) = match (sub.first(), sub.last()) {
            (Some(f), Some(l)) => (f.y, l.y),
            _ => return Ok(()),
        };
        for set in &mut self.sets {
            let (set_min, set_max) = match (set.first(), set.last()) {
                (Some(f), Some(l)) => (f.y, l.y),
                _ => continue,
            };
            if set_min > sub_max || sub_min > set_max {
                continue;
            }
            subtract_from_set(set, sub)?;
        }
        Ok(())
    }

    /// Emit every set as-is, in group order, then empty the group.
    ///
    /// Pixels covered by more than one set are painted more than once.
    pub fn fill(&mut self, sink: &mut dyn SpanSink, pen: Pen) {
        for set in &self.sets {
            sink.fill_spans(set, true, pen);
        }
        self.clear();
    }

    /// Emit the union of every set, painting each pixel at most once, then
    /// empty the group.
    ///
    /// Spans are bucketed by row, each row is sorted by `x` and merged, and
    /// the whole result goes to the sink in one sorted batch. If a scratch
    /// buffer cannot be reserved nothing is emitted.
    pub fn fill_unique(&mut self, sink: &mut dyn SpanSink, pen: Pen) -> Result<()> {
        let result = self.flatten_unique();
        self.clear();
        let spans = result?;
        if !spans.is_empty() {
            sink.fill_spans(&spans, true, pen);
        }
        Ok(())
    }

    fn flatten_unique(&self) -> Result<Vec<Span>> {
        match self.sets.len() {
            0 => return Ok(Vec::new()),
            1 => return Ok(self.sets[0].clone()),
            _ => {}
        }

        let ylength = (self.ymax as i64 - self.ymin as i64 + 1).max(0) as usize;
        let total: usize = self.sets.iter().map(|s| s.len()).sum();

        // Pass 1: row histogram
        let mut rows: Vec<usize> = with_capacity(ylength + 1, "span rows")?;
        rows.resize(ylength + 1, 0);
        for span in self.sets.iter().flatten() {
            if let Some(index) = self.row_index(span.y, ylength) {
                rows[index + 1] += 1;
            }
        }
        for i in 1..rows.len() {
            rows[i] += rows[i - 1];
        }

        // Pass 2: scatter into row buckets
        let mut bucketed: Vec<Span> = with_capacity(total, "span buckets")?;
        bucketed.resize(total, Span::default());
        let mut fill = rows.clone();
        for span in self.sets.iter().flatten() {
            if let Some(index) = self.row_index(span.y, ylength) {
                bucketed[fill[index]] = *span;
                fill[index] += 1;
            }
        }

        // Pass 3: sort and merge each row
        let mut out: Vec<Span> = with_capacity(total, "unique spans")?;
        for index in 0..ylength {
            let row = &mut bucketed[rows[index]..rows[index + 1]];
            match row.len() {
                0 => {}
                1 => out.push(row[0]),
                _ => {
                    quick_sort_spans_x(row);
                    uniquify_spans_x(row, &mut out);
                }
            }
        }
        Ok(out)
    }

    #[inline]
    fn row_index(&self, y: i32, ylength: usize) -> Option<usize> {
        let index = y as i64 - self.ymin as i64;
        if index >= 0 && (index as usize) < ylength {
            Some(index as usize)
        } else {
            None
        }
    }
}

impl Default for SpanGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Subtract `sub` from one y-ordered set, rewriting it in place.
fn subtract_from_set(set: &mut Vec<Span>, sub: &[Span]) -> Result<()> {
    let mut out: Vec<Span> = with_capacity(set.len() + SPLIT_EXTRA, "span subtraction")?;
    let mut j = 0;
    for span in set.iter() {
        while j < sub.len() && sub[j].y < span.y {
            j += 1;
        }
        let mut k = j;
        while k < sub.len() && sub[k].y == span.y {
            k += 1;
        }
        let row = &sub[j..k];
        let overlaps = row
            .iter()
            .any(|s| s.x < span.x_end() && span.x < s.x_end() && !s.is_empty());
        if !overlaps {
            out.push(*span);
            continue;
        }

        // Clip [x1, x2) against every subtracted run on this row. Pieces are
        // kept in `out` from `start` onwards and re-split as needed.
        let start = out.len();
        out.push(*span);
        for s in row.iter().filter(|s| !s.is_empty()) {
            let xmin = s.x;
            let xmax = s.x_end();
            let mut i = start;
            while i < out.len() {
                let piece = out[i];
                if xmin >= piece.x_end() || piece.x >= xmax {
                    i += 1;
                } else if xmin <= piece.x {
                    if xmax >= piece.x_end() {
                        out.remove(i);
                    } else {
                        out[i].width = piece.x_end() - xmax;
                        out[i].x = xmax;
                        i += 1;
                    }
                } else if xmax >= piece.x_end() {
                    out[i].width = xmin - piece.x;
                    i += 1;
                } else {
                    if out.len() == out.capacity() {
                        try_reserve(&mut out, SPLIT_EXTRA, "span subtraction")?;
                    }
                    out[i].width = xmin - piece.x;
                    out.insert(i + 1, Span::new(piece.y, xmax, piece.x_end() - xmax));
                    i += 2;
                }
            }
        }
    }
    *set = out;
    Ok(())
}

// ============================================================================
// Row sorting
// ============================================================================

/// Sort spans of one row by `x`.
///
/// Quicksort with a median-of-three pivot, switching to insertion sort
/// below nine elements.
pub fn quick_sort_spans_x(mut spans: &mut [Span]) {
    loop {
        let n = spans.len();
        if n < 2 {
            return;
        }
        if n < 9 {
            insertion_sort_spans_x(spans);
            return;
        }

        // Choose partition element, stick in location 0
        let m = n / 2;
        if spans[m].x > spans[0].x {
            spans.swap(m, 0);
        }
        if spans[m].x > spans[n - 1].x {
            spans.swap(m, n - 1);
        }
        if spans[m].x > spans[0].x {
            spans.swap(m, 0);
        }
        let x = spans[0].x;

        let mut i = 0;
        let mut j = n;
        loop {
            loop {
                i += 1;
                if i == n || spans[i].x >= x {
                    break;
                }
            }
            loop {
                j -= 1;
                if spans[j].x <= x {
                    break;
                }
            }
            if i < j {
                spans.swap(i, j);
            } else {
                break;
            }
        }

        // Move partition element back to middle
        spans.swap(0, j);

        let (left, right) = core::mem::take(&mut spans).split_at_mut(j);
        quick_sort_spans_x(&mut right[1..]);
        spans = left;
    }
}

fn insertion_sort_spans_x(spans: &mut [Span]) {
    for i in 1..spans.len() {
        let cur = spans[i];
        if spans[i - 1].x > cur.x {
            let j = spans[..i].iter().position(|s| s.x > cur.x).unwrap_or(i);
            spans.copy_within(j..i, j + 1);
            spans[j] = cur;
        }
    }
}

/// Merge overlapping or touching spans of one x-sorted row into `out`.
pub fn uniquify_spans_x(spans: &[Span], out: &mut Vec<Span>) {
    let Some(first) = spans.first() else {
        return;
    };
    let y = first.y;
    let mut x1 = first.x;
    let mut x2 = first.x_end();
    for s in &spans[1..] {
        if s.x > x2 {
            out.push(Span::new(y, x1, x2 - x1));
            x1 = s.x;
            x2 = s.x_end();
        } else if s.x_end() > x2 {
            x2 = s.x_end();
        }
    }
    out.push(Span::new(y, x1, x2 - x1));
}

// ============================================================================
// Tests
// ============================================================================
