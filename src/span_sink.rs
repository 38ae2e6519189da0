//! Span consumers.
//!
//! Every rasterizer in the crate ends by handing finished spans to a
//! [`SpanSink`]. The sink decides what painting means: [`SpanRecorder`]
//! keeps the spans for inspection, [`PixelSurface`] blends them into a
//! `u32` raster with a raster operation.

use std::collections::BTreeMap;

use crate::basics::Span;
use crate::gc::Rop;

// ============================================================================
// Pen
// ============================================================================

/// Which of the two drawing colors a batch of spans should be painted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pen {
    Foreground,
    /// Used for the odd dash runs of double-dashed lines.
    Background,
}

// ============================================================================
// SpanSink
// ============================================================================

/// Receives rasterized spans.
///
/// `sorted` is a hint that the batch is already ordered by `(y, x)`.
/// Spans may have zero width; sinks must tolerate them.
pub trait SpanSink {
    fn fill_spans(&mut self, spans: &[Span], sorted: bool, pen: Pen);
}

impl<F> SpanSink for F
where
    F: FnMut(&[Span], bool, Pen),
{
    fn fill_spans(&mut self, spans: &[Span], sorted: bool, pen: Pen) {
        self(spans, sorted, pen)
    }
}

// ============================================================================
// SpanRecorder
// ============================================================================

/// One call to [`SpanSink::fill_spans`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanBatch {
    pub pen: Pen,
    pub sorted: bool,
    pub spans: Vec<Span>,
}

/// A sink that remembers everything it was asked to paint.
#[derive(Debug, Clone, Default)]
pub struct SpanRecorder {
    batches: Vec<SpanBatch>,
}

impl SpanRecorder {
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
        }
    }

    pub fn batches(&self) -> &[SpanBatch] {
        &self.batches
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// All spans painted with `pen`, zero-width spans dropped, in call order.
    pub fn spans(&self, pen: Pen) -> Vec<Span> {
        self.batches
            .iter()
            .filter(|b| b.pen == pen)
            .flat_map(|b| b.spans.iter().copied())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Number of times each pixel was painted with `pen`.
    pub fn coverage(&self, pen: Pen) -> BTreeMap<(i32, i32), u32> {
        let mut map = BTreeMap::new();
        for s in self.spans(pen) {
            for x in s.x..s.x_end() {
                *map.entry((x, s.y)).or_insert(0) += 1;
            }
        }
        map
    }

    /// Pixels painted at least once with `pen`, as `(x, y)`.
    pub fn pixels(&self, pen: Pen) -> Vec<(i32, i32)> {
        self.coverage(pen).into_keys().collect()
    }

    /// Largest number of times any single pixel was painted with any pen.
    pub fn max_overdraw(&self) -> u32 {
        let mut map: BTreeMap<(i32, i32), u32> = BTreeMap::new();
        for pen in [Pen::Foreground, Pen::Background] {
            for (k, v) in self.coverage(pen) {
                *map.entry(k).or_insert(0) += v;
            }
        }
        map.values().copied().max().unwrap_or(0)
    }
}

impl SpanSink for SpanRecorder {
    fn fill_spans(&mut self, spans: &[Span], sorted: bool, pen: Pen) {
        if spans.is_empty() {
            return;
        }
        self.batches.push(SpanBatch {
            pen,
            sorted,
            spans: spans.to_vec(),
        });
    }
}

// ============================================================================
// PixelSurface
// ============================================================================

/// A `u32` raster that applies a raster operation to every painted pixel.
///
/// Spans are clipped to the surface bounds. The pixel function is chosen
/// from the [`Rop`] once, at construction.
pub struct PixelSurface {
    width: i32,
    height: i32,
    data: Vec<u32>,
    foreground: u32,
    background: u32,
    rop: Rop,
    blend: fn(u32, u32) -> u32,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, rop: Rop) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            data: vec![0; (width as usize) * (height as usize)],
            foreground: u32::MAX,
            background: 0,
            rop,
            blend: rop.blend_fn(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn rop(&self) -> Rop {
        self.rop
    }

    pub fn set_colors(&mut self, foreground: u32, background: u32) {
        self.foreground = foreground;
        self.background = background;
    }

    pub fn clear(&mut self, v: u32) {
        self.data.iter_mut().for_each(|p| *p = v);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }
}

impl SpanSink for PixelSurface {
    fn fill_spans(&mut self, spans: &[Span], _sorted: bool, pen: Pen) {
        let src = match pen {
            Pen::Foreground => self.foreground,
            Pen::Background => self.background,
        };
        for s in spans {
            if s.y < 0 || s.y >= self.height {
                continue;
            }
            let x1 = s.x.max(0);
            let x2 = s.x_end().min(self.width);
            if x1 >= x2 {
                continue;
            }
            let row = (s.y * self.width) as usize;
            for p in &mut self.data[row + x1 as usize..row + x2 as usize] {
                *p = (self.blend)(src, *p);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
