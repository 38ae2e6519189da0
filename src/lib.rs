//! # span-raster
//!
//! Software scanline rasterizer for integer pixel grids. Polygons and
//! polylines are turned into horizontal runs of pixels ("spans") and handed
//! to a caller-supplied [`SpanSink`], which decides what painting means.
//!
//! It features:
//!
//! - General polygon scan conversion with the even-odd and non-zero rules
//! - A sub-pixel convex polygon filler
//! - Wide lines with butt, round and projecting caps and miter, round and
//!   bevel joins (miters beyond about 11 degrees fall back to bevels)
//! - On-off and double dashes, with caps repeated at every dash
//! - One-pixel Bresenham lines that are identical in both directions
//! - Exactly-once painting for raster operations such as XOR, where a
//!   pixel painted twice would come out wrong
//!
//! ## Architecture
//!
//! 1. **Entry points** ([`poly_line`], [`fill_polygon`]) pick a rasterizer
//!    from the [`LineGc`]
//! 2. **Stroker** cuts a polyline into convex pieces: segment quads, join
//!    wedges, caps and dash runs
//! 3. **Edge walkers** turn each piece into spans
//! 4. **Span groups** collect pieces and flatten them so every pixel is
//!    emitted once, when the raster operation requires it
//! 5. **Sink** receives the spans
//!
//! ```
//! use span_raster::{poly_line, LineGc, Pen, Point, SpanRecorder};
//!
//! let gc = LineGc::new().with_line_width(3);
//! let mut rec = SpanRecorder::new();
//! poly_line(&mut rec, &gc, &[Point::new(0, 0), Point::new(10, 0)]).unwrap();
//! assert_eq!(rec.spans(Pen::Foreground).len(), 3);
//! ```

// Foundation types
pub mod basics;
pub mod dash;
pub mod error;
pub mod gc;
pub mod span_sink;

// Span algebra and edge walkers
pub mod edge_table;
pub mod poly_edge;
pub mod span_group;

// Rasterizers
pub mod convex_fill;
pub mod polygon_fill;
pub mod wide_line;
pub mod zero_line;

// Entry points
pub mod poly_line;

pub use basics::{FillingRule, Point, Span};
pub use convex_fill::fill_convex_polygon;
pub use dash::{DashPattern, DashPhase};
pub use error::{RasterError, Result};
pub use gc::{CapStyle, JoinStyle, LineGc, LineStyle, Rop};
pub use poly_edge::PolyVertex;
pub use poly_line::{draw_polygon, fill_polygon, poly_line, poly_segment, PolygonShape};
pub use polygon_fill::fill_general_polygon;
pub use span_group::SpanGroup;
pub use span_sink::{Pen, PixelSurface, SpanRecorder, SpanSink};
