//! Line drawing state: width, styles, dashes and raster operation.
//!
//! The rasterizer only ever reads this; the caller owns it and passes it
//! into each draw call.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::dash::DashPattern;

// ============================================================================
// Enums
// ============================================================================

/// How the line is broken up along its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineStyle {
    #[default]
    Solid,
    /// Even dash runs are drawn in the foreground pen, odd runs are skipped.
    OnOffDash,
    /// Even dash runs in the foreground pen, odd runs in the background pen.
    DoubleDash,
}

/// Line cap style for polyline endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum CapStyle {
    /// Zero-width lines omit the final pixel; wide lines behave like `Butt`.
    NotLast,
    #[default]
    Butt,
    Round,
    /// The line is extended by half its width past each endpoint.
    Projecting,
}

/// Line join style at polyline corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum JoinStyle {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Raster operation applied by the span consumer, with the classic
/// sixteen-entry numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Rop {
    Clear = 0x0,
    And = 0x1,
    AndReverse = 0x2,
    #[default]
    Copy = 0x3,
    AndInverted = 0x4,
    Noop = 0x5,
    Xor = 0x6,
    Or = 0x7,
    Nor = 0x8,
    Equiv = 0x9,
    Invert = 0xa,
    OrReverse = 0xb,
    CopyInverted = 0xc,
    OrInverted = 0xd,
    Nand = 0xe,
    Set = 0xf,
}

impl Rop {
    pub const ALL: [Rop; 16] = [
        Rop::Clear,
        Rop::And,
        Rop::AndReverse,
        Rop::Copy,
        Rop::AndInverted,
        Rop::Noop,
        Rop::Xor,
        Rop::Or,
        Rop::Nor,
        Rop::Equiv,
        Rop::Invert,
        Rop::OrReverse,
        Rop::CopyInverted,
        Rop::OrInverted,
        Rop::Nand,
        Rop::Set,
    ];

    /// Returns `true` when painting a pixel twice gives a different result
    /// than painting it once. Strokes drawn with such an operation must go
    /// through the exactly-once span group path.
    ///
    /// Exactly two bit patterns qualify; no other operation is treated as
    /// careful.
    pub fn is_careful(self) -> bool {
        let rop = self as u8;
        (rop & 0xc) == 0x8 || (rop & 0x3) == 0x2
    }

    /// The pixel combination function for this operation.
    ///
    /// Resolved once per surface, not per pixel.
    pub fn blend_fn(self) -> fn(u32, u32) -> u32 {
        match self {
            Rop::Clear => |_, _| 0,
            Rop::And => |s, d| s & d,
            Rop::AndReverse => |s, d| s & !d,
            Rop::Copy => |s, _| s,
            Rop::AndInverted => |s, d| !s & d,
            Rop::Noop => |_, d| d,
            Rop::Xor => |s, d| s ^ d,
            Rop::Or => |s, d| s | d,
            Rop::Nor => |s, d| !(s | d),
            Rop::Equiv => |s, d| !s ^ d,
            Rop::Invert => |_, d| !d,
            Rop::OrReverse => |s, d| s | !d,
            Rop::CopyInverted => |s, _| !s,
            Rop::OrInverted => |s, d| !s | d,
            Rop::Nand => |s, d| !(s & d),
            Rop::Set => |_, _| !0,
        }
    }
}

// ============================================================================
// LineGc
// ============================================================================

/// Read-only drawing state consumed by the line and polygon rasterizers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineGc {
    #[cfg_attr(feature = "serialization", serde(deserialize_with = "non_negative_width"))]
    line_width: i32,
    line_style: LineStyle,
    cap_style: CapStyle,
    join_style: JoinStyle,
    dashes: DashPattern,
    dash_offset: u32,
    rop: Rop,
    fill_rule: crate::basics::FillingRule,
}

/// Deserialized widths are clamped like [`LineGc::set_line_width`].
#[cfg(feature = "serialization")]
fn non_negative_width<'de, D: Deserializer<'de>>(d: D) -> core::result::Result<i32, D::Error> {
    i32::deserialize(d).map(|w| w.max(0))
}

impl LineGc {
    pub fn new() -> Self {
        Self {
            line_width: 0,
            line_style: LineStyle::Solid,
            cap_style: CapStyle::Butt,
            join_style: JoinStyle::Miter,
            dashes: DashPattern::default(),
            dash_offset: 0,
            rop: Rop::Copy,
            fill_rule: crate::basics::FillingRule::NonZero,
        }
    }

    /// Line width in pixels; 0 selects the one-pixel Bresenham path.
    /// Negative widths are clamped to 0.
    pub fn set_line_width(&mut self, w: i32) {
        self.line_width = w.max(0);
    }
    pub fn line_width(&self) -> i32 {
        self.line_width
    }

    pub fn set_line_style(&mut self, ls: LineStyle) {
        self.line_style = ls;
    }
    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    pub fn set_cap_style(&mut self, cs: CapStyle) {
        self.cap_style = cs;
    }
    pub fn cap_style(&self) -> CapStyle {
        self.cap_style
    }

    pub fn set_join_style(&mut self, js: JoinStyle) {
        self.join_style = js;
    }
    pub fn join_style(&self) -> JoinStyle {
        self.join_style
    }

    pub fn set_dashes(&mut self, dashes: DashPattern) {
        self.dashes = dashes;
    }
    pub fn dashes(&self) -> &DashPattern {
        &self.dashes
    }

    /// Distance into the dash pattern at which every polyline starts.
    pub fn set_dash_offset(&mut self, offset: u32) {
        self.dash_offset = offset;
    }
    pub fn dash_offset(&self) -> u32 {
        self.dash_offset
    }

    pub fn set_rop(&mut self, rop: Rop) {
        self.rop = rop;
    }
    pub fn rop(&self) -> Rop {
        self.rop
    }

    pub fn set_fill_rule(&mut self, rule: crate::basics::FillingRule) {
        self.fill_rule = rule;
    }
    pub fn fill_rule(&self) -> crate::basics::FillingRule {
        self.fill_rule
    }

    /// Builder-style variant of [`set_line_width`](Self::set_line_width).
    pub fn with_line_width(mut self, w: i32) -> Self {
        self.set_line_width(w);
        self
    }

    pub fn with_line_style(mut self, ls: LineStyle) -> Self {
        self.line_style = ls;
        self
    }

    pub fn with_cap_style(mut self, cs: CapStyle) -> Self {
        self.cap_style = cs;
        self
    }

    pub fn with_join_style(mut self, js: JoinStyle) -> Self {
        self.join_style = js;
        self
    }

    pub fn with_dashes(mut self, dashes: DashPattern, offset: u32) -> Self {
        self.dashes = dashes;
        self.dash_offset = offset;
        self
    }

    pub fn with_rop(mut self, rop: Rop) -> Self {
        self.rop = rop;
        self
    }
}

impl Default for LineGc {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
