//! Foundation types, constants, and rounding helpers.
//!
//! The integer point and span types every other module speaks, plus the
//! ceiling/floor conventions the edge walkers depend on.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Floor a double to the nearest integer toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

/// Ceiling of a double as a signed integer.
///
/// Every edge start in the rasterizer is computed with this: a pixel is
/// inside a shape when its centre lies on or to the right of the left
/// boundary, which is a ceiling, never a floor.
#[inline]
pub fn iceil(v: f64) -> i32 {
    v.ceil() as i32
}

// ============================================================================
// Filling rule
// ============================================================================

/// Filling rule for general polygon rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillingRule {
    /// Non-zero winding number.
    #[default]
    NonZero,
    EvenOdd,
}

// ============================================================================
// Point
// ============================================================================

/// Integer device coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// Span
// ============================================================================

/// A horizontal run of pixels: row `y`, columns `[x, x + width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Span {
    pub y: i32,
    pub x: i32,
    pub width: i32,
}

impl Span {
    pub const fn new(y: i32, x: i32, width: i32) -> Self {
        Self { y, x, width }
    }

    /// One past the last covered column.
    #[inline]
    pub fn x_end(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iceil() {
        assert_eq!(iceil(1.0), 1);
        assert_eq!(iceil(1.0001), 2);
        assert_eq!(iceil(-0.5), 0);
        assert_eq!(iceil(-1.5), -1);
        assert_eq!(iceil(0.0), 0);
    }

    #[test]
    fn test_ifloor() {
        assert_eq!(ifloor(1.9), 1);
        assert_eq!(ifloor(-0.1), -1);
        assert_eq!(ifloor(-2.0), -2);
    }

    #[test]
    fn test_span_extent() {
        let s = Span::new(3, 5, 4);
        assert_eq!(s.x_end(), 9);
        assert!(!s.is_empty());
        assert!(Span::new(0, 0, 0).is_empty());
    }

    #[test]
    fn test_point_from_tuple() {
        let p: Point = (4, -2).into();
        assert_eq!(p, Point::new(4, -2));
    }
}
