//! Error type shared by every rasterization entry point.
//!
//! Failure is narrow: a transient buffer could not be reserved, or the
//! caller handed in a dash list that cannot be stepped. Degenerate geometry
//! is never an error.

use thiserror::Error;

/// Errors produced while rasterizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// A scratch buffer could not be reserved. Nothing was emitted for the
    /// shape being drawn.
    #[error("failed to reserve {requested} entries for {what}")]
    Alloc { what: &'static str, requested: usize },

    /// Dash lists must be non-empty and every run must be positive.
    #[error("invalid dash pattern: {0}")]
    InvalidDash(&'static str),
}

pub type Result<T> = core::result::Result<T, RasterError>;

/// Reserve room for `additional` more elements, mapping failure to
/// [`RasterError::Alloc`].
pub(crate) fn try_reserve<T>(v: &mut Vec<T>, additional: usize, what: &'static str) -> Result<()> {
    v.try_reserve(additional).map_err(|_| {
        log::warn!("allocation of {} entries for {} failed", additional, what);
        RasterError::Alloc {
            what,
            requested: additional,
        }
    })
}

/// A new vector with room for `capacity` elements.
pub(crate) fn with_capacity<T>(capacity: usize, what: &'static str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    try_reserve(&mut v, capacity, what)?;
    Ok(v)
}
