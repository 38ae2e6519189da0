//! Dash patterns and phase stepping.
//!
//! A dash pattern is a list of positive run lengths, alternately "on"
//! (even index) and "off" (odd index). The phase within the pattern is a
//! run index plus an offset into that run.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};

// ============================================================================
// DashPattern
// ============================================================================

/// A validated dash list: non-empty, every run positive.
///
/// Serialized as the bare run list; deserialization goes through
/// [`DashPattern::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serialization",
    serde(try_from = "Vec<u32>", into = "Vec<u32>")
)]
pub struct DashPattern {
    dashes: Vec<u32>,
    total: u64,
}

/// Position within a dash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashPhase {
    /// Index of the current run; even runs are "on".
    pub index: usize,
    /// Distance already consumed from the current run.
    pub offset: u32,
}

impl DashPhase {
    /// Returns `true` if the phase sits in an even (foreground) run.
    #[inline]
    pub fn is_on(&self) -> bool {
        self.index & 1 == 0
    }
}

impl DashPattern {
    pub fn new(dashes: &[u32]) -> Result<Self> {
        if dashes.is_empty() {
            return Err(RasterError::InvalidDash("empty dash list"));
        }
        if dashes.iter().any(|&d| d == 0) {
            return Err(RasterError::InvalidDash("zero-length dash"));
        }
        Ok(Self {
            dashes: dashes.to_vec(),
            total: dashes.iter().map(|&d| d as u64).sum(),
        })
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.dashes
    }

    pub fn len(&self) -> usize {
        self.dashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dashes.is_empty()
    }

    /// Sum of every run in the list.
    pub fn total_len(&self) -> u64 {
        self.total
    }

    /// Length of run `index`.
    #[inline]
    pub fn run(&self, index: usize) -> u32 {
        self.dashes[index]
    }

    /// The index following `index`, wrapping at the end of the list.
    #[inline]
    pub fn next_index(&self, index: usize) -> usize {
        if index + 1 == self.dashes.len() {
            0
        } else {
            index + 1
        }
    }

    /// Advance `phase` by `dist`.
    pub fn step(&self, dist: u64, phase: &mut DashPhase) {
        step_dash(dist, &mut phase.index, &mut phase.offset, self);
    }

    /// The phase reached after walking `dist` from the start of the list.
    pub fn phase_at(&self, dist: u64) -> DashPhase {
        let mut phase = DashPhase::default();
        self.step(dist, &mut phase);
        phase
    }
}

impl TryFrom<Vec<u32>> for DashPattern {
    type Error = RasterError;

    fn try_from(dashes: Vec<u32>) -> Result<Self> {
        Self::new(&dashes)
    }
}

impl From<DashPattern> for Vec<u32> {
    fn from(pattern: DashPattern) -> Self {
        pattern.dashes
    }
}

impl Default for DashPattern {
    /// Four on, four off.
    fn default() -> Self {
        Self {
            dashes: vec![4, 4],
            total: 8,
        }
    }
}

// ============================================================================
// Stepping
// ============================================================================

/// Advance the dash phase `(index, offset)` by `dist`.
///
/// Once the current run is exhausted the remaining distance is reduced
/// modulo the total pattern length, so the final scan is bounded by the
/// pattern length rather than by `dist`.
pub fn step_dash(dist: u64, index: &mut usize, offset: &mut u32, pattern: &DashPattern) {
    let mut dash_index = *index;
    let remaining_in_run = (pattern.run(dash_index) - *offset) as u64;
    if dist < remaining_in_run {
        *offset += dist as u32;
        return;
    }
    let mut dist = dist - remaining_in_run;
    dash_index = pattern.next_index(dash_index);
    if pattern.total_len() <= dist {
        dist %= pattern.total_len();
    }
    while dist >= pattern.run(dash_index) as u64 {
        dist -= pattern.run(dash_index) as u64;
        dash_index = pattern.next_index(dash_index);
    }
    *index = dash_index;
    *offset = dist as u32;
}

// ============================================================================
// Tests
// ============================================================================
