//! Edge table and active edge table for general polygon scan conversion.
//!
//! Edges are stored once in an arena and referred to by index. The edge
//! table buckets them by starting scanline; the active edge table is the
//! x-ordered list of edges crossing the current scanline, plus the winding
//! chain used by the non-zero rule.

use crate::basics::Point;
use crate::error::{try_reserve, with_capacity, Result};

// ============================================================================
// Bresenham state
// ============================================================================

/// Incremental x position of a polygon edge, one step per scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BresInfo {
    /// Current x.
    pub minor: i32,
    pub d: i32,
    pub m: i32,
    pub m1: i32,
    pub incr1: i32,
    pub incr2: i32,
}

impl BresInfo {
    /// Set up the walk from `x1` to `x2` over `dy` scanlines.
    pub fn new(dy: i32, x1: i32, x2: i32) -> Self {
        let mut b = BresInfo {
            minor: x1,
            ..Default::default()
        };
        if dy == 0 {
            return b;
        }
        let dx = x2 - x1;
        b.m = dx / dy;
        if dx < 0 {
            b.m1 = b.m - 1;
            b.incr1 = -2 * dx + 2 * dy * b.m1;
            b.incr2 = -2 * dx + 2 * dy * b.m;
            b.d = 2 * b.m * dy - 2 * dx - 2 * dy;
        } else {
            b.m1 = b.m + 1;
            b.incr1 = 2 * dx - 2 * dy * b.m1;
            b.incr2 = 2 * dx - 2 * dy * b.m;
            b.d = -2 * b.m * dy + 2 * dx;
        }
        b
    }

    /// Advance one scanline.
    #[inline]
    pub fn step(&mut self) {
        let take_m1 = if self.m1 > 0 { self.d > 0 } else { self.d >= 0 };
        if take_m1 {
            self.minor += self.m1;
            self.d += self.incr1;
        } else {
            self.minor += self.m;
            self.d += self.incr2;
        }
    }
}

// ============================================================================
// Edge table
// ============================================================================

/// One non-horizontal polygon edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeTableEntry {
    /// Last scanline the edge is active on.
    pub ymax: i32,
    pub bres: BresInfo,
    /// `true` when the edge runs downward in vertex order.
    pub clockwise: bool,
}

/// Edges starting on one scanline, sorted by x.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLineList {
    pub scanline: i32,
    pub edges: Vec<usize>,
}

/// All polygon edges, bucketed by starting scanline.
#[derive(Debug, Clone)]
pub struct EdgeTable {
    pub entries: Vec<EdgeTableEntry>,
    /// Buckets in increasing scanline order.
    pub scanlines: Vec<ScanLineList>,
    pub ymin: i32,
    pub ymax: i32,
}

impl EdgeTable {
    /// Build the table for the closed polygon `points`.
    ///
    /// Horizontal edges are dropped. Each edge covers the rows from its top
    /// vertex down to one above its bottom vertex.
    pub fn new(points: &[Point]) -> Result<Self> {
        let mut et = EdgeTable {
            entries: with_capacity(points.len(), "edge table")?,
            scanlines: with_capacity(points.len(), "scanline buckets")?,
            ymin: i32::MAX,
            ymax: i32::MIN,
        };
        if points.len() < 2 {
            return Ok(et);
        }

        let mut prev = points[points.len() - 1];
        for &curr in points {
            let (top, bottom, clockwise) = if prev.y > curr.y {
                (curr, prev, false)
            } else {
                (prev, curr, true)
            };
            if bottom.y != top.y {
                let dy = bottom.y - top.y;
                let id = et.entries.len();
                et.entries.push(EdgeTableEntry {
                    ymax: bottom.y - 1,
                    bres: BresInfo::new(dy, top.x, bottom.x),
                    clockwise,
                });
                et.insert(id, top.y)?;
                et.ymax = et.ymax.max(prev.y);
                et.ymin = et.ymin.min(prev.y);
            }
            prev = curr;
        }
        Ok(et)
    }

    /// Put edge `id` into the bucket for `scanline`, before any edge whose
    /// x is not smaller.
    fn insert(&mut self, id: usize, scanline: i32) -> Result<()> {
        let bucket = match self.scanlines.binary_search_by_key(&scanline, |s| s.scanline) {
            Ok(b) => b,
            Err(b) => {
                if self.scanlines.len() == self.scanlines.capacity() {
                    try_reserve(&mut self.scanlines, 16, "scanline buckets")?;
                }
                self.scanlines.insert(
                    b,
                    ScanLineList {
                        scanline,
                        edges: Vec::new(),
                    },
                );
                b
            }
        };
        let x = self.entries[id].bres.minor;
        let entries = &self.entries;
        let list = &mut self.scanlines[bucket].edges;
        let pos = list
            .iter()
            .position(|&e| entries[e].bres.minor >= x)
            .unwrap_or(list.len());
        if list.len() == list.capacity() {
            try_reserve(list, 4, "scanline bucket")?;
        }
        list.insert(pos, id);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Active edge table
// ============================================================================

/// Edges crossing the current scanline, ordered by x.
#[derive(Debug, Clone, Default)]
pub struct ActiveEdgeTable {
    edges: Vec<usize>,
    /// Alternating entering/leaving edges for the non-zero rule.
    winding: Vec<usize>,
    /// Merge target for [`ActiveEdgeTable::load`], swapped with `edges`.
    scratch: Vec<usize>,
}

impl ActiveEdgeTable {
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            edges: with_capacity(capacity, "active edge table")?,
            winding: with_capacity(capacity, "winding edge table")?,
            scratch: with_capacity(capacity, "active edge table")?,
        })
    }

    /// Edge indices in x order.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// The winding chain: pairs of (entering, leaving) edges.
    pub fn winding(&self) -> &[usize] {
        &self.winding
    }

    /// Merge an x-sorted bucket into the table. On equal x the new edge
    /// goes first.
    ///
    /// The merge reuses the capacity reserved by [`ActiveEdgeTable::new`]
    /// and only allocates when more edges are loaded than it was sized for.
    pub fn load(&mut self, bucket: &[usize], entries: &[EdgeTableEntry]) -> Result<()> {
        if bucket.is_empty() {
            return Ok(());
        }
        self.scratch.clear();
        try_reserve(&mut self.scratch, self.edges.len() + bucket.len(), "active edge table")?;
        let mut a = self.edges.iter().copied().peekable();
        for &b in bucket {
            let bx = entries[b].bres.minor;
            while let Some(&id) = a.peek() {
                if entries[id].bres.minor < bx {
                    self.scratch.push(id);
                    a.next();
                } else {
                    break;
                }
            }
            self.scratch.push(b);
        }
        self.scratch.extend(a);
        core::mem::swap(&mut self.edges, &mut self.scratch);
        Ok(())
    }

    /// Rebuild the winding chain.
    ///
    /// Walking left to right, a running count goes up on downward edges and
    /// down on upward ones. An edge joins the chain whenever the count
    /// moves from zero to non-zero or back.
    pub fn compute_winding(&mut self, entries: &[EdgeTableEntry]) {
        self.winding.clear();
        let mut inside = true;
        let mut is_inside = 0i32;
        for &id in &self.edges {
            if entries[id].clockwise {
                is_inside += 1;
            } else {
                is_inside -= 1;
            }
            if inside == (is_inside != 0) {
                self.winding.push(id);
                inside = !inside;
            }
        }
    }

    /// Drop edges ending on row `y` and step the rest. Returns `true` if
    /// any edge was dropped.
    pub fn advance(&mut self, y: i32, entries: &mut [EdgeTableEntry]) -> bool {
        let before = self.edges.len();
        self.edges.retain(|&id| {
            let e = &mut entries[id];
            if e.ymax == y {
                false
            } else {
                e.bres.step();
                true
            }
        });
        self.edges.len() != before
    }

    /// Restore x order after a step. Returns `true` if anything moved.
    pub fn insertion_sort(&mut self, entries: &[EdgeTableEntry]) -> bool {
        let mut changed = false;
        for i in 1..self.edges.len() {
            let id = self.edges[i];
            let x = entries[id].bres.minor;
            let mut j = i;
            while j > 0 && entries[self.edges[j - 1]].bres.minor > x {
                j -= 1;
            }
            if j != i {
                self.edges.copy_within(j..i, j + 1);
                self.edges[j] = id;
                changed = true;
            }
        }
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(dy: i32, x1: i32, x2: i32) -> Vec<i32> {
        let mut b = BresInfo::new(dy, x1, x2);
        let mut xs = vec![b.minor];
        for _ in 0..dy {
            b.step();
            xs.push(b.minor);
        }
        xs
    }

    #[test]
    fn test_bres_reaches_endpoint() {
        for &(dy, x1, x2) in &[(10, 0, 3), (10, 0, -3), (3, 0, 10), (3, 5, -10), (7, 2, 2), (1, 0, 9)] {
            let xs = walk(dy, x1, x2);
            assert_eq!(xs[0], x1);
            assert_eq!(*xs.last().unwrap(), x2, "dy={} x1={} x2={}", dy, x1, x2);
        }
    }

    #[test]
    fn test_bres_monotonic() {
        let xs = walk(9, 0, 4);
        assert!(xs.windows(2).all(|w| w[1] >= w[0]));
        let xs = walk(9, 4, 0);
        assert!(xs.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_edge_table_skips_horizontal() {
        let pts = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        let et = EdgeTable::new(&pts).unwrap();
        assert_eq!(et.entries.len(), 2);
        assert_eq!(et.ymin, 0);
        assert_eq!(et.ymax, 10);
        assert_eq!(et.scanlines.len(), 1);
        let bucket = &et.scanlines[0];
        assert_eq!(bucket.scanline, 0);
        let xs: Vec<i32> = bucket.edges.iter().map(|&e| et.entries[e].bres.minor).collect();
        assert_eq!(xs, vec![0, 10]);
        for e in &et.entries {
            assert_eq!(e.ymax, 9);
        }
    }

    #[test]
    fn test_edge_orientation() {
        let pts = [Point::new(0, 0), Point::new(5, 8), Point::new(-5, 8)];
        let et = EdgeTable::new(&pts).unwrap();
        // (-5,8)->(0,0) goes up, (0,0)->(5,8) goes down
        assert_eq!(et.entries.len(), 2);
        assert!(!et.entries[0].clockwise);
        assert!(et.entries[1].clockwise);
    }

    #[test]
    fn test_buckets_sorted_by_scanline() {
        let pts = [
            Point::new(0, 5),
            Point::new(4, 0),
            Point::new(8, 5),
            Point::new(4, 10),
            Point::new(4, 3),
        ];
        let et = EdgeTable::new(&pts).unwrap();
        let rows: Vec<i32> = et.scanlines.iter().map(|s| s.scanline).collect();
        let mut sorted = rows.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(rows, sorted);
    }

    #[test]
    fn test_load_merges_in_x_order() {
        let entries: Vec<EdgeTableEntry> = [5, 1, 3, 3]
            .iter()
            .map(|&x| EdgeTableEntry {
                ymax: 10,
                bres: BresInfo::new(10, x, x),
                clockwise: true,
            })
            .collect();
        let mut aet = ActiveEdgeTable::new(4).unwrap();
        aet.load(&[1, 0], &entries).unwrap();
        aet.load(&[3], &entries).unwrap();
        assert_eq!(aet.edges(), &[1, 3, 0]);
        aet.load(&[2], &entries).unwrap();
        assert_eq!(aet.edges(), &[1, 2, 3, 0]);
    }

    #[test]
    fn test_load_reuses_reserved_buffers() {
        let entries: Vec<EdgeTableEntry> = [4, 2, 9, 7]
            .iter()
            .map(|&x| EdgeTableEntry {
                ymax: 10,
                bres: BresInfo::new(10, x, x),
                clockwise: true,
            })
            .collect();
        let mut aet = ActiveEdgeTable::new(4).unwrap();
        let buffers = |aet: &ActiveEdgeTable| {
            let mut p = [aet.edges.as_ptr(), aet.scratch.as_ptr()];
            p.sort();
            p
        };
        let before = buffers(&aet);
        aet.load(&[1, 0], &entries).unwrap();
        aet.load(&[3], &entries).unwrap();
        aet.load(&[2], &entries).unwrap();
        assert_eq!(aet.edges(), &[1, 0, 3, 2]);
        assert_eq!(buffers(&aet), before);
    }

    #[test]
    fn test_winding_chain_nested() {
        // Two nested same-direction pairs: count goes 1, 2, 1, 0.
        let entries: Vec<EdgeTableEntry> = [(0, true), (2, true), (6, false), (8, false)]
            .iter()
            .map(|&(x, cw)| EdgeTableEntry {
                ymax: 10,
                bres: BresInfo::new(10, x, x),
                clockwise: cw,
            })
            .collect();
        let mut aet = ActiveEdgeTable::new(4).unwrap();
        aet.load(&[0, 1, 2, 3], &entries).unwrap();
        aet.compute_winding(&entries);
        assert_eq!(aet.winding(), &[0, 3]);
    }

    #[test]
    fn test_advance_and_sort() {
        let mut entries = vec![
            EdgeTableEntry {
                ymax: 5,
                bres: BresInfo::new(5, 0, 10),
                clockwise: true,
            },
            EdgeTableEntry {
                ymax: 5,
                bres: BresInfo::new(5, 6, 6),
                clockwise: false,
            },
            EdgeTableEntry {
                ymax: 0,
                bres: BresInfo::new(1, 20, 20),
                clockwise: false,
            },
        ];
        let mut aet = ActiveEdgeTable::new(3).unwrap();
        aet.load(&[0, 1, 2], &entries).unwrap();
        assert!(aet.advance(0, &mut entries));
        assert_eq!(aet.edges(), &[0, 1]);
        assert!(!aet.insertion_sort(&entries));
        for y in 1..4 {
            assert!(!aet.advance(y, &mut entries));
        }
        // Edge 0 has moved past x = 6
        assert!(aet.insertion_sort(&entries));
        assert_eq!(aet.edges(), &[1, 0]);
    }
}
