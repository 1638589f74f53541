//! Uniform Spatial Grid (Broad Phase)
//!
//! Divides space into uniform cubic cells and rebuilds the cell contents
//! wholesale every step.
//!
//! # How It Works
//!
//! Each body is entered into every cell its bounding box overlaps, so two
//! bodies whose boxes overlap always share at least one cell. The entries
//! are kept as a flat `(cell, id)` list sorted by key; runs of equal cells
//! give the candidate pairs. No hash map is iterated, so the output order
//! is a pure function of the body set.
//!
//! Bodies spanning more than [`MAX_CELLS_PER_BODY`] cells (ground planes,
//! arena walls) are kept on an oversize list and paired with everyone.

use crate::math::{Fixed, Vec3Fix};
use crate::shape::AABB;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Bodies covering more cells than this skip the grid
pub const MAX_CELLS_PER_BODY: i64 = 64;

/// Integer cell coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Uniform grid broad phase.
pub struct SpatialGrid {
    cell_size: Fixed,
    /// `(cell, id)` sorted ascending
    entries: Vec<(CellKey, u32)>,
    /// Bodies too large for the grid, ascending ids
    oversize: Vec<u32>,
    /// Every inserted id, ascending
    ids: Vec<u32>,
    /// Canonical candidate pairs of the last rebuild
    pairs: Vec<(u32, u32)>,
}

impl SpatialGrid {
    /// Create an empty grid. `cell_size` must be positive (checked by
    /// `PhysicsConfig::validate`); non-positive sizes fall back to 1.
    pub fn new(cell_size: Fixed) -> Self {
        let cell_size = if cell_size.is_positive() {
            cell_size
        } else {
            Fixed::ONE
        };
        Self {
            cell_size,
            entries: Vec::new(),
            oversize: Vec::new(),
            ids: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Side length of one cell
    #[inline]
    pub fn cell_size(&self) -> Fixed {
        self.cell_size
    }

    /// Clear all cells (retains allocated memory for reuse).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.oversize.clear();
        self.ids.clear();
        self.pairs.clear();
    }

    #[inline]
    fn coord(&self, v: Fixed) -> i32 {
        v.raw.div_euclid(self.cell_size.raw)
    }

    /// Cell containing a point
    #[inline]
    pub fn cell_of(&self, pos: Vec3Fix) -> CellKey {
        CellKey {
            x: self.coord(pos.x),
            y: self.coord(pos.y),
            z: self.coord(pos.z),
        }
    }

    /// Rebuild from `(id, bounds)` pairs and recompute the candidate pairs.
    pub fn rebuild<I>(&mut self, bodies: I)
    where
        I: IntoIterator<Item = (u32, AABB)>,
    {
        self.clear();
        for (id, aabb) in bodies {
            self.insert(id, &aabb);
        }
        self.entries.sort_unstable();
        self.oversize.sort_unstable();
        self.ids.sort_unstable();
        self.compute_pairs();
    }

    fn insert(&mut self, id: u32, aabb: &AABB) {
        self.ids.push(id);
        let lo = self.cell_of(aabb.min);
        let hi = self.cell_of(aabb.max);
        let span = |a: i32, b: i32| (b as i64 - a as i64 + 1).max(1);
        let cells = span(lo.x, hi.x)
            .saturating_mul(span(lo.y, hi.y))
            .saturating_mul(span(lo.z, hi.z));
        if cells > MAX_CELLS_PER_BODY {
            self.oversize.push(id);
            return;
        }
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    self.entries.push((CellKey { x, y, z }, id));
                }
            }
        }
    }

    fn compute_pairs(&mut self) {
        let mut start = 0;
        while start < self.entries.len() {
            let key = self.entries[start].0;
            let mut end = start + 1;
            while end < self.entries.len() && self.entries[end].0 == key {
                end += 1;
            }
            // Ids within a run are ascending, so (i, j) is already canonical
            for i in start..end {
                for j in (i + 1)..end {
                    self.pairs.push((self.entries[i].1, self.entries[j].1));
                }
            }
            start = end;
        }

        for &big in &self.oversize {
            for &other in &self.ids {
                if other != big {
                    self.pairs.push((big.min(other), big.max(other)));
                }
            }
        }

        self.pairs.sort_unstable();
        self.pairs.dedup();
    }

    /// Candidate pairs of the last rebuild: each at most once, `a < b`,
    /// ascending `(a, b)` order.
    pub fn candidate_pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of candidate pairs of the last rebuild
    #[inline]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Ids in cells within `ceil(radius / cell_size)` rings of the cell
    /// containing `center`, plus oversize bodies. Over-approximates; sorted
    /// ascending without duplicates.
    pub fn query_region(&self, center: Vec3Fix, radius: Fixed) -> Vec<u32> {
        let rings = {
            let r = radius.raw.max(0) as i64;
            let c = self.cell_size.raw as i64;
            ((r + c - 1) / c) as i32
        };
        let mid = self.cell_of(center);
        let lo = CellKey {
            x: mid.x.saturating_sub(rings),
            y: mid.y.saturating_sub(rings),
            z: mid.z.saturating_sub(rings),
        };
        let hi = CellKey {
            x: mid.x.saturating_add(rings),
            y: mid.y.saturating_add(rings),
            z: mid.z.saturating_add(rings),
        };
        self.query_cells(lo, hi)
    }

    /// Ids in every cell overlapped by `aabb`, plus oversize bodies
    pub fn query_aabb(&self, aabb: &AABB) -> Vec<u32> {
        self.query_cells(self.cell_of(aabb.min), self.cell_of(aabb.max))
    }

    fn query_cells(&self, lo: CellKey, hi: CellKey) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .entries
            .iter()
            .filter(|(k, _)| {
                k.x >= lo.x && k.x <= hi.x && k.y >= lo.y && k.y <= hi.y && k.z >= lo.z && k.z <= hi.z
            })
            .map(|&(_, id)| id)
            .chain(self.oversize.iter().copied())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
