// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial hash for tolerance-based vertex lookup.
//!
//! Graph vertices are deduplicated by tolerant equality. A linear scan would
//! make building a graph quadratic, so node indices are bucketed in a grid of
//! cubic cells and a lookup only inspects the 3x3x3 neighbourhood of the
//! query's cell.

use rustc_hash::FxHashMap;

use crate::geometry::{Vertex, TOLERANCE};

/// Grid of node indices keyed by cell coordinates.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    grid: FxHashMap<(i64, i64, i64), Vec<usize>>,
}

impl SpatialIndex {
    /// `cell_size` should be >= the tolerance used for equality.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            grid: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, index: usize, v: &Vertex) {
        let cell = self.cell_coords(v);
        self.grid.entry(cell).or_default().push(index);
    }

    /// First indexed vertex equal to `v` within tolerance. `vertices` is the
    /// storage the indices point into.
    pub fn find(&self, vertices: &[Vertex], v: &Vertex) -> Option<usize> {
        let (cx, cy, cz) = self.cell_coords(v);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    if let Some(&i) = bucket
                        .iter()
                        .find(|&&i| vertices.get(i).is_some_and(|candidate| candidate == v))
                    {
                        return Some(i);
                    }
                }
            }
        }
        None
    }

    fn cell_coords(&self, v: &Vertex) -> (i64, i64, i64) {
        (
            (v.x / self.cell_size).floor() as i64,
            (v.y / self.cell_size).floor() as i64,
            (v.z / self.cell_size).floor() as i64,
        )
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(TOLERANCE * 16.0)
    }
}
