// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unique points along each pillar.
//!
//! Every pillar collects the corner depths of the (up to four) active cell
//! columns around it, sorts them and merges runs that lie within tolerance.
//! The surviving depths are numbered consecutively pillar by pillar, so point
//! indices strictly increase with depth along any single pillar.

use rayon::prelude::*;

use crate::grdecl::Grdecl;
use crate::table::SparseTable;

/// Sorted, tolerance-deduplicated depths of every pillar.
///
/// The point index of depth `d` on pillar `p` is its position in the flat
/// [`SparseTable::data`] array, i.e. `offset(p) + local position`.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarPoints {
    depths: SparseTable<f64>,
}

impl PillarPoints {
    /// Builds the unique point list of every pillar of `grid`.
    pub fn build(grid: &Grdecl, tolerance: f64) -> Self {
        let [nx, ny, _] = grid.dims();

        let rows: Vec<Vec<f64>> = (0..(nx + 1) * (ny + 1))
            .into_par_iter()
            .map(|p| {
                let (pi, pj) = (p % (nx + 1), p / (nx + 1));
                let mut samples = pillar_samples(grid, pi, pj);
                samples.sort_unstable_by(f64::total_cmp);
                uniquify(&mut samples, tolerance);
                samples
            })
            .collect();

        let depths = SparseTable::from_rows(rows);
        tracing::debug!(
            pillars = depths.len(),
            points = depths.data().len(),
            "Built unique pillar points"
        );
        Self { depths }
    }

    /// Wraps an already deduplicated depth table.
    #[cfg(test)]
    pub(crate) fn from_table(depths: SparseTable<f64>) -> Self {
        Self { depths }
    }

    /// Total number of pillar points.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.depths.data().len()
    }

    /// Unique depths of pillar `p`, ascending.
    #[inline]
    pub fn depths(&self, p: usize) -> &[f64] {
        self.depths.row(p)
    }

    /// Point index of the first depth of pillar `p`.
    #[inline]
    pub fn offset(&self, p: usize) -> usize {
        self.depths.ptr()[p]
    }

    /// Point index range `[begin, end)` of pillar `p`.
    #[inline]
    pub fn range(&self, p: usize) -> std::ops::Range<usize> {
        self.depths.ptr()[p]..self.depths.ptr()[p + 1]
    }

    /// Depth of point index `point`.
    #[inline]
    pub fn depth(&self, point: usize) -> f64 {
        self.depths.data()[point]
    }

    pub fn table(&self) -> &SparseTable<f64> {
        &self.depths
    }

    pub fn into_table(self) -> SparseTable<f64> {
        self.depths
    }
}

/// Corner depths of active cells around pillar `(pi, pj)`, layer by layer.
fn pillar_samples(grid: &Grdecl, pi: usize, pj: usize) -> Vec<f64> {
    let nz = grid.dims()[2];
    let columns = grid.pillar_corner_columns(pi, pj);
    let mut samples = Vec::with_capacity(8 * nz);
    for kk in 0..2 * nz {
        for [ci, cj] in columns {
            if grid.corner_active(ci, cj, kk) {
                samples.push(grid.zcorn_at(ci, cj, kk));
            }
        }
    }
    samples
}

/// Collapses an ascending list in place so consecutive survivors differ by
/// more than `tolerance`. The first value of each run is kept.
pub(crate) fn uniquify(sorted: &mut Vec<f64>, tolerance: f64) {
    let Some(&first) = sorted.first() else {
        return;
    };
    let mut kept = first;
    let mut pos = 1;
    for i in 1..sorted.len() {
        let z = sorted[i];
        if z - kept > tolerance {
            kept = z;
            sorted[pos] = z;
            pos += 1;
        }
    }
    sorted.truncate(pos);
}
