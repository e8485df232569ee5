// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid builders shared by the integration tests.

#![allow(dead_code)]

use cpgrid_preprocess::Grdecl;

/// Builds a `Grdecl` on vertical pillars with unit spacing.
///
/// By default layer `k` spans depths `[k, k + 1]` on every corner.
pub struct GridBuilder {
    dims: [usize; 3],
    zcorn: Vec<f64>,
    actnum: Vec<i32>,
}

impl GridBuilder {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        let mut zcorn = Vec::with_capacity(8 * nx * ny * nz);
        for kk in 0..2 * nz {
            let depth = ((kk + 1) / 2) as f64;
            zcorn.extend(std::iter::repeat(depth).take(4 * nx * ny));
        }
        Self {
            dims: [nx, ny, nz],
            zcorn,
            actnum: vec![1; nx * ny * nz],
        }
    }

    /// Marks cell `(i, j, k)` inactive.
    pub fn inactive(mut self, i: usize, j: usize, k: usize) -> Self {
        let [nx, ny, _] = self.dims;
        self.actnum[i + nx * (j + ny * k)] = 0;
        self
    }

    /// Sets the depth of corner layer `kk` in corner column `(ci, cj)`.
    pub fn corner(mut self, ci: usize, cj: usize, kk: usize, depth: f64) -> Self {
        let [nx, ny, _] = self.dims;
        self.zcorn[ci + 2 * nx * (cj + 2 * ny * kk)] = depth;
        self
    }

    /// Sets all corner layers of corner column `(ci, cj)`, top to bottom.
    pub fn corner_column(mut self, ci: usize, cj: usize, depths: &[f64]) -> Self {
        assert_eq!(depths.len(), 2 * self.dims[2]);
        for (kk, &z) in depths.iter().enumerate() {
            self = self.corner(ci, cj, kk, z);
        }
        self
    }

    /// Sets the four corner columns of cell column `(i, j)` to the same
    /// layer boundaries: `boundaries[k]` is the top of layer `k`,
    /// `boundaries[k + 1]` its bottom.
    pub fn cell_column(self, i: usize, j: usize, boundaries: &[f64]) -> Self {
        let depths = layer_corners(boundaries);
        self.corner_column(2 * i, 2 * j, &depths)
            .corner_column(2 * i + 1, 2 * j, &depths)
            .corner_column(2 * i, 2 * j + 1, &depths)
            .corner_column(2 * i + 1, 2 * j + 1, &depths)
    }

    pub fn build(self) -> Grdecl {
        let [nx, ny, _] = self.dims;
        Grdecl::new(self.dims, &vertical_coord(nx, ny), self.zcorn, &self.actnum)
            .expect("valid test grid")
    }
}

/// Corner depths (top, bottom per layer) of touching layers.
pub fn layer_corners(boundaries: &[f64]) -> Vec<f64> {
    boundaries
        .windows(2)
        .flat_map(|w| [w[0], w[1]])
        .collect()
}

/// `COORD` for vertical pillars on a unit lattice, 100 units deep.
pub fn vertical_coord(nx: usize, ny: usize) -> Vec<f64> {
    let mut coord = Vec::with_capacity(6 * (nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            let (x, y) = (i as f64, j as f64);
            coord.extend_from_slice(&[x, y, -10.0, x, y, 100.0]);
        }
    }
    coord
}

/// Two columns, the right one thrown down by one layer on every corner.
pub fn vertical_throw() -> Grdecl {
    GridBuilder::new(2, 1, 2)
        .cell_column(1, 0, &[1.0, 2.0, 3.0])
        .build()
}

/// Two single-cell columns. The left cell thins to a point at depth 1 on
/// pillar (1, 0), inside the right cell, while on pillar (1, 1) it lies
/// wholly above the right cell. Both of its lines cross the top of the
/// right cell next to the pinched corner.
pub fn pinched_corner_fault() -> Grdecl {
    GridBuilder::new(2, 1, 1)
        .corner(1, 0, 0, 1.0)
        .corner_column(2, 0, &[0.0, 2.0])
        .corner_column(2, 1, &[2.0, 3.0])
        .build()
}

/// Two columns side by side; the right one is thrown down at pillar row 0
/// and up at pillar row 1, so all of its layer boundaries cross those of
/// the left column on the shared curtain.
pub fn scissor_fault() -> Grdecl {
    let front = layer_corners(&[0.5, 1.5, 2.5]);
    let back = layer_corners(&[-0.5, 0.5, 1.5]);
    GridBuilder::new(2, 1, 2)
        .corner_column(2, 0, &front)
        .corner_column(3, 0, &front)
        .corner_column(2, 1, &back)
        .corner_column(3, 1, &back)
        .build()
}
