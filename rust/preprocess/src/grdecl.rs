// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw corner-point grid description.
//!
//! A [`Grdecl`] holds the pillar endpoints (`COORD`), the eight corner depths of
//! every cell (`ZCORN`) and the active-cell mask (`ACTNUM`) in the standard
//! Eclipse layout:
//!
//! - `zcorn[ci + 2*nx*(cj + 2*ny*kk)]` where `(ci, cj)` is a *corner column*
//!   in `[0, 2nx) x [0, 2ny)` and `kk` a *corner layer* in `[0, 2nz)`.
//!   Corner column `ci` belongs to cell column `ci / 2`; corner layer `kk` is
//!   the top (`kk` even) or bottom (`kk` odd) of layer `kk / 2`.
//! - `actnum[i + nx*(j + ny*k)]`, nonzero meaning active.

use nalgebra::Point3;

use crate::error::{Error, Result};

/// A quasi-vertical line carrying a column of cell corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pillar {
    pub top: Point3<f64>,
    pub bottom: Point3<f64>,
}

impl Pillar {
    /// `true` when both endpoints share a depth, so no point on the pillar can
    /// be located by depth.
    pub fn is_flat(&self) -> bool {
        self.top.z == self.bottom.z
    }
}

/// Validated corner-point grid input.
#[derive(Debug, Clone)]
pub struct Grdecl {
    dims: [usize; 3],
    pillars: Vec<Pillar>,
    zcorn: Vec<f64>,
    actnum: Vec<bool>,
}

impl Grdecl {
    /// Builds a grid description from raw `COORD`, `ZCORN` and `ACTNUM` arrays.
    pub fn new(dims: [usize; 3], coord: &[f64], zcorn: Vec<f64>, actnum: &[i32]) -> Result<Self> {
        let [nx, ny, nz] = dims;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(Error::InvalidInput(format!(
                "dimensions must be positive, got {nx}x{ny}x{nz}"
            )));
        }

        let npillars = (nx + 1) * (ny + 1);
        if coord.len() != 6 * npillars {
            return Err(Error::InvalidInput(format!(
                "COORD must have 6*(nx+1)*(ny+1) = {} values, got {}",
                6 * npillars,
                coord.len()
            )));
        }

        let ncells = nx * ny * nz;
        if zcorn.len() != 8 * ncells {
            return Err(Error::InvalidInput(format!(
                "ZCORN must have 8*nx*ny*nz = {} values, got {}",
                8 * ncells,
                zcorn.len()
            )));
        }
        if actnum.len() != ncells {
            return Err(Error::InvalidInput(format!(
                "ACTNUM must have nx*ny*nz = {} values, got {}",
                ncells,
                actnum.len()
            )));
        }
        if let Some(pos) = zcorn.iter().position(|z| !z.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "ZCORN value at position {pos} is not finite"
            )));
        }

        let pillars = coord
            .chunks_exact(6)
            .map(|c| Pillar {
                top: Point3::new(c[0], c[1], c[2]),
                bottom: Point3::new(c[3], c[4], c[5]),
            })
            .collect::<Vec<_>>();

        let flat = pillars.iter().filter(|p| p.is_flat()).count();
        if flat > 0 {
            tracing::warn!(flat, "Pillars with equal endpoint depths cannot be interpolated");
        }

        Ok(Self {
            dims,
            pillars,
            zcorn,
            actnum: actnum.iter().map(|&a| a != 0).collect(),
        })
    }

    /// Builds a grid description where every cell is active.
    pub fn all_active(dims: [usize; 3], coord: &[f64], zcorn: Vec<f64>) -> Result<Self> {
        let actnum = vec![1; dims.iter().product()];
        Self::new(dims, coord, zcorn, &actnum)
    }

    /// Logical dimensions `[nx, ny, nz]`.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells, active or not.
    pub fn cell_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Number of pillars, `(nx+1)*(ny+1)`.
    pub fn pillar_count(&self) -> usize {
        self.pillars.len()
    }

    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    /// Global (natural order) index of cell `(i, j, k)`.
    #[inline]
    pub fn cell_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.dims;
        i + nx * (j + ny * k)
    }

    /// Pillar index of pillar `(pi, pj)`, `pi` in `[0, nx]`, `pj` in `[0, ny]`.
    #[inline]
    pub fn pillar_index(&self, pi: usize, pj: usize) -> usize {
        pi + (self.dims[0] + 1) * pj
    }

    /// The pillar that corner column `(ci, cj)` lies on.
    #[inline]
    pub fn corner_pillar(&self, ci: usize, cj: usize) -> usize {
        self.pillar_index((ci + 1) / 2, (cj + 1) / 2)
    }

    #[inline]
    pub fn is_active(&self, i: usize, j: usize, k: usize) -> bool {
        self.actnum[self.cell_index(i, j, k)]
    }

    /// Depth of corner layer `kk` in corner column `(ci, cj)`.
    #[inline]
    pub fn zcorn_at(&self, ci: usize, cj: usize, kk: usize) -> f64 {
        let [nx, ny, _] = self.dims;
        self.zcorn[ci + 2 * nx * (cj + 2 * ny * kk)]
    }

    /// `true` if the cell owning corner layer `kk` of corner column `(ci, cj)`
    /// is active.
    #[inline]
    pub fn corner_active(&self, ci: usize, cj: usize, kk: usize) -> bool {
        self.is_active(ci / 2, cj / 2, kk / 2)
    }

    /// The (up to four distinct) corner columns that touch pillar `(pi, pj)`.
    ///
    /// Boundary pillars repeat their single neighbouring column.
    pub fn pillar_corner_columns(&self, pi: usize, pj: usize) -> [[usize; 2]; 4] {
        let [nx, ny, _] = self.dims;
        let im = (2 * pi).max(1) - 1;
        let ip = (2 * pi + 1).min(2 * nx) - 1;
        let jm = (2 * pj).max(1) - 1;
        let jp = (2 * pj + 1).min(2 * ny) - 1;
        [[im, jm], [im, jp], [ip, jm], [ip, jp]]
    }
}
