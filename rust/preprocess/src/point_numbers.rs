// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping of cell corners to pillar point numbers.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::grdecl::Grdecl;
use crate::point::{ColumnPoints, PointRef};
use crate::unique_points::PillarPoints;

impl ColumnPoints {
    /// Assigns a pillar point number to every corner of every corner column.
    ///
    /// Corners of inactive cells repeat the previous entry of their column, so
    /// inactive cells collapse to zero thickness and never reference a point
    /// that was left out of the pillar list.
    pub fn assign(grid: &Grdecl, points: &PillarPoints, tolerance: f64) -> Result<Self> {
        let [nx, ny, nz] = grid.dims();
        let columns = [2 * nx, 2 * ny];
        let stride = 2 * nz + 2;
        let mut data = vec![PointRef::Above; columns[0] * columns[1] * stride];

        let results: Vec<Result<()>> = data
            .par_chunks_mut(stride)
            .enumerate()
            .map(|(c, out)| {
                let (ci, cj) = (c % columns[0], c / columns[0]);
                assign_column(grid, points, ci, cj, tolerance, out)
            })
            .collect();
        results.into_iter().collect::<Result<()>>()?;

        tracing::debug!(
            columns = columns[0] * columns[1],
            stride,
            "Assigned corner point numbers"
        );
        Ok(Self {
            columns,
            stride,
            data,
        })
    }
}

/// Fills the padded point sequence of corner column `(ci, cj)`.
fn assign_column(
    grid: &Grdecl,
    points: &PillarPoints,
    ci: usize,
    cj: usize,
    tolerance: f64,
    out: &mut [PointRef],
) -> Result<()> {
    let pillar = grid.corner_pillar(ci, cj);
    let range = points.range(pillar);
    let mut cursor = range.start;

    out[0] = PointRef::Above;
    for kk in 0..out.len() - 2 {
        if !grid.corner_active(ci, cj, kk) {
            out[kk + 1] = out[kk];
            continue;
        }

        let z = grid.zcorn_at(ci, cj, kk);
        while cursor < range.end && points.depth(cursor) + tolerance < z {
            cursor += 1;
        }
        if cursor == range.end || (z - points.depth(cursor)).abs() > tolerance {
            return Err(Error::Format {
                pillar,
                column: [ci, cj],
                corner_layer: kk,
                depth: z,
                tolerance,
            });
        }
        out[kk + 1] = PointRef::Node(cursor);
    }
    let last = out.len() - 1;
    out[last] = PointRef::Below;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(nx: usize, ny: usize) -> Vec<f64> {
        let mut c = Vec::new();
        for j in 0..=ny {
            for i in 0..=nx {
                c.extend_from_slice(&[i as f64, j as f64, 0.0, i as f64, j as f64, 100.0]);
            }
        }
        c
    }

    /// Single column, `nz` layers, layer `k` spanning `[k, k + 1]`.
    fn stacked(nz: usize, actnum: &[i32]) -> Grdecl {
        let mut zcorn = Vec::new();
        for kk in 0..2 * nz {
            zcorn.extend(std::iter::repeat(((kk + 1) / 2) as f64).take(4));
        }
        Grdecl::new([1, 1, nz], &coord(1, 1), zcorn, actnum).unwrap()
    }

    #[test]
    fn active_column_maps_onto_pillar_points() {
        let grid = stacked(2, &[1, 1]);
        let points = PillarPoints::build(&grid, f64::EPSILON);
        let cp = ColumnPoints::assign(&grid, &points, f64::EPSILON).unwrap();

        assert_eq!(cp.stride(), 6);
        assert_eq!(cp.columns(), [2, 2]);
        // Pillar 0 owns points 0..3 at depths 0, 1, 2.
        assert_eq!(
            cp.column(0, 0),
            &[
                PointRef::Above,
                PointRef::Node(0),
                PointRef::Node(1),
                PointRef::Node(1),
                PointRef::Node(2),
                PointRef::Below
            ]
        );
        // Corner column (1, 1) sits on pillar 3.
        assert_eq!(cp.column(1, 1)[1], PointRef::Node(9));
    }

    #[test]
    fn inactive_cell_collapses_onto_previous_point() {
        let grid = stacked(3, &[1, 0, 1]);
        let points = PillarPoints::build(&grid, f64::EPSILON);
        let cp = ColumnPoints::assign(&grid, &points, f64::EPSILON).unwrap();
        let col = cp.column(0, 0);

        // Layer 1 (entries 3 and 4) repeats the bottom of layer 0.
        assert_eq!(col[3], col[2]);
        assert_eq!(col[4], col[2]);
        assert_ne!(col[5], col[4]);
    }

    #[test]
    fn leading_inactive_cell_collapses_onto_top_marker() {
        let grid = stacked(2, &[0, 1]);
        let points = PillarPoints::build(&grid, f64::EPSILON);
        let cp = ColumnPoints::assign(&grid, &points, f64::EPSILON).unwrap();
        let col = cp.column(0, 0);
        assert_eq!(&col[..3], &[PointRef::Above; 3]);
        assert_eq!(col[3], PointRef::Node(0));
    }

    #[test]
    fn inverted_cell_is_a_format_error() {
        // Top below bottom: the cursor cannot walk back up the pillar.
        let zcorn = vec![2.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0];
        let grid = Grdecl::all_active([1, 1, 1], &coord(1, 1), zcorn).unwrap();
        let points = PillarPoints::build(&grid, f64::EPSILON);
        let err = ColumnPoints::assign(&grid, &points, f64::EPSILON).unwrap_err();
        match err {
            Error::Format {
                column,
                corner_layer,
                depth,
                ..
            } => {
                assert_eq!(column, [0, 0]);
                assert_eq!(corner_layer, 1);
                assert_eq!(depth, 1.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sample_missing_from_pillar_list_is_a_format_error() {
        let grid = stacked(1, &[1]);
        // A pillar list that lacks depth 1.0 on every pillar.
        let table = crate::table::SparseTable::from_rows((0..4).map(|_| vec![0.0]));
        let points = PillarPoints::from_table(table);
        let err = ColumnPoints::assign(&grid, &points, f64::EPSILON).unwrap_err();
        assert!(matches!(err, Error::Format { corner_layer: 1, .. }));
    }
}
