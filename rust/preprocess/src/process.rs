// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid assembly: from a [`Grdecl`] to a [`ProcessedGrid`].

use rayon::prelude::*;

use crate::connections::{find_connections, Curtain, SweepBuffers};
use crate::error::Result;
use crate::faces::{FaceTable, FaceTag, NodeAllocator};
use crate::grdecl::Grdecl;
use crate::options::ProcessOptions;
use crate::point::{ColumnPoints, PointRef};
use crate::processed::ProcessedGrid;
use crate::unique_points::PillarPoints;

/// Active-cell numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellNumbering {
    /// Global cell index -> local active index.
    pub local: Vec<Option<usize>>,
    /// Local active index -> global cell index.
    pub global: Vec<usize>,
}

/// Direction of a family of curtains: between columns `i - 1` and `i`, or
/// between `j - 1` and `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurtainDirection {
    I,
    J,
}

impl CurtainDirection {
    fn tag(self) -> FaceTag {
        match self {
            CurtainDirection::I => FaceTag::I,
            CurtainDirection::J => FaceTag::J,
        }
    }
}

/// Builds the face topology of a corner-point grid.
///
/// The build runs in phases: unique pillar points, corner point numbers,
/// active-cell compaction, then faces of constant `i`, constant `j` and
/// constant `k`, in that order. The first error aborts the whole build.
pub fn process_grid(grid: &Grdecl, options: &ProcessOptions) -> Result<ProcessedGrid> {
    let dims = grid.dims();
    tracing::info!(
        nx = dims[0],
        ny = dims[1],
        nz = dims[2],
        tolerance = options.tolerance,
        "Processing corner-point grid"
    );

    let points = PillarPoints::build(grid, options.tolerance);
    let columns = ColumnPoints::assign(grid, &points, options.tolerance)?;
    let cells = number_cells(grid, &columns);
    tracing::debug!(
        active = cells.global.len(),
        total = grid.cell_count(),
        "Compacted active cells"
    );

    let mut nodes = NodeAllocator::new(points.point_count());
    let mut faces = FaceTable::new();

    for direction in [CurtainDirection::I, CurtainDirection::J] {
        vertical_faces(grid, &columns, &cells, direction, options, &mut nodes, &mut faces)?;
        tracing::debug!(
            ?direction,
            faces = faces.count(direction.tag()),
            nodes = nodes.node_count(),
            "Swept curtains"
        );
    }

    horizontal_faces(grid, &columns, &cells, &mut faces)?;
    tracing::debug!(faces = faces.count(FaceTag::K), "Built horizontal faces");

    let number_of_nodes = nodes.node_count();
    let processed = ProcessedGrid::from_parts(
        dims,
        faces,
        number_of_nodes,
        points.into_table(),
        nodes.into_intersections(),
        cells,
    );

    tracing::info!(
        faces = processed.number_of_faces(),
        nodes = processed.number_of_nodes(),
        cells = processed.number_of_cells(),
        intersections = processed.intersections().len(),
        "Processed corner-point grid"
    );
    Ok(processed)
}

/// The four corner columns of cell column `(i, j)`, in the order
/// `(2i,2j), (2i+1,2j), (2i,2j+1), (2i+1,2j+1)`.
fn cell_columns<'a>(columns: &'a ColumnPoints, i: usize, j: usize) -> [&'a [PointRef]; 4] {
    [
        columns.column(2 * i, 2 * j),
        columns.column(2 * i + 1, 2 * j),
        columns.column(2 * i, 2 * j + 1),
        columns.column(2 * i + 1, 2 * j + 1),
    ]
}

/// Segment `s` has zero extent on all four corner columns.
#[inline]
fn collapsed(c: &[&[PointRef]; 4], s: usize) -> bool {
    c.iter().all(|col| col[s] == col[s + 1])
}

/// Numbers active cells in natural order. Fully pinched cells are dropped.
pub(crate) fn number_cells(grid: &Grdecl, columns: &ColumnPoints) -> CellNumbering {
    let [nx, ny, _] = grid.dims();
    let keep: Vec<bool> = (0..grid.cell_count())
        .into_par_iter()
        .map(|g| {
            let (i, j, k) = (g % nx, (g / nx) % ny, g / (nx * ny));
            grid.is_active(i, j, k) && !collapsed(&cell_columns(columns, i, j), 2 * k + 1)
        })
        .collect();

    let mut local = vec![None; keep.len()];
    let mut global = Vec::new();
    for (g, &kept) in keep.iter().enumerate() {
        if kept {
            local[g] = Some(global.len());
            global.push(g);
        }
    }
    CellNumbering { local, global }
}

/// Sweeps every curtain of one direction.
fn vertical_faces(
    grid: &Grdecl,
    columns: &ColumnPoints,
    cells: &CellNumbering,
    direction: CurtainDirection,
    options: &ProcessOptions,
    nodes: &mut NodeAllocator,
    faces: &mut FaceTable,
) -> Result<()> {
    let [nx, ny, nz] = grid.dims();
    let tag = direction.tag();
    let mut buffers = SweepBuffers::new();
    let mut cells_a = vec![None; nz];
    let mut cells_b = vec![None; nz];
    let mut id = 0;

    // (i, j) walk: curtains between columns i-1 and i (I), or j-1 and j (J).
    let (ni, nj) = match direction {
        CurtainDirection::I => (nx + 1, ny),
        CurtainDirection::J => (nx, ny + 1),
    };

    for j in 0..nj {
        for i in 0..ni {
            let (a, b, side_a, side_b) = match direction {
                CurtainDirection::I => {
                    let im = (2 * i).max(1) - 1;
                    let ip = (2 * i + 1).min(2 * nx) - 1;
                    (
                        [[im, 2 * j], [im, 2 * j + 1]],
                        [[ip, 2 * j], [ip, 2 * j + 1]],
                        i.checked_sub(1).map(|i| (i, j)),
                        (i < nx).then_some((i, j)),
                    )
                }
                CurtainDirection::J => {
                    let jm = (2 * j).max(1) - 1;
                    let jp = (2 * j + 1).min(2 * ny) - 1;
                    (
                        [[2 * i, jm], [2 * i + 1, jm]],
                        [[2 * i, jp], [2 * i + 1, jp]],
                        j.checked_sub(1).map(|j| (i, j)),
                        (j < ny).then_some((i, j)),
                    )
                }
            };

            fill_column_cells(grid, cells, side_a, &mut cells_a);
            fill_column_cells(grid, cells, side_b, &mut cells_b);

            let curtain = Curtain {
                id,
                tag,
                a1: columns.column(a[0][0], a[0][1]),
                a2: columns.column(a[1][0], a[1][1]),
                b1: columns.column(b[0][0], b[0][1]),
                b2: columns.column(b[1][0], b[1][1]),
                cells_a: &cells_a,
                cells_b: &cells_b,
            };
            find_connections(&curtain, options, &mut buffers, nodes, faces)?;
            id += 1;
        }
    }
    Ok(())
}

/// Local cell index of every layer of cell column `column`, or all `None`
/// outside the grid.
fn fill_column_cells(
    grid: &Grdecl,
    cells: &CellNumbering,
    column: Option<(usize, usize)>,
    out: &mut [Option<usize>],
) {
    match column {
        Some((i, j)) => {
            for (k, slot) in out.iter_mut().enumerate() {
                *slot = cells.local[grid.cell_index(i, j, k)];
            }
        }
        None => out.fill(None),
    }
}

/// Emits the faces of constant `k`, column by column.
///
/// Each non-collapsed segment of a column ends in a face: the top of a cell
/// links it to the cell above (if the two touch) and the top of a gap closes
/// the cell above it.
fn horizontal_faces(
    grid: &Grdecl,
    columns: &ColumnPoints,
    cells: &CellNumbering,
    faces: &mut FaceTable,
) -> Result<()> {
    let [nx, ny, nz] = grid.dims();
    for j in 0..ny {
        for i in 0..nx {
            let c = cell_columns(columns, i, j);
            let mut above: Option<usize> = None;

            for s in 1..=2 * nz {
                if collapsed(&c, s) {
                    continue;
                }
                let this = if s % 2 == 1 {
                    cells.local[grid.cell_index(i, j, (s - 1) / 2)]
                } else {
                    None
                };
                if above.is_some() || this.is_some() {
                    let face: Vec<usize> = [c[0][s], c[1][s], c[3][s], c[2][s]]
                        .iter()
                        .filter_map(|p| p.node())
                        .collect();
                    if face.len() == 4 {
                        faces.push(FaceTag::K, &face, [above, this])?;
                    } else {
                        tracing::warn!(
                            i,
                            j,
                            segment = s,
                            "Horizontal face touches the column padding"
                        );
                    }
                }
                above = this;
            }
        }
    }
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

    /// Single column with the given layer boundaries, flat on all corners.
    fn column(tops_and_bottoms: &[(f64, f64)], actnum: &[i32]) -> Grdecl {
        let mut zcorn = Vec::new();
        for &(top, bottom) in tops_and_bottoms {
            zcorn.extend([top; 4]);
            zcorn.extend([bottom; 4]);
        }
        Grdecl::new([1, 1, tops_and_bottoms.len()], &coord(1, 1), zcorn, actnum).unwrap()
    }

    #[test]
    fn single_cell_is_a_closed_hexahedron() {
        let grid = column(&[(0.0, 1.0)], &[1]);
        let out = process_grid(&grid, &ProcessOptions::default()).unwrap();

        assert_eq!(out.number_of_cells(), 1);
        assert_eq!(out.number_of_nodes(), 8);
        assert_eq!(out.number_of_faces(), 6);
        for f in 0..6 {
            let [a, b] = out.face_neighbors()[f];
            assert_eq!(a.or(b), Some(0));
            assert!(a.is_none() || b.is_none());
        }
    }

    #[test]
    fn fully_pinched_column_has_no_cells() {
        let grid = column(&[(5.0, 5.0), (5.0, 5.0)], &[1, 1]);
        let out = process_grid(&grid, &ProcessOptions::default()).unwrap();
        assert_eq!(out.number_of_cells(), 0);
        assert_eq!(out.number_of_faces(), 0);
        assert_eq!(out.number_of_nodes(), 4);
        assert_eq!(out.local_cell_index(), &[None, None]);
    }

    #[test]
    fn pinched_layer_connects_cells_above_and_below() {
        let grid = column(&[(0.0, 1.0), (1.0, 1.0), (1.0, 2.0)], &[1, 1, 1]);
        let out = process_grid(&grid, &ProcessOptions::default()).unwrap();

        assert_eq!(out.local_cell_index(), &[Some(0), None, Some(1)]);
        assert_eq!(out.global_cell(), &[0, 2]);
        assert_eq!(out.number_of_nodes(), 12);
        assert_eq!(out.number_of_faces(), 11);

        let k_faces: Vec<[Option<usize>; 2]> = (0..out.number_of_faces())
            .filter(|&f| out.face_tags()[f] == FaceTag::K)
            .map(|f| out.face_neighbors()[f])
            .collect();
        assert_eq!(k_faces, vec![[None, Some(0)], [Some(0), Some(1)], [Some(1), None]]);
    }

    #[test]
    fn inactive_cell_between_separated_layers_closes_both() {
        // The inactive middle layer has real thickness, so its neighbours do
        // not touch.
        let grid = column(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)], &[1, 0, 1]);
        let out = process_grid(&grid, &ProcessOptions::default()).unwrap();

        assert_eq!(out.number_of_cells(), 2);
        let k_faces: Vec<[Option<usize>; 2]> = (0..out.number_of_faces())
            .filter(|&f| out.face_tags()[f] == FaceTag::K)
            .map(|f| out.face_neighbors()[f])
            .collect();
        assert_eq!(
            k_faces,
            vec![[None, Some(0)], [Some(0), None], [None, Some(1)], [Some(1), None]]
        );
    }

    #[test]
    fn numbering_skips_inactive_cells_in_natural_order() {
        let zcorn = [[0.0; 16], [1.0; 16]].concat();
        let grid = Grdecl::new([2, 2, 1], &coord(2, 2), zcorn, &[1, 0, 1, 1]).unwrap();
        let points = PillarPoints::build(&grid, f64::EPSILON);
        let columns = ColumnPoints::assign(&grid, &points, f64::EPSILON).unwrap();
        let cells = number_cells(&grid, &columns);
        assert_eq!(cells.local, vec![Some(0), None, Some(1), Some(2)]);
        assert_eq!(cells.global, vec![0, 2, 3]);
    }
}
