// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The frozen output of [`crate::process_grid`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::faces::{FaceTable, FaceTag, LineIntersection};
use crate::process::CellNumbering;
use crate::table::SparseTable;

/// Which side of a face a cell lies on.
///
/// A face is directed from `neighbors[0]` (low index side) to
/// `neighbors[1]`, i.e. along increasing `i`, `j` or `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// The face points out of the cell; the cell is `neighbors[0]`.
    Outward,
    /// The face points into the cell; the cell is `neighbors[1]`.
    Inward,
}

/// One face of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellFace {
    pub face: usize,
    pub orientation: Orientation,
}

/// Unstructured face topology of a corner-point grid.
///
/// Nodes `0..number_of_pillar_points()` are pillar points (see
/// [`ProcessedGrid::pillar_points`]); the remaining nodes are fault
/// intersections, described by [`ProcessedGrid::intersections`] in node order.
/// Cells are numbered locally, active cells only.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedGrid {
    pub(crate) dimensions: [usize; 3],
    pub(crate) face_nodes: SparseTable<usize>,
    pub(crate) face_neighbors: Vec<[Option<usize>; 2]>,
    pub(crate) face_tags: Vec<FaceTag>,
    pub(crate) number_of_nodes: usize,
    pub(crate) pillar_points: SparseTable<f64>,
    pub(crate) intersections: Vec<LineIntersection>,
    pub(crate) local_cell_index: Vec<Option<usize>>,
    pub(crate) global_cell: Vec<usize>,
}

impl ProcessedGrid {
    pub(crate) fn from_parts(
        dimensions: [usize; 3],
        faces: FaceTable,
        number_of_nodes: usize,
        pillar_points: SparseTable<f64>,
        intersections: Vec<LineIntersection>,
        cells: CellNumbering,
    ) -> Self {
        let frozen = faces.freeze();
        Self {
            dimensions,
            face_nodes: frozen.nodes,
            face_neighbors: frozen.neighbors,
            face_tags: frozen.tags,
            number_of_nodes,
            pillar_points,
            intersections,
            local_cell_index: cells.local,
            global_cell: cells.global,
        }
    }

    /// Logical grid dimensions `[nx, ny, nz]`.
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    #[inline]
    pub fn number_of_faces(&self) -> usize {
        self.face_neighbors.len()
    }

    #[inline]
    pub fn number_of_nodes(&self) -> usize {
        self.number_of_nodes
    }

    /// Number of active cells.
    #[inline]
    pub fn number_of_cells(&self) -> usize {
        self.global_cell.len()
    }

    /// Number of nodes that are pillar points.
    #[inline]
    pub fn number_of_pillar_points(&self) -> usize {
        self.pillar_points.data().len()
    }

    /// Nodes of face `f`, in winding order.
    #[inline]
    pub fn face_nodes(&self, f: usize) -> &[usize] {
        self.face_nodes.row(f)
    }

    /// Face-to-node table.
    pub fn face_node_table(&self) -> &SparseTable<usize> {
        &self.face_nodes
    }

    /// Start of each face in the flat node list, `number_of_faces() + 1`
    /// entries.
    pub fn face_ptr(&self) -> &[usize] {
        self.face_nodes.ptr()
    }

    /// Cells on either side of each face; `None` is the outside or an
    /// inactive cell.
    pub fn face_neighbors(&self) -> &[[Option<usize>; 2]] {
        &self.face_neighbors
    }

    pub fn face_tags(&self) -> &[FaceTag] {
        &self.face_tags
    }

    /// Unique depths of every pillar. Row `p` holds the depths of nodes
    /// `ptr[p]..ptr[p + 1]`.
    pub fn pillar_points(&self) -> &SparseTable<f64> {
        &self.pillar_points
    }

    /// Line pairs of the fault-intersection nodes.
    pub fn intersections(&self) -> &[LineIntersection] {
        &self.intersections
    }

    /// Global cell index -> local active cell index.
    pub fn local_cell_index(&self) -> &[Option<usize>] {
        &self.local_cell_index
    }

    /// Local active cell index -> global cell index.
    pub fn global_cell(&self) -> &[usize] {
        &self.global_cell
    }

    /// Face neighbours flattened to two entries per face, `-1` for none.
    pub fn face_neighbors_flat(&self) -> Vec<i64> {
        self.face_neighbors
            .iter()
            .flat_map(|pair| pair.map(index_or_minus_one))
            .collect()
    }

    /// Faces of every active cell, in face order.
    pub fn cell_faces(&self) -> SparseTable<CellFace> {
        let mut ptr = vec![0usize; self.number_of_cells() + 1];
        for pair in &self.face_neighbors {
            for cell in pair.iter().flatten() {
                ptr[cell + 1] += 1;
            }
        }
        for c in 1..ptr.len() {
            ptr[c] += ptr[c - 1];
        }

        let mut cursor = ptr[..ptr.len() - 1].to_vec();
        let mut data = vec![
            CellFace {
                face: 0,
                orientation: Orientation::Outward,
            };
            ptr[ptr.len() - 1]
        ];
        for (face, pair) in self.face_neighbors.iter().enumerate() {
            for (side, orientation) in [(0, Orientation::Outward), (1, Orientation::Inward)] {
                if let Some(cell) = pair[side] {
                    data[cursor[cell]] = CellFace { face, orientation };
                    cursor[cell] += 1;
                }
            }
        }
        SparseTable::new_unchecked(ptr, data)
    }

    /// Verifies the structural invariants of the topology.
    pub fn check_consistency(&self) -> Result<()> {
        let nfaces = self.number_of_faces();
        let ncells = self.number_of_cells();

        let ptr = self.face_ptr();
        if ptr.len() != nfaces + 1 || ptr.first() != Some(&0) {
            return Err(Error::Inconsistent(format!(
                "face pointer has {} entries for {nfaces} faces",
                ptr.len()
            )));
        }
        if ptr.windows(2).any(|w| w[0] > w[1]) || ptr[nfaces] != self.face_nodes.data().len() {
            return Err(Error::Inconsistent("face pointer is not a valid prefix sum".into()));
        }
        if self.face_tags.len() != nfaces {
            return Err(Error::Inconsistent(format!(
                "{} face tags for {nfaces} faces",
                self.face_tags.len()
            )));
        }

        let expected_nodes = self.number_of_pillar_points() + self.intersections.len();
        if self.number_of_nodes != expected_nodes {
            return Err(Error::Inconsistent(format!(
                "{} nodes, but {} pillar points and {} intersections",
                self.number_of_nodes,
                self.number_of_pillar_points(),
                self.intersections.len()
            )));
        }
        for (n, line) in self.intersections.iter().enumerate() {
            if [line.a1, line.a2, line.b1, line.b2]
                .iter()
                .any(|&p| p >= self.number_of_pillar_points())
            {
                return Err(Error::Inconsistent(format!(
                    "intersection {n} references a node that is not a pillar point"
                )));
            }
        }

        for (f, nodes) in self.face_nodes.rows().enumerate() {
            if nodes.len() < 3 {
                return Err(Error::Inconsistent(format!("face {f} has {} nodes", nodes.len())));
            }
            for (x, &n) in nodes.iter().enumerate() {
                if n >= self.number_of_nodes {
                    return Err(Error::Inconsistent(format!("face {f} references node {n}")));
                }
                if nodes[x + 1..].contains(&n) {
                    return Err(Error::Inconsistent(format!("face {f} repeats node {n}")));
                }
            }
        }

        for (f, pair) in self.face_neighbors.iter().enumerate() {
            if pair[0] == pair[1] {
                return Err(Error::Inconsistent(format!(
                    "face {f} has equal neighbours {pair:?}"
                )));
            }
            if let Some(c) = pair.iter().flatten().find(|&&c| c >= ncells) {
                return Err(Error::Inconsistent(format!("face {f} references cell {c}")));
            }
        }

        let [nx, ny, nz] = self.dimensions;
        if self.local_cell_index.len() != nx * ny * nz {
            return Err(Error::Inconsistent(format!(
                "{} cell indices for a {nx}x{ny}x{nz} grid",
                self.local_cell_index.len()
            )));
        }
        for (local, &global) in self.global_cell.iter().enumerate() {
            if self.local_cell_index.get(global).copied().flatten() != Some(local) {
                return Err(Error::Inconsistent(format!(
                    "active cell {local} does not map back from global cell {global}"
                )));
            }
        }
        let mapped = self.local_cell_index.iter().flatten().count();
        if mapped != ncells {
            return Err(Error::Inconsistent(format!(
                "{mapped} global cells map to {ncells} active cells"
            )));
        }

        Ok(())
    }
}

#[inline]
pub(crate) fn index_or_minus_one(index: Option<usize>) -> i64 {
    index.map_or(-1, |i| i as i64)
}
