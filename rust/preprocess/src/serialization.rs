// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON serialization for processed grids.
//!
//! The snapshot uses the flat array layout grid construction code expects:
//! a face pointer plus flat face-node list, two neighbour entries per face
//! with `-1` for the outside, and a global-to-local cell map with `-1` for
//! inactive cells.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::faces::{FaceTag, LineIntersection};
use crate::processed::{index_or_minus_one, ProcessedGrid};
use crate::table::SparseTable;

/// Serializable representation of a [`ProcessedGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub dimensions: [usize; 3],
    pub number_of_faces: usize,
    pub face_ptr: Vec<usize>,
    pub face_nodes: Vec<usize>,
    pub face_neighbors: Vec<i64>,
    pub face_tags: Vec<FaceTag>,
    pub number_of_nodes: usize,
    pub pillar_ptr: Vec<usize>,
    pub pillar_depths: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intersections: Vec<LineIntersection>,
    pub number_of_cells: usize,
    pub local_cell_index: Vec<i64>,
}

impl ProcessedGrid {
    /// Serializes the grid to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserializes and validates a grid from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: GridSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    /// Creates a flat, serializable snapshot of the grid.
    pub fn to_snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            dimensions: self.dimensions,
            number_of_faces: self.number_of_faces(),
            face_ptr: self.face_nodes.ptr().to_vec(),
            face_nodes: self.face_nodes.data().to_vec(),
            face_neighbors: self.face_neighbors_flat(),
            face_tags: self.face_tags.clone(),
            number_of_nodes: self.number_of_nodes,
            pillar_ptr: self.pillar_points.ptr().to_vec(),
            pillar_depths: self.pillar_points.data().to_vec(),
            intersections: self.intersections.clone(),
            number_of_cells: self.number_of_cells(),
            local_cell_index: self
                .local_cell_index
                .iter()
                .map(|&c| index_or_minus_one(c))
                .collect(),
        }
    }

    /// Rebuilds a grid from a snapshot, rejecting inconsistent data.
    pub fn from_snapshot(snapshot: GridSnapshot) -> Result<Self> {
        if snapshot.face_ptr.len() != snapshot.number_of_faces + 1 {
            return Err(Error::Serialization(format!(
                "face_ptr has {} entries for {} faces",
                snapshot.face_ptr.len(),
                snapshot.number_of_faces
            )));
        }
        if snapshot.face_neighbors.len() != 2 * snapshot.number_of_faces {
            return Err(Error::Serialization(format!(
                "face_neighbors has {} entries for {} faces",
                snapshot.face_neighbors.len(),
                snapshot.number_of_faces
            )));
        }

        let face_nodes = SparseTable::from_parts(snapshot.face_ptr, snapshot.face_nodes)?;
        let pillar_points = SparseTable::from_parts(snapshot.pillar_ptr, snapshot.pillar_depths)?;
        let face_neighbors = snapshot
            .face_neighbors
            .chunks_exact(2)
            .map(|pair| Ok([optional_index(pair[0])?, optional_index(pair[1])?]))
            .collect::<Result<Vec<_>>>()?;
        let local_cell_index = snapshot
            .local_cell_index
            .iter()
            .map(|&c| optional_index(c))
            .collect::<Result<Vec<_>>>()?;

        if snapshot.number_of_cells > local_cell_index.len() {
            return Err(Error::Serialization(format!(
                "{} active cells out of {} cells",
                snapshot.number_of_cells,
                local_cell_index.len()
            )));
        }
        let mut global_cell = vec![usize::MAX; snapshot.number_of_cells];
        for (global, local) in local_cell_index.iter().enumerate() {
            if let Some(local) = *local {
                match global_cell.get_mut(local) {
                    Some(slot) if *slot == usize::MAX => *slot = global,
                    _ => {
                        return Err(Error::Serialization(format!(
                            "local cell {local} is out of range or assigned twice"
                        )))
                    }
                }
            }
        }
        if global_cell.contains(&usize::MAX) {
            return Err(Error::Serialization(
                "some active cells have no global cell".into(),
            ));
        }

        let grid = Self {
            dimensions: snapshot.dimensions,
            face_nodes,
            face_neighbors,
            face_tags: snapshot.face_tags,
            number_of_nodes: snapshot.number_of_nodes,
            pillar_points,
            intersections: snapshot.intersections,
            local_cell_index,
            global_cell,
        };
        grid.check_consistency()?;
        Ok(grid)
    }
}

/// Maps `-1` to `None`; other negative values are an error.
fn optional_index(value: i64) -> Result<Option<usize>> {
    match value {
        -1 => Ok(None),
        v if v >= 0 => Ok(Some(v as usize)),
        v => Err(Error::Serialization(format!("invalid index {v}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_index_decoding() {
        assert_eq!(optional_index(-1).unwrap(), None);
        assert_eq!(optional_index(4).unwrap(), Some(4));
        assert!(optional_index(-2).is_err());
    }

    #[test]
    fn snapshot_with_bad_pointer_is_rejected() {
        let snapshot = GridSnapshot {
            dimensions: [1, 1, 1],
            number_of_faces: 1,
            face_ptr: vec![0, 5],
            face_nodes: vec![0, 1, 2],
            face_neighbors: vec![-1, 0],
            face_tags: vec![FaceTag::I],
            number_of_nodes: 3,
            pillar_ptr: vec![0, 3],
            pillar_depths: vec![0.0, 1.0, 2.0],
            intersections: Vec::new(),
            number_of_cells: 1,
            local_cell_index: vec![0],
        };
        assert!(ProcessedGrid::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn duplicate_local_cell_is_rejected() {
        let snapshot = GridSnapshot {
            dimensions: [2, 1, 1],
            number_of_faces: 0,
            face_ptr: vec![0],
            face_nodes: Vec::new(),
            face_neighbors: Vec::new(),
            face_tags: Vec::new(),
            number_of_nodes: 0,
            pillar_ptr: vec![0],
            pillar_depths: Vec::new(),
            intersections: Vec::new(),
            number_of_cells: 1,
            local_cell_index: vec![0, 0],
        };
        assert!(matches!(
            ProcessedGrid::from_snapshot(snapshot),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn cell_count_beyond_the_cell_map_is_rejected() {
        let snapshot = GridSnapshot {
            dimensions: [1, 1, 1],
            number_of_faces: 0,
            face_ptr: vec![0],
            face_nodes: Vec::new(),
            face_neighbors: Vec::new(),
            face_tags: Vec::new(),
            number_of_nodes: 0,
            pillar_ptr: vec![0],
            pillar_depths: Vec::new(),
            intersections: Vec::new(),
            number_of_cells: usize::MAX,
            local_cell_index: vec![0],
        };
        assert!(matches!(
            ProcessedGrid::from_snapshot(snapshot),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            ProcessedGrid::from_json("{\"dimensions\": [1, 1]}"),
            Err(Error::Serialization(_))
        ));
    }
}
