// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face and node accumulation while the grid is being swept.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point::PointRef;
use crate::table::{GrowableTable, SparseTable};

/// Logical direction a face is normal to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceTag {
    /// Between columns `i - 1` and `i` (constant-i curtain).
    I,
    /// Between columns `j - 1` and `j` (constant-j curtain).
    J,
    /// Between layers `k - 1` and `k`.
    K,
}

/// The two lines whose crossing created a fault-intersection node.
///
/// `a1`/`b1` lie on one pillar, `a2`/`b2` on the other; line `a` runs
/// `a1 -> a2` and line `b` runs `b1 -> b2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIntersection {
    pub a1: usize,
    pub a2: usize,
    pub b1: usize,
    pub b2: usize,
}

/// Hands out node indices for fault intersections.
///
/// Pillar points own indices `0..pillar_points`; intersection nodes are
/// numbered from there on in creation order.
#[derive(Debug, Clone)]
pub struct NodeAllocator {
    pillar_points: usize,
    intersections: Vec<LineIntersection>,
}

impl NodeAllocator {
    pub fn new(pillar_points: usize) -> Self {
        Self {
            pillar_points,
            intersections: Vec::new(),
        }
    }

    /// Allocates a node where line `a1 -> a2` crosses line `b1 -> b2`.
    ///
    /// Returns `None` if one of the lines touches a boundary marker; two such
    /// lines never cross.
    pub fn allocate(
        &mut self,
        a1: PointRef,
        a2: PointRef,
        b1: PointRef,
        b2: PointRef,
    ) -> Result<Option<usize>> {
        let (Some(a1), Some(a2), Some(b1), Some(b2)) = (a1.node(), a2.node(), b1.node(), b2.node())
        else {
            return Ok(None);
        };
        self.intersections.try_reserve(1).map_err(|_| Error::Capacity {
            rows: 0,
            entries: 1,
        })?;
        self.intersections.push(LineIntersection { a1, a2, b1, b2 });
        Ok(Some(self.pillar_points + self.intersections.len() - 1))
    }

    /// Total node count so far.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.pillar_points + self.intersections.len()
    }

    #[inline]
    pub fn pillar_points(&self) -> usize {
        self.pillar_points
    }

    pub fn intersections(&self) -> &[LineIntersection] {
        &self.intersections
    }

    pub fn into_intersections(self) -> Vec<LineIntersection> {
        self.intersections
    }
}

/// Growable face storage: nodes (CSR), neighbours and tags.
#[derive(Debug, Clone, Default)]
pub struct FaceTable {
    nodes: GrowableTable<usize>,
    neighbors: Vec<[Option<usize>; 2]>,
    tags: Vec<FaceTag>,
}

/// Frozen face storage.
pub(crate) struct FrozenFaces {
    pub nodes: SparseTable<usize>,
    pub neighbors: Vec<[Option<usize>; 2]>,
    pub tags: Vec<FaceTag>,
}

impl FaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a face. `neighbors[0]` is the cell on the low-index side.
    pub fn push(
        &mut self,
        tag: FaceTag,
        nodes: &[usize],
        neighbors: [Option<usize>; 2],
    ) -> Result<usize> {
        self.neighbors.try_reserve(1).map_err(|_| Error::Capacity {
            rows: 1,
            entries: nodes.len(),
        })?;
        self.tags.try_reserve(1).map_err(|_| Error::Capacity {
            rows: 1,
            entries: nodes.len(),
        })?;
        let face = self.nodes.push_row(nodes.iter().copied())?;
        self.neighbors.push(neighbors);
        self.tags.push(tag);
        Ok(face)
    }

    /// Number of faces.
    #[inline]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Number of faces carrying `tag`.
    pub fn count(&self, tag: FaceTag) -> usize {
        self.tags.iter().filter(|&&t| t == tag).count()
    }

    pub(crate) fn freeze(self) -> FrozenFaces {
        FrozenFaces {
            nodes: self.nodes.freeze(),
            neighbors: self.neighbors,
            tags: self.tags,
        }
    }
}
