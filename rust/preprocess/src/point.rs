// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point references and padded per-column point sequences.

use serde::{Deserialize, Serialize};

/// A position along a pillar as seen by the curtain sweep.
///
/// Real pillar points are bracketed by two boundary markers so the sweep can
/// run past both ends of a column without special cases. The derived ordering
/// is `Above < Node(_) < Below`, and nodes compare by point index, which grows
/// with depth along a pillar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PointRef {
    /// Before the first corner of the column.
    Above,
    /// A unique pillar point.
    Node(usize),
    /// After the last corner of the column.
    Below,
}

impl PointRef {
    /// The point index, or `None` for a boundary marker.
    #[inline]
    pub fn node(self) -> Option<usize> {
        match self {
            PointRef::Node(n) => Some(n),
            PointRef::Above | PointRef::Below => None,
        }
    }
}

/// Point numbers of every corner column, `2*nz + 2` entries each.
///
/// Entry `0` is [`PointRef::Above`], entry `2*nz + 1` is [`PointRef::Below`],
/// and entries `2k + 1` / `2k + 2` are the top / bottom corner of layer `k`.
/// Segment `s` (between entries `s` and `s + 1`) is layer `(s - 1) / 2` when
/// `s` is odd and the gap between two layers when `s` is even.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPoints {
    pub(crate) columns: [usize; 2],
    pub(crate) stride: usize,
    pub(crate) data: Vec<PointRef>,
}

impl ColumnPoints {
    /// Number of entries per column.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of corner columns in each direction, `[2nx, 2ny]`.
    #[inline]
    pub fn columns(&self) -> [usize; 2] {
        self.columns
    }

    /// The padded point sequence of corner column `(ci, cj)`.
    #[inline]
    pub fn column(&self, ci: usize, cj: usize) -> &[PointRef] {
        let start = (ci + self.columns[0] * cj) * self.stride;
        &self.data[start..start + self.stride]
    }
}

/// Segment `s` of a padded column belongs to a layer only when `s` is odd.
#[inline]
pub(crate) fn segment_layer(segment: usize) -> Option<usize> {
    if segment % 2 == 1 {
        Some((segment - 1) / 2)
    } else {
        None
    }
}
