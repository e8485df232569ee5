// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face discovery along one curtain.
//!
//! A curtain is the vertical sheet between two neighbouring pillars. Side `a`
//! and side `b` are the cell columns on either side of it; each side is given
//! as two padded point sequences (`a1`/`b1` on the first pillar, `a2`/`b2` on
//! the second). Because point indices increase with depth on each pillar, the
//! faces can be found by a merge-like sweep over the segments of both sides:
//! cursor `i` walks side `a`, cursor `j` walks side `b`, and `j` only ever
//! restarts at the last segment still reaching above the current `a` segment.
//! That keeps the sweep linear in the column length.
//!
//! Where the segments of both sides line up exactly, the face is the shared
//! quadrilateral (or triangle). Elsewhere the face is the overlap of the two
//! segments, and the lines bounding them may cross between the pillars; each
//! crossing gets a new node, shared by every face that touches it.

use crate::error::{Error, Result};
use crate::face_topology::{resolve_face, Crossings, FaceNodes, SegmentPair};
use crate::faces::{FaceTable, FaceTag, NodeAllocator};
use crate::options::{PinchPolicy, ProcessOptions};
use crate::point::{segment_layer, PointRef};

/// Input of one curtain sweep.
#[derive(Debug, Clone, Copy)]
pub struct Curtain<'a> {
    /// Sequential id, used in diagnostics.
    pub id: usize,
    pub tag: FaceTag,
    pub a1: &'a [PointRef],
    pub a2: &'a [PointRef],
    pub b1: &'a [PointRef],
    pub b2: &'a [PointRef],
    /// Local cell index of each layer of side `a`; all `None` outside the grid.
    pub cells_a: &'a [Option<usize>],
    /// Local cell index of each layer of side `b`.
    pub cells_b: &'a [Option<usize>],
}

/// Crossing records of the lines bounding the current `a` segment.
///
/// `deep[j]` is the node where the deep line of segment `i` crosses line `j`
/// of side `b`; `shallow[j]` the same for its shallow line. Moving to the next
/// `a` segment turns the deep line into the shallow one, so the buffers swap.
#[derive(Debug, Clone, Default)]
pub struct SweepBuffers {
    shallow: Vec<Option<usize>>,
    deep: Vec<Option<usize>>,
}

impl SweepBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, n: usize) {
        self.shallow.clear();
        self.shallow.resize(n, None);
        self.deep.clear();
        self.deep.resize(n, None);
    }

    fn advance(&mut self) {
        std::mem::swap(&mut self.shallow, &mut self.deep);
        self.deep.fill(None);
    }
}

/// Ranges `[x0, x1]` and `[y0, y1]` overlap with positive length.
#[inline]
fn overlap(x0: PointRef, x1: PointRef, y0: PointRef, y1: PointRef) -> bool {
    x0.max(y0) < x1.min(y1)
}

/// Line `x1 -> x2` crosses line `y1 -> y2` strictly between the pillars.
#[inline]
pub(crate) fn lines_cross(x1: PointRef, x2: PointRef, y1: PointRef, y2: PointRef) -> bool {
    (x1 > y1 && x2 < y2) || (x1 < y1 && x2 > y2)
}

/// Segment `i` of side `a` and segment `j` of side `b` share some area.
#[inline]
fn segments_meet(c: &Curtain<'_>, i: usize, j: usize) -> bool {
    overlap(c.a1[i], c.a1[i + 1], c.b1[j], c.b1[j + 1])
        || overlap(c.a2[i], c.a2[i + 1], c.b2[j], c.b2[j + 1])
        || lines_cross(c.a1[i], c.a2[i], c.b1[j], c.b2[j])
}

/// Sweeps one curtain, appending its faces to `faces`.
pub fn find_connections(
    curtain: &Curtain<'_>,
    options: &ProcessOptions,
    buffers: &mut SweepBuffers,
    nodes: &mut NodeAllocator,
    faces: &mut FaceTable,
) -> Result<()> {
    let Curtain { a1, a2, b1, b2, .. } = *curtain;
    let n = a1.len();
    debug_assert!(a2.len() == n && b1.len() == n && b2.len() == n);

    buffers.reset(n);
    let (mut k1, mut k2) = (0, 0);
    let mut j = 0;

    for i in 0..n - 1 {
        if a1[i] == a1[i + 1] && a2[i] == a2[i + 1] {
            continue;
        }

        while j < n - 1 && (b1[j] < a1[i + 1] || b2[j] < a2[i + 1]) {
            if b1[j] == b1[j + 1] && b2[j] == b2[j + 1] {
                buffers.deep[j + 1] = buffers.deep[j];
                j += 1;
                continue;
            }

            if segments_meet(curtain, i, j) {
                let matched = a1[i] == b1[j]
                    && a1[i + 1] == b1[j + 1]
                    && a2[i] == b2[j]
                    && a2[i + 1] == b2[j + 1];

                if matched {
                    if let Some(neighbors) = face_cells(curtain, i, j) {
                        let mut face = FaceNodes::new();
                        face.extend([a1[i], a2[i]].iter().filter_map(|p| p.node()));
                        if a2[i + 1] != a2[i] {
                            face.extend(a2[i + 1].node());
                        }
                        if a1[i + 1] != a1[i] {
                            face.extend(a1[i + 1].node());
                        }
                        emit(curtain, options, faces, &face, neighbors)?;
                    }
                } else {
                    let (deep_a1, deep_a2) = (a1[i + 1], a2[i + 1]);
                    let (deep_b1, deep_b2) = (b1[j + 1], b2[j + 1]);
                    buffers.deep[j + 1] = if lines_cross(deep_a1, deep_a2, deep_b1, deep_b2) {
                        nodes.allocate(deep_a1, deep_a2, deep_b1, deep_b2)?
                    } else {
                        None
                    };

                    if let Some(neighbors) = face_cells(curtain, i, j) {
                        let crossings = Crossings {
                            shallow_shallow: buffers.shallow[j],
                            shallow_deep: buffers.shallow[j + 1],
                            deep_shallow: buffers.deep[j],
                            deep_deep: buffers.deep[j + 1],
                        };
                        let seg = SegmentPair {
                            a1: [a1[i], a1[i + 1]],
                            a2: [a2[i], a2[i + 1]],
                            b1: [b1[j], b1[j + 1]],
                            b2: [b2[j], b2[j + 1]],
                        };
                        let resolved = resolve_face(&seg, &crossings);
                        for anomaly in &resolved.anomalies {
                            match options.pinch_policy {
                                PinchPolicy::Warn => tracing::warn!(
                                    curtain = curtain.id,
                                    segment_a = i,
                                    segment_b = j,
                                    %anomaly,
                                    "Illegal partial pinch"
                                ),
                                PinchPolicy::Error => {
                                    return Err(Error::IllegalPinch {
                                        curtain: curtain.id,
                                        detail: format!("segments {i}/{j}: {anomaly}"),
                                    })
                                }
                            }
                        }
                        emit(curtain, options, faces, &resolved.nodes, neighbors)?;
                    }
                }
            }

            if b1[j] < a1[i + 1] {
                k1 = j;
            }
            if b2[j] < a2[i + 1] {
                k2 = j;
            }
            j += 1;
        }

        buffers.advance();
        j = k1.min(k2);
    }

    Ok(())
}

/// Cells on either side of the face between segments `i` and `j`, or `None`
/// if the face should not be emitted: it lies entirely above or below the
/// grid, or neither side is an active cell.
fn face_cells(c: &Curtain<'_>, i: usize, j: usize) -> Option<[Option<usize>; 2]> {
    if c.a1[i] == PointRef::Above && c.b1[j] == PointRef::Above {
        return None;
    }
    if c.a1[i + 1] == PointRef::Below && c.b1[j + 1] == PointRef::Below {
        return None;
    }
    let cell_a = segment_layer(i).and_then(|k| c.cells_a[k]);
    let cell_b = segment_layer(j).and_then(|k| c.cells_b[k]);
    if cell_a.is_none() && cell_b.is_none() {
        return None;
    }
    Some([cell_a, cell_b])
}

fn emit(
    curtain: &Curtain<'_>,
    options: &ProcessOptions,
    faces: &mut FaceTable,
    nodes: &[usize],
    neighbors: [Option<usize>; 2],
) -> Result<()> {
    if nodes.len() < 3 {
        match options.pinch_policy {
            PinchPolicy::Warn => {
                tracing::warn!(
                    curtain = curtain.id,
                    nodes = nodes.len(),
                    "Dropping degenerate face with fewer than 3 nodes"
                );
                return Ok(());
            }
            PinchPolicy::Error => {
                return Err(Error::IllegalPinch {
                    curtain: curtain.id,
                    detail: format!("face collapsed to {} nodes", nodes.len()),
                })
            }
        }
    }
    faces.push(curtain.tag, nodes, neighbors)?;
    Ok(())
}
