// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon of a faulted (non-matching) curtain face.
//!
//! A face between segment `a` (lines `a_i`, `a_{i+1}`) and segment `b`
//! (lines `b_j`, `b_{j+1}`) of a curtain is the overlap of two quadrilaterals
//! spanned between the same two pillars. Its outline is picked from eight
//! slots, walking around the face:
//!
//! ```text
//!   slot 0: pillar 1, deep boundary     slot 1: deep-deep crossing
//!   slot 2: pillar 2, deep boundary     slot 3: crossing near pillar 2
//!   slot 4: pillar 2, shallow boundary  slot 5: shallow-shallow crossing
//!   slot 6: pillar 1, shallow boundary  slot 7: crossing near pillar 1
//! ```
//!
//! On each pillar the face is bounded by the inner of the two candidate
//! points (the overlap, not the union). Crossings of the boundary lines are
//! inserted where they occur, and corner slots that a crossing cuts off are
//! removed.

use smallvec::SmallVec;

use crate::point::PointRef;

/// Node list of one face. Faces have 3 to 8 nodes.
pub type FaceNodes = SmallVec<[usize; 8]>;

/// Which pillar of a curtain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PillarSide {
    First,
    Second,
}

/// Degenerate configuration noticed while resolving a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyAnomaly {
    /// Both boundaries meet on a pillar, yet a crossing was recorded next to
    /// that pillar.
    PinchedCornerCrossing(PillarSide),
    /// A node appeared twice in the outline; the repeat was dropped.
    RepeatedNode(usize),
}

impl std::fmt::Display for TopologyAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyAnomaly::PinchedCornerCrossing(side) => {
                write!(f, "crossing recorded at a pinched corner on the {side:?} pillar")
            }
            TopologyAnomaly::RepeatedNode(n) => write!(f, "node {n} repeated in face outline"),
        }
    }
}

/// Crossing markers of the four boundary-line pairs of a face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crossings {
    /// `a_i` x `b_j`.
    pub shallow_shallow: Option<usize>,
    /// `a_i` x `b_{j+1}`.
    pub shallow_deep: Option<usize>,
    /// `a_{i+1}` x `b_j`.
    pub deep_shallow: Option<usize>,
    /// `a_{i+1}` x `b_{j+1}`.
    pub deep_deep: Option<usize>,
}

/// Corner points of the two segments meeting in a face.
///
/// Index `0` is the shallow line of a segment, index `1` the deep line.
#[derive(Debug, Clone, Copy)]
pub struct SegmentPair {
    pub a1: [PointRef; 2],
    pub a2: [PointRef; 2],
    pub b1: [PointRef; 2],
    pub b2: [PointRef; 2],
}

/// Outline of a resolved face plus anything odd found on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFace {
    pub nodes: FaceNodes,
    pub anomalies: SmallVec<[TopologyAnomaly; 2]>,
}

/// Resolves the outline of a non-matching face.
///
/// Slots are emitted in reverse order (7 down to 0), which winds the face
/// pillar-1 shallow, pillar-2 shallow, pillar-2 deep, pillar-1 deep, the same
/// way as matched faces.
pub fn resolve_face(seg: &SegmentPair, crossings: &Crossings) -> ResolvedFace {
    let SegmentPair { a1, a2, b1, b2 } = *seg;
    let mut anomalies = SmallVec::new();
    let mut slots: [Option<usize>; 8] = [None; 8];

    // Inner boundary on each pillar.
    slots[0] = a1[1].min(b1[1]).node();
    slots[2] = a2[1].min(b2[1]).node();
    slots[4] = a2[0].max(b2[0]).node();
    slots[6] = a1[0].max(b1[0]).node();

    // Partial pinch: shallow and deep boundary meet on a pillar.
    if slots[0] == slots[6] {
        slots[6] = None;
        if crossings.deep_shallow.is_some() {
            anomalies.push(TopologyAnomaly::PinchedCornerCrossing(PillarSide::First));
        }
    }
    if slots[2] == slots[4] {
        slots[4] = None;
        if crossings.shallow_deep.is_some() {
            anomalies.push(TopologyAnomaly::PinchedCornerCrossing(PillarSide::Second));
        }
    }

    slots[1] = crossings.deep_deep;
    slots[5] = crossings.shallow_shallow;

    // A crossing between a shallow and a deep line cuts one pillar side off
    // the face. Which side depends on how the lines are ordered on pillar 1.
    if let Some(node) = crossings.shallow_deep {
        if a1[0] > b1[1] {
            cut_first_pillar(&mut slots, node);
        } else {
            cut_second_pillar(&mut slots, node);
        }
    }
    if let Some(node) = crossings.deep_shallow {
        if a1[1] < b1[0] {
            cut_first_pillar(&mut slots, node);
        } else {
            cut_second_pillar(&mut slots, node);
        }
    }

    let mut nodes = FaceNodes::new();
    for node in slots.iter().rev().flatten().copied() {
        if nodes.contains(&node) {
            anomalies.push(TopologyAnomaly::RepeatedNode(node));
        } else {
            nodes.push(node);
        }
    }

    ResolvedFace { nodes, anomalies }
}

fn cut_first_pillar(slots: &mut [Option<usize>; 8], crossing: usize) {
    slots[0] = None;
    slots[6] = None;
    slots[7] = Some(crossing);
}

fn cut_second_pillar(slots: &mut [Option<usize>; 8], crossing: usize) {
    slots[2] = None;
    slots[4] = None;
    slots[3] = Some(crossing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn n(i: usize) -> PointRef {
        PointRef::Node(i)
    }

    #[test]
    fn overlapping_quads_use_inner_corners() {
        // Pillar 1 points 0..10, pillar 2 points 10..20.
        // a spans [1, 4] / [11, 14]; b spans [2, 5] / [12, 15].
        let seg = SegmentPair {
            a1: [n(1), n(4)],
            a2: [n(11), n(14)],
            b1: [n(2), n(5)],
            b2: [n(12), n(15)],
        };
        let face = resolve_face(&seg, &Crossings::default());
        let expected: FaceNodes = smallvec![2, 12, 14, 4];
        assert_eq!(face.nodes, expected);
        assert!(face.anomalies.is_empty());
    }

    #[test]
    fn partial_pinch_gives_triangle() {
        // Both boundaries meet on pillar 1 at point 3.
        let seg = SegmentPair {
            a1: [n(1), n(3)],
            a2: [n(11), n(14)],
            b1: [n(3), n(6)],
            b2: [n(12), n(15)],
        };
        let face = resolve_face(&seg, &Crossings::default());
        let expected: FaceNodes = smallvec![12, 14, 3];
        assert_eq!(face.nodes, expected);
        assert!(face.anomalies.is_empty());
    }

    #[test]
    fn deep_shallow_crossing_cuts_first_pillar() {
        // On pillar 1, a ends (4) above where b starts (5): the faces only
        // overlap near pillar 2, cut off by the crossing of a_{i+1} and b_j.
        let seg = SegmentPair {
            a1: [n(1), n(4)],
            a2: [n(13), n(16)],
            b1: [n(5), n(8)],
            b2: [n(11), n(14)],
        };
        let crossings = Crossings {
            deep_shallow: Some(30),
            ..Default::default()
        };
        let face = resolve_face(&seg, &crossings);
        let expected: FaceNodes = smallvec![30, 13, 14];
        assert_eq!(face.nodes, expected);
    }

    #[test]
    fn shallow_deep_crossing_cuts_second_pillar() {
        // On pillar 1, a starts (1) above where b ends (6), so the crossing
        // of a_i and b_{j+1} cuts the pillar 2 side.
        let seg = SegmentPair {
            a1: [n(1), n(8)],
            a2: [n(16), n(18)],
            b1: [n(2), n(6)],
            b2: [n(11), n(14)],
        };
        let crossings = Crossings {
            shallow_deep: Some(40),
            ..Default::default()
        };
        let face = resolve_face(&seg, &crossings);
        let expected: FaceNodes = smallvec![2, 40, 6];
        assert_eq!(face.nodes, expected);
    }

    #[test]
    fn shallow_and_deep_crossings_give_hexagon() {
        let seg = SegmentPair {
            a1: [n(1), n(5)],
            a2: [n(12), n(16)],
            b1: [n(2), n(6)],
            b2: [n(11), n(15)],
        };
        let crossings = Crossings {
            shallow_shallow: Some(50),
            deep_deep: Some(51),
            ..Default::default()
        };
        let face = resolve_face(&seg, &crossings);
        let expected: FaceNodes = smallvec![2, 50, 12, 15, 51, 5];
        assert_eq!(face.nodes, expected);
    }

    #[test]
    fn crossing_at_pinched_corner_is_reported() {
        let seg = SegmentPair {
            a1: [n(1), n(3)],
            a2: [n(11), n(14)],
            b1: [n(3), n(6)],
            b2: [n(12), n(15)],
        };
        let crossings = Crossings {
            deep_shallow: Some(30),
            ..Default::default()
        };
        let face = resolve_face(&seg, &crossings);
        assert!(face
            .anomalies
            .contains(&TopologyAnomaly::PinchedCornerCrossing(PillarSide::First)));
    }

    #[test]
    fn repeated_node_is_dropped_and_reported() {
        let seg = SegmentPair {
            a1: [n(1), n(4)],
            a2: [n(11), n(14)],
            b1: [n(2), n(5)],
            b2: [n(12), n(15)],
        };
        // A crossing that reuses a corner node.
        let crossings = Crossings {
            deep_deep: Some(4),
            ..Default::default()
        };
        let face = resolve_face(&seg, &crossings);
        let expected: FaceNodes = smallvec![2, 12, 14, 4];
        assert_eq!(face.nodes, expected);
        assert_eq!(face.anomalies.as_slice(), &[TopologyAnomaly::RepeatedNode(4)]);
    }
}
