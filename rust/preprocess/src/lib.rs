// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CpGrid Preprocess
//!
//! Turns a corner-point grid description (pillars, per-cell corner depths and
//! an active-cell mask) into an unstructured polyhedral topology: faces,
//! face-to-node lists and face-to-cell adjacency.
//!
//! Adjacent cell columns need not match. Where a fault offsets them, faces are
//! found by sweeping each curtain (the sheet between two neighbouring pillars)
//! and new nodes are created where boundary lines of the two sides cross.
//! Pinched (zero-thickness) layers and inactive cells collapse onto the point
//! above them and never carry faces.
//!
//! ```
//! use cpgrid_preprocess::{process_grid, Grdecl, ProcessOptions};
//!
//! // One cell between depths 0 and 1 on four vertical pillars.
//! let coord = [
//!     0.0, 0.0, 0.0, 0.0, 0.0, 1.0, //
//!     1.0, 0.0, 0.0, 1.0, 0.0, 1.0, //
//!     0.0, 1.0, 0.0, 0.0, 1.0, 1.0, //
//!     1.0, 1.0, 0.0, 1.0, 1.0, 1.0,
//! ];
//! let zcorn = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
//! let grid = Grdecl::all_active([1, 1, 1], &coord, zcorn)?;
//!
//! let processed = process_grid(&grid, &ProcessOptions::default())?;
//! assert_eq!(processed.number_of_faces(), 6);
//! assert_eq!(processed.number_of_nodes(), 8);
//! assert_eq!(processed.number_of_cells(), 1);
//! # Ok::<(), cpgrid_preprocess::Error>(())
//! ```
//!
//! Node coordinates are left to the caller: pillar nodes lie on their pillar
//! at the depths in [`ProcessedGrid::pillar_points`], and intersection nodes
//! on the crossing of the two lines in [`ProcessedGrid::intersections`].

pub mod connections;
pub mod error;
pub mod face_topology;
pub mod faces;
pub mod grdecl;
pub mod options;
pub mod point;
pub mod point_numbers;
pub mod process;
pub mod processed;
pub mod serialization;
pub mod table;
pub mod unique_points;

pub use error::{Error, Result};
pub use faces::{FaceTag, LineIntersection};
pub use grdecl::{Grdecl, Pillar};
pub use options::{PinchPolicy, ProcessOptions};
pub use point::{ColumnPoints, PointRef};
pub use process::process_grid;
pub use processed::{CellFace, Orientation, ProcessedGrid};
pub use serialization::GridSnapshot;
pub use table::SparseTable;
pub use unique_points::PillarPoints;
