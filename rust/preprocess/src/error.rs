// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for corner-point preprocessing.

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a corner-point description into a
/// face topology.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A corner depth of an active cell matches no unique point on its pillar.
    #[error(
        "zcorn value {depth} on pillar {pillar} (corner column {column:?}, \
         corner layer {corner_layer}) matches no pillar point within tolerance {tolerance}"
    )]
    Format {
        pillar: usize,
        column: [usize; 2],
        corner_layer: usize,
        depth: f64,
        tolerance: f64,
    },

    /// Growing a face table failed.
    #[error("could not reserve storage for {rows} more faces / {entries} more face nodes")]
    Capacity { rows: usize, entries: usize },

    /// The raw grid arrays are malformed.
    #[error("invalid grid input: {0}")]
    InvalidInput(String),

    /// A faulted face degenerated in a way the resolver cannot place cleanly,
    /// and the pinch policy asks for a hard failure.
    #[error("illegal partial pinch on curtain {curtain}: {detail}")]
    IllegalPinch { curtain: usize, detail: String },

    /// A processed grid violates one of its structural invariants.
    #[error("inconsistent processed grid: {0}")]
    Inconsistent(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

