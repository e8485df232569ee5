// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Processing options.

use serde::{Deserialize, Serialize};

/// What to do when a faulted face hits an illegal partial pinch.
///
/// Field data often carries near-degenerate faults, so the default is to log
/// and keep a best-effort face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinchPolicy {
    /// Log a warning and emit the best-effort face.
    #[default]
    Warn,
    /// Abort the build with [`crate::Error::IllegalPinch`].
    Error,
}

impl PinchPolicy {
    /// Parses `"warn"` or `"error"` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "warn" | "warning" => Some(PinchPolicy::Warn),
            "error" | "strict" => Some(PinchPolicy::Error),
            _ => None,
        }
    }
}

/// Options for [`crate::process_grid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Two depths on the same pillar closer than this are one point.
    pub tolerance: f64,
    /// Handling of illegal partial pinches in faulted faces.
    pub pinch_policy: PinchPolicy,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            tolerance: f64::EPSILON,
            pinch_policy: PinchPolicy::Warn,
        }
    }
}

impl ProcessOptions {
    /// Load options from environment variables.
    ///
    /// `CPGRID_TOLERANCE` and `CPGRID_PINCH_POLICY` override the defaults;
    /// missing or unparsable values fall back to them.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tolerance: std::env::var("CPGRID_TOLERANCE")
                .ok()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|t| t.is_finite() && *t >= 0.0)
                .unwrap_or(defaults.tolerance),
            pinch_policy: std::env::var("CPGRID_PINCH_POLICY")
                .ok()
                .and_then(|v| PinchPolicy::parse(&v))
                .unwrap_or(defaults.pinch_policy),
        }
    }

    /// Returns a copy with the given point tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns a copy with the given pinch policy.
    pub fn with_pinch_policy(mut self, policy: PinchPolicy) -> Self {
        self.pinch_policy = policy;
        self
    }
}
