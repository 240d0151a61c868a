// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intersection check configuration.

use clash_lite_geometry::{OverlapFidelity, OverlapOptions, DEFAULT_LEAF_SIZE, DEFAULT_TOLERANCE};
use serde::Serialize;
use std::str::FromStr;

/// What to do when a selected mesh cannot be resolved or prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeshFailurePolicy {
    /// Abort the whole check with the first failing mesh in selection order.
    #[default]
    FailFast,
    /// Exclude the mesh, record why, and keep checking the rest.
    Skip,
}

impl FromStr for MeshFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail" => Ok(MeshFailurePolicy::FailFast),
            "skip" => Ok(MeshFailurePolicy::Skip),
            other => Err(format!("unknown mesh failure policy '{}'", other)),
        }
    }
}

/// Intersection check configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionConfig {
    /// Exact triangle tests or bounding boxes only.
    pub fidelity: OverlapFidelity,
    /// Handling of missing or degenerate meshes.
    pub mesh_failure: MeshFailurePolicy,
    /// Prepare meshes and test pairs on the rayon pool.
    pub parallel: bool,
    /// Maximum triangles per BVH leaf (at least 1).
    pub leaf_size: usize,
    /// Absolute contact tolerance in world units.
    pub tolerance: f64,
    /// Record every overlapping face pair instead of stopping at the first.
    pub collect_faces: bool,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            fidelity: OverlapFidelity::Exact,
            mesh_failure: MeshFailurePolicy::FailFast,
            parallel: true,
            leaf_size: DEFAULT_LEAF_SIZE,
            tolerance: DEFAULT_TOLERANCE,
            collect_faces: false,
        }
    }
}

impl IntersectionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Missing or
    /// unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            fidelity: lookup("CLASH_FIDELITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fidelity),
            mesh_failure: lookup("CLASH_MESH_FAILURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.mesh_failure),
            parallel: lookup("CLASH_PARALLEL")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.parallel),
            leaf_size: lookup("CLASH_LEAF_SIZE")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(defaults.leaf_size)
                .max(1),
            tolerance: lookup("CLASH_TOLERANCE")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|&t| is_valid_tolerance(t))
                .unwrap_or(defaults.tolerance),
            collect_faces: lookup("CLASH_COLLECT_FACES")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.collect_faces),
        }
    }

    pub fn with_fidelity(mut self, fidelity: OverlapFidelity) -> Self {
        self.fidelity = fidelity;
        self
    }

    pub fn with_mesh_failure(mut self, policy: MeshFailurePolicy) -> Self {
        self.mesh_failure = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size.max(1);
        self
    }

    /// Set the contact tolerance. Negative or non-finite values fall back
    /// to [`DEFAULT_TOLERANCE`].
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = if is_valid_tolerance(tolerance) {
            tolerance
        } else {
            tracing::warn!(tolerance, "Invalid tolerance, using default");
            DEFAULT_TOLERANCE
        };
        self
    }

    pub fn with_collect_faces(mut self, collect: bool) -> Self {
        self.collect_faces = collect;
        self
    }

    /// Options handed to the pairwise overlap tester. An invalid
    /// `tolerance` set directly on the field is replaced by the default.
    pub fn overlap_options(&self) -> OverlapOptions {
        let tolerance = if is_valid_tolerance(self.tolerance) {
            self.tolerance
        } else {
            DEFAULT_TOLERANCE
        };
        OverlapOptions {
            fidelity: self.fidelity,
            tolerance,
        }
    }
}

/// Tolerances must be finite and non-negative
#[inline]
pub fn is_valid_tolerance(tolerance: f64) -> bool {
    tolerance.is_finite() && tolerance >= 0.0
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
