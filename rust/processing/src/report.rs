// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Check results.

use crate::config::IntersectionConfig;
use serde::Serialize;

pub const SUMMARY_INTERSECT: &str = "Objects DO intersect!";
pub const SUMMARY_CLEAR: &str = "Objects do NOT intersect.";

/// Outcome of testing one unordered pair of meshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairOutcome {
    pub mesh_a: String,
    pub mesh_b: String,
    pub intersects: bool,
    /// Overlapping `(face in A, face in B)` pairs. Only filled when face
    /// collection is enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<(u32, u32)>,
}

impl PairOutcome {
    pub fn new(mesh_a: impl Into<String>, mesh_b: impl Into<String>, intersects: bool) -> Self {
        Self {
            mesh_a: mesh_a.into(),
            mesh_b: mesh_b.into(),
            intersects,
            faces: Vec::new(),
        }
    }

    /// User-facing line for this pair
    pub fn message(&self) -> String {
        if self.intersects {
            format!("{} and {} intersect!", self.mesh_a, self.mesh_b)
        } else {
            format!("{} and {} do NOT intersect!", self.mesh_a, self.mesh_b)
        }
    }
}

/// A selected mesh that was left out under the skip policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedMesh {
    pub name: String,
    pub reason: String,
}

impl ExcludedMesh {
    pub fn message(&self) -> String {
        format!("{} skipped: {}", self.name, self.reason)
    }
}

/// Work counters and timings for one check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckStats {
    /// Distinct meshes after duplicate removal
    pub selected: usize,
    /// Meshes that were prepared successfully
    pub prepared: usize,
    /// Total triangles across prepared meshes
    pub triangles: usize,
    /// Pairs that should have been tested
    pub pairs_total: usize,
    /// Pairs actually tested (less than total when cancelled)
    pub pairs_tested: usize,
    /// Pairs settled by the world-box pre-check alone
    pub pairs_culled: usize,
    pub prepare_ms: u64,
    pub test_ms: u64,
    pub total_ms: u64,
}

/// Result of a completed intersection check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// One entry per tested pair, in selection order
    pub pairs: Vec<PairOutcome>,
    /// True iff any pair intersects
    pub any_intersection: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<ExcludedMesh>,
    /// Set when the check was cancelled before all pairs were tested
    pub cancelled: bool,
    pub config: IntersectionConfig,
    pub stats: CheckStats,
}

impl Report {
    /// Summary line shown after the per-pair messages
    pub fn summary(&self) -> &'static str {
        if self.any_intersection {
            SUMMARY_INTERSECT
        } else {
            SUMMARY_CLEAR
        }
    }

    /// Per-pair lines in pair order
    pub fn messages(&self) -> Vec<String> {
        self.pairs.iter().map(PairOutcome::message).collect()
    }

    /// Pairs that intersect
    pub fn intersecting(&self) -> impl Iterator<Item = &PairOutcome> {
        self.pairs.iter().filter(|p| p.intersects)
    }

    /// Look up the outcome for `a` and `b` in either order
    pub fn outcome(&self, a: &str, b: &str) -> Option<&PairOutcome> {
        self.pairs
            .iter()
            .find(|p| (p.mesh_a == a && p.mesh_b == b) || (p.mesh_a == b && p.mesh_b == a))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
