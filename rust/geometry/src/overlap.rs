// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairwise BVH overlap queries
//!
//! Both trees are traversed together. A pair of nodes is expanded only when
//! their boxes overlap; at leaf level every pair of triangles whose boxes
//! overlap becomes a candidate, and candidates are confirmed according to the
//! requested [`OverlapFidelity`].

use crate::bvh::{Bvh, NodeKind};
use crate::triangle::DEFAULT_TOLERANCE;
use smallvec::SmallVec;
use std::ops::ControlFlow;

/// How leaf-level candidates are confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverlapFidelity {
    /// Confirm with an exact triangle-triangle test
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "exact"))]
    Exact,
    /// Accept any pair of triangles whose bounding boxes overlap.
    /// Conservative: may report false positives for concave or sparse meshes.
    #[cfg_attr(feature = "serde", serde(rename = "bbox"))]
    BoundingBox,
}

impl OverlapFidelity {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapFidelity::Exact => "exact",
            OverlapFidelity::BoundingBox => "bbox",
        }
    }
}

impl std::str::FromStr for OverlapFidelity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "triangle" => Ok(OverlapFidelity::Exact),
            "bbox" | "aabb" | "bounding-box" | "bounding_box" => Ok(OverlapFidelity::BoundingBox),
            other => Err(format!("unknown overlap fidelity '{}'", other)),
        }
    }
}

impl std::fmt::Display for OverlapFidelity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapOptions {
    pub fidelity: OverlapFidelity,
    /// Gap still treated as contact, in world units. Boxes are compared with
    /// the same margin so no candidate is lost to it.
    pub tolerance: f64,
}

impl Default for OverlapOptions {
    fn default() -> Self {
        Self {
            fidelity: OverlapFidelity::Exact,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl OverlapOptions {
    pub fn new(fidelity: OverlapFidelity) -> Self {
        Self {
            fidelity,
            ..Self::default()
        }
    }
}

/// Confirmed overlapping triangle pairs between two meshes.
///
/// Each pair is `(face in A, face in B)` using the source meshes' face
/// indices, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapResult {
    pairs: Vec<(u32, u32)>,
}

impl OverlapResult {
    #[inline]
    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<(u32, u32)> {
        self.pairs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True iff at least one triangle pair overlaps
    #[inline]
    pub fn intersects(&self) -> bool {
        !self.pairs.is_empty()
    }

    /// Same result seen from B's side
    pub fn swapped(&self) -> Self {
        let mut pairs: Vec<(u32, u32)> = self.pairs.iter().map(|&(a, b)| (b, a)).collect();
        pairs.sort_unstable();
        Self { pairs }
    }
}

impl Bvh {
    /// All overlapping triangle pairs between `self` and `other`.
    ///
    /// The two hierarchies must be distinct meshes; comparing a mesh with
    /// itself reports every triangle against itself and is not meaningful.
    pub fn overlap(&self, other: &Bvh, options: &OverlapOptions) -> OverlapResult {
        let mut pairs = Vec::new();
        self.traverse(other, options, |a, b| {
            pairs.push((a, b));
            ControlFlow::Continue(())
        });
        pairs.sort_unstable();
        OverlapResult { pairs }
    }

    /// Whether any triangle pair overlaps; stops at the first confirmed pair.
    pub fn intersects(&self, other: &Bvh, options: &OverlapOptions) -> bool {
        self.traverse(other, options, |_, _| ControlFlow::Break(()))
            .is_break()
    }

    /// Simultaneous descent of both trees, calling `visit` with source face
    /// indices for every confirmed pair.
    fn traverse<F>(
        &self,
        other: &Bvh,
        options: &OverlapOptions,
        mut visit: F,
    ) -> ControlFlow<()>
    where
        F: FnMut(u32, u32) -> ControlFlow<()>,
    {
        let margin = options.tolerance.max(0.0);
        let overlaps = |a: &crate::Aabb, b: &crate::Aabb| a.inflated(margin).intersects(b);

        if !overlaps(&self.root().bounds, &other.root().bounds) {
            return ControlFlow::Continue(());
        }

        let mut stack: SmallVec<[(u32, u32); 64]> = SmallVec::new();
        stack.push((0, 0));

        while let Some((ia, ib)) = stack.pop() {
            let na = self.node(ia);
            let nb = other.node(ib);

            match (na.kind, nb.kind) {
                (
                    NodeKind::Leaf { start: sa, count: ca },
                    NodeKind::Leaf { start: sb, count: cb },
                ) => {
                    for i in sa as usize..(sa + ca) as usize {
                        let box_a = self.triangle_bounds[i];
                        for j in sb as usize..(sb + cb) as usize {
                            if !overlaps(&box_a, &other.triangle_bounds[j]) {
                                continue;
                            }
                            let confirmed = match options.fidelity {
                                OverlapFidelity::BoundingBox => true,
                                OverlapFidelity::Exact => self.triangles[i]
                                    .intersects(&other.triangles[j], margin),
                            };
                            if confirmed {
                                visit(self.faces[i], other.faces[j])?;
                            }
                        }
                    }
                }
                (NodeKind::Leaf { .. }, NodeKind::Internal { left, right }) => {
                    for child in [left, right] {
                        if overlaps(&na.bounds, &other.node(child).bounds) {
                            stack.push((ia, child));
                        }
                    }
                }
                (NodeKind::Internal { left, right }, NodeKind::Leaf { .. }) => {
                    for child in [left, right] {
                        if overlaps(&self.node(child).bounds, &nb.bounds) {
                            stack.push((child, ib));
                        }
                    }
                }
                (
                    NodeKind::Internal { left: la, right: ra },
                    NodeKind::Internal { left: lb, right: rb },
                ) => {
                    // Descend the larger volume first
                    if na.bounds.surface_area() >= nb.bounds.surface_area() {
                        for child in [la, ra] {
                            if overlaps(&self.node(child).bounds, &nb.bounds) {
                                stack.push((child, ib));
                            }
                        }
                    } else {
                        for child in [lb, rb] {
                            if overlaps(&na.bounds, &other.node(child).bounds) {
                                stack.push((ia, child));
                            }
                        }
                    }
                }
            }
        }

        ControlFlow::Continue(())
    }
}
