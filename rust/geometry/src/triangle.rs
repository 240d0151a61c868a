// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle primitive and exact triangle-triangle overlap
//!
//! The overlap test is a separating axis test over the full candidate set
//! for two flat convex polygons:
//!
//! - the two face normals
//! - the nine edge-edge cross products
//! - the six in-plane edge normals (face normal x edge), which handle the
//!   coplanar case
//! - the three coordinate axes, which keep zero-area triangles from passing
//!   when every other axis degenerates
//!
//! Triangles are closed sets: sharing a single point counts as overlap.

use crate::aabb::Aabb;
use nalgebra::{Point3, Vector3};

/// Default absolute tolerance for [`Triangle::intersects`]
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Triangle definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal (length is twice the area)
    #[inline]
    pub fn scaled_normal(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Calculate triangle normal
    pub fn normal(&self) -> Vector3<f64> {
        self.scaled_normal().normalize()
    }

    /// Calculate triangle area
    pub fn area(&self) -> f64 {
        self.scaled_normal().norm() * 0.5
    }

    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_triangle(&self.v0, &self.v1, &self.v2)
    }

    #[inline]
    fn edges(&self) -> [Vector3<f64>; 3] {
        [self.v1 - self.v0, self.v2 - self.v1, self.v0 - self.v2]
    }

    /// Project onto `axis`, returning (min, max)
    #[inline]
    fn project(&self, axis: &Vector3<f64>) -> (f64, f64) {
        let a = axis.dot(&self.v0.coords);
        let b = axis.dot(&self.v1.coords);
        let c = axis.dot(&self.v2.coords);
        (a.min(b).min(c), a.max(b).max(c))
    }

    /// Exact overlap test against another triangle.
    ///
    /// Returns `true` when the closed triangles share at least one point,
    /// allowing a gap of up to `tolerance` along every separating axis.
    /// Negative or NaN tolerances are treated as zero.
    pub fn intersects(&self, other: &Triangle, tolerance: f64) -> bool {
        let tolerance = tolerance.max(0.0);
        let ea = self.edges();
        let eb = other.edges();
        let na = self.scaled_normal();
        let nb = other.scaled_normal();

        // Cross products of near-parallel vectors carry no direction; skip
        // axes shorter than this relative to the triangles' scale.
        let scale = ea
            .iter()
            .chain(eb.iter())
            .map(|e| e.norm_squared())
            .fold(0.0_f64, f64::max);
        let min_axis_sq = (scale * 1e-12).powi(2);

        let separated = |axis: Vector3<f64>| -> bool {
            let len_sq = axis.norm_squared();
            if len_sq <= min_axis_sq || len_sq == 0.0 {
                return false;
            }
            let axis = axis / len_sq.sqrt();
            let (min_a, max_a) = self.project(&axis);
            let (min_b, max_b) = other.project(&axis);
            max_a + tolerance < min_b || max_b + tolerance < min_a
        };

        if separated(na) || separated(nb) {
            return false;
        }

        for a in &ea {
            for b in &eb {
                if separated(a.cross(b)) {
                    return false;
                }
            }
        }

        for e in &ea {
            if separated(na.cross(e)) {
                return false;
            }
        }
        for e in &eb {
            if separated(nb.cross(e)) {
                return false;
            }
        }

        !(separated(Vector3::x()) || separated(Vector3::y()) || separated(Vector3::z()))
    }
}
