// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World-space triangle mesh

use crate::aabb::Aabb;
use crate::triangle::Triangle;
use nalgebra::Point3;

/// Triangle soup in world coordinates.
///
/// Produced by [`transform_mesh`](crate::transform::transform_mesh) and
/// consumed by [`Bvh::build`](crate::bvh::Bvh::build). Face order matches the
/// source mesh so triangle indices reported by overlap queries can be mapped
/// back to the host's faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions
    pub positions: Vec<Point3<f64>>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.positions.push(position);
        (self.positions.len() - 1) as u32
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push([i0, i1, i2]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Check if mesh has no triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Get triangle `index` as a value.
    ///
    /// # Panics
    /// If `index` is out of range or the face references a missing vertex.
    /// Meshes built by `transform_mesh` have validated faces.
    #[inline]
    pub fn triangle(&self, index: usize) -> Triangle {
        let [i0, i1, i2] = self.indices[index];
        Triangle::new(
            self.positions[i0 as usize],
            self.positions[i1 as usize],
            self.positions[i2 as usize],
        )
    }

    /// Iterate over all triangles in face order
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.indices.len()).map(move |i| self.triangle(i))
    }

    /// Bounding box of all referenced vertices
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.indices.iter().flatten().map(|&i| &self.positions[i as usize]))
    }
}
