// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding Volume Hierarchy over world-space triangles
//!
//! Top-down median split: each node partitions its triangles at the median
//! centroid along the longest axis of the centroid bounds. Partitioning uses
//! `select_nth_unstable_by`, so every level costs O(n) and the tree is
//! balanced with O(log n) depth.
//!
//! Nodes live in a flat array with the root at index 0. Triangles are copied
//! into leaf order so that leaf-level tests read contiguous memory; the
//! original face index of every triangle is kept for reporting.

use crate::aabb::Aabb;
use crate::error::{Error, Result};
use crate::mesh::TriangleMesh;
use crate::triangle::Triangle;
use nalgebra::Point3;

/// Default maximum number of triangles per leaf
pub const DEFAULT_LEAF_SIZE: usize = 4;

/// Node payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Contiguous run of triangles in leaf order
    Leaf { start: u32, count: u32 },
    /// Child node indices
    Internal { left: u32, right: u32 },
}

/// A single node in the hierarchy
#[derive(Debug, Clone, Copy)]
pub struct BvhNode {
    /// Bounds of every triangle below this node
    pub bounds: Aabb,
    pub kind: NodeKind,
}

impl BvhNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Input item for building the tree
#[derive(Debug, Clone, Copy)]
struct BuildItem {
    face: u32,
    bounds: Aabb,
    centroid: Point3<f64>,
}

/// Immutable bounding volume hierarchy over one mesh's triangles
#[derive(Debug, Clone)]
pub struct Bvh {
    pub(crate) nodes: Vec<BvhNode>,
    /// Triangles in leaf order
    pub(crate) triangles: Vec<Triangle>,
    /// Per-triangle bounds in leaf order
    pub(crate) triangle_bounds: Vec<Aabb>,
    /// Source face index for each triangle in leaf order
    pub(crate) faces: Vec<u32>,
    leaf_size: usize,
}

impl Bvh {
    /// Build with [`DEFAULT_LEAF_SIZE`]
    pub fn build(mesh: &TriangleMesh) -> Result<Self> {
        Self::with_leaf_size(mesh, DEFAULT_LEAF_SIZE)
    }

    /// Build a hierarchy whose leaves hold at most `leaf_size` triangles.
    ///
    /// `leaf_size` is clamped to at least 1. Leaves may exceed it only when
    /// all of their triangle centroids coincide and no split is possible.
    ///
    /// # Errors
    /// [`Error::EmptyMesh`] if the mesh has no triangles,
    /// [`Error::InvalidGeometry`] if a face references a missing vertex.
    pub fn with_leaf_size(mesh: &TriangleMesh, leaf_size: usize) -> Result<Self> {
        if mesh.is_empty() {
            return Err(Error::EmptyMesh("cannot build a BVH without triangles".into()));
        }
        let vertex_count = mesh.vertex_count();
        if let Some(face) = mesh
            .indices
            .iter()
            .position(|f| f.iter().any(|&i| i as usize >= vertex_count))
        {
            return Err(Error::geometry(format!(
                "face {} references a vertex outside 0..{}",
                face, vertex_count
            )));
        }

        let mut items: Vec<BuildItem> = mesh
            .triangles()
            .enumerate()
            .map(|(face, tri)| BuildItem {
                face: face as u32,
                bounds: tri.bounds(),
                centroid: tri.centroid(),
            })
            .collect();

        let leaf_size = leaf_size.max(1);
        let mut bvh = Self {
            // A binary tree over n leaves has at most 2n - 1 nodes
            nodes: Vec::with_capacity(2 * items.len().div_ceil(leaf_size)),
            triangles: Vec::new(),
            triangle_bounds: Vec::new(),
            faces: Vec::new(),
            leaf_size,
        };
        bvh.build_node(&mut items, 0);

        bvh.faces = items.iter().map(|item| item.face).collect();
        bvh.triangle_bounds = items.iter().map(|item| item.bounds).collect();
        bvh.triangles = bvh
            .faces
            .iter()
            .map(|&face| mesh.triangle(face as usize))
            .collect();

        Ok(bvh)
    }

    /// Build the subtree over `items`, whose first element sits at `offset` in
    /// leaf order. Returns the new node's index.
    fn build_node(&mut self, items: &mut [BuildItem], offset: usize) -> u32 {
        let mut bounds = Aabb::empty();
        let mut centroid_bounds = Aabb::empty();
        for item in items.iter() {
            bounds.extend(&item.bounds);
            centroid_bounds.extend_point(&item.centroid);
        }

        let index = self.nodes.len() as u32;
        let leaf = BvhNode {
            bounds,
            kind: NodeKind::Leaf {
                start: offset as u32,
                count: items.len() as u32,
            },
        };

        if items.len() <= self.leaf_size {
            self.nodes.push(leaf);
            return index;
        }

        let axis = centroid_bounds.longest_axis();
        if centroid_bounds.extent()[axis] <= 0.0 {
            // All centroids coincide; no split separates them
            self.nodes.push(leaf);
            return index;
        }

        let mid = items.len() / 2;
        items.select_nth_unstable_by(mid, |a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));

        // Reserve the slot, children are appended after it
        self.nodes.push(leaf);
        let (lower, upper) = items.split_at_mut(mid);
        let left = self.build_node(lower, offset);
        let right = self.build_node(upper, offset + mid);
        self.nodes[index as usize].kind = NodeKind::Internal { left, right };

        index
    }

    /// Bounds of the whole mesh
    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.nodes[0].bounds
    }

    #[inline]
    pub fn root(&self) -> &BvhNode {
        &self.nodes[0]
    }

    #[inline]
    pub fn node(&self, index: u32) -> &BvhNode {
        &self.nodes[index as usize]
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of levels from the root to the deepest leaf (a lone leaf is 1)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0u32, 1usize)];
        while let Some((index, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let NodeKind::Internal { left, right } = self.node(index).kind {
                stack.push((left, level + 1));
                stack.push((right, level + 1));
            }
        }
        deepest
    }

    /// Triangles stored in a leaf, paired with their source face indices
    pub fn leaf_triangles(&self, node: &BvhNode) -> impl Iterator<Item = (u32, &Triangle)> + '_ {
        let range = match node.kind {
            NodeKind::Leaf { start, count } => start as usize..(start + count) as usize,
            NodeKind::Internal { .. } => 0..0,
        };
        range.map(move |i| (self.faces[i], &self.triangles[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform_mesh;
    use clash_lite_core::primitives::{grid, unit_cube, uv_sphere};

    fn world(mesh: &clash_lite_core::SceneMesh) -> TriangleMesh {
        transform_mesh(mesh).unwrap()
    }

    /// Every node contains its children; every leaf contains its triangles.
    fn assert_invariants(bvh: &Bvh) {
        let mut seen = vec![false; bvh.triangle_count()];
        let mut stack = vec![0u32];
        while let Some(index) = stack.pop() {
            let node = bvh.node(index);
            match node.kind {
                NodeKind::Internal { left, right } => {
                    assert!(node.bounds.contains(&bvh.node(left).bounds));
                    assert!(node.bounds.contains(&bvh.node(right).bounds));
                    stack.push(left);
                    stack.push(right);
                }
                NodeKind::Leaf { count, .. } => {
                    assert!(count >= 1);
                    assert_eq!(bvh.leaf_triangles(node).count(), count as usize);
                    for (face, tri) in bvh.leaf_triangles(node) {
                        for v in [&tri.v0, &tri.v1, &tri.v2] {
                            assert!(node.bounds.contains_point(v));
                        }
                        assert!(!seen[face as usize], "face referenced twice");
                        seen[face as usize] = true;
                    }
                }
            }
        }
        assert!(seen.iter().all(|&s| s), "every triangle must be in a leaf");
    }

    #[test]
    fn test_single_triangle_is_one_leaf() {
        let mut mesh = TriangleMesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(0, 1, 2);

        let bvh = Bvh::with_leaf_size(&mesh, 1).unwrap();
        assert_eq!(bvh.node_count(), 1);
        assert_eq!(bvh.depth(), 1);
        assert!(bvh.root().is_leaf());
        assert_invariants(&bvh);
    }

    #[test]
    fn test_cube_hierarchy() {
        let bvh = Bvh::with_leaf_size(&world(&unit_cube("A")), 1).unwrap();
        assert_eq!(bvh.triangle_count(), 12);
        assert_eq!(bvh.leaf_count(), 12);
        assert_eq!(bvh.node_count(), 23);
        assert_eq!(bvh.bounds().min, Point3::new(-0.5, -0.5, -0.5));
        assert_invariants(&bvh);
    }

    #[test]
    fn test_large_mesh_is_balanced() {
        let mesh = world(&grid("g", 10.0, 32)); // 2048 triangles
        let bvh = Bvh::build(&mesh).unwrap();
        assert_eq!(bvh.triangle_count(), 2048);
        // 2048 / 4 = 512 leaves -> 10 levels when perfectly balanced
        assert!(bvh.depth() <= 11, "depth {}", bvh.depth());
        assert_invariants(&bvh);
    }

    #[test]
    fn test_sphere_invariants_with_various_leaf_sizes() {
        let mesh = world(&uv_sphere("s", 2.0, 24, 12).translated(3.0, -1.0, 0.5));
        for leaf_size in [1, 2, 3, 8, 64] {
            let bvh = Bvh::with_leaf_size(&mesh, leaf_size).unwrap();
            assert_eq!(bvh.triangle_count(), mesh.triangle_count());
            assert_invariants(&bvh);
        }
    }

    #[test]
    fn test_leaf_size_zero_is_clamped() {
        let bvh = Bvh::with_leaf_size(&world(&unit_cube("A")), 0).unwrap();
        assert_eq!(bvh.leaf_size(), 1);
        assert_invariants(&bvh);
    }

    #[test]
    fn test_coincident_triangles_stay_in_one_leaf() {
        let mut mesh = TriangleMesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        for _ in 0..10 {
            mesh.add_triangle(0, 1, 2);
        }
        let bvh = Bvh::with_leaf_size(&mesh, 2).unwrap();
        assert_eq!(bvh.node_count(), 1);
        assert_invariants(&bvh);
    }

    #[test]
    fn test_face_indices_are_preserved() {
        let mesh = world(&unit_cube("A"));
        let bvh = Bvh::with_leaf_size(&mesh, 1).unwrap();
        let mut faces = Vec::new();
        for index in 0..bvh.node_count() as u32 {
            for (face, tri) in bvh.leaf_triangles(bvh.node(index)) {
                assert_eq!(*tri, mesh.triangle(face as usize));
                faces.push(face);
            }
        }
        faces.sort_unstable();
        assert_eq!(faces, (0..12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        assert!(matches!(
            Bvh::build(&TriangleMesh::new()),
            Err(Error::EmptyMesh(_))
        ));
    }

    #[test]
    fn test_bad_index_is_rejected() {
        let mut mesh = TriangleMesh::new();
        mesh.add_vertex(Point3::origin());
        mesh.add_triangle(0, 0, 7);
        assert!(matches!(Bvh::build(&mesh), Err(Error::InvalidGeometry(_))));
    }
}
