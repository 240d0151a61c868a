// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene data model
//!
//! A [`SceneMesh`] is the host's view of a mesh object: local-space vertices,
//! triangular faces and the world transform. The clash checker never mutates
//! scene data; it resolves names through a [`SceneSource`] for the duration of
//! one check.

use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;
use std::borrow::Cow;

/// A named triangle mesh as stored by the host scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMesh {
    /// Object name, unique within the working set
    pub name: String,
    /// Vertex positions in local (object) space
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as vertex index triples
    pub faces: Vec<[u32; 3]>,
    /// Local-to-world transform
    pub transform: Matrix4<f64>,
}

impl SceneMesh {
    /// Create a mesh with an identity world transform
    pub fn new(name: impl Into<String>, vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            name: name.into(),
            vertices,
            faces,
            transform: Matrix4::identity(),
        }
    }

    /// Replace the world transform
    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Self {
        self.transform = transform;
        self
    }

    /// Pre-multiply the world transform by a translation
    pub fn translated(mut self, x: f64, y: f64, z: f64) -> Self {
        self.transform = Matrix4::new_translation(&Vector3::new(x, y, z)) * self.transform;
        self
    }

    /// Get number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no renderable triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }
}

/// Resolves object names to mesh data.
///
/// This is the only way the checker reaches into the host scene. Implementors
/// must be `Sync` because meshes are resolved from worker threads when the
/// check runs in parallel.
pub trait SceneSource: Sync {
    /// Look up a mesh by name. `None` means the name does not resolve to a
    /// mesh in the current scene.
    fn mesh(&self, name: &str) -> Option<Cow<'_, SceneMesh>>;
}

/// Scene held entirely in memory
///
/// Keeps insertion order so that "select everything" produces a stable
/// identifier list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    meshes: Vec<SceneMesh>,
    by_name: FxHashMap<String, usize>,
}

impl InMemoryScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh, replacing any existing mesh with the same name in place.
    pub fn insert(&mut self, mesh: SceneMesh) {
        match self.by_name.get(&mesh.name) {
            Some(&slot) => self.meshes[slot] = mesh,
            None => {
                self.by_name.insert(mesh.name.clone(), self.meshes.len());
                self.meshes.push(mesh);
            }
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_mesh(mut self, mesh: SceneMesh) -> Self {
        self.insert(mesh);
        self
    }

    /// Get a mesh by name
    pub fn get(&self, name: &str) -> Option<&SceneMesh> {
        self.by_name.get(name).map(|&slot| &self.meshes[slot])
    }

    /// Names of all meshes in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.meshes.iter().map(|m| m.name.as_str()).collect()
    }

    /// Iterate over meshes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SceneMesh> {
        self.meshes.iter()
    }

    /// Get number of meshes
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Check if the scene is empty
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl FromIterator<SceneMesh> for InMemoryScene {
    fn from_iter<I: IntoIterator<Item = SceneMesh>>(iter: I) -> Self {
        let mut scene = Self::new();
        for mesh in iter {
            scene.insert(mesh);
        }
        scene
    }
}

impl SceneSource for InMemoryScene {
    fn mesh(&self, name: &str) -> Option<Cow<'_, SceneMesh>> {
        self.get(name).map(Cow::Borrowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::unit_cube;
    use approx::assert_relative_eq;

    #[test]
    fn test_scene_insert_and_lookup() {
        let scene = InMemoryScene::new()
            .with_mesh(unit_cube("A"))
            .with_mesh(unit_cube("B"));

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.names(), vec!["A", "B"]);
        assert!(scene.mesh("A").is_some());
        assert!(scene.mesh("missing").is_none());
    }

    #[test]
    fn test_scene_insert_replaces_in_place() {
        let mut scene = InMemoryScene::new()
            .with_mesh(unit_cube("A"))
            .with_mesh(unit_cube("B"));
        scene.insert(unit_cube("A").translated(5.0, 0.0, 0.0));

        assert_eq!(scene.names(), vec!["A", "B"]);
        let a = scene.get("A").unwrap();
        assert_relative_eq!(a.transform[(0, 3)], 5.0);
    }

    #[test]
    fn test_scene_collects_in_order() {
        let scene: InMemoryScene = ["A", "B", "C"].into_iter().map(unit_cube).collect();
        assert_eq!(scene.names(), vec!["A", "B", "C"]);
        assert_eq!(scene.get("C").map(|m| m.name.as_str()), Some("C"));
    }

    #[test]
    fn test_translated_composes_with_existing_transform() {
        let mesh = unit_cube("A")
            .translated(1.0, 0.0, 0.0)
            .translated(0.0, 2.0, 0.0);

        assert_relative_eq!(mesh.transform[(0, 3)], 1.0);
        assert_relative_eq!(mesh.transform[(1, 3)], 2.0);
        assert_relative_eq!(mesh.transform[(2, 3)], 0.0);
    }

    #[test]
    fn test_empty_mesh_detection() {
        let mesh = SceneMesh::new("empty", Vec::new(), Vec::new());
        assert!(mesh.is_empty());
        assert!(!unit_cube("A").is_empty());
    }
}
