// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable scene description
//!
//! Plain-array records so scenes can be exchanged as JSON without pulling
//! nalgebra's serde support. Transforms are row-major 4x4.

use crate::scene::{InMemoryScene, SceneMesh};
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

/// Kind of scene object. Only meshes take part in clash checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    #[default]
    Mesh,
    Curve,
    Empty,
    Light,
    Camera,
}

/// One object in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectRecord {
    pub name: String,
    #[serde(default)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub vertices: Vec<[f64; 3]>,
    #[serde(default)]
    pub faces: Vec<[u32; 3]>,
    /// Row-major local-to-world transform; identity when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[[f64; 4]; 4]>,
}

/// Top-level scene file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default, alias = "objects")]
    pub meshes: Vec<SceneObjectRecord>,
}

impl SceneObjectRecord {
    /// Convert into a scene mesh
    pub fn to_scene_mesh(&self) -> SceneMesh {
        let vertices = self
            .vertices
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();
        let transform = self
            .transform
            .map(|rows| Matrix4::from_fn(|r, c| rows[r][c]))
            .unwrap_or_else(Matrix4::identity);

        SceneMesh::new(self.name.clone(), vertices, self.faces.clone()).with_transform(transform)
    }

    /// Build a record from a scene mesh
    pub fn from_scene_mesh(mesh: &SceneMesh) -> Self {
        let m = &mesh.transform;
        let transform = if *m == Matrix4::identity() {
            None
        } else {
            Some(std::array::from_fn(|r| std::array::from_fn(|c| m[(r, c)])))
        };

        Self {
            name: mesh.name.clone(),
            kind: ObjectKind::Mesh,
            vertices: mesh.vertices.iter().map(|p| [p.x, p.y, p.z]).collect(),
            faces: mesh.faces.clone(),
            transform,
        }
    }
}

impl SceneFile {
    /// Names of mesh-type objects in file order, i.e. what a host would
    /// report as "selected mesh objects" when everything is selected.
    pub fn mesh_names(&self) -> Vec<&str> {
        self.meshes
            .iter()
            .filter(|o| o.kind == ObjectKind::Mesh)
            .map(|o| o.name.as_str())
            .collect()
    }

    /// First object with the given name, of any kind
    pub fn find(&self, name: &str) -> Option<&SceneObjectRecord> {
        self.meshes.iter().find(|o| o.name == name)
    }

    /// Build an in-memory scene from the mesh-type objects
    pub fn to_scene(&self) -> InMemoryScene {
        self.meshes
            .iter()
            .filter(|o| o.kind == ObjectKind::Mesh)
            .map(SceneObjectRecord::to_scene_mesh)
            .collect()
    }
}

impl From<&InMemoryScene> for SceneFile {
    fn from(scene: &InMemoryScene) -> Self {
        Self {
            meshes: scene.iter().map(SceneObjectRecord::from_scene_mesh).collect(),
        }
    }
}
