// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-mesh preparation cache.
//!
//! Every selected mesh is resolved, moved to world space and indexed exactly
//! once per check; all pairs involving it share the same `Arc<PreparedMesh>`.

use crate::error::{Error, Result, Stage};
use clash_lite_core::SceneSource;
use clash_lite_geometry::{transform_mesh, Aabb, Bvh};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A world-space mesh with its BVH, ready for pair tests.
#[derive(Debug)]
pub struct PreparedMesh {
    name: String,
    bvh: Bvh,
    vertex_count: usize,
}

impl PreparedMesh {
    /// Resolve `name` in `scene`, transform it and build its hierarchy.
    pub fn prepare(scene: &dyn SceneSource, name: &str, leaf_size: usize) -> Result<Self> {
        let source = scene.mesh(name).ok_or_else(|| Error::not_found(name))?;

        let world = transform_mesh(&source)
            .map_err(|e| Error::invalid_geometry(name, Stage::Transform, e))?;
        let bvh = Bvh::with_leaf_size(&world, leaf_size)
            .map_err(|e| Error::invalid_geometry(name, Stage::Build, e))?;

        tracing::debug!(
            mesh = %name,
            vertices = world.vertex_count(),
            triangles = bvh.triangle_count(),
            nodes = bvh.node_count(),
            depth = bvh.depth(),
            "Prepared mesh"
        );

        Ok(Self {
            name: name.to_string(),
            vertex_count: world.vertex_count(),
            bvh,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// World-space bounds of the whole mesh
    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.bvh.triangle_count()
    }
}

/// Prepared meshes keyed by identifier.
#[derive(Debug, Default)]
pub struct MeshCache {
    entries: FxHashMap<String, Arc<PreparedMesh>>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<PreparedMesh>> {
        self.entries.get(name).map(Arc::clone)
    }

    /// Store a prepared mesh, replacing any entry with the same name
    pub fn insert(&mut self, mesh: PreparedMesh) -> Arc<PreparedMesh> {
        let mesh = Arc::new(mesh);
        self.entries.insert(mesh.name.clone(), Arc::clone(&mesh));
        mesh
    }

    /// Prepare every name that is not cached yet.
    ///
    /// Names already present are not looked up again. Failures are returned
    /// in the order of `names`; successful meshes are cached.
    pub fn prepare_all(
        &mut self,
        scene: &dyn SceneSource,
        names: &[&str],
        leaf_size: usize,
        parallel: bool,
    ) -> Vec<Error> {
        let mut missing: Vec<&str> = Vec::with_capacity(names.len());
        for &name in names {
            if !self.contains(name) && !missing.contains(&name) {
                missing.push(name);
            }
        }

        let results: Vec<Result<PreparedMesh>> = if parallel {
            missing
                .par_iter()
                .map(|name| PreparedMesh::prepare(scene, name, leaf_size))
                .collect()
        } else {
            missing
                .iter()
                .map(|name| PreparedMesh::prepare(scene, name, leaf_size))
                .collect()
        };

        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(mesh) => {
                    self.insert(mesh);
                }
                Err(err) => failures.push(err),
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clash_lite_core::primitives::unit_cube;
    use clash_lite_core::{InMemoryScene, SceneMesh};

    fn scene() -> InMemoryScene {
        InMemoryScene::new()
            .with_mesh(unit_cube("A"))
            .with_mesh(unit_cube("B").translated(5.0, 0.0, 0.0))
            .with_mesh(SceneMesh::new("Empty", Vec::new(), Vec::new()))
    }

    #[test]
    fn test_prepare_moves_to_world_space() {
        let scene = scene();
        let b = PreparedMesh::prepare(&scene, "B", 4).unwrap();
        assert_eq!(b.name(), "B");
        assert_eq!(b.triangle_count(), 12);
        assert_eq!(b.vertex_count(), 8);
        assert_relative_eq!(b.bounds().min.x, 4.5);
        assert_relative_eq!(b.bounds().max.x, 5.5);
    }

    #[test]
    fn test_prepare_failures_carry_kind_and_stage() {
        let scene = scene();
        assert_eq!(
            PreparedMesh::prepare(&scene, "Missing", 4).unwrap_err(),
            Error::not_found("Missing")
        );
        assert!(matches!(
            PreparedMesh::prepare(&scene, "Empty", 4),
            Err(Error::InvalidGeometry { stage: Stage::Transform, .. })
        ));
    }

    #[test]
    fn test_prepare_all_caches_successes_and_orders_failures() {
        let scene = scene();
        let mut cache = MeshCache::new();
        let failures = cache.prepare_all(&scene, &["Missing", "A", "Empty", "B"], 4, true);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("A") && cache.contains("B"));
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].mesh(), Some("Missing"));
        assert_eq!(failures[1].mesh(), Some("Empty"));
    }

    #[test]
    fn test_cached_entries_are_shared() {
        let scene = scene();
        let mut cache = MeshCache::new();
        cache.prepare_all(&scene, &["A"], 4, false);
        let first = cache.get("A").unwrap();
        cache.prepare_all(&scene, &["A", "A"], 4, false);
        let second = cache.get("A").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
