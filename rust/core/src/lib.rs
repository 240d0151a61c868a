// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Clash-Lite Core
//!
//! Scene-side types shared by the geometry and processing crates:
//!
//! - [`SceneMesh`]: a named triangle mesh with its world transform
//! - [`SceneSource`]: the capability the checker uses to resolve names to
//!   meshes, implemented by the host
//! - [`InMemoryScene`]: a ready-made `SceneSource`
//! - [`primitives`]: cube, grid and sphere builders
//!
//! ## Feature Flags
//!
//! - `serde`: JSON-friendly scene file records ([`SceneFile`])

pub mod primitives;
pub mod scene;
#[cfg(feature = "serde")]
pub mod scene_file;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use scene::{InMemoryScene, SceneMesh, SceneSource};
#[cfg(feature = "serde")]
pub use scene_file::{ObjectKind, SceneFile, SceneObjectRecord};
