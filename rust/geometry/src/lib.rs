// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clash-Lite Geometry
//!
//! World-space transformation of scene meshes, bounding volume hierarchy
//! construction and triangle-level overlap queries between two hierarchies.
//!
//! ```rust,ignore
//! use clash_lite_core::primitives::unit_cube;
//! use clash_lite_geometry::{transform_mesh, Bvh, OverlapOptions};
//!
//! let a = Bvh::build(&transform_mesh(&unit_cube("A"))?)?;
//! let b = Bvh::build(&transform_mesh(&unit_cube("B").translated(0.5, 0.0, 0.0))?)?;
//! assert!(a.intersects(&b, &OverlapOptions::default()));
//! ```

pub mod aabb;
pub mod bvh;
pub mod error;
pub mod mesh;
pub mod overlap;
pub mod transform;
pub mod triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use aabb::Aabb;
pub use bvh::{Bvh, BvhNode, NodeKind, DEFAULT_LEAF_SIZE};
pub use error::{Error, Result};
pub use mesh::TriangleMesh;
pub use overlap::{OverlapFidelity, OverlapOptions, OverlapResult};
pub use transform::{transform_mesh, transform_point};
pub use triangle::{Triangle, DEFAULT_TOLERANCE};
