// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared intersection pipeline for clash-lite.
//!
//! Takes a list of mesh identifiers and a [`SceneSource`], prepares each
//! mesh once and reports which unordered pairs intersect. Used by the CLI
//! and by any host that can expose its scene through `SceneSource`.
//!
//! ```rust,ignore
//! use clash_lite_core::{primitives::unit_cube, InMemoryScene};
//! use clash_lite_processing::{IntersectionChecker, IntersectionConfig, TracingSink};
//!
//! let scene = InMemoryScene::new()
//!     .with_mesh(unit_cube("A"))
//!     .with_mesh(unit_cube("B").translated(0.5, 0.0, 0.0));
//! let mut checker = IntersectionChecker::new(IntersectionConfig::from_env());
//! let report = checker.run(&scene, &["A", "B"], &mut TracingSink)?;
//! assert!(report.any_intersection);
//! ```

pub mod cache;
pub mod checker;
pub mod config;
pub mod error;
pub mod pairs;
pub mod report;
pub mod sink;

pub use clash_lite_core::SceneSource;

pub use cache::{MeshCache, PreparedMesh};
pub use checker::{
    check_intersections, CancelToken, CheckPhase, IntersectionChecker, ProgressFn,
};
pub use config::{is_valid_tolerance, IntersectionConfig, MeshFailurePolicy};
pub use error::{Error, Result, Stage};
pub use pairs::{pair_count, unordered_pairs, Selection};
pub use report::{CheckStats, ExcludedMesh, PairOutcome, Report};
pub use sink::{MessageLog, ReportSink, Severity, TracingSink};

pub use clash_lite_geometry::OverlapFidelity;
