// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage a mesh failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Transform,
    Build,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transform => f.write_str("transform"),
            Stage::Build => f.write_str("build"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Fewer than two distinct meshes were selected. Raised before the
    /// scene is consulted.
    #[error(
        "Unable to check for intersections. \
         You must select multiple mesh objects to see if they intersect."
    )]
    InsufficientSelection { found: usize },

    #[error("Mesh '{mesh}' not found in scene")]
    NotFound { mesh: String },

    #[error("Invalid geometry in '{mesh}' ({stage}): {source}")]
    InvalidGeometry {
        mesh: String,
        stage: Stage,
        #[source]
        source: clash_lite_geometry::Error,
    },
}

impl Error {
    pub fn not_found(mesh: impl Into<String>) -> Self {
        Error::NotFound { mesh: mesh.into() }
    }

    pub fn invalid_geometry(
        mesh: impl Into<String>,
        stage: Stage,
        source: clash_lite_geometry::Error,
    ) -> Self {
        Error::InvalidGeometry {
            mesh: mesh.into(),
            stage,
            source,
        }
    }

    /// Name of the mesh this error is about, if any
    pub fn mesh(&self) -> Option<&str> {
        match self {
            Error::InsufficientSelection { .. } => None,
            Error::NotFound { mesh } | Error::InvalidGeometry { mesh, .. } => Some(mesh),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_selection_message() {
        let err = Error::InsufficientSelection { found: 1 };
        assert_eq!(
            err.to_string(),
            "Unable to check for intersections. \
             You must select multiple mesh objects to see if they intersect."
        );
        assert_eq!(err.mesh(), None);
    }

    #[test]
    fn test_invalid_geometry_keeps_source() {
        use std::error::Error as _;

        let err = Error::invalid_geometry(
            "Wall",
            Stage::Transform,
            clash_lite_geometry::Error::EmptyMesh("'Wall' has no faces".into()),
        );
        assert_eq!(err.mesh(), Some("Wall"));
        assert!(err.to_string().contains("(transform)"));
        assert!(err.source().is_some());
    }
}
