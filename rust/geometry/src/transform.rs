// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local-to-world mesh transformation
//!
//! Moves a scene mesh into the common world frame so that meshes with
//! different object transforms can be compared directly.

use crate::error::{Error, Result};
use crate::mesh::TriangleMesh;
use clash_lite_core::SceneMesh;
use nalgebra::{Matrix4, Point3};

/// Apply the affine part of a 4x4 transform to a point.
///
/// The bottom row is ignored (no perspective divide); world transforms are
/// affine.
#[inline]
pub fn transform_point(transform: &Matrix4<f64>, point: &Point3<f64>) -> Point3<f64> {
    let linear = transform.fixed_view::<3, 3>(0, 0);
    let translation = transform.fixed_view::<3, 1>(0, 3);
    Point3::from(linear * point.coords + translation)
}

/// Transform a scene mesh into world space.
///
/// Every vertex is multiplied through `mesh.transform`; faces are copied
/// unchanged. Fails with [`Error::EmptyMesh`] for meshes without vertices or
/// faces, and with [`Error::InvalidGeometry`] when a face references a
/// missing vertex or the transform produces non-finite coordinates.
pub fn transform_mesh(mesh: &SceneMesh) -> Result<TriangleMesh> {
    if mesh.vertices.is_empty() {
        return Err(Error::EmptyMesh(format!("'{}' has no vertices", mesh.name)));
    }
    if mesh.faces.is_empty() {
        return Err(Error::EmptyMesh(format!("'{}' has no faces", mesh.name)));
    }

    let vertex_count = mesh.vertices.len();
    if let Some((face, &[i0, i1, i2])) = mesh
        .faces
        .iter()
        .enumerate()
        .find(|(_, f)| f.iter().any(|&i| i as usize >= vertex_count))
    {
        return Err(Error::geometry(format!(
            "'{}' face {} references vertex ({}, {}, {}) but only {} vertices exist",
            mesh.name, face, i0, i1, i2, vertex_count
        )));
    }

    let mut out = TriangleMesh::with_capacity(vertex_count, mesh.faces.len());
    for (index, local) in mesh.vertices.iter().enumerate() {
        let world = transform_point(&mesh.transform, local);
        if !(world.x.is_finite() && world.y.is_finite() && world.z.is_finite()) {
            return Err(Error::geometry(format!(
                "'{}' vertex {} is not finite in world space",
                mesh.name, index
            )));
        }
        out.positions.push(world);
    }
    out.indices.extend_from_slice(&mesh.faces);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clash_lite_core::primitives::unit_cube;
    use nalgebra::{Rotation3, Vector3};

    #[test]
    fn test_translation_moves_every_vertex() {
        let source = unit_cube("A").translated(10.0, -2.0, 3.0);
        let mesh = transform_mesh(&source).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.indices, source.faces);
        for (local, world) in source.vertices.iter().zip(&mesh.positions) {
            assert_relative_eq!(world.x, local.x + 10.0);
            assert_relative_eq!(world.y, local.y - 2.0);
            assert_relative_eq!(world.z, local.z + 3.0);
        }
    }

    #[test]
    fn test_rotation_and_scale() {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let transform = rotation.to_homogeneous() * Matrix4::new_scaling(2.0);
        let p = transform_point(&transform, &Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shear_is_applied() {
        let mut transform = Matrix4::identity();
        transform[(0, 1)] = 1.0; // x += y
        let p = transform_point(&transform, &Point3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.y, 2.0);
    }

    #[test]
    fn test_bottom_row_is_ignored() {
        let mut transform = Matrix4::identity();
        transform[(3, 3)] = 4.0;
        transform[(3, 0)] = 1.0;
        let p = transform_point(&transform, &Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_source_mesh_is_untouched() {
        let source = unit_cube("A").translated(1.0, 0.0, 0.0);
        let before = source.clone();
        let _ = transform_mesh(&source).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn test_empty_meshes_are_rejected() {
        let no_vertices = SceneMesh::new("a", Vec::new(), vec![[0, 1, 2]]);
        let no_faces = SceneMesh::new("b", vec![Point3::origin()], Vec::new());

        assert!(matches!(transform_mesh(&no_vertices), Err(Error::EmptyMesh(_))));
        assert!(matches!(transform_mesh(&no_faces), Err(Error::EmptyMesh(_))));
    }

    #[test]
    fn test_out_of_range_face_is_rejected() {
        let mesh = SceneMesh::new(
            "bad",
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 3]],
        );
        let err = transform_mesh(&mesh).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry(_)));
        assert!(err.to_string().contains("face 0"));
    }

    #[test]
    fn test_non_finite_transform_is_rejected() {
        let mut transform = Matrix4::identity();
        transform[(0, 3)] = f64::NAN;
        let mesh = unit_cube("nan").with_transform(transform);
        assert!(matches!(transform_mesh(&mesh), Err(Error::InvalidGeometry(_))));
    }
}
