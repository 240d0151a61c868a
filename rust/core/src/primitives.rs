// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive mesh builders
//!
//! Closed, outward-facing primitives used by hosts, tests and benchmarks.

use crate::scene::SceneMesh;
use nalgebra::Point3;

/// Create an axis-aligned box mesh from min/max corners.
/// Returns a mesh with 12 triangles (2 per face, 6 faces).
pub fn cuboid(name: impl Into<String>, min: Point3<f64>, max: Point3<f64>) -> SceneMesh {
    let vertices = vec![
        Point3::new(min.x, min.y, min.z), // 0: front-bottom-left
        Point3::new(max.x, min.y, min.z), // 1: front-bottom-right
        Point3::new(max.x, max.y, min.z), // 2: front-top-right
        Point3::new(min.x, max.y, min.z), // 3: front-top-left
        Point3::new(min.x, min.y, max.z), // 4: back-bottom-left
        Point3::new(max.x, min.y, max.z), // 5: back-bottom-right
        Point3::new(max.x, max.y, max.z), // 6: back-top-right
        Point3::new(min.x, max.y, max.z), // 7: back-top-left
    ];

    // Counter-clockwise winding when viewed from outside
    let faces = vec![
        [0, 2, 1],
        [0, 3, 2], // -Z
        [4, 5, 6],
        [4, 6, 7], // +Z
        [0, 4, 7],
        [0, 7, 3], // -X
        [1, 2, 6],
        [1, 6, 5], // +X
        [0, 1, 5],
        [0, 5, 4], // -Y
        [3, 7, 6],
        [3, 6, 2], // +Y
    ];

    SceneMesh::new(name, vertices, faces)
}

/// Unit cube centred on the local origin (extent -0.5..0.5 on every axis)
pub fn unit_cube(name: impl Into<String>) -> SceneMesh {
    cuboid(
        name,
        Point3::new(-0.5, -0.5, -0.5),
        Point3::new(0.5, 0.5, 0.5),
    )
}

/// Flat square grid in the XY plane split into `2 * divisions^2` triangles.
///
/// Useful for producing meshes with many small triangles.
pub fn grid(name: impl Into<String>, size: f64, divisions: u32) -> SceneMesh {
    let divisions = divisions.max(1);
    let step = size / divisions as f64;
    let row = divisions + 1;

    let mut vertices = Vec::with_capacity((row * row) as usize);
    for j in 0..row {
        for i in 0..row {
            vertices.push(Point3::new(i as f64 * step, j as f64 * step, 0.0));
        }
    }

    let mut faces = Vec::with_capacity((divisions * divisions * 2) as usize);
    for j in 0..divisions {
        for i in 0..divisions {
            let a = j * row + i;
            let b = a + 1;
            let c = a + row + 1;
            let d = a + row;
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }

    SceneMesh::new(name, vertices, faces)
}

/// UV sphere centred on the local origin
pub fn uv_sphere(name: impl Into<String>, radius: f64, segments: u32, rings: u32) -> SceneMesh {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut vertices = Vec::with_capacity((segments * (rings - 1) + 2) as usize);
    vertices.push(Point3::new(0.0, 0.0, radius));
    for r in 1..rings {
        let phi = std::f64::consts::PI * r as f64 / rings as f64;
        for s in 0..segments {
            let theta = 2.0 * std::f64::consts::PI * s as f64 / segments as f64;
            vertices.push(Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            ));
        }
    }
    let south = vertices.len() as u32;
    vertices.push(Point3::new(0.0, 0.0, -radius));

    let ring_start = |r: u32| 1 + (r - 1) * segments;
    let mut faces = Vec::new();

    // North cap
    for s in 0..segments {
        faces.push([0, ring_start(1) + s, ring_start(1) + (s + 1) % segments]);
    }
    // Bands
    for r in 1..rings - 1 {
        for s in 0..segments {
            let a = ring_start(r) + s;
            let b = ring_start(r) + (s + 1) % segments;
            let c = ring_start(r + 1) + (s + 1) % segments;
            let d = ring_start(r + 1) + s;
            faces.push([a, d, c]);
            faces.push([a, c, b]);
        }
    }
    // South cap
    for s in 0..segments {
        let last = ring_start(rings - 1);
        faces.push([south, last + (s + 1) % segments, last + s]);
    }

    SceneMesh::new(name, vertices, faces)
}
