// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use assert_cmd::Command;
use clash_lite_core::primitives::unit_cube;
use clash_lite_core::{InMemoryScene, ObjectKind, SceneFile, SceneObjectRecord};
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_scene(dir: &TempDir, file: &SceneFile) -> PathBuf {
    let path = dir.path().join("scene.json");
    std::fs::write(&path, serde_json::to_string_pretty(file).unwrap()).unwrap();
    path
}

/// CubeA at the origin, CubeB overlapping it, CubeC far away, plus an
/// empty that is not a mesh.
fn three_cube_scene(dir: &TempDir) -> PathBuf {
    let scene = InMemoryScene::new()
        .with_mesh(unit_cube("CubeA"))
        .with_mesh(unit_cube("CubeB").translated(0.5, 0.0, 0.0))
        .with_mesh(unit_cube("CubeC").translated(10.0, 0.0, 0.0));
    let mut file = SceneFile::from(&scene);
    file.meshes.push(SceneObjectRecord {
        name: "Rig".into(),
        kind: ObjectKind::Empty,
        vertices: Vec::new(),
        faces: Vec::new(),
        transform: None,
    });
    write_scene(dir, &file)
}

fn clash_lite() -> Command {
    let mut cmd = Command::cargo_bin("clash-lite").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_check_reports_every_pair() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    clash_lite()
        .arg("check")
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("CubeA and CubeB intersect!"))
        .stdout(predicate::str::contains("CubeA and CubeC do NOT intersect!"))
        .stdout(predicate::str::contains("CubeB and CubeC do NOT intersect!"))
        .stdout(predicate::str::contains("Objects DO intersect!"))
        .stdout(predicate::str::contains("Rig").not());
}

#[test]
fn test_fail_on_intersection_exit_code() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    clash_lite()
        .args(["check", "--fail-on-intersection"])
        .arg(&scene)
        .assert()
        .code(2);

    clash_lite()
        .args(["check", "--fail-on-intersection", "-s", "CubeA", "-s", "CubeC"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("Objects do NOT intersect."));
}

#[test]
fn test_single_selection_is_rejected() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    clash_lite()
        .args(["check", "--select", "CubeA"])
        .arg(&scene)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "You must select multiple mesh objects to see if they intersect.",
        ));
}

#[test]
fn test_non_mesh_objects_are_filtered_from_selection() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    // Only one mesh remains after dropping the empty
    clash_lite()
        .args(["check", "--select", "CubeA", "--select", "Rig"])
        .arg(&scene)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unable to check for intersections"));
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    let output = clash_lite()
        .args(["check", "--json", "--sequential"])
        .arg(&scene)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["any_intersection"], true);
    assert_eq!(report["pairs"].as_array().unwrap().len(), 3);
    assert_eq!(report["pairs"][0]["mesh_a"], "CubeA");
    assert_eq!(report["pairs"][0]["mesh_b"], "CubeB");
    assert_eq!(report["config"]["parallel"], false);
}

#[test]
fn test_missing_mesh_fails_unless_skipped() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    clash_lite()
        .args(["check", "-s", "CubeA", "-s", "Ghost", "-s", "CubeB"])
        .arg(&scene)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Mesh 'Ghost' not found"));

    clash_lite()
        .args(["check", "--skip-invalid", "-s", "CubeA", "-s", "Ghost", "-s", "CubeB"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ghost skipped"))
        .stdout(predicate::str::contains("CubeA and CubeB intersect!"));
}

#[test]
fn test_bbox_fidelity_flag() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    clash_lite()
        .args(["check", "--fidelity", "bbox", "--json"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fidelity\": \"bbox\""));

    clash_lite()
        .args(["check", "--fidelity", "fuzzy"])
        .arg(&scene)
        .assert()
        .failure();
}

#[test]
fn test_tolerance_flag_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    for bad in ["--tolerance=-1", "--tolerance=NaN", "--tolerance=inf", "--tolerance=wide"] {
        clash_lite()
            .args(["check", bad])
            .arg(&scene)
            .assert()
            .failure()
            .stdout(predicate::str::is_empty());
    }

    clash_lite()
        .args(["check", "--tolerance=-1"])
        .arg(&scene)
        .assert()
        .stderr(predicate::str::contains("tolerance must be a finite, non-negative number"));

    clash_lite()
        .args(["check", "--tolerance=0.001", "--json"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tolerance\": 0.001"));
}

#[test]
fn test_faces_flag_lists_face_pairs() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    clash_lite()
        .args(["check", "--faces", "-s", "CubeA", "-s", "CubeB"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("CubeA / CubeB faces:"));
}

#[test]
fn test_list_command() {
    let dir = TempDir::new().unwrap();
    let scene = three_cube_scene(&dir);

    clash_lite()
        .arg("list")
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("CubeA\tmesh\t8 vertices\t12 faces"))
        .stdout(predicate::str::contains("Rig\tempty"));
}

#[test]
fn test_unreadable_scene() {
    let dir = TempDir::new().unwrap();

    clash_lite()
        .arg("check")
        .arg(dir.path().join("missing.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read scene file"));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    clash_lite()
        .arg("check")
        .arg(&bad)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse scene file"));
}
