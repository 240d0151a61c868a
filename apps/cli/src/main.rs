// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! clash-lite - report which meshes in a scene intersect.
//!
//! # Commands
//!
//! - `check <scene.json>` - test every pair among the selected meshes
//! - `list <scene.json>` - show the objects in a scene file
//!
//! Configuration defaults come from `CLASH_*` environment variables and are
//! overridden by flags. Logs go to stderr and are filtered by `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clash_lite_core::{ObjectKind, SceneFile};
use clash_lite_processing::{
    is_valid_tolerance, IntersectionChecker, IntersectionConfig, MeshFailurePolicy, OverlapFidelity,
    ReportSink, Severity,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status when `--fail-on-intersection` is set and a pair intersects
const EXIT_INTERSECTING: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pairwise mesh intersection checks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check selected meshes for pairwise intersections
    Check(CheckArgs),
    /// List the objects in a scene file
    List {
        /// Scene file (JSON)
        scene: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct CheckArgs {
    /// Scene file (JSON)
    scene: PathBuf,
    /// Mesh to include (repeatable). Defaults to every mesh object.
    #[arg(short, long = "select", value_name = "NAME")]
    select: Vec<String>,
    /// Overlap fidelity: exact or bbox
    #[arg(long)]
    fidelity: Option<OverlapFidelity>,
    /// Exclude missing or degenerate meshes instead of failing
    #[arg(long)]
    skip_invalid: bool,
    /// Run on the current thread only
    #[arg(long)]
    sequential: bool,
    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,
    /// Maximum triangles per BVH leaf
    #[arg(long)]
    leaf_size: Option<usize>,
    /// Gap still treated as contact, in scene units
    #[arg(long, value_parser = parse_tolerance)]
    tolerance: Option<f64>,
    /// Report overlapping face pairs
    #[arg(long)]
    faces: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Exit with status 2 when any pair intersects
    #[arg(long)]
    fail_on_intersection: bool,
}

/// Prints report messages; errors go to stderr.
struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn report(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Info | Severity::Warning => println!("{}", message),
            Severity::Error => eprintln!("error: {}", message),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Check(args) => check(args),
        Command::List { scene } => list(&scene),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_scene(path: &Path) -> Result<SceneFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scene file {}", path.display()))
}

fn parse_tolerance(value: &str) -> std::result::Result<f64, String> {
    let tolerance: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if is_valid_tolerance(tolerance) {
        Ok(tolerance)
    } else {
        Err("tolerance must be a finite, non-negative number".to_string())
    }
}

/// Requested names, or every mesh object when none were given. Named
/// objects of another kind are dropped; unknown names are kept so the
/// checker reports them.
fn resolve_selection(file: &SceneFile, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return file.mesh_names().into_iter().map(String::from).collect();
    }

    requested
        .iter()
        .filter(|name| match file.find(name) {
            Some(record) if record.kind != ObjectKind::Mesh => {
                tracing::warn!(
                    object = %name,
                    kind = ?record.kind,
                    "Not a mesh object, ignored"
                );
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}

fn build_config(args: &CheckArgs) -> IntersectionConfig {
    let mut config = IntersectionConfig::from_env();
    if let Some(fidelity) = args.fidelity {
        config = config.with_fidelity(fidelity);
    }
    if args.skip_invalid {
        config = config.with_mesh_failure(MeshFailurePolicy::Skip);
    }
    if args.sequential {
        config = config.with_parallel(false);
    }
    if let Some(leaf_size) = args.leaf_size {
        config = config.with_leaf_size(leaf_size);
    }
    if let Some(tolerance) = args.tolerance {
        config = config.with_tolerance(tolerance);
    }
    if args.faces {
        config = config.with_collect_faces(true);
    }
    config
}

fn check(args: CheckArgs) -> Result<ExitCode> {
    let config = build_config(&args);

    if config.parallel {
        let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to initialize rayon thread pool")?;
    }

    let file = load_scene(&args.scene)?;
    let selection = resolve_selection(&file, &args.select);
    let scene = file.to_scene();

    tracing::info!(
        scene = %args.scene.display(),
        objects = file.meshes.len(),
        selected = selection.len(),
        "Loaded scene"
    );

    let mut checker = IntersectionChecker::new(config);

    let report = if args.json {
        let report = checker.check(&scene, &selection)?;
        println!("{}", report.to_json()?);
        report
    } else {
        match checker.run(&scene, &selection, &mut ConsoleSink) {
            Ok(report) => {
                if args.faces {
                    for pair in report.intersecting() {
                        let faces: Vec<String> =
                            pair.faces.iter().map(|(a, b)| format!("{}:{}", a, b)).collect();
                        println!(
                            "  {} / {} faces: {}",
                            pair.mesh_a,
                            pair.mesh_b,
                            faces.join(" ")
                        );
                    }
                }
                report
            }
            // Already printed by the sink
            Err(_) => return Ok(ExitCode::FAILURE),
        }
    };

    if args.fail_on_intersection && report.any_intersection {
        return Ok(ExitCode::from(EXIT_INTERSECTING));
    }
    Ok(ExitCode::SUCCESS)
}

fn list(path: &Path) -> Result<ExitCode> {
    let file = load_scene(path)?;
    for object in &file.meshes {
        let kind = match object.kind {
            ObjectKind::Mesh => "mesh",
            ObjectKind::Curve => "curve",
            ObjectKind::Empty => "empty",
            ObjectKind::Light => "light",
            ObjectKind::Camera => "camera",
        };
        println!(
            "{}\t{}\t{} vertices\t{} faces",
            object.name,
            kind,
            object.vertices.len(),
            object.faces.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}
