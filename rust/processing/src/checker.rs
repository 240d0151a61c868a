// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intersection checker
//!
//! Drives a check from a list of identifiers to a [`Report`]:
//!
//! 1. Validate the selection (duplicates collapse, at least two meshes)
//! 2. Prepare every distinct mesh once (world transform + BVH)
//! 3. Test every unordered pair, skipping pairs whose world boxes are apart
//! 4. Aggregate into a report and emit messages

use crate::cache::{MeshCache, PreparedMesh};
use crate::config::{IntersectionConfig, MeshFailurePolicy};
use crate::error::{Error, Result};
use crate::pairs::{pair_count, unordered_pairs, Selection};
use crate::report::{CheckStats, ExcludedMesh, PairOutcome, Report};
use crate::sink::{ReportSink, Severity};
use clash_lite_core::SceneSource;
use clash_lite_geometry::OverlapOptions;
use rayon::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle of a check, observable through [`IntersectionChecker::phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    Idle,
    Validating,
    /// The last run returned an error
    Rejected,
    Processing,
    Completed,
}

/// Cooperative cancellation flag, checked before each pair is tested.
///
/// Clones share the same flag. A cancelled token stays cancelled until
/// [`CancelToken::reset`] is called.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Called after each tested pair with `(tested, total)`.
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Pairwise intersection checker over a scene.
pub struct IntersectionChecker {
    config: IntersectionConfig,
    phase: CheckPhase,
    cancel: CancelToken,
    progress: Option<Arc<ProgressFn>>,
}

impl fmt::Debug for IntersectionChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionChecker")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Default for IntersectionChecker {
    fn default() -> Self {
        Self::new(IntersectionConfig::default())
    }
}

impl IntersectionChecker {
    pub fn new(config: IntersectionConfig) -> Self {
        Self {
            config,
            phase: CheckPhase::Idle,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Observe pair progress. The callback may run on rayon workers, and
    /// pairs finish out of order when the check is parallel.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn config(&self) -> &IntersectionConfig {
        &self.config
    }

    pub fn phase(&self) -> CheckPhase {
        self.phase
    }

    /// Handle that cancels this checker's runs
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Check every unordered pair among `selection` without emitting
    /// messages.
    pub fn check<S: AsRef<str>>(
        &mut self,
        scene: &dyn SceneSource,
        selection: &[S],
    ) -> Result<Report> {
        self.run(scene, selection, &mut |_: Severity, _: &str| {})
    }

    /// Check every unordered pair among `selection` and report to `sink`.
    ///
    /// On success the sink receives one warning per excluded mesh, one line
    /// per tested pair and a closing summary. On failure it receives the
    /// error message only.
    pub fn run<S: AsRef<str>>(
        &mut self,
        scene: &dyn SceneSource,
        selection: &[S],
        sink: &mut dyn ReportSink,
    ) -> Result<Report> {
        match self.execute(scene, selection) {
            Ok(report) => {
                for excluded in &report.excluded {
                    sink.report(Severity::Warning, &excluded.message());
                }
                for pair in &report.pairs {
                    sink.report(Severity::Info, &pair.message());
                }
                if report.cancelled {
                    sink.report(
                        Severity::Warning,
                        &format!(
                            "Check cancelled after {} of {} pairs",
                            report.stats.pairs_tested, report.stats.pairs_total
                        ),
                    );
                }
                let severity = if report.any_intersection {
                    Severity::Warning
                } else {
                    Severity::Info
                };
                sink.report(severity, report.summary());
                Ok(report)
            }
            Err(err) => {
                sink.report(Severity::Error, &err.to_string());
                Err(err)
            }
        }
    }

    fn set_phase(&mut self, phase: CheckPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "Check phase");
        self.phase = phase;
    }

    fn execute<S: AsRef<str>>(
        &mut self,
        scene: &dyn SceneSource,
        identifiers: &[S],
    ) -> Result<Report> {
        let started = Instant::now();
        self.set_phase(CheckPhase::Validating);

        let selection = Selection::new(identifiers);
        for name in &selection.duplicates {
            tracing::warn!(mesh = %name, "Duplicate selection ignored");
        }
        if selection.len() < 2 {
            self.set_phase(CheckPhase::Rejected);
            return Err(Error::InsufficientSelection {
                found: selection.len(),
            });
        }

        self.set_phase(CheckPhase::Processing);
        tracing::info!(
            meshes = selection.len(),
            pairs = pair_count(selection.len()),
            fidelity = %self.config.fidelity,
            parallel = self.config.parallel,
            "Checking intersections"
        );

        let cancel = self.cancel.clone();
        let cancelled_early = cancel.is_cancelled();

        // Prepare every distinct mesh once
        let prepare_start = Instant::now();
        let mut cache = MeshCache::new();
        let failures = if cancelled_early {
            Vec::new()
        } else {
            cache.prepare_all(
                scene,
                &selection.names,
                self.config.leaf_size,
                self.config.parallel,
            )
        };

        let mut excluded = Vec::new();
        for err in failures {
            if self.config.mesh_failure == MeshFailurePolicy::FailFast {
                tracing::error!(error = %err, "Mesh preparation failed");
                self.set_phase(CheckPhase::Rejected);
                return Err(err);
            }
            tracing::warn!(error = %err, "Excluding mesh");
            excluded.push(ExcludedMesh {
                name: err.mesh().unwrap_or_default().to_string(),
                reason: err.to_string(),
            });
        }

        let meshes: Vec<Arc<PreparedMesh>> = selection
            .names
            .iter()
            .filter_map(|name| cache.get(name))
            .collect();
        let prepare_ms = prepare_start.elapsed().as_millis() as u64;

        // Test every unordered pair; results come back in pair order
        let test_start = Instant::now();
        let pairs: Vec<(usize, usize)> = unordered_pairs(meshes.len()).collect();
        let options = self.config.overlap_options();
        let collect_faces = self.config.collect_faces;
        let progress = self.progress.clone();
        let tested = AtomicUsize::new(0);
        let total = pairs.len();

        let evaluate = |&(i, j): &(usize, usize)| -> Option<(PairOutcome, bool)> {
            if cancel.is_cancelled() {
                return None;
            }
            let result = test_pair(&meshes[i], &meshes[j], &options, collect_faces);
            let done = tested.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(progress) = &progress {
                progress(done, total);
            }
            Some(result)
        };

        let results: Vec<Option<(PairOutcome, bool)>> = if self.config.parallel {
            pairs.par_iter().map(evaluate).collect()
        } else {
            pairs.iter().map(evaluate).collect()
        };

        let cancelled = cancelled_early || results.iter().any(Option::is_none);
        let mut pairs_culled = 0;
        let outcomes: Vec<PairOutcome> = results
            .into_iter()
            .flatten()
            .map(|(outcome, culled)| {
                pairs_culled += usize::from(culled);
                outcome
            })
            .collect();
        let test_ms = test_start.elapsed().as_millis() as u64;

        let any_intersection = outcomes.iter().any(|p| p.intersects);
        let stats = CheckStats {
            selected: selection.len(),
            prepared: meshes.len(),
            triangles: meshes.iter().map(|m| m.triangle_count()).sum(),
            // Nothing was prepared when cancelled up front
            pairs_total: if cancelled_early {
                pair_count(selection.len())
            } else {
                pair_count(meshes.len())
            },
            pairs_tested: outcomes.len(),
            pairs_culled,
            prepare_ms,
            test_ms,
            total_ms: started.elapsed().as_millis() as u64,
        };

        if cancelled {
            tracing::warn!(
                tested = stats.pairs_tested,
                total = stats.pairs_total,
                "Intersection check cancelled"
            );
        }
        tracing::info!(
            pairs = stats.pairs_tested,
            intersecting = outcomes.iter().filter(|p| p.intersects).count(),
            culled = stats.pairs_culled,
            excluded = excluded.len(),
            triangles = stats.triangles,
            prepare_ms = stats.prepare_ms,
            test_ms = stats.test_ms,
            "Intersection check complete"
        );

        self.set_phase(CheckPhase::Completed);

        Ok(Report {
            pairs: outcomes,
            any_intersection,
            excluded,
            cancelled,
            config: self.config.clone(),
            stats,
        })
    }
}

/// Test one pair; the flag is true when the world-box pre-check settled it.
fn test_pair(
    a: &PreparedMesh,
    b: &PreparedMesh,
    options: &OverlapOptions,
    collect_faces: bool,
) -> (PairOutcome, bool) {
    let mut outcome = PairOutcome::new(a.name(), b.name(), false);

    let culled = !a.bounds().inflated(options.tolerance).intersects(&b.bounds());
    if !culled {
        if collect_faces {
            let result = a.bvh().overlap(b.bvh(), options);
            outcome.intersects = result.intersects();
            outcome.faces = result.into_pairs();
        } else {
            outcome.intersects = a.bvh().intersects(b.bvh(), options);
        }
    }

    tracing::debug!(
        a = %a.name(),
        b = %b.name(),
        intersects = outcome.intersects,
        culled,
        "Tested pair"
    );
    (outcome, culled)
}

/// Check `selection` against `scene` with a fresh checker.
pub fn check_intersections<S: AsRef<str>>(
    scene: &dyn SceneSource,
    selection: &[S],
    config: IntersectionConfig,
) -> Result<Report> {
    IntersectionChecker::new(config).check(scene, selection)
}
