//! Analysis driver that runs the checks over a project and keeps the marker
//! store in step with the sources.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use globset::GlobSet;

use crate::analysis::Project;
use crate::error::{Error, Result};
use crate::fix::{Fixer, ResolutionEngine, Rewrite};

use super::checks::Check;
use super::markers::MarkerStore;
use super::package_info;
use super::reporter::MarkerCollector;
use super::types::{AnalysisResult, Marker};

/// Resources added, changed and removed since the last pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub removed: Vec<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A change set in which only `resources` changed.
    pub fn changed(resources: Vec<String>) -> Self {
        Self {
            changed: resources,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Runs checks over a [`Project`] and records their markers.
///
/// Each resource's markers are deleted before new ones are created, so
/// repeated passes never accumulate duplicates. Resources are analyzed one
/// at a time, and a pass can be cancelled between two resources through
/// [`Driver::cancellation`].
pub struct Driver {
    project: Project,
    store: Box<dyn MarkerStore>,
    checks: Vec<Check>,
    missing_package_info: bool,
    excluded: GlobSet,
    engine: ResolutionEngine,
    cancel: Arc<AtomicBool>,
}

impl Driver {
    /// Create a driver running every check.
    pub fn new(project: Project, store: Box<dyn MarkerStore>) -> Self {
        Self {
            project,
            store,
            checks: Check::ALL.to_vec(),
            missing_package_info: true,
            excluded: GlobSet::empty(),
            engine: ResolutionEngine::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Restrict the checks that run, keeping registry order.
    pub fn checks(mut self, checks: Vec<Check>) -> Self {
        self.checks = Check::ALL
            .iter()
            .copied()
            .filter(|c| checks.contains(c))
            .collect();
        self
    }

    /// Set whether package directories are checked for `package-info.java`.
    pub fn missing_package_info(mut self, enabled: bool) -> Self {
        self.missing_package_info = enabled;
        self
    }

    /// Resources matching `excluded` are never analyzed.
    pub fn excluded(mut self, excluded: GlobSet) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn resolution_engine(mut self, engine: ResolutionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn store(&self) -> &dyn MarkerStore {
        self.store.as_ref()
    }

    /// Flag that cancels the running pass before its next resource.
    pub fn cancellation(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// All markers currently recorded.
    pub fn markers(&self) -> Vec<Marker> {
        self.store.all_markers()
    }

    /// Discover, load and analyze every source in the project.
    pub fn analyze_full_project(&mut self) -> Result<AnalysisResult> {
        let mut result = AnalysisResult::new();
        let resources = self.project.discover(&self.excluded);
        let current: BTreeSet<&str> = resources.iter().map(String::as_str).collect();
        for gone in self
            .project
            .resources()
            .into_iter()
            .filter(|r| !current.contains(r.as_str()))
        {
            self.project.remove(&gone);
        }

        let failures = self.project.load(&resources);
        self.project.relink();
        self.record_failures(failures, &mut result);

        let directories = self.package_directories(resources.iter());
        let previous: BTreeSet<String> = self
            .store
            .all_markers()
            .into_iter()
            .map(|m| m.resource)
            .collect();
        for stale in previous
            .iter()
            .filter(|r| !current.contains(r.as_str()) && !directories.contains(*r))
        {
            if let Err(err) = self.store.delete_markers(stale) {
                result.failures.push((stale.clone(), err));
            }
        }

        let loaded: Vec<String> = resources
            .iter()
            .filter(|r| self.project.unit(r).is_some())
            .cloned()
            .collect();
        tracing::info!(resources = loaded.len(), "full analysis");
        self.analyze(&loaded, &directories, &mut result);
        self.store.flush()?;
        self.log_summary(&result);
        Ok(result)
    }

    /// Re-analyze only what `changes` touched.
    ///
    /// Types declared by the changed sources are re-indexed for the whole
    /// project, but only the changed resources and their package
    /// directories receive new markers.
    pub fn analyze_changed_resources(&mut self, changes: &ChangeSet) -> Result<AnalysisResult> {
        let mut result = AnalysisResult::new();
        for removed in &changes.removed {
            self.project.remove(removed);
            if let Err(err) = self.store.delete_markers(removed) {
                result.failures.push((removed.clone(), err));
            }
        }

        let loadable: Vec<String> = changes
            .added
            .iter()
            .chain(&changes.changed)
            .filter(|r| r.ends_with(".java") && !self.excluded.is_match(r.as_str()))
            .cloned()
            .collect();
        let failures = self.project.load(&loadable);
        self.project.relink();
        self.record_failures(failures, &mut result);

        let directories = self.package_directories(loadable.iter().chain(&changes.removed));
        let loaded: Vec<String> = loadable
            .into_iter()
            .filter(|r| self.project.unit(r).is_some())
            .collect();
        tracing::info!(resources = loaded.len(), "incremental analysis");
        self.analyze(&loaded, &directories, &mut result);
        self.store.flush()?;
        self.log_summary(&result);
        Ok(result)
    }

    /// Delete every marker.
    pub fn clean(&mut self) -> Result<()> {
        self.store.clear()?;
        self.store.flush()?;
        tracing::info!("markers cleared");
        Ok(())
    }

    /// Fixers able to resolve `marker`, in registration order.
    pub fn resolutions_for(&self, marker: &Marker) -> Result<Vec<&'static dyn Fixer>> {
        self.engine.resolutions_for(marker)
    }

    /// The rewrite `fixer` would make, without writing it.
    pub fn preview_fix(&self, marker: &Marker, fixer: &dyn Fixer) -> Result<Option<Rewrite>> {
        self.engine.preview(&self.project, marker, fixer)
    }

    /// Apply `fixer` and re-analyze the rewritten resource.
    pub fn apply_fix(&mut self, marker: &Marker, fixer: &dyn Fixer) -> Result<Option<Rewrite>> {
        let rewrite = self.engine.apply(&self.project, marker, fixer)?;
        if let Some(rewrite) = &rewrite {
            self.analyze_changed_resources(&ChangeSet::changed(vec![rewrite.resource.clone()]))?;
        }
        Ok(rewrite)
    }

    fn package_directories<'a>(
        &self,
        resources: impl Iterator<Item = &'a String>,
    ) -> BTreeSet<String> {
        if self.missing_package_info {
            package_info::package_directories(&self.project, resources)
        } else {
            BTreeSet::new()
        }
    }

    /// Markers of resources that failed to load are dropped along with the
    /// unit.
    fn record_failures(&mut self, failures: Vec<(String, Error)>, result: &mut AnalysisResult) {
        for (resource, err) in failures {
            if let Err(store_err) = self.store.delete_markers(&resource) {
                tracing::warn!(%resource, error = %store_err, "cannot delete markers");
            }
            result.failures.push((resource, err));
        }
    }

    fn analyze(
        &mut self,
        resources: &[String],
        directories: &BTreeSet<String>,
        result: &mut AnalysisResult,
    ) {
        for resource in resources {
            if self.cancel.swap(false, Ordering::SeqCst) {
                tracing::info!(%resource, "analysis cancelled");
                result.cancelled = true;
                return;
            }
            let Some(query) = self.project.query(resource) else {
                continue;
            };
            let mut collector = MarkerCollector::for_unit(resource, query.tree());
            for check in &self.checks {
                check.run(&query, &mut collector);
            }
            let markers = collector.into_markers();
            tracing::debug!(%resource, markers = markers.len(), "analyzed");
            match replace_markers(self.store.as_mut(), resource, markers.clone()) {
                Ok(()) => {
                    result.analyzed.push(resource.clone());
                    result.markers.extend(markers);
                }
                Err(err) => {
                    tracing::warn!(%resource, error = %err, "cannot record markers");
                    result.failures.push((resource.clone(), err));
                }
            }
        }

        for directory in directories {
            let markers = package_info::check(&self.project, directory);
            match replace_markers(self.store.as_mut(), directory, markers.clone()) {
                Ok(()) => result.markers.extend(markers),
                Err(err) => result.failures.push((directory.clone(), err)),
            }
        }
    }

    fn log_summary(&self, result: &AnalysisResult) {
        tracing::info!(
            analyzed = result.analyzed.len(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            failures = result.failures.len(),
            cancelled = result.cancelled,
            "analysis finished"
        );
    }
}

fn replace_markers(store: &mut dyn MarkerStore, resource: &str, markers: Vec<Marker>) -> Result<()> {
    store.delete_markers(resource)?;
    store.create_markers(markers)
}
