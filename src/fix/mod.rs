//! Automatic fixes for reported problems.
//!
//! A [`Fixer`] never touches the tree that checks visited. The
//! [`ResolutionEngine`] re-reads the marked file, binds a private copy of it,
//! asks the fixer for a complete set of edits, and writes the result only
//! when every edit applied cleanly.

mod constructor_injection;
mod diff;
mod lambda_parentheses;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::analysis::{Project, SemanticQuery};
use crate::detect::{Marker, Problem};
use crate::error::{Error, Result};
use crate::syntax::{print, Edit, NodeId};

pub use constructor_injection::ConstructorInjection;
pub use diff::{change_counts, unified_diff};
pub use lambda_parentheses::LambdaParentheses;

/// A rewrite that resolves one kind of problem.
pub trait Fixer: Sync {
    /// Stable identifier, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Short description shown to users.
    fn label(&self) -> &'static str;

    /// The problem this fixer resolves.
    fn problem(&self) -> Problem;

    /// Edits resolving the problem marked at `marked`, or `None` when the
    /// fix does not apply to this tree.
    fn rewrite(&self, query: &SemanticQuery<'_>, marked: NodeId) -> Option<Vec<Edit>>;
}

static CONSTRUCTOR_INJECTION: ConstructorInjection = ConstructorInjection;
static LAMBDA_PARENTHESES: LambdaParentheses = LambdaParentheses;

/// Fixers by the problem they resolve, in registration order.
#[derive(Clone)]
pub struct FixerRegistry {
    fixers: HashMap<Problem, Vec<&'static dyn Fixer>>,
}

impl FixerRegistry {
    pub fn empty() -> Self {
        Self {
            fixers: HashMap::new(),
        }
    }

    /// The built-in fixers.
    pub fn standard() -> Self {
        Self::empty()
            .register(&CONSTRUCTOR_INJECTION)
            .register(&LAMBDA_PARENTHESES)
    }

    pub fn register(mut self, fixer: &'static dyn Fixer) -> Self {
        self.fixers.entry(fixer.problem()).or_default().push(fixer);
        self
    }

    pub fn fixers_for(&self, problem: Problem) -> &[&'static dyn Fixer] {
        self.fixers.get(&problem).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Problems that have at least one fixer.
    pub fn fixable(&self) -> Vec<Problem> {
        let mut problems: Vec<Problem> = self.fixers.keys().copied().collect();
        problems.sort();
        problems
    }
}

impl Default for FixerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// A fixed version of one resource.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub resource: String,
    pub path: PathBuf,
    pub original: String,
    pub fixed: String,
}

impl Rewrite {
    pub fn diff(&self) -> String {
        unified_diff(&self.resource, &self.original, &self.fixed)
    }
}

/// Looks up and runs fixers for markers.
pub struct ResolutionEngine {
    registry: FixerRegistry,
}

impl ResolutionEngine {
    pub fn new(registry: FixerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FixerRegistry {
        &self.registry
    }

    /// Fixers able to resolve `marker`, empty when none is registered.
    ///
    /// A marker whose problem id is not in the catalogue is an error: it
    /// did not come from this version of the checks.
    pub fn resolutions_for(&self, marker: &Marker) -> Result<Vec<&'static dyn Fixer>> {
        let problem = marker.problem()?;
        Ok(self.registry.fixers_for(problem).to_vec())
    }

    /// Compute the rewrite `fixer` makes for `marker` without writing it.
    ///
    /// Returns `Ok(None)` when the fixer does not apply.
    pub fn preview(
        &self,
        project: &Project,
        marker: &Marker,
        fixer: &dyn Fixer,
    ) -> Result<Option<Rewrite>> {
        let problem = marker.problem()?;
        if fixer.problem() != problem {
            return Err(Error::FixerMismatch {
                fixer: fixer.name(),
                problem,
            });
        }
        let (Some(start), Some(end)) = (marker.char_start, marker.char_end) else {
            tracing::debug!(resource = %marker.resource, "marker has no range to fix");
            return Ok(None);
        };

        let path = project.path_for(&marker.resource);
        let original = fs::read_to_string(&path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        if end > original.len() || start > end {
            return Err(Error::StaleMarker { path });
        }

        let unit = project.detached(&marker.resource, &original)?;
        let query = SemanticQuery::new(&unit, project);
        let marked = unit
            .tree()
            .covering_node(start, end)
            .ok_or_else(|| Error::StaleMarker { path: path.clone() })?;

        let Some(edits) = fixer.rewrite(&query, marked) else {
            tracing::debug!(fixer = fixer.name(), resource = %marker.resource, "fix not applicable");
            return Ok(None);
        };
        let mut tree = unit.tree().clone();
        tree.apply(&edits)?;
        let fixed = print(&tree);
        if fixed == original {
            return Ok(None);
        }
        Ok(Some(Rewrite {
            resource: marker.resource.clone(),
            path,
            original,
            fixed,
        }))
    }

    /// Apply `fixer` to the file `marker` belongs to.
    ///
    /// The file is replaced in one step; when any part of the fix fails the
    /// file is left exactly as it was.
    pub fn apply(
        &self,
        project: &Project,
        marker: &Marker,
        fixer: &dyn Fixer,
    ) -> Result<Option<Rewrite>> {
        let Some(rewrite) = self.preview(project, marker, fixer)? else {
            return Ok(None);
        };
        let staging = rewrite.path.with_extension("java.bootcheck-fix");
        fs::write(&staging, &rewrite.fixed).map_err(|source| Error::Write {
            path: staging.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&staging, &rewrite.path) {
            let _ = fs::remove_file(&staging);
            return Err(Error::Write {
                path: rewrite.path.clone(),
                source,
            });
        }
        let (inserted, deleted) = change_counts(&rewrite.original, &rewrite.fixed);
        tracing::info!(
            fixer = fixer.name(),
            resource = %rewrite.resource,
            inserted,
            deleted,
            "applied fix"
        );
        Ok(Some(rewrite))
    }
}

impl Default for ResolutionEngine {
    fn default() -> Self {
        Self::new(FixerRegistry::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ProjectLayout;
    use crate::detect::{Check, MarkerCollector};
    use tempfile::TempDir;

    const RESOURCE: &str = "src/main/java/com/example/Example.java";

    fn write_project(source: &str) -> (TempDir, Project) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(RESOURCE);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, source).unwrap();
        let mut project = Project::new(ProjectLayout::new(temp.path()));
        assert!(project.load(&[RESOURCE.to_string()]).is_empty());
        project.relink();
        (temp, project)
    }

    fn markers(project: &Project, check: Check) -> Vec<Marker> {
        let query = project.query(RESOURCE).unwrap();
        let mut collector = MarkerCollector::for_unit(RESOURCE, query.tree());
        check.run(&query, &mut collector);
        collector.into_markers()
    }

    #[test]
    fn test_standard_registry_covers_both_fixers() {
        let registry = FixerRegistry::standard();
        assert_eq!(
            registry.fixable(),
            vec![
                Problem::ConfigurationClassConstructorInjection,
                Problem::MissingParenthesesAroundLambdaParameter,
            ]
        );
        assert!(registry.fixers_for(Problem::UnusedMethodParameter).is_empty());
    }

    #[test]
    fn test_resolutions_follow_the_problem_id() {
        let engine = ResolutionEngine::default();
        let source = "package com.example;\nclass Example { java.util.function.Function<String, String> f = s -> s; }\n";
        let (_temp, project) = write_project(source);
        let marker = markers(&project, Check::LambdaParameterParentheses).remove(0);

        let fixers = engine.resolutions_for(&marker).unwrap();
        assert_eq!(fixers.len(), 1);
        assert_eq!(fixers[0].label(), "Add parentheses");

        let mut unknown = marker.clone();
        unknown.problem_id = "99".to_string();
        assert!(matches!(
            engine.resolutions_for(&unknown),
            Err(Error::UnknownProblem(_))
        ));

        let mut unfixable = marker;
        unfixable.problem_id = Problem::UnusedMethodParameter.id().to_string();
        assert!(engine.resolutions_for(&unfixable).unwrap().is_empty());
    }

    #[test]
    fn test_applying_a_fix_rewrites_the_file() {
        let source = "package com.example;\nclass Example { java.util.function.Function<String, String> f = s -> s; }\n";
        let (temp, project) = write_project(source);
        let marker = markers(&project, Check::LambdaParameterParentheses).remove(0);

        let engine = ResolutionEngine::default();
        let rewrite = engine
            .apply(&project, &marker, &LAMBDA_PARENTHESES)
            .unwrap()
            .unwrap();
        let written = fs::read_to_string(temp.path().join(RESOURCE)).unwrap();
        assert_eq!(written, rewrite.fixed);
        assert!(written.contains("f = (s) -> s;"));
        assert!(rewrite.diff().contains("+class Example"));
    }

    #[test]
    fn test_mismatched_fixer_is_rejected_and_file_untouched() {
        let source = "package com.example;\nclass Example { java.util.function.Function<String, String> f = s -> s; }\n";
        let (temp, project) = write_project(source);
        let marker = markers(&project, Check::LambdaParameterParentheses).remove(0);

        let engine = ResolutionEngine::default();
        let result = engine.apply(&project, &marker, &CONSTRUCTOR_INJECTION);
        assert!(matches!(result, Err(Error::FixerMismatch { .. })));
        assert_eq!(fs::read_to_string(temp.path().join(RESOURCE)).unwrap(), source);
    }

    #[test]
    fn test_stale_markers_are_reported() {
        let source = "package com.example;\nclass Example { java.util.function.Function<String, String> f = s -> s; }\n";
        let (temp, project) = write_project(source);
        let mut marker = markers(&project, Check::LambdaParameterParentheses).remove(0);
        marker.char_start = Some(10_000);
        marker.char_end = Some(10_001);

        let engine = ResolutionEngine::default();
        let result = engine.preview(&project, &marker, &LAMBDA_PARENTHESES);
        assert!(matches!(result, Err(Error::StaleMarker { .. })));
        assert_eq!(fs::read_to_string(temp.path().join(RESOURCE)).unwrap(), source);
    }
}
