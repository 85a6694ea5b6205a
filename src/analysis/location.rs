//! Classification of source files by the source root that contains them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const MAIN_ROOT: &str = "src/main/java";
pub const TEST_ROOTS: &[&str] = &["src/test/java", "src/it/java"];

/// Where a compilation unit lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLocation {
    Main,
    Test,
    Generated,
    Unknown,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceLocation::Main => "main",
            SourceLocation::Test => "test",
            SourceLocation::Generated => "generated",
            SourceLocation::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Directory layout of a project: where sources, generated sources and
/// resources live, relative to each module directory.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    /// Roots searched for `META-INF/spring.factories`, in order.
    source_roots: Vec<String>,
    generated_roots: Vec<String>,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source_roots: vec![MAIN_ROOT.to_string(), "src/main/resources".to_string()],
            generated_roots: vec![
                "target/generated-sources/annotations".to_string(),
                "target/generated-test-sources/test-annotations".to_string(),
                "build/generated/sources/annotationProcessor/java/main".to_string(),
            ],
        }
    }

    pub fn with_source_roots(mut self, roots: Vec<String>) -> Self {
        self.source_roots = roots;
        self
    }

    pub fn with_generated_roots(mut self, roots: Vec<String>) -> Self {
        self.generated_roots = roots;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_roots(&self) -> &[String] {
        &self.source_roots
    }

    /// Classify a project-relative resource path (`/`-separated).
    ///
    /// The nearest enclosing directory that is a known root decides.
    pub fn classify(&self, resource: &str) -> SourceLocation {
        self.nearest_root(resource)
            .map(|(_, location)| location)
            .unwrap_or(SourceLocation::Unknown)
    }

    /// Module directory of a resource: the prefix before its source root,
    /// with a trailing `/`, or empty for single-module projects.
    pub fn module_of<'r>(&self, resource: &'r str) -> &'r str {
        match self.nearest_root(resource) {
            Some((root_dir, _)) => {
                let module_len = root_dir.len() - self.matched_root_len(root_dir);
                &resource[..module_len]
            }
            None => "",
        }
    }

    /// Candidate manifest files for the module containing `resource`.
    pub fn manifest_candidates(&self, resource: &str) -> Vec<PathBuf> {
        let module = self.module_of(resource);
        self.source_roots
            .iter()
            .map(|root| {
                self.root
                    .join(module)
                    .join(root)
                    .join("META-INF")
                    .join("spring.factories")
            })
            .collect()
    }

    fn nearest_root<'r>(&self, resource: &'r str) -> Option<(&'r str, SourceLocation)> {
        let mut dir = resource;
        while let Some((parent, _)) = dir.rsplit_once('/') {
            dir = parent;
            if is_root(dir, MAIN_ROOT) {
                return Some((dir, SourceLocation::Main));
            }
            if TEST_ROOTS.iter().any(|root| is_root(dir, root)) {
                return Some((dir, SourceLocation::Test));
            }
            if self.generated_roots.iter().any(|root| is_root(dir, root)) {
                return Some((dir, SourceLocation::Generated));
            }
        }
        None
    }

    fn matched_root_len(&self, dir: &str) -> usize {
        std::iter::once(MAIN_ROOT)
            .chain(TEST_ROOTS.iter().copied())
            .chain(self.generated_roots.iter().map(String::as_str))
            .filter(|root| is_root(dir, root))
            .map(str::len)
            .max()
            .unwrap_or(0)
    }
}

fn is_root(dir: &str, root: &str) -> bool {
    let root = root.trim_matches('/');
    dir == root
        || dir
            .strip_suffix(root)
            .map_or(false, |prefix| prefix.ends_with('/'))
}
