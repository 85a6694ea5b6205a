//! The analyzed project: compilation units plus the type index they share.
//!
//! A [`Project`] owns every parsed unit keyed by its project-relative
//! resource path. Loading reads and parses files in parallel; linking then
//! rebuilds the type index and the bindings of every unit, so that changes
//! in one file are reflected in the units that reference its types.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::parser;

use super::binder::bind;
use super::declare::{declare_types, declared_names};
use super::index::TypeIndex;
use super::location::ProjectLayout;
use super::query::SemanticQuery;
use super::unit::CompilationUnit;

/// Directories never scanned for sources.
const SKIPPED_DIRS: &[&str] = &["node_modules", "bin", "out"];

pub struct Project {
    layout: ProjectLayout,
    units: BTreeMap<String, CompilationUnit>,
    index: TypeIndex,
}

impl Project {
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            units: BTreeMap::new(),
            index: TypeIndex::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn index(&self) -> &TypeIndex {
        &self.index
    }

    pub fn units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.values()
    }

    pub fn unit(&self, resource: &str) -> Option<&CompilationUnit> {
        self.units.get(resource)
    }

    pub fn resources(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }

    pub fn query(&self, resource: &str) -> Option<SemanticQuery<'_>> {
        self.unit(resource).map(|unit| SemanticQuery::new(unit, self))
    }

    /// Absolute path of a resource.
    pub fn path_for(&self, resource: &str) -> PathBuf {
        self.root().join(resource)
    }

    /// Project-relative, `/`-separated resource path of a file.
    pub fn resource_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(self.root()).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Java sources under the project root, minus excluded paths.
    pub fn discover(&self, excluded: &GlobSet) -> Vec<String> {
        let mut resources = Vec::new();
        let walker = WalkDir::new(self.root())
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("java")
            {
                continue;
            }
            let resource = self.resource_for(path);
            if excluded.is_match(&resource) {
                tracing::debug!(%resource, "excluded");
                continue;
            }
            resources.push(resource);
        }
        resources.sort();
        resources
    }

    /// Read and parse `resources` in parallel, replacing any previous units.
    ///
    /// Returns the resources that could not be loaded. Call [`Self::relink`]
    /// afterwards.
    pub fn load(&mut self, resources: &[String]) -> Vec<(String, Error)> {
        let root = self.root().to_path_buf();
        let results: Vec<(String, Result<CompilationUnit>)> = resources
            .par_iter()
            .map(|resource| {
                let path = root.join(resource);
                let unit = fs::read_to_string(&path)
                    .map_err(|source| Error::Read {
                        path: path.clone(),
                        source,
                    })
                    .and_then(|text| parse_unit(path, resource, &text));
                (resource.clone(), unit)
            })
            .collect();

        let mut failures = Vec::new();
        for (resource, result) in results {
            match result {
                Ok(unit) => {
                    if unit.has_errors() {
                        tracing::debug!(%resource, "parsed with syntax errors");
                    }
                    self.units.insert(resource, unit);
                }
                Err(err) => {
                    tracing::warn!(%resource, error = %err, "cannot load source");
                    self.units.remove(&resource);
                    failures.push((resource, err));
                }
            }
        }
        failures
    }

    /// Add or replace a unit from source text held in memory.
    pub fn insert_source(&mut self, resource: &str, source: &str) -> Result<()> {
        let unit = parse_unit(self.path_for(resource), resource, source)?;
        self.units.insert(resource.to_string(), unit);
        Ok(())
    }

    pub fn remove(&mut self, resource: &str) -> bool {
        self.units.remove(resource).is_some()
    }

    /// Rebuild the type index and all bindings.
    pub fn relink(&mut self) {
        let mut index = TypeIndex::new();
        let names: Vec<_> = self
            .units
            .values()
            .map(|unit| declared_names(unit.tree(), unit.header()))
            .collect();
        for name in names.iter().flatten() {
            index.declare(&name.qualified_name, name.kind);
        }

        let declarations: Vec<_> = self
            .units
            .values()
            .zip(&names)
            .map(|(unit, names)| declare_types(unit.tree(), unit.header(), names, &index))
            .collect();
        for info in declarations.iter().flat_map(|d| d.types.iter()) {
            index.insert(info.clone());
        }

        for (unit, declarations) in self.units.values_mut().zip(declarations) {
            unit.bindings = bind(unit.tree(), unit.header(), &declarations, &index);
            unit.declarations = declarations;
        }
        tracing::debug!(units = self.units.len(), types = index.len(), "project linked");
        self.index = index;
    }

    /// Parse and bind `source` as a private copy of `resource`, against the
    /// current index. The project itself is left untouched.
    pub fn detached(&self, resource: &str, source: &str) -> Result<CompilationUnit> {
        let mut unit = parse_unit(self.path_for(resource), resource, source)?;
        let names = declared_names(unit.tree(), unit.header());
        let declarations = declare_types(unit.tree(), unit.header(), &names, &self.index);
        unit.bindings = bind(unit.tree(), unit.header(), &declarations, &self.index);
        unit.declarations = declarations;
        Ok(unit)
    }
}

fn parse_unit(path: PathBuf, resource: &str, text: &str) -> Result<CompilationUnit> {
    match parser::parse(text) {
        Ok(parsed) => Ok(CompilationUnit::new(path, resource.to_string(), parsed)),
        Err(err) => {
            tracing::debug!(%resource, error = %err, "parser failure");
            Err(Error::Parse { path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::GlobSetBuilder;
    use tempfile::TempDir;

    fn write(root: &Path, resource: &str, text: &str) {
        let path = root.join(resource);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_discovers_and_links_sources() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "src/main/java/com/example/Greeter.java",
            "package com.example;\npublic interface Greeter { String greet(String name); }",
        );
        write(
            temp.path(),
            "src/main/java/com/example/Hello.java",
            "package com.example;\nclass Hello implements Greeter { public String greet(String name) { return name; } }",
        );
        write(temp.path(), ".git/Ignored.java", "class Ignored {}");
        write(temp.path(), "README.md", "# readme");

        let mut project = Project::new(ProjectLayout::new(temp.path()));
        let resources = project.discover(&GlobSet::empty());
        assert_eq!(
            resources,
            vec![
                "src/main/java/com/example/Greeter.java",
                "src/main/java/com/example/Hello.java"
            ]
        );

        let failures = project.load(&resources);
        assert!(failures.is_empty());
        project.relink();

        let hello = project.index().get("com.example.Hello").unwrap();
        assert_eq!(hello.interfaces, vec!["com.example.Greeter"]);
        let query = project.query("src/main/java/com/example/Hello.java").unwrap();
        assert!(query.overrides(&hello.methods[0], hello));
    }

    #[test]
    fn test_excluded_paths_are_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/main/java/A.java", "class A {}");
        write(temp.path(), "generated/B.java", "class B {}");

        let mut builder = GlobSetBuilder::new();
        builder.add(globset::Glob::new("generated/**").unwrap());
        let excluded = builder.build().unwrap();

        let project = Project::new(ProjectLayout::new(temp.path()));
        assert_eq!(project.discover(&excluded), vec!["src/main/java/A.java"]);
    }

    #[test]
    fn test_missing_files_are_reported() {
        let temp = TempDir::new().unwrap();
        let mut project = Project::new(ProjectLayout::new(temp.path()));
        let failures = project.load(&["src/main/java/Missing.java".to_string()]);
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0].1, Error::Read { .. }));
    }

    #[test]
    fn test_detached_units_do_not_change_the_project() {
        let mut project = Project::new(ProjectLayout::new("/nonexistent"));
        project.insert_source("src/main/java/A.java", "class A {}").unwrap();
        project.relink();

        let copy = project
            .detached("src/main/java/A.java", "class A { void m() {} }")
            .unwrap();
        assert_eq!(copy.types()[0].methods.len(), 1);
        assert!(project.index().get("A").unwrap().methods.is_empty());
    }
}
