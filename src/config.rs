//! Project configuration read from `bootcheck.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::analysis::ProjectLayout;
use crate::detect::{Check, DEFAULT_MARKERS_PATH};
use crate::error::{Error, Result};

/// File names searched for, in order.
pub const CONFIG_FILES: &[&str] = &["bootcheck.yaml", ".bootcheck.yaml"];

/// Settings for one project. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Roots searched for `META-INF/spring.factories`, relative to each
    /// module directory. Empty means the Maven defaults.
    pub source_roots: Vec<String>,
    /// Roots holding generated sources.
    pub generated_roots: Vec<String>,
    /// Names of checks that never run, e.g. `unused-method-parameter`.
    pub disabled_checks: Vec<String>,
    /// Glob patterns of resources never analyzed (e.g. `**/legacy/**`).
    pub excluded_paths: Vec<String>,
    /// Marker store location, relative to the project directory.
    pub markers_path: Option<PathBuf>,
    /// Whether package directories are checked for `package-info.java`
    /// (default: true).
    pub missing_package_info: Option<bool>,
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Parse and validate a configuration file.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Configuration for `project_dir`: the explicit file when given,
    /// otherwise the first file found in the project directory and then in
    /// the user configuration directory, otherwise the defaults.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::parse_file(path);
        }
        match Self::discover(project_dir) {
            Some(path) => Self::parse_file(path),
            None => {
                tracing::debug!("no configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn discover(project_dir: &Path) -> Option<PathBuf> {
        find_in(project_dir).or_else(|| user_config_dir().and_then(|dir| find_in(&dir)))
    }

    pub fn validate(&self) -> Result<()> {
        for name in &self.disabled_checks {
            if Check::parse(name).is_none() {
                return Err(Error::Config(format!("unknown check {:?}", name)));
            }
        }
        self.excluded_globs().map(|_| ())
    }

    pub fn layout(&self, root: &Path) -> ProjectLayout {
        let mut layout = ProjectLayout::new(root);
        if !self.source_roots.is_empty() {
            layout = layout.with_source_roots(self.source_roots.clone());
        }
        if !self.generated_roots.is_empty() {
            layout = layout.with_generated_roots(self.generated_roots.clone());
        }
        layout
    }

    /// Checks left after removing the disabled ones, in registry order.
    pub fn enabled_checks(&self) -> Vec<Check> {
        Check::ALL
            .iter()
            .copied()
            .filter(|check| !self.disabled_checks.iter().any(|d| d == check.as_str()))
            .collect()
    }

    pub fn excluded_globs(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| {
                Error::Config(format!("invalid excluded_paths pattern {:?}: {}", pattern, e))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| Error::Config(format!("invalid excluded_paths: {}", e)))
    }

    pub fn markers_path(&self, root: &Path) -> PathBuf {
        let path = self
            .markers_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MARKERS_PATH));
        if path.is_absolute() {
            path
        } else {
            root.join(path)
        }
    }

    pub fn check_package_info(&self) -> bool {
        self.missing_package_info.unwrap_or(true)
    }
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn user_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "bootcheck").map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SourceLocation;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
source_roots:
  - src/main/java
  - src/main/resources
  - config
disabled_checks:
  - unused-method-parameter
excluded_paths:
  - "**/legacy/**"
markers_path: build/markers.json
missing_package_info: false
"#;
        let config = Config::from_yaml(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.source_roots.len(), 3);
        assert!(!config.enabled_checks().contains(&Check::UnusedMethodParameter));
        assert_eq!(config.enabled_checks().len(), Check::ALL.len() - 1);
        assert!(!config.check_package_info());
        assert_eq!(
            config.markers_path(Path::new("/project")),
            PathBuf::from("/project/build/markers.json")
        );
        assert!(config
            .excluded_globs()
            .unwrap()
            .is_match("src/main/java/com/legacy/Old.java"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.enabled_checks(), Check::ALL.to_vec());
        assert!(config.check_package_info());
        assert_eq!(
            config.markers_path(Path::new("/project")),
            Path::new("/project").join(DEFAULT_MARKERS_PATH)
        );
        let layout = config.layout(Path::new("/project"));
        assert_eq!(
            layout.classify("src/main/java/com/example/Example.java"),
            SourceLocation::Main
        );
    }

    #[test]
    fn test_generated_roots() {
        let config = Config::from_yaml("generated_roots: [gen/java]").unwrap();
        let layout = config.layout(Path::new("/project"));
        assert_eq!(
            layout.classify("gen/java/com/example/Example_.java"),
            SourceLocation::Generated
        );
    }

    #[test]
    fn test_validation_rejects_unknown_checks_and_bad_globs() {
        let unknown = Config::from_yaml("disabled_checks: [no-such-check]").unwrap();
        assert!(matches!(unknown.validate(), Err(Error::Config(msg)) if msg.contains("no-such-check")));

        let bad_glob = Config::from_yaml("excluded_paths: [\"src/[\"]").unwrap();
        assert!(matches!(bad_glob.validate(), Err(Error::Config(_))));

        assert!(matches!(
            Config::from_yaml("unknown_key: true"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_discovery_prefers_project_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".bootcheck.yaml"),
            "disabled_checks: [string-index-of]\n",
        )
        .unwrap();
        assert_eq!(
            find_in(temp.path()),
            Some(temp.path().join(".bootcheck.yaml"))
        );

        fs::write(temp.path().join("bootcheck.yaml"), "missing_package_info: false\n").unwrap();
        let config = Config::load(temp.path(), None).unwrap();
        assert!(!config.check_package_info());
        assert!(config.disabled_checks.is_empty());
    }

    #[test]
    fn test_invalid_file_names_the_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bootcheck.yaml");
        fs::write(&path, "disabled_checks: [bogus]\n").unwrap();
        assert!(Config::load(temp.path(), Some(&path)).is_err());
    }
}
