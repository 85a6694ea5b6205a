//! Package directories in main code without a `package-info.java`.

use std::collections::BTreeSet;

use crate::analysis::{Project, SourceLocation};

use super::checks::has_modifier;
use super::reporter::{MarkerCollector, ProblemReporter};
use super::types::{Marker, Problem};

pub const PACKAGE_INFO: &str = "package-info.java";

/// Directory part of a resource path.
pub fn directory_of(resource: &str) -> Option<&str> {
    resource.rsplit_once('/').map(|(dir, _)| dir)
}

/// Main-code package directories containing any of `resources`.
pub fn package_directories<'a>(
    project: &Project,
    resources: impl IntoIterator<Item = &'a String>,
) -> BTreeSet<String> {
    resources
        .into_iter()
        .filter(|r| project.layout().classify(r) == SourceLocation::Main)
        .filter_map(|r| directory_of(r))
        .map(str::to_string)
        .collect()
}

/// Markers for `directory`: one warning when it holds a public or protected
/// top-level type but no `package-info.java`.
pub fn check(project: &Project, directory: &str) -> Vec<Marker> {
    let mut collector = MarkerCollector::for_resource(directory);
    let units: Vec<_> = project
        .units()
        .filter(|u| directory_of(u.resource()) == Some(directory))
        .collect();

    let has_package_info = units
        .iter()
        .any(|u| u.resource().ends_with(PACKAGE_INFO))
        || project.path_for(directory).join(PACKAGE_INFO).is_file();
    if has_package_info {
        return Vec::new();
    }

    let exported = units.iter().any(|unit| {
        let tree = unit.tree();
        unit.package().is_some()
            && tree.named_children(tree.root()).any(|node| {
                tree.kind(node).is_type_declaration()
                    && (has_modifier(tree, node, "public") || has_modifier(tree, node, "protected"))
            })
    });
    if exported {
        tracing::debug!(directory, "package has no package-info.java");
        collector.resource_warning(Problem::MissingPackageInfo, &[]);
    }
    collector.into_markers()
}
