//! `{@link}` tags that point at annotation types.

use crate::analysis::{SemanticQuery, TypeKind};
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::NodeKind;

/// Links to an annotation must read `{@link Name @Name}`.
pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    let links = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|&n| tree.kind(n) == NodeKind::JavadocLink);

    for link in links {
        let Some(reference) = tree.child_by_field(link, "name") else {
            continue;
        };
        let Some(target) = query.type_binding(reference) else {
            continue;
        };
        if query.index().kind_of(target) != Some(TypeKind::Annotation) {
            continue;
        }
        let name = target.rsplit('.').next().unwrap_or(target);
        let expected = format!("@{}", name);
        let text = tree.child_by_field(link, "text").map(|t| tree.text(t).trim());
        if text != Some(expected.as_str()) {
            reporter.warning(Problem::IncorrectAnnotationLink, link, &[name, name]);
        }
    }
}
