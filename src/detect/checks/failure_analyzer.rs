//! Failure analyzers must be registered in `spring.factories`.

use crate::analysis::{SemanticQuery, SourceLocation, SpringFactories, FAILURE_ANALYZER_KEY};
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    if query.classify_location() != SourceLocation::Main {
        return;
    }
    let tree = query.tree();
    walk(
        tree,
        tree.root(),
        &mut FailureAnalyzers {
            query,
            reporter,
            manifest: None,
        },
    );
}

struct FailureAnalyzers<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
    /// Looked up on first use; the inner `None` records a missing file.
    manifest: Option<Option<SpringFactories>>,
}

impl FailureAnalyzers<'_, '_> {
    fn is_listed(&mut self, names: &[String]) -> bool {
        let query = self.query;
        let manifest = self
            .manifest
            .get_or_insert_with(|| query.find_declarative_manifest());
        match manifest {
            Some(manifest) => names
                .iter()
                .any(|name| manifest.contains(FAILURE_ANALYZER_KEY, name)),
            None => false,
        }
    }
}

impl Visitor for FailureAnalyzers<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if tree.kind(node) != NodeKind::ClassDeclaration {
            return true;
        }
        let Some(info) = self.query.unit().type_at(node) else {
            return true;
        };
        if info.modifiers.is_abstract
            || !self
                .query
                .implemented_interfaces(info)
                .iter()
                .any(|i| i == FAILURE_ANALYZER_KEY)
        {
            return true;
        }
        let names = [
            info.qualified_name.clone(),
            info.binary_name(self.query.unit().package()),
        ];
        if !self.is_listed(&names) {
            if let Some(name) = tree.child_by_field(node, "name") {
                self.reporter
                    .error(Problem::FailureAnalyzerNotInSpringFactories, name, &[]);
            }
        }
        true
    }
}
