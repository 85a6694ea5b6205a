//! Unused parameters of methods that take no part in dynamic dispatch.

use std::collections::HashSet;

use crate::analysis::builtins::THROWABLE;
use crate::analysis::{MethodInfo, SemanticQuery, SourceLocation};
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::EXCEPTION_HANDLER;

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    if query.classify_location() != SourceLocation::Main {
        return;
    }
    let tree = query.tree();
    walk(tree, tree.root(), &mut UnusedParameters { query, reporter });
}

struct UnusedParameters<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for UnusedParameters<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if !tree.kind(node).is_method_like() {
            return true;
        }
        let Some(body) = tree.child_by_field(node, "body") else {
            return false;
        };
        let Some((owner, method)) = self.query.unit().method_at(node) else {
            return false;
        };
        if self.query.is_overridable(method, owner) || self.query.overrides(method, owner) {
            return false;
        }

        let referenced: HashSet<NodeId> = tree
            .descendants(body)
            .into_iter()
            .filter_map(|n| self.query.variable_binding(n))
            .collect();

        for (parameter, name) in parameters(tree, node) {
            if referenced.contains(&name) || self.is_exempt(method, tree.text(name)) {
                continue;
            }
            self.reporter
                .warning(Problem::UnusedMethodParameter, parameter, &[]);
        }
        false
    }
}

impl UnusedParameters<'_, '_> {
    /// Exception handlers receive the exception whether they use it or not.
    fn is_exempt(&self, method: &MethodInfo, name: &str) -> bool {
        if !method.has_annotation(EXCEPTION_HANDLER) {
            return false;
        }
        method
            .params
            .iter()
            .find(|p| p.name == name)
            .map_or(false, |p| self.query.index().is_subtype_of(&p.type_name, THROWABLE))
    }
}

/// Parameter declarations of a method with the name node of each.
fn parameters(tree: &SyntaxTree, method: NodeId) -> Vec<(NodeId, NodeId)> {
    let Some(list) = tree.child_by_field(method, "parameters") else {
        return Vec::new();
    };
    tree.named_children(list)
        .filter_map(|parameter| {
            let name = match tree.kind(parameter) {
                NodeKind::FormalParameter => tree.child_by_field(parameter, "name"),
                NodeKind::SpreadParameter => tree
                    .child_of_kind(parameter, NodeKind::VariableDeclarator)
                    .and_then(|d| tree.child_by_field(d, "name")),
                _ => None,
            }?;
            Some((parameter, name))
        })
        .collect()
}
