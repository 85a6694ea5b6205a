//! Interfaces with a single abstract method should say so.

use crate::analysis::builtins::OBJECT;
use crate::analysis::{
    is_override_equivalent, MethodInfo, SemanticQuery, SourceLocation, TypeInfo,
};
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::{has_modifier, FUNCTIONAL_INTERFACE};

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    if query.classify_location() != SourceLocation::Main {
        return;
    }
    let tree = query.tree();
    walk(tree, tree.root(), &mut FunctionalInterfaces { query, reporter });
}

struct FunctionalInterfaces<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for FunctionalInterfaces<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if tree.kind(node) != NodeKind::InterfaceDeclaration {
            return true;
        }
        let public_or_protected =
            has_modifier(tree, node, "public") || has_modifier(tree, node, "protected");
        if !public_or_protected
            || self.query.find_annotation(node, FUNCTIONAL_INTERFACE).is_some()
        {
            return true;
        }
        let Some(info) = self.query.unit().type_at(node) else {
            return true;
        };
        if is_functional(self.query, info) {
            if let Some(name) = tree.child_by_field(node, "name") {
                self.reporter
                    .warning(Problem::MissingFunctionalInterfaceAnnotation, name, &[]);
            }
        }
        true
    }
}

/// Exactly one abstract method, counting inherited ones and ignoring
/// redeclarations of `Object`'s public methods. A redeclared inherited method
/// counts once, with type variables matching any argument. Unknown supertypes
/// make the shape unknown.
fn is_functional(query: &SemanticQuery<'_>, info: &TypeInfo) -> bool {
    let index = query.index();
    if index.has_unknown_supertypes(info) {
        return false;
    }
    let object = index.get(OBJECT);
    let mut seen: Vec<&MethodInfo> = Vec::new();
    let mut abstract_methods = 0;
    let types = std::iter::once(info).chain(
        index
            .supertypes(info)
            .into_iter()
            .filter(|t| t.kind.is_interface()),
    );
    for ty in types {
        for method in &ty.methods {
            if method.is_constructor || method.modifiers.is_static || method.modifiers.private {
                continue;
            }
            if seen
                .iter()
                .any(|m| m.name == method.name && is_override_equivalent(method, m))
            {
                continue;
            }
            seen.push(method);
            if method.is_abstract() && !object.map_or(false, |o| declares(o, method)) {
                abstract_methods += 1;
            }
        }
    }
    abstract_methods == 1
}

fn signature(method: &MethodInfo) -> String {
    let params: Vec<&str> = method.params.iter().map(|p| p.type_name.as_str()).collect();
    format!("{}({})", method.name, params.join(","))
}

fn declares(object: &TypeInfo, method: &MethodInfo) -> bool {
    object
        .methods_named(&method.name)
        .any(|m| signature(m) == signature(method))
}
