//! Read-only semantic queries over one compilation unit.
//!
//! Every query treats missing semantic information as "unknown": it returns
//! `None`, `false` or an empty list and never fails.

use std::collections::HashSet;

use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::context::Project;
use super::declare::element_value;
use super::index::TypeIndex;
use super::location::SourceLocation;
use super::manifest::SpringFactories;
use super::model::{AnnotationValue, Binding, MethodInfo, MethodRef, ParamInfo, TypeInfo};
use super::unit::CompilationUnit;

/// Queries available to checks and fixers while visiting `unit`.
#[derive(Clone, Copy)]
pub struct SemanticQuery<'a> {
    unit: &'a CompilationUnit,
    project: &'a Project,
}

impl<'a> SemanticQuery<'a> {
    pub fn new(unit: &'a CompilationUnit, project: &'a Project) -> Self {
        Self { unit, project }
    }

    pub fn unit(&self) -> &'a CompilationUnit {
        self.unit
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.unit.tree()
    }

    pub fn index(&self) -> &'a TypeIndex {
        self.project.index()
    }

    pub fn binding(&self, node: NodeId) -> Option<&'a Binding> {
        self.unit.binding(node)
    }

    /// Qualified name bound to a type declaration, annotation or reference.
    pub fn type_binding(&self, node: NodeId) -> Option<&'a str> {
        match self.unit.binding(node)? {
            Binding::Type(name) => Some(name),
            _ => None,
        }
    }

    pub fn method_binding(&self, node: NodeId) -> Option<&'a MethodRef> {
        match self.unit.binding(node)? {
            Binding::Method(target) => Some(target),
            _ => None,
        }
    }

    pub fn variable_binding(&self, node: NodeId) -> Option<NodeId> {
        match self.unit.binding(node)? {
            Binding::Variable(declaration) => Some(*declaration),
            _ => None,
        }
    }

    /// Annotation nodes declared directly on `declaration`.
    pub fn annotations(&self, declaration: NodeId) -> Vec<NodeId> {
        let tree = self.tree();
        match tree.child_of_kind(declaration, NodeKind::Modifiers) {
            Some(modifiers) => tree
                .children(modifiers)
                .filter(|&child| tree.kind(child).is_annotation())
                .collect(),
            None => Vec::new(),
        }
    }

    /// First annotation on `declaration` whose type is `qualified_name`.
    pub fn find_annotation(&self, declaration: NodeId, qualified_name: &str) -> Option<NodeId> {
        self.annotations(declaration)
            .into_iter()
            .find(|&annotation| self.type_binding(annotation) == Some(qualified_name))
    }

    /// Whether `declaration` carries `qualified_name` directly or through a
    /// meta-annotation at any depth.
    pub fn has_annotation(&self, declaration: NodeId, qualified_name: &str) -> bool {
        let mut visited = HashSet::new();
        self.annotations(declaration).into_iter().any(|annotation| {
            self.type_binding(annotation).map_or(false, |ty| {
                ty == qualified_name || self.meta_annotated(ty, qualified_name, &mut visited)
            })
        })
    }

    /// [`Self::has_annotation`] over the recorded annotations of a type,
    /// which also works for types declared in other units.
    pub fn type_has_annotation(&self, info: &TypeInfo, qualified_name: &str) -> bool {
        let mut visited = HashSet::new();
        info.annotations.iter().filter(|a| a.resolved).any(|a| {
            a.type_name == qualified_name
                || self.meta_annotated(&a.type_name, qualified_name, &mut visited)
        })
    }

    fn meta_annotated(
        &self,
        annotation_type: &str,
        qualified_name: &str,
        visited: &mut HashSet<String>,
    ) -> bool {
        if !visited.insert(annotation_type.to_string()) {
            return false;
        }
        let Some(info) = self.index().get(annotation_type) else {
            return false;
        };
        info.annotations.iter().filter(|a| a.resolved).any(|a| {
            a.type_name == qualified_name
                || self.meta_annotated(&a.type_name, qualified_name, visited)
        })
    }

    /// Value of a boolean element of the annotation at `annotation`, falling
    /// back to the element's declared default.
    pub fn annotation_bool(&self, annotation: NodeId, element: &str) -> Option<bool> {
        let ty = self.type_binding(annotation)?;
        match self.annotation_value(annotation, element) {
            Some(value) => value.as_bool(),
            None => self.element_default(ty, element),
        }
    }

    /// Explicit value of an element as written on the annotation.
    pub fn annotation_value(&self, annotation: NodeId, element: &str) -> Option<AnnotationValue> {
        let tree = self.tree();
        let arguments = tree.child_by_field(annotation, "arguments")?;
        tree.named_children(arguments).find_map(|argument| {
            match tree.kind(argument) {
                NodeKind::ElementValuePair => {
                    let key = tree.child_by_field(argument, "key")?;
                    if tree.text(key) != element {
                        return None;
                    }
                    tree.child_by_field(argument, "value")
                        .map(|value| element_value(tree, value))
                }
                kind if kind.is_comment() => None,
                _ if element == "value" => Some(element_value(tree, argument)),
                _ => None,
            }
        })
    }

    /// Declared default of an annotation element.
    pub fn element_default(&self, annotation_type: &str, element: &str) -> Option<bool> {
        self.index()
            .get(annotation_type)?
            .methods_named(element)
            .find_map(|m| m.default_value.as_ref().and_then(AnnotationValue::as_bool))
    }

    /// Interfaces implemented by `info` and its superclasses, transitively,
    /// in first-seen order. Unindexed interfaces are listed but not expanded.
    pub fn implemented_interfaces(&self, info: &TypeInfo) -> Vec<String> {
        let index = self.index();
        let mut out: Vec<String> = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        let mut classes = vec![info];
        classes.extend(index.superclasses(info));
        for class in classes {
            pending.extend(class.interfaces.iter().map(String::as_str));
        }
        pending.reverse();

        while let Some(name) = pending.pop() {
            if out.iter().any(|seen| seen == name) {
                continue;
            }
            out.push(name.to_string());
            if let Some(interface) = index.get(name) {
                pending.extend(interface.interfaces.iter().rev().map(String::as_str));
            }
        }
        out
    }

    pub fn classify_location(&self) -> SourceLocation {
        self.project.layout().classify(self.unit.resource())
    }

    pub fn find_ancestor(
        &self,
        node: NodeId,
        predicate: impl Fn(NodeKind) -> bool,
    ) -> Option<NodeId> {
        self.tree().find_ancestor(node, predicate)
    }

    /// Public or protected, with neither the method nor its type final.
    pub fn is_overridable(&self, method: &MethodInfo, owner: &TypeInfo) -> bool {
        if owner.modifiers.is_final || method.modifiers.is_final {
            return false;
        }
        method.modifiers.public || method.modifiers.protected
    }

    /// Whether `method`, declared by `owner`, overrides a method of any
    /// superclass or superinterface.
    ///
    /// Answers `true` when a supertype cannot be resolved, since an override
    /// cannot be ruled out.
    pub fn overrides(&self, method: &MethodInfo, owner: &TypeInfo) -> bool {
        if method.is_constructor || method.modifiers.private || method.modifiers.is_static {
            return false;
        }
        let index = self.index();
        if index.has_unknown_supertypes(owner) {
            return true;
        }
        index.supertypes(owner).into_iter().any(|supertype| {
            supertype
                .methods_named(&method.name)
                .any(|candidate| is_override_equivalent(method, candidate))
        })
    }

    /// The first `META-INF/spring.factories` under the source roots of this
    /// unit's module.
    pub fn find_declarative_manifest(&self) -> Option<SpringFactories> {
        self.project
            .layout()
            .manifest_candidates(self.unit.resource())
            .iter()
            .find_map(|path| SpringFactories::load(path))
    }
}

/// Same parameter count and matching parameter types. A type variable on
/// either side matches any type.
pub(crate) fn is_override_equivalent(method: &MethodInfo, candidate: &MethodInfo) -> bool {
    !candidate.is_constructor
        && !candidate.modifiers.private
        && !candidate.modifiers.is_static
        && candidate.params.len() == method.params.len()
        && method
            .params
            .iter()
            .zip(&candidate.params)
            .all(|(a, b)| same_parameter_type(a, b))
}

fn same_parameter_type(a: &ParamInfo, b: &ParamInfo) -> bool {
    if a.type_variable || b.type_variable || a.type_name == b.type_name {
        return true;
    }
    // An unresolved name still matches the simple name of a resolved one.
    let simple = |name: &str| name.rsplit('.').next().unwrap_or(name).to_string();
    let resolved = |name: &str| name.contains('.');
    (!resolved(&a.type_name) || !resolved(&b.type_name))
        && simple(&a.type_name) == simple(&b.type_name)
}
