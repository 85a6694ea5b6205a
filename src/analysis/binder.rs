//! Attaches bindings to the nodes of one compilation unit.
//!
//! The binder walks the tree once, tracking lexical scopes of local
//! variables and the enclosing type declarations. It records:
//!
//! - `Type` for named type declarations, annotations and Javadoc link
//!   references that resolve to an indexed type;
//! - `Variable` for simple names that refer to a local variable or
//!   parameter;
//! - `Method` for method invocations whose target can be determined.
//!
//! Anything it cannot determine is left unbound.

use std::collections::HashMap;

use crate::parser::Header;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::builtins::STRING;
use super::declare::{type_kind, Declarations};
use super::index::TypeIndex;
use super::model::{Binding, MethodInfo, MethodRef, TypeInfo};
use super::resolve::TypeResolver;

/// Compute the bindings of a unit whose types have been declared.
pub fn bind(
    tree: &SyntaxTree,
    header: &Header,
    declarations: &Declarations,
    index: &TypeIndex,
) -> HashMap<NodeId, Binding> {
    let mut binder = Binder {
        tree,
        index,
        declarations,
        imports_static_single: &header.imports.static_single,
        imports_static_on_demand: &header.imports.static_on_demand,
        resolver: TypeResolver::new(index, header.package.as_deref(), &header.imports),
        scopes: Vec::new(),
        enclosing: Vec::new(),
        method_type_variables: Vec::new(),
        variable_types: HashMap::new(),
        invocations: HashMap::new(),
        bindings: HashMap::new(),
    };
    walk(tree, tree.root(), &mut binder);

    let Binder {
        mut bindings,
        invocations,
        ..
    } = binder;
    for (node, target) in invocations {
        if let Some(target) = target {
            bindings.insert(node, Binding::Method(target));
        }
    }
    bindings
}

struct Scope {
    owner: NodeId,
    /// `None` marks a field that shadows outer locals.
    variables: HashMap<String, Option<NodeId>>,
}

struct Binder<'a> {
    tree: &'a SyntaxTree,
    index: &'a TypeIndex,
    declarations: &'a Declarations,
    imports_static_single: &'a [String],
    imports_static_on_demand: &'a [String],
    resolver: TypeResolver<'a>,
    scopes: Vec<Scope>,
    /// Enclosing type declarations, innermost last.
    enclosing: Vec<(NodeId, &'a TypeInfo)>,
    method_type_variables: Vec<NodeId>,
    /// Declared type of each local variable, keyed by its name node.
    variable_types: HashMap<NodeId, Option<String>>,
    invocations: HashMap<NodeId, Option<MethodRef>>,
    bindings: HashMap<NodeId, Binding>,
}

impl<'a> Visitor for Binder<'a> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        let kind = tree.kind(node);
        if let Some(&slot) = self.declarations.by_node.get(&node) {
            self.enter_type(node, slot);
            return true;
        }
        match kind {
            NodeKind::MethodDeclaration
            | NodeKind::ConstructorDeclaration
            | NodeKind::CompactConstructorDeclaration => {
                self.push_scope(node);
                let names = tree
                    .child_of_kind(node, NodeKind::TypeParameters)
                    .map(|list| {
                        tree.children_of_kind(list, NodeKind::TypeParameter)
                            .filter_map(|tp| tree.named_children(tp).next())
                            .map(|name| tree.text(name).to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                self.resolver.push_type_variables(names);
                self.method_type_variables.push(node);
            }
            NodeKind::LambdaExpression => {
                self.push_scope(node);
                if let Some(params) = tree.child_by_field(node, "parameters") {
                    match tree.kind(params) {
                        NodeKind::Identifier => self.declare(params, None),
                        NodeKind::InferredParameters => {
                            let names: Vec<NodeId> =
                                tree.children_of_kind(params, NodeKind::Identifier).collect();
                            for name in names {
                                self.declare(name, None);
                            }
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::Block
            | NodeKind::ConstructorBody
            | NodeKind::CatchClause
            | NodeKind::ForStatement
            | NodeKind::TryWithResourcesStatement
            | NodeKind::SwitchBlockStatementGroup
            | NodeKind::SwitchRule => self.push_scope(node),
            NodeKind::EnhancedForStatement => {
                self.push_scope(node);
                if let Some(name) = tree.child_by_field(node, "name") {
                    let ty = self.declared_type(tree.child_by_field(node, "type"), None);
                    self.declare(name, ty);
                }
            }
            NodeKind::FormalParameter => {
                if let Some(name) = tree.child_by_field(node, "name") {
                    let ty = self.declared_type(tree.child_by_field(node, "type"), None);
                    self.declare(name, ty);
                }
            }
            NodeKind::CatchFormalParameter => {
                if let Some(name) = tree.child_by_field(node, "name") {
                    let ty = tree
                        .child_of_kind(node, NodeKind::CatchType)
                        .and_then(|catch_type| tree.named_children(catch_type).next())
                        .and_then(|ty| self.resolver.resolve_node(tree, ty));
                    self.declare(name, ty);
                }
            }
            NodeKind::VariableDeclarator => self.declare_variable(node),
            NodeKind::Resource | NodeKind::InstanceofExpression => {
                if let Some(name) = tree.child_by_field(node, "name") {
                    let ty = self.declared_type(tree.child_by_field(node, "type"), None);
                    self.declare(name, ty);
                }
            }
            NodeKind::MarkerAnnotation | NodeKind::Annotation => {
                if let Some(name) = tree.child_by_field(node, "name") {
                    if let Some(resolved) = self.resolver.resolve(tree.text(name)) {
                        self.bindings.insert(node, Binding::Type(resolved));
                    }
                }
            }
            NodeKind::JavadocReference => {
                let text = tree.text(node);
                if !text.contains('#') {
                    if let Some(resolved) = self.resolver.resolve(text) {
                        if self.index.contains(&resolved) {
                            self.bindings.insert(node, Binding::Type(resolved));
                        }
                    }
                }
            }
            NodeKind::Identifier => {
                if is_reference(tree, node) {
                    if let Some(Some(declaration)) = self.lookup(tree.text(node)) {
                        self.bindings.insert(node, Binding::Variable(declaration));
                    }
                }
            }
            NodeKind::MethodInvocation => {
                self.invocation(node);
            }
            _ => {}
        }
        true
    }

    fn leave(&mut self, _tree: &SyntaxTree, node: NodeId) {
        if self.scopes.last().map(|s| s.owner) == Some(node) {
            self.scopes.pop();
        }
        if self.method_type_variables.last() == Some(&node) {
            self.method_type_variables.pop();
            self.resolver.pop_type_variables();
        }
        if self.enclosing.last().map(|(owner, _)| *owner) == Some(node) {
            if let Some((_, info)) = self.enclosing.pop() {
                if !info.is_anonymous() {
                    self.resolver.pop_type();
                }
            }
        }
    }
}

impl<'a> Binder<'a> {
    fn enter_type(&mut self, node: NodeId, slot: usize) {
        let info: &'a TypeInfo = &self.declarations.types[slot];
        if !info.is_anonymous() {
            self.bindings
                .insert(node, Binding::Type(info.qualified_name.clone()));
            self.resolver
                .push_type(&info.qualified_name, info.type_parameters.clone());
        }
        self.enclosing.push((node, info));
        self.scopes.push(Scope {
            owner: node,
            variables: info.fields.iter().map(|f| (f.name.clone(), None)).collect(),
        });
    }

    fn push_scope(&mut self, owner: NodeId) {
        self.scopes.push(Scope {
            owner,
            variables: HashMap::new(),
        });
    }

    fn declare(&mut self, name: NodeId, ty: Option<String>) {
        self.variable_types.insert(name, ty);
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .variables
                .insert(self.tree.text(name).to_string(), Some(name));
        }
    }

    fn declare_variable(&mut self, declarator: NodeId) {
        let tree = self.tree;
        let Some(parent) = tree.parent(declarator) else {
            return;
        };
        if matches!(
            tree.kind(parent),
            NodeKind::FieldDeclaration | NodeKind::ConstantDeclaration
        ) {
            return;
        }
        let Some(name) = tree.child_by_field(declarator, "name") else {
            return;
        };
        let ty = match tree.kind(parent) {
            NodeKind::SpreadParameter => tree
                .named_children(parent)
                .find(|&c| {
                    !matches!(
                        tree.kind(c),
                        NodeKind::Modifiers | NodeKind::VariableDeclarator
                    )
                })
                .and_then(|ty| self.resolver.resolve_node(tree, ty))
                .map(|element| format!("{}[]", element)),
            _ => self.declared_type(
                tree.child_by_field(parent, "type"),
                tree.child_by_field(declarator, "value"),
            ),
        };
        self.declare(name, ty);
    }

    fn declared_type(&mut self, ty: Option<NodeId>, value: Option<NodeId>) -> Option<String> {
        let ty = ty?;
        if self.tree.text(ty) == "var" {
            return value.and_then(|value| self.type_of(value));
        }
        self.resolver.resolve_node(self.tree, ty)
    }

    fn lookup(&self, name: &str) -> Option<Option<NodeId>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name).copied())
    }

    /// Static type of an expression, when it can be determined.
    fn type_of(&mut self, expression: NodeId) -> Option<String> {
        let tree = self.tree;
        match tree.kind(expression) {
            NodeKind::Identifier => {
                let name = tree.text(expression);
                if let Some(Some(declaration)) = self.lookup(name) {
                    return self.variable_types.get(&declaration).cloned().flatten();
                }
                self.enclosing
                    .iter()
                    .rev()
                    .find_map(|(_, info)| self.field_type(info, name))
            }
            NodeKind::This => self.this_type(),
            NodeKind::Super => {
                let (_, info) = self.enclosing.last()?;
                info.superclass.clone()
            }
            NodeKind::StringLiteral | NodeKind::Other("text_block") => Some(STRING.to_string()),
            NodeKind::MethodInvocation => {
                let target = self.invocation(expression)?;
                target
                    .return_type
                    .filter(|ty| ty.contains('.') || self.index.contains(ty))
            }
            NodeKind::CastExpression | NodeKind::ObjectCreationExpression => {
                let ty = tree.child_by_field(expression, "type")?;
                self.resolver.resolve_node(tree, ty)
            }
            NodeKind::ParenthesizedExpression => {
                let inner = tree.named_children(expression).next()?;
                self.type_of(inner)
            }
            NodeKind::FieldAccess => {
                let object = tree.child_by_field(expression, "object")?;
                let field = tree.child_by_field(expression, "field")?;
                match self.type_of(object) {
                    Some(owner) => {
                        let info = self.index.get(&owner)?;
                        self.field_type(info, tree.text(field))
                    }
                    None => self.resolver.resolve(&compact(tree.text(expression))),
                }
            }
            _ => None,
        }
    }

    /// Type named by an invocation receiver: an expression type, or a type
    /// name for static invocations.
    fn receiver_type(&mut self, object: NodeId) -> Option<String> {
        if let Some(ty) = self.type_of(object) {
            return Some(ty);
        }
        let tree = self.tree;
        match tree.kind(object) {
            NodeKind::Identifier if self.lookup(tree.text(object)).is_none() => {
                self.resolver.resolve(tree.text(object))
            }
            _ => None,
        }
    }

    fn this_type(&self) -> Option<String> {
        let (_, info) = self.enclosing.last()?;
        if info.is_anonymous() {
            return info
                .interfaces
                .first()
                .or(info.superclass.as_ref())
                .cloned();
        }
        Some(info.qualified_name.clone())
    }

    fn field_type(&self, info: &TypeInfo, name: &str) -> Option<String> {
        if let Some(field) = info.field(name) {
            return field.type_name.clone();
        }
        self.index
            .supertypes(info)
            .into_iter()
            .find_map(|t| t.field(name))
            .and_then(|f| f.type_name.clone())
    }

    fn invocation(&mut self, node: NodeId) -> Option<MethodRef> {
        if let Some(cached) = self.invocations.get(&node) {
            return cached.clone();
        }
        let target = self.resolve_invocation(node);
        self.invocations.insert(node, target.clone());
        target
    }

    fn resolve_invocation(&mut self, node: NodeId) -> Option<MethodRef> {
        let tree = self.tree;
        let name = tree.text(tree.child_by_field(node, "name")?).to_string();
        let arity = tree
            .child_by_field(node, "arguments")
            .map(|args| {
                tree.named_children(args)
                    .filter(|&a| !tree.kind(a).is_comment())
                    .count()
            })
            .unwrap_or(0);

        if let Some(object) = tree.child_by_field(node, "object") {
            let receiver = self.receiver_type(object)?;
            let info = self.index.get(&receiver)?;
            let (declaring, method) = find_method(self.index, info, &name, arity)?;
            return Some(MethodRef::from_info(declaring, method));
        }

        for (_, info) in self.enclosing.iter().rev() {
            if let Some((declaring, method)) = find_method(self.index, info, &name, arity) {
                return Some(MethodRef::from_info(declaring, method));
            }
        }

        for import in self.imports_static_single {
            let Some((class, member)) = import.rsplit_once('.') else {
                continue;
            };
            if member != name {
                continue;
            }
            return match self.index.get(class) {
                Some(info) => find_method(self.index, info, &name, arity)
                    .map(|(declaring, method)| MethodRef::from_info(declaring, method)),
                None => Some(MethodRef::opaque(class, &name)),
            };
        }

        self.imports_static_on_demand.iter().find_map(|class| {
            let info = self.index.get(class)?;
            find_method(self.index, info, &name, arity)
                .filter(|(_, method)| method.modifiers.is_static)
                .map(|(declaring, method)| MethodRef::from_info(declaring, method))
        })
    }
}

/// First method named `name` accepting `arity` arguments, searching `info`
/// and then its supertypes.
fn find_method<'a>(
    index: &'a TypeIndex,
    info: &'a TypeInfo,
    name: &str,
    arity: usize,
) -> Option<(&'a str, &'a MethodInfo)> {
    let matches = |t: &'a TypeInfo| {
        t.methods
            .iter()
            .find(|m| !m.is_constructor && m.name == name && m.accepts_arity(arity))
            .map(|m| (t.qualified_name.as_str(), m))
    };
    matches(info).or_else(|| index.supertypes(info).into_iter().find_map(matches))
}

/// Whether an identifier sits where a variable could be referenced.
fn is_reference(tree: &SyntaxTree, identifier: NodeId) -> bool {
    let node = tree.node(identifier);
    if matches!(
        node.field,
        Some("name") | Some("field") | Some("key") | Some("parameters") | Some("label")
    ) {
        return false;
    }
    let Some(parent) = node.parent else {
        return false;
    };
    match tree.kind(parent) {
        NodeKind::ScopedIdentifier
        | NodeKind::PackageDeclaration
        | NodeKind::ImportDeclaration
        | NodeKind::InferredParameters
        | NodeKind::LabeledStatement
        | NodeKind::BreakStatement
        | NodeKind::ContinueStatement => false,
        NodeKind::MethodReference => tree.named_children(parent).next() == Some(identifier),
        kind => type_kind(kind).is_none(),
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::declare::{declare_types, declared_names};
    use crate::parser::parse;

    struct Bound {
        tree: SyntaxTree,
        bindings: HashMap<NodeId, Binding>,
    }

    fn bind_source(source: &str) -> Bound {
        let parsed = parse(source).unwrap();
        let names = declared_names(&parsed.tree, &parsed.header);
        let mut index = TypeIndex::new();
        for name in &names {
            index.declare(&name.qualified_name, name.kind);
        }
        let declarations = declare_types(&parsed.tree, &parsed.header, &names, &index);
        for info in &declarations.types {
            index.insert(info.clone());
        }
        let bindings = bind(&parsed.tree, &parsed.header, &declarations, &index);
        Bound {
            tree: parsed.tree,
            bindings,
        }
    }

    fn invocations(bound: &Bound) -> Vec<(String, Option<MethodRef>)> {
        bound
            .tree
            .descendants(bound.tree.root())
            .into_iter()
            .filter(|&id| bound.tree.kind(id) == NodeKind::MethodInvocation)
            .map(|id| {
                let target = match bound.bindings.get(&id) {
                    Some(Binding::Method(m)) => Some(m.clone()),
                    _ => None,
                };
                (bound.tree.text(id).to_string(), target)
            })
            .collect()
    }

    #[test]
    fn test_parameters_and_locals_bind_to_declarations() {
        let bound = bind_source(
            "class A { int f; int m(int a, int b) { int c = a; return c + f; } }",
        );
        let tree = &bound.tree;
        let variables: Vec<&str> = tree
            .descendants(tree.root())
            .into_iter()
            .filter_map(|id| match bound.bindings.get(&id) {
                Some(Binding::Variable(declaration)) => Some(tree.text(*declaration)),
                _ => None,
            })
            .collect();
        assert_eq!(variables, vec!["a", "c"]);
    }

    #[test]
    fn test_lambda_parameters_shadow_nothing_outside() {
        let bound = bind_source(
            "class A { void m(java.util.List<String> items, String x) { items.forEach(x2 -> System.out.println(x2)); } }",
        );
        let tree = &bound.tree;
        let referenced: Vec<&str> = bound
            .bindings
            .iter()
            .filter_map(|(id, b)| match b {
                Binding::Variable(_) => Some(tree.text(*id)),
                _ => None,
            })
            .collect();
        assert!(referenced.contains(&"items"));
        assert!(referenced.contains(&"x2"));
        assert!(!referenced.contains(&"x"));
    }

    #[test]
    fn test_string_methods_resolve_through_receiver_types() {
        let bound = bind_source(
            r#"class A { int m(String s) { String t = s.trim(); return t.indexOf("a") + "abc".lastIndexOf("c"); } }"#,
        );
        let found = invocations(&bound);
        assert_eq!(found.len(), 3);
        for (_, target) in &found {
            assert_eq!(target.as_ref().unwrap().declaring_type, STRING);
        }
    }

    #[test]
    fn test_static_imports_bind_assertions() {
        let bound = bind_source(
            r#"import static org.assertj.core.api.Assertions.assertThat;
import static org.junit.Assert.*;
class ATest { void t() { assertThat(1).isEqualTo(1); fail(); } }"#,
        );
        let found = invocations(&bound);
        let assert_that = found
            .iter()
            .find(|(text, _)| text == "assertThat(1)")
            .and_then(|(_, t)| t.clone())
            .unwrap();
        assert!(assert_that.is("org.assertj.core.api.Assertions", "assertThat"));

        let fail = found
            .iter()
            .find(|(text, _)| text == "fail()")
            .and_then(|(_, t)| t.clone())
            .unwrap();
        assert!(fail.is("org.junit.Assert", "fail"));

        let chained = found.iter().find(|(text, _)| text.ends_with("isEqualTo(1)")).unwrap();
        assert!(chained.1.is_none());
    }

    #[test]
    fn test_own_methods_carry_annotations() {
        let bound = bind_source(
            r#"import org.springframework.context.annotation.Bean;
class Config {
    @Bean Object one() { return two(); }
    @Bean Object two() { return new Object(); }
}"#,
        );
        let found = invocations(&bound);
        let (_, target) = &found[0];
        let target = target.as_ref().unwrap();
        assert!(target.is("Config", "two"));
        assert_eq!(
            target.annotations,
            vec!["org.springframework.context.annotation.Bean"]
        );
    }

    #[test]
    fn test_annotations_bind_to_types() {
        let bound = bind_source(
            "import org.springframework.stereotype.Component;\n@Component class A {}",
        );
        let tree = &bound.tree;
        let annotation = tree
            .descendants(tree.root())
            .into_iter()
            .find(|&id| tree.kind(id).is_annotation())
            .unwrap();
        assert_eq!(
            bound.bindings.get(&annotation),
            Some(&Binding::Type(
                "org.springframework.stereotype.Component".to_string()
            ))
        );
    }
}
