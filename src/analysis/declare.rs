//! Type declarations and their signatures.
//!
//! Declaring a project happens in two steps. [`declared_names`] lists the
//! qualified names of every type a unit declares, so that all names are
//! known to the index before any signature is resolved. [`declare_types`]
//! then builds a [`TypeInfo`] per declaration, anonymous classes included,
//! resolving supertypes, annotations and member signatures.

use std::collections::HashMap;

use crate::parser::Header;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::builtins::OBJECT;
use super::index::TypeIndex;
use super::model::{
    AnnotationInfo, AnnotationValue, FieldInfo, MethodInfo, Modifiers, ParamInfo, TypeInfo,
    TypeKind,
};
use super::resolve::TypeResolver;

/// A named type declared by a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredName {
    pub node: NodeId,
    pub qualified_name: String,
    pub kind: TypeKind,
}

/// Types declared by one unit.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    pub types: Vec<TypeInfo>,
    /// Declaration node (class body for anonymous classes) to `types` index.
    pub by_node: HashMap<NodeId, usize>,
}

pub(crate) fn type_kind(kind: NodeKind) -> Option<TypeKind> {
    match kind {
        NodeKind::ClassDeclaration => Some(TypeKind::Class),
        NodeKind::InterfaceDeclaration => Some(TypeKind::Interface),
        NodeKind::EnumDeclaration => Some(TypeKind::Enum),
        NodeKind::RecordDeclaration => Some(TypeKind::Record),
        NodeKind::AnnotationTypeDeclaration => Some(TypeKind::Annotation),
        _ => None,
    }
}

/// Qualified names of the named types declared in `tree`.
pub fn declared_names(tree: &SyntaxTree, header: &Header) -> Vec<DeclaredName> {
    let mut out = Vec::new();
    collect_names(tree, tree.root(), None, header.package.as_deref(), &mut out);
    out
}

fn collect_names(
    tree: &SyntaxTree,
    node: NodeId,
    outer: Option<&str>,
    package: Option<&str>,
    out: &mut Vec<DeclaredName>,
) {
    let declared = type_kind(tree.kind(node)).and_then(|kind| {
        let name = tree.text(tree.child_by_field(node, "name")?);
        let qualified_name = match (outer, package) {
            (Some(outer), _) => format!("{}.{}", outer, name),
            (None, Some(package)) => format!("{}.{}", package, name),
            (None, None) => name.to_string(),
        };
        Some(DeclaredName {
            node,
            qualified_name,
            kind,
        })
    });

    let scope = declared.as_ref().map(|d| d.qualified_name.clone());
    if let Some(declared) = declared {
        out.push(declared);
    }
    let outer = scope.as_deref().or(outer);
    for child in tree.named_children(node) {
        collect_names(tree, child, outer, package, out);
    }
}

/// Build signatures for every type declared in `tree`.
///
/// `names` must come from [`declared_names`] on the same tree, and the index
/// must already know the names of every project type.
pub fn declare_types(
    tree: &SyntaxTree,
    header: &Header,
    names: &[DeclaredName],
    index: &TypeIndex,
) -> Declarations {
    let names: HashMap<NodeId, &DeclaredName> = names.iter().map(|d| (d.node, d)).collect();
    let mut declarer = Declarer {
        tree,
        names,
        resolver: TypeResolver::new(index, header.package.as_deref(), &header.imports),
        out: Declarations::default(),
    };
    declarer.visit(tree.root());
    declarer.out
}

struct Declarer<'a> {
    tree: &'a SyntaxTree,
    names: HashMap<NodeId, &'a DeclaredName>,
    resolver: TypeResolver<'a>,
    out: Declarations,
}

impl<'a> Declarer<'a> {
    fn visit(&mut self, node: NodeId) {
        let tree = self.tree;
        if let Some(declared) = self.names.get(&node).copied() {
            let info = self.named_type(node, declared);
            let type_parameters = info.type_parameters.clone();
            self.record(node, info);
            self.resolver
                .push_type(&declared.qualified_name, type_parameters);
            for child in tree.named_children(node) {
                self.visit(child);
            }
            self.resolver.pop_type();
            return;
        }

        if tree.kind(node) == NodeKind::ClassBody {
            if let Some(info) = self.anonymous_type(node) {
                self.record(node, info);
            }
        }
        for child in tree.named_children(node) {
            self.visit(child);
        }
    }

    fn record(&mut self, node: NodeId, info: TypeInfo) {
        self.out.by_node.insert(node, self.out.types.len());
        self.out.types.push(info);
    }

    fn named_type(&mut self, node: NodeId, declared: &DeclaredName) -> TypeInfo {
        let tree = self.tree;
        let kind = declared.kind;
        let (mut modifiers, annotations) = self.modifiers(node);
        let type_parameters = type_parameter_names(tree, node);

        let nested = tree
            .ancestors(node)
            .any(|a| type_kind(tree.kind(a)).is_some());
        let in_interface = tree
            .ancestors(node)
            .find(|&a| type_kind(tree.kind(a)).is_some())
            .and_then(|a| type_kind(tree.kind(a)))
            .map_or(false, |k| k.is_interface());
        match kind {
            TypeKind::Interface | TypeKind::Annotation => {
                modifiers.is_abstract = true;
                if nested {
                    modifiers.is_static = true;
                }
            }
            TypeKind::Enum | TypeKind::Record => {
                modifiers.is_final = true;
                if nested {
                    modifiers.is_static = true;
                }
            }
            TypeKind::Class => {}
        }
        if in_interface {
            modifiers.is_static = true;
            if !modifiers.private {
                modifiers.public = true;
            }
        }

        self.resolver.push_type_variables(type_parameters.clone());
        let mut unresolved = false;
        let superclass = match kind {
            TypeKind::Class => match tree.child_by_field(node, "superclass") {
                Some(clause) => {
                    let resolved = tree
                        .named_children(clause)
                        .next()
                        .and_then(|ty| self.resolver.resolve_node(tree, ty));
                    unresolved |= resolved.is_none();
                    resolved
                }
                None if declared.qualified_name == OBJECT => None,
                None => Some(OBJECT.to_string()),
            },
            TypeKind::Enum => Some("java.lang.Enum".to_string()),
            TypeKind::Record => Some("java.lang.Record".to_string()),
            TypeKind::Interface | TypeKind::Annotation => None,
        };

        let clauses: Vec<NodeId> = tree
            .children(node)
            .filter(|&c| {
                matches!(
                    tree.kind(c),
                    NodeKind::SuperInterfaces | NodeKind::ExtendsInterfaces
                )
            })
            .collect();
        let mut interfaces = Vec::new();
        for clause in clauses {
            let Some(list) = tree.child_of_kind(clause, NodeKind::TypeList) else {
                continue;
            };
            for ty in tree.named_children(list) {
                match self.resolver.resolve_node(tree, ty) {
                    Some(name) => interfaces.push(name),
                    None => unresolved = true,
                }
            }
        }
        self.resolver.pop_type_variables();

        self.resolver
            .push_type(&declared.qualified_name, type_parameters.clone());
        let (methods, mut fields) = self.members(node, kind);
        if kind == TypeKind::Record {
            fields.extend(self.record_components(node));
        }
        self.resolver.pop_type();

        TypeInfo {
            qualified_name: declared.qualified_name.clone(),
            simple_name: declared
                .qualified_name
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string(),
            kind,
            modifiers,
            superclass,
            interfaces,
            unresolved_supertypes: unresolved,
            annotations,
            methods,
            fields,
            type_parameters,
            complete: true,
            node: Some(node),
        }
    }

    /// Class body of `new T() { ... }` or of an enum constant.
    fn anonymous_type(&mut self, body: NodeId) -> Option<TypeInfo> {
        let tree = self.tree;
        let parent = tree.parent(body)?;
        let (superclass, interfaces, unresolved) = match tree.kind(parent) {
            NodeKind::ObjectCreationExpression => {
                let ty = tree.child_by_field(parent, "type")?;
                match self.resolver.resolve_node(tree, ty) {
                    Some(name) => {
                        let is_interface = self
                            .resolver
                            .index()
                            .kind_of(&name)
                            .map_or(false, |k| k.is_interface());
                        if is_interface {
                            (Some(OBJECT.to_string()), vec![name], false)
                        } else {
                            (Some(name), Vec::new(), false)
                        }
                    }
                    None => (Some(OBJECT.to_string()), Vec::new(), true),
                }
            }
            NodeKind::EnumConstant => {
                let declaration = tree.find_ancestor(parent, |k| k == NodeKind::EnumDeclaration)?;
                let name = self.names.get(&declaration)?.qualified_name.clone();
                (Some(name), Vec::new(), false)
            }
            _ => return None,
        };

        let (methods, fields) = self.members(body, TypeKind::Class);
        Some(TypeInfo {
            qualified_name: String::new(),
            simple_name: String::new(),
            kind: TypeKind::Class,
            modifiers: Modifiers {
                is_final: true,
                ..Modifiers::default()
            },
            superclass,
            interfaces,
            unresolved_supertypes: unresolved,
            annotations: Vec::new(),
            methods,
            fields,
            type_parameters: Vec::new(),
            complete: true,
            node: Some(body),
        })
    }

    fn members(&mut self, node: NodeId, kind: TypeKind) -> (Vec<MethodInfo>, Vec<FieldInfo>) {
        let tree = self.tree;
        let body = if tree.kind(node) == NodeKind::ClassBody {
            Some(node)
        } else {
            tree.child_by_field(node, "body")
        };
        let Some(body) = body else {
            return (Vec::new(), Vec::new());
        };

        let mut member_nodes: Vec<NodeId> = Vec::new();
        for child in tree.named_children(body) {
            if tree.kind(child) == NodeKind::EnumBodyDeclarations {
                member_nodes.extend(tree.named_children(child));
            } else {
                member_nodes.push(child);
            }
        }

        let mut methods = Vec::new();
        let mut fields = Vec::new();
        for member in member_nodes {
            match tree.kind(member) {
                NodeKind::MethodDeclaration
                | NodeKind::ConstructorDeclaration
                | NodeKind::CompactConstructorDeclaration
                | NodeKind::AnnotationTypeElementDeclaration => {
                    methods.push(self.method(member, kind));
                }
                NodeKind::FieldDeclaration | NodeKind::ConstantDeclaration => {
                    fields.extend(self.fields(member, kind));
                }
                _ => {}
            }
        }
        (methods, fields)
    }

    fn method(&mut self, node: NodeId, owner_kind: TypeKind) -> MethodInfo {
        let tree = self.tree;
        let (mut modifiers, annotations) = self.modifiers(node);
        let type_parameters = tree
            .child_of_kind(node, NodeKind::TypeParameters)
            .map(|tp| type_parameter_list(tree, tp))
            .unwrap_or_default();
        self.resolver.push_type_variables(type_parameters);

        let kind = tree.kind(node);
        let is_constructor = matches!(
            kind,
            NodeKind::ConstructorDeclaration | NodeKind::CompactConstructorDeclaration
        );
        let name = match tree.child_by_field(node, "name") {
            Some(name) => tree.text(name).to_string(),
            None => String::new(),
        };

        let parameters = if kind == NodeKind::CompactConstructorDeclaration {
            tree.find_ancestor(node, |k| k == NodeKind::RecordDeclaration)
                .and_then(|record| tree.child_by_field(record, "parameters"))
        } else {
            tree.child_by_field(node, "parameters")
        };
        let (params, varargs) = match parameters {
            Some(list) => self.parameters(list),
            None => (Vec::new(), false),
        };

        let return_type = if is_constructor {
            None
        } else {
            tree.child_by_field(node, "type").map(|ty| {
                self.resolver
                    .resolve_node(tree, ty)
                    .unwrap_or_else(|| TypeResolver::written_name(tree, ty))
            })
        };
        let has_body = tree.child_by_field(node, "body").is_some();
        let default_value = if kind == NodeKind::AnnotationTypeElementDeclaration {
            tree.child_by_field(node, "value")
                .map(|value| element_value(tree, value))
        } else {
            None
        };
        self.resolver.pop_type_variables();

        if owner_kind.is_interface() {
            if !modifiers.private {
                modifiers.public = true;
            }
            if !has_body && !modifiers.is_static && !modifiers.is_default && !modifiers.private {
                modifiers.is_abstract = true;
            }
        }
        if owner_kind == TypeKind::Enum && is_constructor {
            modifiers.private = true;
        }

        MethodInfo {
            name,
            params,
            varargs,
            return_type,
            modifiers,
            annotations,
            is_constructor,
            has_body,
            default_value,
            node: Some(node),
        }
    }

    fn parameters(&self, list: NodeId) -> (Vec<ParamInfo>, bool) {
        let tree = self.tree;
        let mut params = Vec::new();
        let mut varargs = false;
        for param in tree.named_children(list) {
            match tree.kind(param) {
                NodeKind::FormalParameter => {
                    let (Some(ty), Some(name)) = (
                        tree.child_by_field(param, "type"),
                        tree.child_by_field(param, "name"),
                    ) else {
                        continue;
                    };
                    params.push(self.param(ty, tree.text(name), false));
                }
                NodeKind::SpreadParameter => {
                    let ty = tree.named_children(param).find(|&c| {
                        !matches!(
                            tree.kind(c),
                            NodeKind::Modifiers | NodeKind::VariableDeclarator
                        )
                    });
                    let name = tree
                        .child_of_kind(param, NodeKind::VariableDeclarator)
                        .and_then(|d| tree.child_by_field(d, "name"));
                    if let (Some(ty), Some(name)) = (ty, name) {
                        params.push(self.param(ty, tree.text(name), true));
                        varargs = true;
                    }
                }
                _ => {}
            }
        }
        (params, varargs)
    }

    fn param(&self, ty: NodeId, name: &str, spread: bool) -> ParamInfo {
        let tree = self.tree;
        let written = TypeResolver::written_name(tree, ty);
        let type_variable = self.resolver.is_type_variable(&written);
        let mut type_name = self
            .resolver
            .resolve_node(tree, ty)
            .unwrap_or(written);
        if spread {
            type_name.push_str("[]");
        }
        ParamInfo {
            name: name.to_string(),
            type_name,
            type_variable,
        }
    }

    fn fields(&self, node: NodeId, owner_kind: TypeKind) -> Vec<FieldInfo> {
        let tree = self.tree;
        let (mut modifiers, annotations) = self.modifiers(node);
        if owner_kind.is_interface() {
            modifiers.public = true;
            modifiers.is_static = true;
            modifiers.is_final = true;
        }
        let type_name = tree
            .child_by_field(node, "type")
            .and_then(|ty| self.resolver.resolve_node(tree, ty));
        tree.children_by_field(node, "declarator")
            .filter_map(|declarator| tree.child_by_field(declarator, "name"))
            .map(|name| FieldInfo {
                name: tree.text(name).to_string(),
                type_name: type_name.clone(),
                modifiers,
                annotations: annotations.clone(),
            })
            .collect()
    }

    fn record_components(&self, record: NodeId) -> Vec<FieldInfo> {
        let tree = self.tree;
        let Some(list) = tree.child_by_field(record, "parameters") else {
            return Vec::new();
        };
        let (params, _) = self.parameters(list);
        params
            .into_iter()
            .map(|p| FieldInfo {
                name: p.name,
                type_name: Some(p.type_name),
                modifiers: Modifiers {
                    private: true,
                    is_final: true,
                    ..Modifiers::default()
                },
                annotations: Vec::new(),
            })
            .collect()
    }

    fn modifiers(&self, node: NodeId) -> (Modifiers, Vec<AnnotationInfo>) {
        let tree = self.tree;
        let mut modifiers = Modifiers::default();
        let mut annotations = Vec::new();
        if let Some(list) = tree.child_of_kind(node, NodeKind::Modifiers) {
            for child in tree.children(list) {
                match tree.kind(child) {
                    NodeKind::Token(keyword) => modifiers.set(keyword),
                    kind if kind.is_annotation() => {
                        annotations.push(annotation_info(tree, child, &self.resolver));
                    }
                    _ => {}
                }
            }
        }
        (modifiers, annotations)
    }
}

/// Read an annotation node into an [`AnnotationInfo`].
pub(crate) fn annotation_info(
    tree: &SyntaxTree,
    node: NodeId,
    resolver: &TypeResolver<'_>,
) -> AnnotationInfo {
    let written = tree
        .child_by_field(node, "name")
        .map(|name| tree.text(name).to_string())
        .unwrap_or_default();
    let resolved = resolver.resolve(&written);

    let mut values = Vec::new();
    if let Some(arguments) = tree.child_by_field(node, "arguments") {
        for argument in tree.named_children(arguments) {
            match tree.kind(argument) {
                NodeKind::ElementValuePair => {
                    let key = tree.child_by_field(argument, "key");
                    let value = tree.child_by_field(argument, "value");
                    if let (Some(key), Some(value)) = (key, value) {
                        values.push((tree.text(key).to_string(), element_value(tree, value)));
                    }
                }
                kind if kind.is_comment() => {}
                _ => values.push(("value".to_string(), element_value(tree, argument))),
            }
        }
    }

    AnnotationInfo {
        resolved: resolved.is_some(),
        type_name: resolved.unwrap_or(written),
        values,
        node: Some(node),
    }
}

pub(crate) fn element_value(tree: &SyntaxTree, node: NodeId) -> AnnotationValue {
    match tree.kind(node) {
        NodeKind::Other("true") => AnnotationValue::Bool(true),
        NodeKind::Other("false") => AnnotationValue::Bool(false),
        NodeKind::StringLiteral => {
            AnnotationValue::Str(tree.text(node).trim_matches('"').to_string())
        }
        _ => AnnotationValue::Other(tree.text(node).to_string()),
    }
}

fn type_parameter_names(tree: &SyntaxTree, declaration: NodeId) -> Vec<String> {
    tree.child_by_field(declaration, "type_parameters")
        .or_else(|| tree.child_of_kind(declaration, NodeKind::TypeParameters))
        .map(|tp| type_parameter_list(tree, tp))
        .unwrap_or_default()
}

fn type_parameter_list(tree: &SyntaxTree, list: NodeId) -> Vec<String> {
    tree.children_of_kind(list, NodeKind::TypeParameter)
        .filter_map(|tp| {
            tree.named_children(tp)
                .find(|&c| matches!(tree.kind(c), NodeKind::TypeIdentifier | NodeKind::Identifier))
        })
        .map(|name| tree.text(name).to_string())
        .collect()
}
