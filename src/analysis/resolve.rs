//! Name resolution for type references.

use crate::parser::Imports;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::index::TypeIndex;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Resolves simple and qualified type names as seen from one position in a
/// compilation unit.
pub struct TypeResolver<'a> {
    index: &'a TypeIndex,
    package: Option<&'a str>,
    imports: &'a Imports,
    /// Qualified names of the enclosing named types, outermost first.
    enclosing: Vec<String>,
    /// Type variables in scope.
    type_variables: Vec<Vec<String>>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(index: &'a TypeIndex, package: Option<&'a str>, imports: &'a Imports) -> Self {
        Self {
            index,
            package,
            imports,
            enclosing: Vec::new(),
            type_variables: Vec::new(),
        }
    }

    pub fn index(&self) -> &'a TypeIndex {
        self.index
    }

    pub fn push_type(&mut self, qualified_name: &str, type_variables: Vec<String>) {
        self.enclosing.push(qualified_name.to_string());
        self.type_variables.push(type_variables);
    }

    pub fn pop_type(&mut self) {
        self.enclosing.pop();
        self.type_variables.pop();
    }

    pub fn push_type_variables(&mut self, names: Vec<String>) {
        self.type_variables.push(names);
    }

    pub fn pop_type_variables(&mut self) {
        self.type_variables.pop();
    }

    pub fn is_type_variable(&self, name: &str) -> bool {
        self.type_variables
            .iter()
            .any(|scope| scope.iter().any(|v| v == name))
    }

    /// Qualified name for a nested type declared in the current scope.
    pub fn qualify(&self, simple_name: &str) -> String {
        match (self.enclosing.last(), self.package) {
            (Some(outer), _) => format!("{}.{}", outer, simple_name),
            (None, Some(package)) => format!("{}.{}", package, simple_name),
            (None, None) => simple_name.to_string(),
        }
    }

    /// Resolve a type name as written in source.
    ///
    /// Single-type imports are trusted even when the imported type is not
    /// indexed. Other forms only resolve to indexed names.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if PRIMITIVES.contains(&name) {
            return Some(name.to_string());
        }
        match name.split_once('.') {
            Some((first, rest)) => self.resolve_dotted(name, first, rest),
            None => self.resolve_simple(name),
        }
    }

    fn resolve_simple(&self, name: &str) -> Option<String> {
        if self.is_type_variable(name) {
            return None;
        }

        for outer in self.enclosing.iter().rev() {
            if outer.rsplit('.').next() == Some(name) {
                return Some(outer.clone());
            }
            if let Some(member) = self.member_type(outer, name) {
                return Some(member);
            }
        }

        let suffix = format!(".{}", name);
        if let Some(import) = self.imports.single.iter().find(|i| i.ends_with(&suffix)) {
            return Some(import.clone());
        }

        let same_package = match self.package {
            Some(package) => format!("{}.{}", package, name),
            None => name.to_string(),
        };
        if self.index.contains(&same_package) {
            return Some(same_package);
        }

        for package in &self.imports.on_demand {
            let candidate = format!("{}.{}", package, name);
            if self.index.contains(&candidate) {
                return Some(candidate);
            }
        }

        let lang = format!("java.lang.{}", name);
        if self.index.contains(&lang) {
            return Some(lang);
        }
        None
    }

    fn resolve_dotted(&self, name: &str, first: &str, rest: &str) -> Option<String> {
        if self.index.contains(name) {
            return Some(name.to_string());
        }
        if let Some(outer) = self.resolve_simple(first) {
            return Some(format!("{}.{}", outer, rest));
        }
        // Lower-case first segments are package names.
        if first.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Some(name.to_string());
        }
        None
    }

    /// Member type `name` of `outer` or of one of its indexed supertypes.
    fn member_type(&self, outer: &str, name: &str) -> Option<String> {
        let direct = format!("{}.{}", outer, name);
        if self.index.contains(&direct) {
            return Some(direct);
        }
        let info = self.index.get(outer)?;
        self.index
            .supertypes(info)
            .into_iter()
            .map(|t| format!("{}.{}", t.qualified_name, name))
            .find(|candidate| self.index.contains(candidate))
    }

    /// Resolve the type written at `node`, erasing type arguments.
    ///
    /// Arrays keep a `[]` suffix per dimension. Type variables erase to
    /// `java.lang.Object`.
    pub fn resolve_node(&self, tree: &SyntaxTree, node: NodeId) -> Option<String> {
        match tree.kind(node) {
            NodeKind::TypeIdentifier | NodeKind::ScopedTypeIdentifier => {
                let text: String = tree
                    .text(node)
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                if self.is_type_variable(&text) {
                    return Some(super::builtins::OBJECT.to_string());
                }
                self.resolve(&text)
            }
            NodeKind::GenericType => {
                let raw = tree
                    .named_children(node)
                    .find(|&c| tree.kind(c) != NodeKind::TypeArguments)?;
                self.resolve_node(tree, raw)
            }
            NodeKind::ArrayType => {
                let element = tree.child_by_field(node, "element")?;
                let dimensions = tree
                    .child_by_field(node, "dimensions")
                    .map(|d| tree.text(d).matches('[').count())
                    .unwrap_or(1);
                let element = self.resolve_node(tree, element)?;
                Some(format!("{}{}", element, "[]".repeat(dimensions)))
            }
            NodeKind::VoidType
            | NodeKind::IntegralType
            | NodeKind::FloatingPointType
            | NodeKind::BooleanType => Some(tree.text(node).to_string()),
            NodeKind::Other("annotated_type") => {
                let inner = tree
                    .named_children(node)
                    .find(|&c| !tree.kind(c).is_annotation())?;
                self.resolve_node(tree, inner)
            }
            _ => None,
        }
    }

    /// The written name of a type node without type arguments.
    pub fn written_name(tree: &SyntaxTree, node: NodeId) -> String {
        let text = match tree.kind(node) {
            NodeKind::GenericType => tree
                .named_children(node)
                .find(|&c| tree.kind(c) != NodeKind::TypeArguments)
                .map(|raw| tree.text(raw))
                .unwrap_or_else(|| tree.text(node)),
            _ => tree.text(node),
        };
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }
}
