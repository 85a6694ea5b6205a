//! A parsed and bound compilation unit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::parser::{Header, ParsedSource};
use crate::syntax::{NodeId, SyntaxTree};

use super::declare::Declarations;
use super::model::{Binding, MethodInfo, TypeInfo};

/// One Java source file with its tree and semantic facts.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    path: PathBuf,
    resource: String,
    tree: SyntaxTree,
    header: Header,
    has_errors: bool,
    pub(crate) declarations: Declarations,
    pub(crate) bindings: HashMap<NodeId, Binding>,
}

impl CompilationUnit {
    pub(crate) fn new(path: PathBuf, resource: String, parsed: ParsedSource) -> Self {
        Self {
            path,
            resource,
            tree: parsed.tree,
            header: parsed.header,
            has_errors: parsed.has_errors,
            declarations: Declarations::default(),
            bindings: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project-relative, `/`-separated path.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn package(&self) -> Option<&str> {
        self.header.package.as_deref()
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn binding(&self, node: NodeId) -> Option<&Binding> {
        self.bindings.get(&node)
    }

    /// Types declared in this unit, anonymous classes included.
    pub fn types(&self) -> &[TypeInfo] {
        &self.declarations.types
    }

    /// Type declared at a declaration node (or anonymous class body).
    pub fn type_at(&self, node: NodeId) -> Option<&TypeInfo> {
        self.declarations
            .by_node
            .get(&node)
            .map(|&slot| &self.declarations.types[slot])
    }

    /// Nearest type declaration strictly enclosing `node`.
    pub fn enclosing_type(&self, node: NodeId) -> Option<&TypeInfo> {
        self.tree
            .ancestors(node)
            .find_map(|ancestor| self.type_at(ancestor))
    }

    /// Signature of the method or constructor declared at `node`, with the
    /// type that declares it.
    pub fn method_at(&self, node: NodeId) -> Option<(&TypeInfo, &MethodInfo)> {
        let owner = self.enclosing_type(node)?;
        let method = owner.methods.iter().find(|m| m.node == Some(node))?;
        Some((owner, method))
    }
}
