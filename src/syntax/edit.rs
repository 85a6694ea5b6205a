//! Recorded modifications to a [`SyntaxTree`].

use super::{Node, NodeId, NodeKind, Origin, Span, SyntaxTree};
use crate::error::Error;

/// Text introduced by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// A modifier keyword, separated from its neighbours by single spaces.
    Keyword(&'static str),
    /// Source text emitted verbatim, including any leading line breaks.
    Text(String),
}

/// A single change to a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Drop a node together with the whitespace that follows it.
    Remove(NodeId),
    /// Add a node as the last child of `parent`.
    Append { parent: NodeId, insertion: Insertion },
    /// Add a node directly after `anchor`, as its sibling.
    InsertAfter { anchor: NodeId, insertion: Insertion },
    /// Add a node as the first child of `parent`.
    Prepend { parent: NodeId, insertion: Insertion },
    /// Wrap the parameter of a lambda expression in parentheses.
    Parenthesize(NodeId),
}

impl SyntaxTree {
    /// Apply a batch of edits.
    ///
    /// Every edit is validated before any is applied, so a rejected batch
    /// leaves the tree as it was. An edit may not target a node that an
    /// earlier edit of the same batch removes, nor anything inside it.
    pub fn apply(&mut self, edits: &[Edit]) -> Result<(), Error> {
        let mut removed: Vec<NodeId> = Vec::new();
        for edit in edits {
            self.validate(edit, &removed)?;
            if let Edit::Remove(id) = edit {
                removed.push(*id);
            }
        }
        for edit in edits {
            match edit {
                Edit::Remove(id) => {
                    self.node_mut(*id).removed = true;
                    if let Some(parent) = self.parent(*id) {
                        self.mark_dirty(parent);
                    }
                }
                Edit::Append { parent, insertion } => {
                    let index = self.node(*parent).children.len();
                    let at = self.span(*parent).end;
                    self.insert(*parent, index, at, insertion.clone());
                }
                Edit::Prepend { parent, insertion } => {
                    let at = self.span(*parent).start;
                    self.insert(*parent, 0, at, insertion.clone());
                }
                Edit::InsertAfter { anchor, insertion } => {
                    let parent = self.parent(*anchor).ok_or_else(|| {
                        Error::InvalidEdit(format!("node {} has no parent", anchor))
                    })?;
                    let index = self
                        .node(parent)
                        .children
                        .iter()
                        .position(|child| child == anchor)
                        .map(|i| i + 1)
                        .ok_or_else(|| {
                            Error::InvalidEdit(format!("node {} is detached", anchor))
                        })?;
                    let at = self.span(*anchor).end;
                    self.insert(parent, index, at, insertion.clone());
                }
                Edit::Parenthesize(lambda) => {
                    self.node_mut(*lambda).parenthesized = true;
                    self.mark_dirty(*lambda);
                }
            }
        }
        Ok(())
    }

    fn validate(&self, edit: &Edit, removed: &[NodeId]) -> Result<(), Error> {
        let target = match edit {
            Edit::Remove(id) | Edit::Parenthesize(id) => *id,
            Edit::Append { parent, .. } | Edit::Prepend { parent, .. } => *parent,
            Edit::InsertAfter { anchor, .. } => *anchor,
        };
        if target.index() >= self.len() {
            return Err(Error::InvalidEdit(format!("unknown node {}", target)));
        }
        let node = self.node(target);
        let inside_removed = std::iter::once(target)
            .chain(self.ancestors(target))
            .any(|id| self.node(id).removed || removed.contains(&id));
        if inside_removed || node.is_inserted() {
            return Err(Error::InvalidEdit(format!(
                "node {} cannot be edited",
                target
            )));
        }
        if let Edit::Parenthesize(id) = edit {
            if node.kind != NodeKind::LambdaExpression {
                return Err(Error::InvalidEdit(format!("node {} is not a lambda", id)));
            }
        }
        if let Edit::Remove(id) | Edit::InsertAfter { anchor: id, .. } = edit {
            if *id == self.root() {
                return Err(Error::InvalidEdit(format!(
                    "the root cannot be the target of {:?}",
                    edit
                )));
            }
        }
        Ok(())
    }

    fn insert(&mut self, parent: NodeId, index: usize, at: usize, insertion: Insertion) {
        let mut node = Node::parsed(
            NodeKind::Other("inserted"),
            Span::new(at, at),
            None,
            Some(parent),
        );
        node.origin = Origin::Inserted(insertion);
        let id = self.push(node);
        self.node_mut(parent).children.insert(index, id);
        self.mark_dirty(parent);
    }

    fn mark_dirty(&mut self, from: NodeId) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.node_mut(id);
            if node.dirty {
                break;
            }
            node.dirty = true;
            current = node.parent;
        }
    }

    /// Whether any edit has been applied.
    pub fn is_modified(&self) -> bool {
        self.node(self.root()).dirty
    }
}
