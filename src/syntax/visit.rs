//! Depth-first traversal over a [`SyntaxTree`].

use super::{NodeId, SyntaxTree};

/// Callback interface for [`walk`].
///
/// `visit` runs before a node's children and decides whether they are
/// visited; `leave` runs after them, and only for nodes whose `visit`
/// returned `true`.
pub trait Visitor {
    fn visit(&mut self, _tree: &SyntaxTree, _node: NodeId) -> bool {
        true
    }

    fn leave(&mut self, _tree: &SyntaxTree, _node: NodeId) {}
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Walk the subtree rooted at `start` in source order.
///
/// Uses an explicit stack so deeply nested expressions cannot overflow the
/// call stack.
pub fn walk<V: Visitor + ?Sized>(tree: &SyntaxTree, start: NodeId, visitor: &mut V) {
    let mut stack = vec![Step::Enter(start)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(node) => {
                if !visitor.visit(tree, node) {
                    continue;
                }
                stack.push(Step::Leave(node));
                let children: Vec<NodeId> = tree.children(node).collect();
                stack.extend(children.into_iter().rev().map(Step::Enter));
            }
            Step::Leave(node) => visitor.leave(tree, node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::syntax::NodeKind;

    struct Recorder {
        entered: Vec<NodeKind>,
        left: Vec<NodeKind>,
        stop_at: Option<NodeKind>,
    }

    impl Visitor for Recorder {
        fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
            let kind = tree.kind(node);
            if kind.is_token() {
                return false;
            }
            self.entered.push(kind);
            Some(kind) != self.stop_at
        }

        fn leave(&mut self, tree: &SyntaxTree, node: NodeId) {
            self.left.push(tree.kind(node));
        }
    }

    #[test]
    fn test_visits_in_source_order_and_leaves_after_children() {
        let tree = parse_source("class A { void m() {} }").unwrap();
        let mut recorder = Recorder {
            entered: Vec::new(),
            left: Vec::new(),
            stop_at: None,
        };
        walk(&tree, tree.root(), &mut recorder);

        let class_at = recorder
            .entered
            .iter()
            .position(|k| *k == NodeKind::ClassDeclaration)
            .unwrap();
        let method_at = recorder
            .entered
            .iter()
            .position(|k| *k == NodeKind::MethodDeclaration)
            .unwrap();
        assert!(class_at < method_at);
        assert_eq!(recorder.left.last(), Some(&NodeKind::Program));
    }

    #[test]
    fn test_returning_false_skips_children() {
        let tree = parse_source("class A { void m() {} }").unwrap();
        let mut recorder = Recorder {
            entered: Vec::new(),
            left: Vec::new(),
            stop_at: Some(NodeKind::ClassBody),
        };
        walk(&tree, tree.root(), &mut recorder);
        assert!(!recorder.entered.contains(&NodeKind::MethodDeclaration));
        assert!(!recorder.left.contains(&NodeKind::ClassBody));
    }
}
