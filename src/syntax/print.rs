//! Serialization of a (possibly edited) tree back to source text.
//!
//! Untouched subtrees are copied from the original text. Nodes on the path
//! to an edit are rebuilt child by child, keeping the original text between
//! children so formatting and comments survive.

use super::{Insertion, NodeId, NodeKind, Origin, SyntaxTree};

/// Render the tree as source text.
pub fn print(tree: &SyntaxTree) -> String {
    let source = tree.source();
    let root = tree.span(tree.root());
    let mut printer = Printer {
        tree,
        out: String::with_capacity(source.len() + 128),
    };
    printer.out.push_str(&source[..root.start]);
    printer.node(tree.root());
    printer.out.push_str(&source[root.end..]);
    printer.out
}

struct Printer<'a> {
    tree: &'a SyntaxTree,
    out: String,
}

impl Printer<'_> {
    fn node(&mut self, id: NodeId) {
        let tree = self.tree;
        let node = tree.node(id);
        if !node.dirty {
            self.out.push_str(tree.text(id));
            return;
        }

        let source = tree.source();
        let end = node.span.end;
        let mut cursor = node.span.start;
        let mut emitted = false;
        // Output length before the gap kept ahead of a removed child.
        let mut gap: Option<usize> = None;
        let children = &node.children;

        for (index, &child_id) in children.iter().enumerate() {
            let child = tree.node(child_id);
            match &child.origin {
                Origin::Inserted(Insertion::Keyword(keyword)) => {
                    if emitted && gap.take().is_none() {
                        self.out.push(' ');
                    }
                    self.out.push_str(keyword);
                    let more = children[index + 1..]
                        .iter()
                        .any(|&next| !tree.node(next).removed);
                    if !emitted && more {
                        self.out.push(' ');
                    }
                    emitted = true;
                    continue;
                }
                Origin::Inserted(Insertion::Text(text)) => {
                    gap = None;
                    self.out.push_str(&source[cursor..child.span.start.max(cursor)]);
                    cursor = cursor.max(child.span.start);
                    self.out.push_str(text);
                    emitted = true;
                    continue;
                }
                Origin::Parsed => {}
            }

            if child.removed {
                if emitted && gap.is_none() {
                    gap = Some(self.out.len());
                    self.out.push_str(&source[cursor..child.span.start]);
                }
                cursor = skip_whitespace(source, child.span.end, end);
                continue;
            }

            gap = None;
            self.out.push_str(&source[cursor..child.span.start]);
            if node.kind == NodeKind::LambdaExpression
                && node.parenthesized
                && child.field == Some("parameters")
                && child.kind == NodeKind::Identifier
            {
                self.out.push('(');
                self.node(child_id);
                self.out.push(')');
            } else {
                self.node(child_id);
            }
            cursor = child.span.end;
            emitted = true;
        }

        if let Some(len) = gap {
            if cursor >= end {
                self.out.truncate(len);
            }
        }
        self.out.push_str(&source[cursor..end]);
    }
}

fn skip_whitespace(source: &str, from: usize, limit: usize) -> usize {
    let bytes = source.as_bytes();
    let mut at = from;
    while at < limit && bytes[at].is_ascii_whitespace() {
        at += 1;
    }
    at
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_source;
    use crate::syntax::{print, Edit, Insertion, NodeKind};

    fn find(tree: &crate::syntax::SyntaxTree, kind: NodeKind) -> crate::syntax::NodeId {
        tree.descendants(tree.root())
            .into_iter()
            .find(|&id| tree.kind(id) == kind)
            .unwrap()
    }

    #[test]
    fn test_unmodified_tree_prints_verbatim() {
        let source = "// header\npackage a;\n\nclass A {\n    int x; // trailing\n}\n";
        let tree = parse_source(source).unwrap();
        assert_eq!(print(&tree), source);
    }

    #[test]
    fn test_removal_takes_following_whitespace() {
        let source = "class A {\n    @Deprecated\n    private int x;\n}\n";
        let mut tree = parse_source(source).unwrap();
        let annotation = find(&tree, NodeKind::MarkerAnnotation);
        tree.apply(&[Edit::Remove(annotation)]).unwrap();
        assert_eq!(print(&tree), "class A {\n    private int x;\n}\n");
    }

    #[test]
    fn test_keywords_join_existing_modifiers() {
        let source = "class A {\n    private int x;\n}\n";
        let mut tree = parse_source(source).unwrap();
        let modifiers = find(&tree, NodeKind::Modifiers);
        tree.apply(&[Edit::Append {
            parent: modifiers,
            insertion: Insertion::Keyword("final"),
        }])
        .unwrap();
        assert_eq!(print(&tree), "class A {\n    private final int x;\n}\n");
    }

    #[test]
    fn test_lambda_parameter_gains_parentheses() {
        let source = "class A { Runnable r = () -> list.forEach(x -> use(x)); }";
        let mut tree = parse_source(source).unwrap();
        let lambda = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|&id| tree.kind(id) == NodeKind::LambdaExpression)
            .nth(1)
            .unwrap();
        tree.apply(&[Edit::Parenthesize(lambda)]).unwrap();
        assert_eq!(
            print(&tree),
            "class A { Runnable r = () -> list.forEach((x) -> use(x)); }"
        );
    }

    #[test]
    fn test_text_is_inserted_after_anchor() {
        let source = "class A {\n    int x;\n\n    void m() {}\n}\n";
        let mut tree = parse_source(source).unwrap();
        let field = find(&tree, NodeKind::FieldDeclaration);
        tree.apply(&[Edit::InsertAfter {
            anchor: field,
            insertion: Insertion::Text("\n\n    A() {}".to_string()),
        }])
        .unwrap();
        assert_eq!(
            print(&tree),
            "class A {\n    int x;\n\n    A() {}\n\n    void m() {}\n}\n"
        );
    }

    #[test]
    fn test_trailing_removal_keeps_single_separator() {
        let source = "class A {\n    private @Deprecated int x;\n}\n";
        let mut tree = parse_source(source).unwrap();
        let annotation = find(&tree, NodeKind::MarkerAnnotation);
        tree.apply(&[Edit::Remove(annotation)]).unwrap();
        assert_eq!(print(&tree), "class A {\n    private int x;\n}\n");

        let mut tree = parse_source(source).unwrap();
        let annotation = find(&tree, NodeKind::MarkerAnnotation);
        let modifiers = find(&tree, NodeKind::Modifiers);
        tree.apply(&[
            Edit::Remove(annotation),
            Edit::Append {
                parent: modifiers,
                insertion: Insertion::Keyword("final"),
            },
        ])
        .unwrap();
        assert_eq!(print(&tree), "class A {\n    private final int x;\n}\n");
    }
}
