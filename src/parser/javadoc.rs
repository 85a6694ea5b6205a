//! Javadoc structure.
//!
//! tree-sitter-java treats `/** ... */` as a plain block comment. Lowering
//! retags such comments as [`NodeKind::Javadoc`] and adds one
//! [`NodeKind::JavadocLink`] child per `{@link ...}` tag. A link holds a
//! [`NodeKind::JavadocReference`] for the linked name and, when present, a
//! [`NodeKind::JavadocText`] for the label that follows it.

use lazy_static::lazy_static;
use regex::Regex;

use crate::syntax::{Node, NodeId, NodeKind, Span, SyntaxTree};

lazy_static! {
    static ref LINK: Regex = Regex::new(r"\{@link\s+([^\s}]+)([^}]*)\}").unwrap();
}

pub(super) fn lower(tree: &mut SyntaxTree) {
    let comments: Vec<NodeId> = (0..tree.len())
        .map(NodeId::new)
        .filter(|&id| tree.kind(id) == NodeKind::BlockComment)
        .filter(|&id| {
            let text = tree.text(id);
            text.starts_with("/**") && text != "/**/"
        })
        .collect();

    for comment in comments {
        tree.node_mut(comment).kind = NodeKind::Javadoc;
        let base = tree.span(comment).start;
        let links: Vec<(Span, Span, Option<Span>)> = LINK
            .captures_iter(tree.text(comment))
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                let text = caps.get(2).and_then(|label| {
                    let trimmed = trim_label(label.as_str());
                    if trimmed.is_empty() {
                        return None;
                    }
                    let offset = label.as_str().find(trimmed)?;
                    let start = base + label.start() + offset;
                    Some(Span::new(start, start + trimmed.len()))
                });
                Some((
                    Span::new(base + whole.start(), base + whole.end()),
                    Span::new(base + name.start(), base + name.end()),
                    text,
                ))
            })
            .collect();

        for (link_span, name_span, text_span) in links {
            let link = tree.push(Node::parsed(
                NodeKind::JavadocLink,
                link_span,
                None,
                Some(comment),
            ));
            tree.node_mut(comment).children.push(link);
            let reference = tree.push(Node::parsed(
                NodeKind::JavadocReference,
                name_span,
                Some("name"),
                Some(link),
            ));
            tree.node_mut(link).children.push(reference);
            if let Some(text_span) = text_span {
                let text = tree.push(Node::parsed(
                    NodeKind::JavadocText,
                    text_span,
                    Some("text"),
                    Some(link),
                ));
                tree.node_mut(link).children.push(text);
            }
        }
    }
}

/// Label text with surrounding whitespace and line-leading `*` removed.
fn trim_label(label: &str) -> &str {
    label.trim_matches(|c: char| c.is_whitespace() || c == '*')
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_source;
    use crate::syntax::NodeKind;

    #[test]
    fn test_links_become_nodes() {
        let source = "/**\n * See {@link Configuration @Configuration} and {@link Bean}.\n */\nclass A {}";
        let tree = parse_source(source).unwrap();
        let links: Vec<_> = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|&id| tree.kind(id) == NodeKind::JavadocLink)
            .collect();
        assert_eq!(links.len(), 2);

        let first = tree.child_by_field(links[0], "name").unwrap();
        assert_eq!(tree.text(first), "Configuration");
        let label = tree.child_by_field(links[0], "text").unwrap();
        assert_eq!(tree.text(label), "@Configuration");

        let second = tree.child_by_field(links[1], "name").unwrap();
        assert_eq!(tree.text(second), "Bean");
        assert!(tree.child_by_field(links[1], "text").is_none());
    }

    #[test]
    fn test_plain_block_comments_are_untouched() {
        let tree = parse_source("/* {@link Foo} */\nclass A {}").unwrap();
        assert!(tree
            .descendants(tree.root())
            .into_iter()
            .all(|id| tree.kind(id) != NodeKind::JavadocLink));
    }
}
