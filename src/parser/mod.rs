//! Java front end.
//!
//! Source text is parsed with tree-sitter-java and lowered into an owned
//! [`SyntaxTree`]. Every grammar node is kept, anonymous tokens included, so
//! the lowered tree can be printed back to the original text. Javadoc
//! comments are further split into link nodes (see [`javadoc`]).

mod javadoc;

use once_cell::sync::Lazy;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser as TsParser, Query, QueryCursor, TreeCursor};

use crate::syntax::{Node, NodeId, NodeKind, Span, SyntaxTree};

static JAVA: Lazy<Language> = Lazy::new(|| tree_sitter_java::LANGUAGE.into());

/// Tree-sitter query for the package and import declarations of a unit.
const HEADER_QUERY: &str = r#"
(package_declaration
  [(identifier) (scoped_identifier)] @package
)

(import_declaration) @import
"#;

/// Imports of a compilation unit, split by form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports {
    /// `import a.b.C;`
    pub single: Vec<String>,
    /// `import a.b.*;` stored as `a.b`
    pub on_demand: Vec<String>,
    /// `import static a.b.C.m;`
    pub static_single: Vec<String>,
    /// `import static a.b.C.*;` stored as `a.b.C`
    pub static_on_demand: Vec<String>,
}

impl Imports {
    /// Whether `qualified_name` is imported by a single-type import.
    pub fn imports_type(&self, qualified_name: &str) -> bool {
        self.single.iter().any(|i| i == qualified_name)
    }

    fn add(&mut self, text: &str) {
        let body = text
            .trim()
            .trim_start_matches("import")
            .trim_end()
            .trim_end_matches(';');
        let body: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
        let (is_static, path) = match body.strip_prefix("static ") {
            Some(rest) => (true, rest),
            None => (false, body.as_str()),
        };
        let path: String = path.chars().filter(|c| !c.is_whitespace()).collect();
        match (is_static, path.strip_suffix(".*")) {
            (false, Some(package)) => self.on_demand.push(package.to_string()),
            (false, None) => self.single.push(path),
            (true, Some(class)) => self.static_on_demand.push(class.to_string()),
            (true, None) => self.static_single.push(path),
        }
    }
}

/// Package and imports of a compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub package: Option<String>,
    pub imports: Imports,
}

/// A lowered tree together with its header.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub tree: SyntaxTree,
    pub header: Header,
    /// Whether tree-sitter recovered from syntax errors.
    pub has_errors: bool,
}

/// Parse Java source text.
pub fn parse(source: &str) -> anyhow::Result<ParsedSource> {
    let mut parser = TsParser::new();
    parser.set_language(&JAVA)?;
    let ts_tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse source"))?;

    let header = read_header(&ts_tree, source)?;

    let mut nodes = Vec::new();
    let mut cursor = ts_tree.walk();
    let root = lower_node(&mut nodes, &mut cursor, None);
    let mut tree = SyntaxTree::from_parts(source.to_string(), nodes, root);
    javadoc::lower(&mut tree);

    Ok(ParsedSource {
        tree,
        header,
        has_errors: ts_tree.root_node().has_error(),
    })
}

/// Parse Java source text, keeping only the tree.
pub fn parse_source(source: &str) -> anyhow::Result<SyntaxTree> {
    Ok(parse(source)?.tree)
}

fn read_header(ts_tree: &tree_sitter::Tree, source: &str) -> anyhow::Result<Header> {
    let query = Query::new(&JAVA, HEADER_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, ts_tree.root_node(), source.as_bytes());

    let mut header = Header::default();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let text = capture.node.utf8_text(source.as_bytes()).unwrap_or("");
            match query.capture_names()[capture.index as usize] {
                "package" => {
                    let package: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                    header.package = Some(package);
                }
                "import" => header.imports.add(text),
                _ => {}
            }
        }
    }
    Ok(header)
}

fn lower_node(nodes: &mut Vec<Node>, cursor: &mut TreeCursor, parent: Option<NodeId>) -> NodeId {
    let ts_node = cursor.node();
    let kind = NodeKind::from_grammar(ts_node.kind(), ts_node.is_named());
    let id = NodeId::new(nodes.len());
    nodes.push(Node::parsed(
        kind,
        Span::new(ts_node.start_byte(), ts_node.end_byte()),
        cursor.field_name(),
        parent,
    ));

    if cursor.goto_first_child() {
        loop {
            let child = lower_node(nodes, cursor, Some(id));
            nodes[id.index()].children.push(child);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_package_and_imports() {
        let parsed = parse(
            r#"package com.example.app;

import java.util.List;
import java.util.concurrent.*;
import static org.assertj.core.api.Assertions.assertThat;
import static org.mockito.Mockito.*;

class A {}
"#,
        )
        .unwrap();

        let header = parsed.header;
        assert_eq!(header.package.as_deref(), Some("com.example.app"));
        assert_eq!(header.imports.single, vec!["java.util.List"]);
        assert_eq!(header.imports.on_demand, vec!["java.util.concurrent"]);
        assert_eq!(
            header.imports.static_single,
            vec!["org.assertj.core.api.Assertions.assertThat"]
        );
        assert_eq!(header.imports.static_on_demand, vec!["org.mockito.Mockito"]);
        assert!(!parsed.has_errors);
    }

    #[test]
    fn test_default_package_has_no_name() {
        let parsed = parse("class A {}").unwrap();
        assert_eq!(parsed.header.package, None);
    }

    #[test]
    fn test_keeps_fields_and_tokens() {
        let tree = parse_source("class A { void m(int x) {} }").unwrap();
        let method = tree
            .descendants(tree.root())
            .into_iter()
            .find(|&id| tree.kind(id) == NodeKind::MethodDeclaration)
            .unwrap();
        let name = tree.child_by_field(method, "name").unwrap();
        assert_eq!(tree.text(name), "m");
        let params = tree.child_by_field(method, "parameters").unwrap();
        assert!(tree.has_token(params, "("));
        assert_eq!(tree.named_children(params).count(), 1);
    }
}
