//! `indexOf("x")` where `indexOf('x')` would do.

use crate::analysis::builtins::STRING;
use crate::analysis::SemanticQuery;
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::arguments;

const METHODS: [&str; 2] = ["indexOf", "lastIndexOf"];

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    walk(tree, tree.root(), &mut StringIndexOf { query, reporter });
}

struct StringIndexOf<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for StringIndexOf<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if tree.kind(node) != NodeKind::MethodInvocation {
            return true;
        }
        let Some(target) = self.query.method_binding(node) else {
            return true;
        };
        let Some(method) = METHODS.iter().copied().find(|m| target.is(STRING, m)) else {
            return true;
        };
        if let [argument] = arguments(tree, node).as_slice() {
            let single_character = tree.kind(*argument) == NodeKind::StringLiteral
                && literal_value(tree.text(*argument)).map_or(false, |v| v.chars().count() == 1);
            if single_character {
                if let Some(name) = tree.child_by_field(node, "name") {
                    self.reporter.warning(
                        Problem::SingleCharacterStringLiteralIndexOf,
                        name,
                        &[method, method],
                    );
                }
            }
        }
        true
    }
}

/// Decoded value of a string literal, or `None` for text blocks and
/// malformed escapes.
fn literal_value(literal: &str) -> Option<String> {
    let body = literal.strip_prefix('"')?.strip_suffix('"')?;
    if body.starts_with("\"\"") {
        return None;
    }
    let mut out = String::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars.next()?;
        let decoded = match escape {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            's' => ' ',
            '0'..='7' => {
                // At most three digits, and only when the value fits in a byte.
                let mut value = escape.to_digit(8)?;
                let max_digits = if escape <= '3' { 3 } else { 2 };
                for _ in 1..max_digits {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                char::from_u32(value)?
            }
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?
            }
            other => other,
        };
        out.push(decoded);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::literal_value;
    use crate::detect::checks::testing::{check_main, flagged};
    use crate::detect::checks::Check;

    #[test]
    fn test_decodes_escapes() {
        assert_eq!(literal_value(r#""a""#).as_deref(), Some("a"));
        assert_eq!(literal_value(r#""\n""#).as_deref(), Some("\n"));
        assert_eq!(literal_value(r#""\\""#).as_deref(), Some("\\"));
        assert_eq!(literal_value(r#""A""#).as_deref(), Some("A"));
        assert_eq!(literal_value(r#""\101""#).as_deref(), Some("A"));
        assert_eq!(literal_value(r#""\7a""#).as_deref(), Some("\u{7}a"));
        assert_eq!(literal_value(r#""ab""#).as_deref(), Some("ab"));
        assert_eq!(literal_value(r#""""#).as_deref(), Some(""));
    }

    #[test]
    fn test_single_character_literals_are_flagged() {
        let source = r#"package com.example;

class Example {

    int search(String value) {
        int a = value.indexOf("a");
        int b = value.lastIndexOf("\n");
        int c = value.indexOf("ab");
        int d = value.indexOf('a');
        int e = value.indexOf("a", 2);
        int f = "text".indexOf("A");
        return a + b + c + d + e + f;
    }
}
"#;
        let markers = check_main(Check::StringIndexOf, source);
        let names: Vec<_> = markers.iter().map(|m| flagged(source, m)).collect();
        assert_eq!(names, vec!["indexOf", "lastIndexOf", "indexOf"]);
        assert_eq!(
            markers[1].message,
            "Use lastIndexOf(char) rather than lastIndexOf(String) when searching for a single character"
        );
    }

    #[test]
    fn test_other_index_of_methods_are_ignored() {
        let source = r#"package com.example;

import java.util.List;

class Example {

    int search(List<String> values) {
        return values.indexOf("a");
    }
}
"#;
        assert!(check_main(Check::StringIndexOf, source).is_empty());
    }
}
