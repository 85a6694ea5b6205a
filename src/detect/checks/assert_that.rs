//! `assertThat(...)` without an assertion on its result.

use crate::analysis::SemanticQuery;
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::ASSERTIONS;

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    walk(tree, tree.root(), &mut IncompleteAssertThat { query, reporter });
}

struct IncompleteAssertThat<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for IncompleteAssertThat<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if tree.kind(node) != NodeKind::ExpressionStatement {
            return true;
        }
        let Some(expression) = tree.named_children(node).next() else {
            return false;
        };
        let assert_that = tree.descendants(expression).into_iter().find(|&n| {
            tree.kind(n) == NodeKind::MethodInvocation
                && self
                    .query
                    .method_binding(n)
                    .map_or(false, |target| target.is(ASSERTIONS, "assertThat"))
        });
        if let Some(invocation) = assert_that {
            if !is_receiver(tree, invocation) {
                self.reporter
                    .error(Problem::IncompleteUseOfAssertThat, invocation, &[]);
            }
        }
        false
    }
}

/// Whether `invocation` is the object another method is invoked on.
fn is_receiver(tree: &SyntaxTree, invocation: NodeId) -> bool {
    tree.node(invocation).field == Some("object")
        && tree
            .parent(invocation)
            .map_or(false, |p| tree.kind(p) == NodeKind::MethodInvocation)
}

#[cfg(test)]
mod tests {
    use crate::detect::checks::testing::{flagged, project, run_on};
    use crate::detect::checks::Check;

    const RESOURCE: &str = "src/test/java/com/example/ExampleTests.java";

    fn check(source: &str) -> Vec<String> {
        let tests = project(&[(RESOURCE, source)]);
        run_on(&tests, Check::IncompleteAssertThat, RESOURCE)
            .iter()
            .map(|m| flagged(source, m).to_string())
            .collect()
    }

    #[test]
    fn test_bare_assert_that_is_an_error() {
        let source = r#"package com.example;

import static org.assertj.core.api.Assertions.assertThat;

class ExampleTests {

    void incomplete() {
        assertThat("x");
    }

    void complete() {
        assertThat("x").isEqualTo("x");
    }
}
"#;
        assert_eq!(check(source), vec!["assertThat(\"x\")"]);
    }

    #[test]
    fn test_qualified_and_wildcard_imports_resolve() {
        let source = r#"package com.example;

import org.assertj.core.api.Assertions;

class ExampleTests {

    void incomplete() {
        Assertions.assertThat(1);
    }
}
"#;
        assert_eq!(check(source), vec!["Assertions.assertThat(1)"]);

        let wildcard = r#"package com.example;

import static org.assertj.core.api.Assertions.*;

class ExampleTests {

    void incomplete() {
        assertThat(1);
    }
}
"#;
        assert_eq!(check(wildcard).len(), 1);
    }

    #[test]
    fn test_other_assert_that_methods_are_ignored() {
        let source = r#"package com.example;

class ExampleTests {

    void local() {
        assertThat("x");
    }

    private Object assertThat(Object value) {
        return value;
    }
}
"#;
        assert!(check(source).is_empty());
    }
}
