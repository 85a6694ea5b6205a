//! `@Autowired` placement.

use crate::analysis::SemanticQuery;
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::{members, AUTOWIRED, CONFIGURATION};

/// Flags `@Autowired` on the only constructor of a class.
pub(super) fn single_constructor(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    walk(
        tree,
        tree.root(),
        &mut SingleConstructor {
            query,
            reporter,
        },
    );
}

/// Flags `@Autowired` fields of `@Configuration` classes.
pub(super) fn configuration_fields(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    walk(
        tree,
        tree.root(),
        &mut ConfigurationFields {
            query,
            reporter,
        },
    );
}

struct SingleConstructor<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for SingleConstructor<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if tree.kind(node) != NodeKind::ClassDeclaration {
            return true;
        }
        let constructors: Vec<NodeId> = members(tree, node)
            .into_iter()
            .filter(|&m| tree.kind(m) == NodeKind::ConstructorDeclaration)
            .collect();
        if let [constructor] = constructors.as_slice() {
            if let Some(autowired) = self.query.find_annotation(*constructor, AUTOWIRED) {
                self.reporter
                    .warning(Problem::AutowiredSingleConstructor, autowired, &[]);
            }
        }
        true
    }
}

struct ConfigurationFields<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for ConfigurationFields<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if tree.kind(node) != NodeKind::ClassDeclaration
            || self.query.find_annotation(node, CONFIGURATION).is_none()
        {
            return true;
        }
        for field in members(tree, node) {
            if tree.kind(field) != NodeKind::FieldDeclaration {
                continue;
            }
            if let Some(autowired) = self.query.find_annotation(field, AUTOWIRED) {
                self.reporter.warning(
                    Problem::ConfigurationClassConstructorInjection,
                    autowired,
                    &[],
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::checks::testing::{check_main, flagged};
    use crate::detect::checks::Check;

    #[test]
    fn test_autowired_sole_constructor_is_flagged_at_the_annotation() {
        let source = r#"package com.example;

import org.springframework.beans.factory.annotation.Autowired;

class Example {
    private final Object dependency;

    @Autowired
    Example(Object dependency) {
        this.dependency = dependency;
    }
}
"#;
        let markers = check_main(Check::AutowiredSingleConstructor, source);
        assert_eq!(markers.len(), 1);
        assert_eq!(flagged(source, &markers[0]), "@Autowired");
        assert_eq!(markers[0].location.as_deref(), Some("Line 8"));
    }

    #[test]
    fn test_multiple_constructors_are_not_flagged() {
        let source = r#"package com.example;

import org.springframework.beans.factory.annotation.Autowired;

class Example {
    @Autowired
    Example(Object dependency) {
    }

    Example() {
    }
}
"#;
        assert!(check_main(Check::AutowiredSingleConstructor, source).is_empty());
    }

    #[test]
    fn test_unresolved_annotation_is_skipped() {
        let source = "package com.example;\nclass Example { @Autowired Example() {} }";
        assert!(check_main(Check::AutowiredSingleConstructor, source).is_empty());
    }

    #[test]
    fn test_autowired_fields_in_configuration_classes() {
        let source = r#"package com.example;

import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.context.annotation.Configuration;

@Configuration
class Example {
    @Autowired
    private Object first;

    @Autowired(required = false)
    private Object second;

    private Object plain;
}

class NotConfiguration {
    @Autowired
    private Object field;
}
"#;
        let markers = check_main(Check::ConfigurationConstructorInjection, source);
        assert_eq!(markers.len(), 2);
        assert_eq!(flagged(source, &markers[0]), "@Autowired");
        assert_eq!(flagged(source, &markers[1]), "@Autowired(required = false)");
        assert!(markers.iter().all(|m| m.problem_id == "0"));
    }
}
