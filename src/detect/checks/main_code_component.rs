//! `@Component` in Spring Boot's own main code.

use crate::analysis::{SemanticQuery, SourceLocation};
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::COMPONENT;

const RESTRICTED_PACKAGE: &str = "org.springframework.boot.";

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    walk(tree, tree.root(), &mut MainCodeComponents { query, reporter });
}

struct MainCodeComponents<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for MainCodeComponents<'_, '_> {
    /// Only top-level types are inspected; nested types are never entered.
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if !matches!(
            tree.kind(node),
            NodeKind::ClassDeclaration | NodeKind::InterfaceDeclaration
        ) {
            return true;
        }
        let Some(name) = self.query.type_binding(node) else {
            return false;
        };
        if name.starts_with(RESTRICTED_PACKAGE)
            && self.query.classify_location() == SourceLocation::Main
            && self.query.has_annotation(node, COMPONENT)
        {
            self.reporter.warning(Problem::MainCodeComponent, node, &[]);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::checks::testing::{project, run_on};
    use crate::detect::checks::Check;

    const SOURCE: &str = r#"package org.springframework.boot.example;

import org.springframework.stereotype.Service;

@Service
public class ExampleService {

    @Service
    static class Nested {
    }
}
"#;

    #[test]
    fn test_meta_annotated_component_in_boot_main_code() {
        let resource = "spring-boot/src/main/java/org/springframework/boot/example/ExampleService.java";
        let boot = project(&[(resource, SOURCE)]);
        let markers = run_on(&boot, Check::MainCodeComponent, resource);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].char_start, Some(SOURCE.find("@Service").unwrap()));
    }

    #[test]
    fn test_code_and_other_packages_are_ignored() {
        let test_resource = "src/test/java/org/springframework/boot/example/ExampleService.java";
        let tests = project(&[(test_resource, SOURCE)]);
        assert!(run_on(&tests, Check::MainCodeComponent, test_resource).is_empty());

        let other = SOURCE.replace("org.springframework.boot.example", "com.example");
        let resource = "src/main/java/com/example/ExampleService.java";
        let elsewhere = project(&[(resource, other.as_str())]);
        assert!(run_on(&elsewhere, Check::MainCodeComponent, resource).is_empty());
    }
}
