//! `@Bean` methods belong on `@Configuration` classes.

use crate::analysis::SemanticQuery;
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::{BEAN, CONFIGURATION};

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    walk(tree, tree.root(), &mut BeanConfiguration { query, reporter });
}

struct BeanConfiguration<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for BeanConfiguration<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        match tree.kind(node) {
            NodeKind::ClassDeclaration => self.check_inherited(tree, node),
            NodeKind::MethodDeclaration => self.check_declared(node),
            _ => {}
        }
        true
    }
}

impl BeanConfiguration<'_, '_> {
    /// Subclasses of a type with bean methods must be configuration classes
    /// themselves for the inherited methods to be processed.
    fn check_inherited(&mut self, tree: &SyntaxTree, class: NodeId) {
        let query = self.query;
        let Some(info) = query.unit().type_at(class) else {
            return;
        };
        let inherits_beans = query
            .index()
            .superclasses(info)
            .iter()
            .any(|superclass| superclass.methods.iter().any(|m| m.has_annotation(BEAN)));
        if !inherits_beans || query.has_annotation(class, CONFIGURATION) {
            return;
        }
        let superclass_type = tree
            .child_by_field(class, "superclass")
            .and_then(|s| tree.named_children(s).find(|&c| !tree.kind(c).is_comment()));
        if let Some(anchor) = superclass_type {
            self.reporter
                .warning(Problem::NonConfigurationClassHasInheritedBeanMethods, anchor, &[]);
        }
    }

    fn check_declared(&mut self, method: NodeId) {
        let query = self.query;
        let Some(bean) = query.find_annotation(method, BEAN) else {
            return;
        };
        let Some(owner) = query.find_ancestor(method, |kind| {
            matches!(kind, NodeKind::ClassDeclaration | NodeKind::InterfaceDeclaration)
        }) else {
            return;
        };
        let Some(info) = query.unit().type_at(owner) else {
            return;
        };
        if info.kind.is_interface() || info.modifiers.is_abstract {
            return;
        }
        if !query.has_annotation(owner, CONFIGURATION) {
            self.reporter
                .warning(Problem::BeanMethodOnNonConfigurationClass, bean, &[]);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::checks::testing::{check_main, flagged, project, run_on};
    use crate::detect::checks::Check;

    #[test]
    fn test_bean_methods_need_a_configuration_class() {
        let source = r#"package com.example;

import org.springframework.context.annotation.Bean;

class Example {

    @Bean
    Object service() {
        return new Object();
    }
}
"#;
        let markers = check_main(Check::BeanMethodOnNonConfiguration, source);
        assert_eq!(markers.len(), 1);
        assert_eq!(flagged(source, &markers[0]), "@Bean");
        assert_eq!(markers[0].problem_id, "14");
    }

    #[test]
    fn test_configuration_abstract_and_interface_owners_pass() {
        let configuration = r#"package com.example;

import org.springframework.boot.autoconfigure.SpringBootApplication;
import org.springframework.context.annotation.Bean;

@SpringBootApplication
class Example {

    @Bean
    Object service() {
        return new Object();
    }
}
"#;
        assert!(check_main(Check::BeanMethodOnNonConfiguration, configuration).is_empty());

        let abstract_class = r#"package com.example;

import org.springframework.context.annotation.Bean;

abstract class Example {

    @Bean
    Object service() {
        return new Object();
    }
}
"#;
        assert!(check_main(Check::BeanMethodOnNonConfiguration, abstract_class).is_empty());

        let interface = r#"package com.example;

import org.springframework.context.annotation.Bean;

interface Example {

    @Bean
    default Object service() {
        return new Object();
    }
}
"#;
        assert!(check_main(Check::BeanMethodOnNonConfiguration, interface).is_empty());
    }

    #[test]
    fn test_inherited_bean_methods_need_a_configuration_subclass() {
        let base = r#"package com.example;

import org.springframework.context.annotation.Bean;

abstract class BaseConfiguration {

    @Bean
    Object service() {
        return new Object();
    }
}
"#;
        let child = "package com.example;\n\nclass ChildConfiguration extends BaseConfiguration {\n}\n";
        let configured = "package com.example;\n\nimport org.springframework.context.annotation.Configuration;\n\n@Configuration\nclass OtherConfiguration extends BaseConfiguration {\n}\n";
        let base_resource = "src/main/java/com/example/BaseConfiguration.java";
        let child_resource = "src/main/java/com/example/ChildConfiguration.java";
        let configured_resource = "src/main/java/com/example/OtherConfiguration.java";
        let configurations = project(&[
            (base_resource, base),
            (child_resource, child),
            (configured_resource, configured),
        ]);

        let markers = run_on(&configurations, Check::BeanMethodOnNonConfiguration, child_resource);
        assert_eq!(markers.len(), 1);
        assert_eq!(flagged(child, &markers[0]), "BaseConfiguration");
        assert_eq!(markers[0].problem_id, "15");

        assert!(
            run_on(&configurations, Check::BeanMethodOnNonConfiguration, configured_resource)
                .is_empty()
        );
        assert!(run_on(&configurations, Check::BeanMethodOnNonConfiguration, base_resource).is_empty());
    }
}
