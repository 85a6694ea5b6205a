//! `@Bean` method proxying.
//!
//! A configuration class proxies its bean methods unless its configuration
//! annotation sets `proxyBeanMethods = false`. Types without a configuration
//! annotation inherit the answer from their superclass.

use crate::analysis::{SemanticQuery, TypeInfo};
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::{BEAN, CONFIGURATION, MANAGEMENT_CONTEXT_CONFIGURATION};

const PROXY_BEAN_METHODS: &str = "proxyBeanMethods";

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    walk(tree, tree.root(), &mut BeanMethodProxying { query, reporter });
}

struct BeanMethodProxying<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for BeanMethodProxying<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        match tree.kind(node) {
            NodeKind::ClassDeclaration => self.check_class(node),
            NodeKind::MethodInvocation => self.check_invocation(node),
            _ => {}
        }
        true
    }
}

impl BeanMethodProxying<'_, '_> {
    /// A class may not switch proxying off when its superclass has it on.
    fn check_class(&mut self, node: NodeId) {
        let query = self.query;
        let Some(info) = query.unit().type_at(node) else {
            return;
        };
        let index = query.index();
        let superclass_proxied = info
            .superclass
            .as_deref()
            .and_then(|name| index.get(name))
            .map_or(false, |superclass| proxied(query, superclass));
        if !superclass_proxied {
            return;
        }
        let annotation = query.annotations(node).into_iter().find(|&a| {
            query
                .type_binding(a)
                .map_or(false, |ty| is_configuration_annotation(query, ty))
        });
        if let Some(annotation) = annotation {
            if !query
                .annotation_bool(annotation, PROXY_BEAN_METHODS)
                .unwrap_or(true)
            {
                self.reporter
                    .error(Problem::MismatchedBeanMethodProxying, annotation, &[]);
            }
        }
    }

    /// Direct calls to a `@Bean` method only reach the container when the
    /// declaring class is proxied.
    fn check_invocation(&mut self, node: NodeId) {
        let query = self.query;
        let Some(target) = query.method_binding(node) else {
            return;
        };
        if !target.annotations.iter().any(|a| a == BEAN) {
            return;
        }
        let proxied = query
            .index()
            .get(&target.declaring_type)
            .map_or(false, |declaring| proxied(query, declaring));
        if !proxied {
            self.reporter
                .error(Problem::InvocationOfUnproxiedBeanMethod, node, &[]);
        }
    }
}

/// `@Configuration`, `@ManagementContextConfiguration`, or an annotation
/// meta-annotated with `@Configuration`.
fn is_configuration_annotation(query: &SemanticQuery<'_>, annotation_type: &str) -> bool {
    if annotation_type == CONFIGURATION || annotation_type == MANAGEMENT_CONTEXT_CONFIGURATION {
        return true;
    }
    query
        .index()
        .get(annotation_type)
        .map_or(false, |info| query.type_has_annotation(info, CONFIGURATION))
}

/// Whether bean methods declared by `info` are proxied.
fn proxied(query: &SemanticQuery<'_>, info: &TypeInfo) -> bool {
    let index = query.index();
    let mut current = Some(info);
    let mut visited = 0;
    while let Some(ty) = current {
        let flags: Vec<bool> = ty
            .annotations
            .iter()
            .filter(|a| a.resolved && is_configuration_annotation(query, &a.type_name))
            .map(|a| {
                a.value(PROXY_BEAN_METHODS)
                    .and_then(|v| v.as_bool())
                    .or_else(|| query.element_default(&a.type_name, PROXY_BEAN_METHODS))
                    .unwrap_or(true)
            })
            .collect();
        if flags.iter().any(|&flag| flag) {
            return true;
        }
        visited += 1;
        if visited > index.len() {
            return false;
        }
        current = ty.superclass.as_deref().and_then(|name| index.get(name));
    }
    false
}

#[cfg(test)]
mod tests {
    use crate::detect::checks::testing::{check_main, flagged, project, run_on};
    use crate::detect::checks::Check;

    #[test]
    fn test_invoking_bean_methods_of_lite_configuration_is_an_error() {
        let source = r#"package com.example;

import org.springframework.context.annotation.Bean;
import org.springframework.context.annotation.Configuration;

@Configuration(proxyBeanMethods = false)
class Example {

    @Bean
    Object one() {
        return two();
    }

    @Bean
    Object two() {
        return helper();
    }

    Object helper() {
        return new Object();
    }
}
"#;
        let markers = check_main(Check::BeanMethodProxying, source);
        assert_eq!(markers.len(), 1);
        assert_eq!(flagged(source, &markers[0]), "two()");
        assert_eq!(markers[0].problem_id, "11");
    }

    #[test]
    fn test_proxied_configuration_allows_invocations() {
        let source = r#"package com.example;

import org.springframework.context.annotation.Bean;
import org.springframework.context.annotation.Configuration;

@Configuration
class Example {

    @Bean
    Object one() {
        return two();
    }

    @Bean
    Object two() {
        return new Object();
    }
}
"#;
        assert!(check_main(Check::BeanMethodProxying, source).is_empty());

        let auto = source.replace(
            "import org.springframework.context.annotation.Configuration;",
            "import org.springframework.boot.autoconfigure.AutoConfiguration;",
        );
        let auto = auto.replace("@Configuration", "@AutoConfiguration");
        let markers = check_main(Check::BeanMethodProxying, &auto);
        assert_eq!(markers.len(), 1, "AutoConfiguration defaults to lite mode");
    }

    #[test]
    fn test_switching_off_proxying_below_a_proxied_superclass_is_an_error() {
        let base = r#"package com.example;

import org.springframework.context.annotation.Configuration;

@Configuration
class BaseConfiguration {
}
"#;
        let child = r#"package com.example;

import org.springframework.context.annotation.Configuration;

@Configuration(proxyBeanMethods = false)
class ChildConfiguration extends BaseConfiguration {
}
"#;
        let base_resource = "src/main/java/com/example/BaseConfiguration.java";
        let child_resource = "src/main/java/com/example/ChildConfiguration.java";
        let configurations = project(&[(base_resource, base), (child_resource, child)]);

        let markers = run_on(&configurations, Check::BeanMethodProxying, child_resource);
        assert_eq!(markers.len(), 1);
        assert_eq!(
            flagged(child, &markers[0]),
            "@Configuration(proxyBeanMethods = false)"
        );
        assert!(run_on(&configurations, Check::BeanMethodProxying, base_resource).is_empty());
    }
}
