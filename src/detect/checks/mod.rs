//! The check registry.
//!
//! Each check is an independent visitor over one compilation unit. Checks
//! read the tree through a [`SemanticQuery`], report through a
//! [`ProblemReporter`], and share no state with each other.

mod assert_that;
mod autowired;
mod bean_configuration;
mod bean_proxying;
mod failure_analyzer;
mod functional_interface;
mod javadoc_link;
mod lambda;
mod main_code_component;
mod prefer_assertj;
mod string_index_of;
mod unused_parameter;

use crate::analysis::SemanticQuery;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::reporter::ProblemReporter;
use super::types::Problem;

pub(crate) use lambda::unparenthesized_parameter;

pub(crate) const AUTOWIRED: &str = "org.springframework.beans.factory.annotation.Autowired";
pub(crate) const BEAN: &str = "org.springframework.context.annotation.Bean";
pub(crate) const CONFIGURATION: &str = "org.springframework.context.annotation.Configuration";
pub(crate) const MANAGEMENT_CONTEXT_CONFIGURATION: &str =
    "org.springframework.boot.actuate.autoconfigure.web.ManagementContextConfiguration";
pub(crate) const COMPONENT: &str = "org.springframework.stereotype.Component";
pub(crate) const FUNCTIONAL_INTERFACE: &str = "java.lang.FunctionalInterface";
pub(crate) const EXCEPTION_HANDLER: &str =
    "org.springframework.web.bind.annotation.ExceptionHandler";
pub(crate) const ASSERTIONS: &str = "org.assertj.core.api.Assertions";
pub(crate) const JUNIT_ASSERT: &str = "org.junit.Assert";

/// Checks run over every compilation unit, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    AutowiredSingleConstructor,
    ConfigurationConstructorInjection,
    FailureAnalyzerSpringFactories,
    MainCodeComponent,
    MissingFunctionalInterface,
    LambdaParameterParentheses,
    LambdaSingleStatementBlock,
    UnusedMethodParameter,
    IncompleteAssertThat,
    JavadocAnnotationLink,
    BeanMethodProxying,
    StringIndexOf,
    BeanMethodOnNonConfiguration,
    PreferAssertjExceptionAssertions,
}

impl Check {
    pub const ALL: [Check; 14] = [
        Check::AutowiredSingleConstructor,
        Check::ConfigurationConstructorInjection,
        Check::FailureAnalyzerSpringFactories,
        Check::MainCodeComponent,
        Check::MissingFunctionalInterface,
        Check::LambdaParameterParentheses,
        Check::LambdaSingleStatementBlock,
        Check::UnusedMethodParameter,
        Check::IncompleteAssertThat,
        Check::JavadocAnnotationLink,
        Check::BeanMethodProxying,
        Check::StringIndexOf,
        Check::BeanMethodOnNonConfiguration,
        Check::PreferAssertjExceptionAssertions,
    ];

    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Check::AutowiredSingleConstructor => "autowired-single-constructor",
            Check::ConfigurationConstructorInjection => "configuration-constructor-injection",
            Check::FailureAnalyzerSpringFactories => "failure-analyzer-spring-factories",
            Check::MainCodeComponent => "main-code-component",
            Check::MissingFunctionalInterface => "missing-functional-interface",
            Check::LambdaParameterParentheses => "lambda-parameter-parentheses",
            Check::LambdaSingleStatementBlock => "lambda-single-statement-block",
            Check::UnusedMethodParameter => "unused-method-parameter",
            Check::IncompleteAssertThat => "incomplete-assert-that",
            Check::JavadocAnnotationLink => "javadoc-annotation-link",
            Check::BeanMethodProxying => "bean-method-proxying",
            Check::StringIndexOf => "string-index-of",
            Check::BeanMethodOnNonConfiguration => "bean-method-on-non-configuration",
            Check::PreferAssertjExceptionAssertions => "prefer-assertj-exception-assertions",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|check| check.as_str() == s)
    }

    /// Problems this check can report.
    pub fn problems(&self) -> &'static [Problem] {
        match self {
            Check::AutowiredSingleConstructor => &[Problem::AutowiredSingleConstructor],
            Check::ConfigurationConstructorInjection => {
                &[Problem::ConfigurationClassConstructorInjection]
            }
            Check::FailureAnalyzerSpringFactories => {
                &[Problem::FailureAnalyzerNotInSpringFactories]
            }
            Check::MainCodeComponent => &[Problem::MainCodeComponent],
            Check::MissingFunctionalInterface => &[Problem::MissingFunctionalInterfaceAnnotation],
            Check::LambdaParameterParentheses => {
                &[Problem::MissingParenthesesAroundLambdaParameter]
            }
            Check::LambdaSingleStatementBlock => {
                &[Problem::LambdaExpressionBodyIsSingleStatementBlock]
            }
            Check::UnusedMethodParameter => &[Problem::UnusedMethodParameter],
            Check::IncompleteAssertThat => &[Problem::IncompleteUseOfAssertThat],
            Check::JavadocAnnotationLink => &[Problem::IncorrectAnnotationLink],
            Check::BeanMethodProxying => &[
                Problem::InvocationOfUnproxiedBeanMethod,
                Problem::MismatchedBeanMethodProxying,
            ],
            Check::StringIndexOf => &[Problem::SingleCharacterStringLiteralIndexOf],
            Check::BeanMethodOnNonConfiguration => &[
                Problem::BeanMethodOnNonConfigurationClass,
                Problem::NonConfigurationClassHasInheritedBeanMethods,
            ],
            Check::PreferAssertjExceptionAssertions => {
                &[Problem::AssertjExceptionAssertionSupportNotUsed]
            }
        }
    }

    /// Visit the whole unit behind `query` once.
    pub fn run(&self, query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
        match self {
            Check::AutowiredSingleConstructor => autowired::single_constructor(query, reporter),
            Check::ConfigurationConstructorInjection => {
                autowired::configuration_fields(query, reporter)
            }
            Check::FailureAnalyzerSpringFactories => failure_analyzer::run(query, reporter),
            Check::MainCodeComponent => main_code_component::run(query, reporter),
            Check::MissingFunctionalInterface => functional_interface::run(query, reporter),
            Check::LambdaParameterParentheses => lambda::parameter_parentheses(query, reporter),
            Check::LambdaSingleStatementBlock => lambda::single_statement_block(query, reporter),
            Check::UnusedMethodParameter => unused_parameter::run(query, reporter),
            Check::IncompleteAssertThat => assert_that::run(query, reporter),
            Check::JavadocAnnotationLink => javadoc_link::run(query, reporter),
            Check::BeanMethodProxying => bean_proxying::run(query, reporter),
            Check::StringIndexOf => string_index_of::run(query, reporter),
            Check::BeanMethodOnNonConfiguration => bean_configuration::run(query, reporter),
            Check::PreferAssertjExceptionAssertions => prefer_assertj::run(query, reporter),
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a declaration carries `keyword` as an explicit modifier.
pub(crate) fn has_modifier(tree: &SyntaxTree, declaration: NodeId, keyword: &str) -> bool {
    tree.child_of_kind(declaration, NodeKind::Modifiers)
        .map_or(false, |modifiers| tree.has_token(modifiers, keyword))
}

/// Member declarations in the body of a type declaration.
pub(crate) fn members(tree: &SyntaxTree, declaration: NodeId) -> Vec<NodeId> {
    let Some(body) = tree.child_by_field(declaration, "body") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for child in tree.named_children(body) {
        if tree.kind(child) == NodeKind::EnumBodyDeclarations {
            out.extend(tree.named_children(child));
        } else {
            out.push(child);
        }
    }
    out
}

/// Arguments of an invocation, comments excluded.
pub(crate) fn arguments(tree: &SyntaxTree, invocation: NodeId) -> Vec<NodeId> {
    match tree.child_by_field(invocation, "arguments") {
        Some(list) => tree
            .named_children(list)
            .filter(|&a| !tree.kind(a).is_comment())
            .collect(),
        None => Vec::new(),
    }
}
