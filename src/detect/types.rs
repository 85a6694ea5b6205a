//! Problem catalogue and marker records.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Severity of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Every kind of problem the checks can report.
///
/// Ids are persisted in markers and must never be reused or renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Problem {
    ConfigurationClassConstructorInjection,
    AutowiredSingleConstructor,
    FailureAnalyzerNotInSpringFactories,
    MainCodeComponent,
    MissingFunctionalInterfaceAnnotation,
    MissingParenthesesAroundLambdaParameter,
    LambdaExpressionBodyIsSingleStatementBlock,
    UnusedMethodParameter,
    IncompleteUseOfAssertThat,
    MissingPackageInfo,
    IncorrectAnnotationLink,
    InvocationOfUnproxiedBeanMethod,
    MismatchedBeanMethodProxying,
    SingleCharacterStringLiteralIndexOf,
    BeanMethodOnNonConfigurationClass,
    NonConfigurationClassHasInheritedBeanMethods,
    AssertjExceptionAssertionSupportNotUsed,
}

impl Problem {
    pub const ALL: [Problem; 17] = [
        Problem::ConfigurationClassConstructorInjection,
        Problem::AutowiredSingleConstructor,
        Problem::FailureAnalyzerNotInSpringFactories,
        Problem::MainCodeComponent,
        Problem::MissingFunctionalInterfaceAnnotation,
        Problem::MissingParenthesesAroundLambdaParameter,
        Problem::LambdaExpressionBodyIsSingleStatementBlock,
        Problem::UnusedMethodParameter,
        Problem::IncompleteUseOfAssertThat,
        Problem::MissingPackageInfo,
        Problem::IncorrectAnnotationLink,
        Problem::InvocationOfUnproxiedBeanMethod,
        Problem::MismatchedBeanMethodProxying,
        Problem::SingleCharacterStringLiteralIndexOf,
        Problem::BeanMethodOnNonConfigurationClass,
        Problem::NonConfigurationClassHasInheritedBeanMethods,
        Problem::AssertjExceptionAssertionSupportNotUsed,
    ];

    pub fn id(&self) -> u32 {
        match self {
            Problem::ConfigurationClassConstructorInjection => 0,
            Problem::AutowiredSingleConstructor => 1,
            Problem::FailureAnalyzerNotInSpringFactories => 2,
            Problem::MainCodeComponent => 3,
            Problem::MissingFunctionalInterfaceAnnotation => 4,
            Problem::MissingParenthesesAroundLambdaParameter => 5,
            Problem::LambdaExpressionBodyIsSingleStatementBlock => 6,
            Problem::UnusedMethodParameter => 7,
            Problem::IncompleteUseOfAssertThat => 8,
            Problem::MissingPackageInfo => 9,
            Problem::IncorrectAnnotationLink => 10,
            Problem::InvocationOfUnproxiedBeanMethod => 11,
            Problem::MismatchedBeanMethodProxying => 12,
            Problem::SingleCharacterStringLiteralIndexOf => 13,
            Problem::BeanMethodOnNonConfigurationClass => 14,
            Problem::NonConfigurationClassHasInheritedBeanMethods => 15,
            Problem::AssertjExceptionAssertionSupportNotUsed => 16,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Problem::ConfigurationClassConstructorInjection => {
                "CONFIGURATION_CLASS_CONSTRUCTOR_INJECTION"
            }
            Problem::AutowiredSingleConstructor => "AUTOWIRED_SINGLE_CONSTRUCTOR",
            Problem::FailureAnalyzerNotInSpringFactories => {
                "FAILURE_ANALYZER_NOT_IN_SPRING_FACTORIES"
            }
            Problem::MainCodeComponent => "MAIN_CODE_COMPONENT",
            Problem::MissingFunctionalInterfaceAnnotation => {
                "MISSING_FUNCTIONAL_INTERFACE_ANNOTATION"
            }
            Problem::MissingParenthesesAroundLambdaParameter => {
                "MISSING_PARENTHESES_AROUND_LAMBDA_PARAMETER"
            }
            Problem::LambdaExpressionBodyIsSingleStatementBlock => {
                "LAMBDA_EXPRESSION_BODY_IS_SINGLE_STATEMENT_BLOCK"
            }
            Problem::UnusedMethodParameter => "UNUSED_METHOD_PARAMETER",
            Problem::IncompleteUseOfAssertThat => "INCOMPLETE_USE_OF_ASSERT_THAT",
            Problem::MissingPackageInfo => "MISSING_PACKAGE_INFO",
            Problem::IncorrectAnnotationLink => "INCORRECT_ANNOTATION_LINK",
            Problem::InvocationOfUnproxiedBeanMethod => "INVOCATION_OF_UNPROXIED_BEAN_METHOD",
            Problem::MismatchedBeanMethodProxying => "MISMATCHED_BEAN_METHOD_PROXYING",
            Problem::SingleCharacterStringLiteralIndexOf => {
                "SINGLE_CHARACTER_STRING_LITERAL_INDEX_OF"
            }
            Problem::BeanMethodOnNonConfigurationClass => "BEAN_METHOD_ON_NON_CONFIGURATION_CLASS",
            Problem::NonConfigurationClassHasInheritedBeanMethods => {
                "NON_CONFIGURATION_CLASS_HAS_INHERITED_BEAN_METHODS"
            }
            Problem::AssertjExceptionAssertionSupportNotUsed => {
                "ASSERTJ_EXCEPTION_ASSERTION_SUPPORT_NOT_USED"
            }
        }
    }

    /// Message template; `{0}`, `{1}`, ... are positional arguments.
    pub fn message(&self) -> &'static str {
        match self {
            Problem::ConfigurationClassConstructorInjection => {
                "@Configuration classes should use constructor injection"
            }
            Problem::AutowiredSingleConstructor => {
                "@Autowired is unnecessary as the class has a single constructor"
            }
            Problem::FailureAnalyzerNotInSpringFactories => {
                "Implements FailureAnalyzer but is not listed in spring.factories"
            }
            Problem::MainCodeComponent => "@Component should not be used in main code",
            Problem::MissingFunctionalInterfaceAnnotation => {
                "Functional interface is not annotated with @FunctionalInterface"
            }
            Problem::MissingParenthesesAroundLambdaParameter => {
                "Lambda expression parameter should be wrapped in parentheses"
            }
            Problem::LambdaExpressionBodyIsSingleStatementBlock => {
                "Lambda expression body is a block containing a single statement"
            }
            Problem::UnusedMethodParameter => "Method parameter is unused",
            Problem::IncompleteUseOfAssertThat => {
                "Incomplete use of assertThat: no assertion method is called on its result"
            }
            Problem::MissingPackageInfo => "Package is missing a package-info.java file",
            Problem::IncorrectAnnotationLink => "Link to annotation {0} should use @{1} as its text",
            Problem::InvocationOfUnproxiedBeanMethod => {
                "@Bean method is invoked directly but bean methods of its declaring class are not proxied"
            }
            Problem::MismatchedBeanMethodProxying => {
                "Bean method proxying does not match the proxying configured on the superclass"
            }
            Problem::SingleCharacterStringLiteralIndexOf => {
                "Use {0}(char) rather than {1}(String) when searching for a single character"
            }
            Problem::BeanMethodOnNonConfigurationClass => {
                "@Bean method declared on a class that is not annotated with @Configuration"
            }
            Problem::NonConfigurationClassHasInheritedBeanMethods => {
                "Class inherits @Bean methods but is not annotated with @Configuration"
            }
            Problem::AssertjExceptionAssertionSupportNotUsed => {
                "AssertJ's exception assertion support should be used instead of fail() and assertThat() in a catch block"
            }
        }
    }

    /// Substitute `args` into the message template.
    pub fn format(&self, args: &[String]) -> String {
        let mut message = self.message().to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", i), arg);
        }
        message
    }

    /// Catalogue entry for `id`.
    ///
    /// # Panics
    ///
    /// When no problem has that id. Ids only come from the catalogue itself,
    /// so an unknown one is a wiring defect.
    pub fn value_of(id: u32) -> Problem {
        match Self::ALL.iter().find(|p| p.id() == id) {
            Some(problem) => *problem,
            None => panic!("No problem with id '{}' exists", id),
        }
    }

    /// Catalogue entry for a string-encoded id read from a persisted marker.
    pub fn from_id(id: &str) -> Result<Problem> {
        id.trim()
            .parse::<u32>()
            .ok()
            .and_then(|n| Self::ALL.iter().copied().find(|p| p.id() == n))
            .ok_or_else(|| Error::UnknownProblem(id.to_string()))
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One reported problem, as persisted and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// String-encoded [`Problem::id`].
    pub problem_id: String,
    pub severity: Severity,
    /// Project-relative path of the resource the marker belongs to.
    pub resource: String,
    /// Byte range of the flagged node; absent for resource-level markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_end: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_args: Vec<String>,
    /// Human-readable position, `Line N`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Marker {
    pub fn problem(&self) -> Result<Problem> {
        Problem::from_id(&self.problem_id)
    }

    /// Key used to compare markers across passes.
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.problem_id,
            self.resource,
            self.char_start.unwrap_or_default(),
            self.message
        )
    }
}

/// Outcome of one analysis pass.
#[derive(Debug, Default)]
pub struct AnalysisResult {
    /// Resources whose markers were regenerated.
    pub analyzed: Vec<String>,
    /// Resources that could not be analyzed, with the reason.
    pub failures: Vec<(String, Error)>,
    /// Markers reported during this pass.
    pub markers: Vec<Marker>,
    pub cancelled: bool,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| m.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| m.severity == Severity::Warning)
            .count()
    }

    /// Every resource was analyzed. Markers of either severity are advisory
    /// and never fail a pass.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable_and_unique() {
        for (expected, problem) in Problem::ALL.iter().enumerate() {
            assert_eq!(problem.id(), expected as u32);
            assert_eq!(Problem::value_of(problem.id()), *problem);
        }
    }

    #[test]
    fn test_format_without_args_returns_template() {
        let problem = Problem::IncorrectAnnotationLink;
        assert_eq!(problem.format(&[]), problem.message());
    }

    #[test]
    fn test_format_substitutes_positional_args() {
        let args = vec!["indexOf".to_string(), "indexOf".to_string()];
        assert_eq!(
            Problem::SingleCharacterStringLiteralIndexOf.format(&args),
            "Use indexOf(char) rather than indexOf(String) when searching for a single character"
        );
    }

    #[test]
    #[should_panic(expected = "No problem with id '99' exists")]
    fn test_value_of_unknown_id_panics() {
        Problem::value_of(99);
    }

    #[test]
    fn test_from_id_is_fallible() {
        assert_eq!(Problem::from_id("7").unwrap(), Problem::UnusedMethodParameter);
        assert!(matches!(
            Problem::from_id("abc"),
            Err(Error::UnknownProblem(id)) if id == "abc"
        ));
        assert!(Problem::from_id("17").is_err());
    }

    #[test]
    fn test_severity_round_trips_through_strings() {
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert!("info".parse::<Severity>().is_err());
    }

    #[test]
    fn test_markers_do_not_fail_a_pass() {
        let mut result = AnalysisResult::new();
        result.markers.push(Marker {
            problem_id: Problem::InvocationOfUnproxiedBeanMethod.id().to_string(),
            severity: Severity::Error,
            resource: "src/main/java/com/example/B.java".to_string(),
            char_start: Some(10),
            char_end: Some(15),
            line_number: Some(1),
            message: Problem::InvocationOfUnproxiedBeanMethod.message().to_string(),
            message_args: Vec::new(),
            location: None,
        });
        assert_eq!(result.error_count(), 1);
        assert!(result.passed());

        result.failures.push((
            "src/main/java/com/example/C.java".to_string(),
            Error::Parse {
                path: "src/main/java/com/example/C.java".into(),
            },
        ));
        assert!(!result.passed());
    }

    #[test]
    fn test_markers_serialize_without_empty_fields() {
        let marker = Marker {
            problem_id: "9".to_string(),
            severity: Severity::Warning,
            resource: "src/main/java/com/example".to_string(),
            char_start: None,
            char_end: None,
            line_number: None,
            message: Problem::MissingPackageInfo.message().to_string(),
            message_args: Vec::new(),
            location: None,
        };
        let json = serde_json::to_string(&marker).unwrap();
        assert!(!json.contains("char_start"));
        let back: Marker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, marker);
        assert_eq!(back.problem().unwrap(), Problem::MissingPackageInfo);
    }
}
