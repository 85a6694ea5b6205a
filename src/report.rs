//! Output formatting for analysis results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::detect::{AnalysisResult, Marker, Problem, Severity};

/// Markers in report order: by resource, then by position.
pub fn sorted(markers: &[Marker]) -> Vec<&Marker> {
    let mut sorted: Vec<&Marker> = markers.iter().collect();
    sorted.sort_by(|a, b| {
        (&a.resource, a.char_start, &a.problem_id).cmp(&(&b.resource, b.char_start, &b.problem_id))
    });
    sorted
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub passed: bool,
    pub cancelled: bool,
    pub files_analyzed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub markers: Vec<JsonMarker>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<JsonFailure>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonMarker {
    pub problem_id: String,
    pub problem: String,
    pub severity: String,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct JsonFailure {
    pub resource: String,
    pub error: String,
}

fn marker_to_json(m: &Marker) -> JsonMarker {
    JsonMarker {
        problem_id: m.problem_id.clone(),
        problem: m
            .problem()
            .map(|p| p.name().to_string())
            .unwrap_or_else(|_| m.problem_id.clone()),
        severity: m.severity.to_string(),
        resource: m.resource.clone(),
        line: m.line_number,
        message: m.message.clone(),
    }
}

pub fn render_json(path: &str, result: &AnalysisResult) -> anyhow::Result<String> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        passed: result.passed(),
        cancelled: result.cancelled,
        files_analyzed: result.analyzed.len(),
        errors: result.error_count(),
        warnings: result.warning_count(),
        markers: sorted(&result.markers).into_iter().map(marker_to_json).collect(),
        failures: result
            .failures
            .iter()
            .map(|(resource, err)| JsonFailure {
                resource: resource.clone(),
                error: err.to_string(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write results in JSON format.
pub fn write_json(path: &str, result: &AnalysisResult) -> anyhow::Result<()> {
    println!("{}", render_json(path, result)?);
    Ok(())
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "bootcheck";

#[derive(Serialize, Deserialize)]
struct SarifReport {
    version: String,
    #[serde(rename = "$schema")]
    schema: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
struct SarifRule {
    id: String,
    name: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
struct SarifRuleConfig {
    level: String,
}

#[derive(Serialize, Deserialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifact,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Serialize, Deserialize)]
struct SarifArtifact {
    uri: String,
}

#[derive(Serialize, Deserialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
}

/// Severity a problem is reported with.
fn default_level(problem: Problem) -> &'static str {
    match problem {
        Problem::FailureAnalyzerNotInSpringFactories
        | Problem::IncompleteUseOfAssertThat
        | Problem::InvocationOfUnproxiedBeanMethod
        | Problem::MismatchedBeanMethodProxying => "error",
        _ => "warning",
    }
}

fn map_severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

/// PascalCase form of a catalogue name, `UNUSED_METHOD_PARAMETER` to
/// `UnusedMethodParameter`.
fn rule_name(problem: Problem) -> String {
    problem
        .name()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn render_sarif(markers: &[Marker]) -> anyhow::Result<String> {
    let problems: BTreeSet<Problem> = markers.iter().filter_map(|m| m.problem().ok()).collect();
    let rules: Vec<SarifRule> = problems
        .into_iter()
        .map(|problem| SarifRule {
            id: problem.name().to_string(),
            name: rule_name(problem),
            short_description: SarifMessage {
                text: problem.message().to_string(),
            },
            default_config: SarifRuleConfig {
                level: default_level(problem).to_string(),
            },
        })
        .collect();

    let results: Vec<SarifResult> = sorted(markers)
        .into_iter()
        .map(|m| SarifResult {
            rule_id: m
                .problem()
                .map(|p| p.name().to_string())
                .unwrap_or_else(|_| m.problem_id.clone()),
            level: map_severity_to_level(m.severity).to_string(),
            message: SarifMessage {
                text: m.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: m.resource.clone(),
                    },
                    region: m.line_number.map(|line| SarifRegion {
                        start_line: line.max(1),
                    }),
                },
            }],
        })
        .collect();

    let report = SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write markers in SARIF format.
pub fn write_sarif(markers: &[Marker]) -> anyhow::Result<()> {
    println!("{}", render_sarif(markers)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, result: &AnalysisResult) {
    println!();
    print!("  ");
    print!("{}", TOOL_NAME.cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzing: ".dimmed());
    println!("{}", path);
    println!();

    if !result.markers.is_empty() {
        write_markers(&result.markers);
        println!();
    }

    if !result.failures.is_empty() {
        println!("  {} ({}):", "Not analyzed".bold(), result.failures.len());
        for (resource, err) in &result.failures {
            println!("    {}  {}", resource.blue(), err.to_string().dimmed());
        }
        println!();
    }

    write_final_status(result);
    println!();
}

/// Write stored markers, grouped the same way as analysis results.
pub fn write_markers(markers: &[Marker]) {
    println!("  {} ({}):", "Problems".bold(), markers.len());
    println!();

    for m in sorted(markers) {
        write_severity_tag(m.severity);
        print!("   ");
        let name = m
            .problem()
            .map(rule_name)
            .unwrap_or_else(|_| m.problem_id.clone());
        print!("{:<36}", name.dimmed());
        print!("{}", m.resource.blue());
        if let Some(line) = m.line_number {
            print!("{}", format!(":{}", line).dimmed());
        }
        println!();

        println!("            {}", m.message);
        println!();
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
    }
}

fn write_final_status(result: &AnalysisResult) {
    if result.passed() {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ FAIL".red());
    }
    print!(
        "  {}",
        format!(
            "{} files, {} errors, {} warnings",
            result.analyzed.len(),
            result.error_count(),
            result.warning_count()
        )
        .dimmed()
    );
    if result.cancelled {
        print!("  {}", "(cancelled)".yellow());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(problem: Problem, severity: Severity, resource: &str, line: Option<usize>) -> Marker {
        Marker {
            problem_id: problem.id().to_string(),
            severity,
            resource: resource.to_string(),
            char_start: line.map(|l| l * 10),
            char_end: line.map(|l| l * 10 + 5),
            line_number: line,
            message: problem.message().to_string(),
            message_args: Vec::new(),
            location: line.map(|l| format!("Line {}", l)),
        }
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            analyzed: vec!["src/main/java/com/example/B.java".to_string()],
            failures: Vec::new(),
            markers: vec![
                marker(
                    Problem::InvocationOfUnproxiedBeanMethod,
                    Severity::Error,
                    "src/main/java/com/example/B.java",
                    Some(12),
                ),
                marker(
                    Problem::MissingPackageInfo,
                    Severity::Warning,
                    "src/main/java/com/example",
                    None,
                ),
            ],
            cancelled: false,
        }
    }

    #[test]
    fn test_rule_name() {
        assert_eq!(rule_name(Problem::UnusedMethodParameter), "UnusedMethodParameter");
        assert_eq!(
            rule_name(Problem::MissingParenthesesAroundLambdaParameter),
            "MissingParenthesesAroundLambdaParameter"
        );
    }

    #[test]
    fn test_json_report() {
        let json = render_json("/project", &result()).unwrap();
        let report: JsonReport = serde_json::from_str(&json).unwrap();
        assert!(report.passed);
        assert_eq!(report.errors, 1);
        assert_eq!(report.warnings, 1);
        assert_eq!(report.markers[0].resource, "src/main/java/com/example");
        assert_eq!(report.markers[0].problem, "MISSING_PACKAGE_INFO");
        assert_eq!(report.markers[1].line, Some(12));
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_sarif_report() {
        let json = render_sarif(&result().markers).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "2.1.0");
        let run = &value["runs"][0];
        assert_eq!(run["tool"]["driver"]["name"], "bootcheck");
        assert_eq!(run["tool"]["driver"]["rules"].as_array().unwrap().len(), 2);
        let results = run["results"].as_array().unwrap();
        assert_eq!(results[0]["ruleId"], "MISSING_PACKAGE_INFO");
        assert!(results[0]["locations"][0]["physicalLocation"]
            .get("region")
            .is_none());
        assert_eq!(results[1]["level"], "error");
        assert_eq!(
            results[1]["locations"][0]["physicalLocation"]["region"]["startLine"],
            12
        );
    }
}
