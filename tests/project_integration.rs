//! Integration tests for the analysis pipeline.
//!
//! Each test copies the sample project in `testdata/project` into a
//! temporary directory, so fixes and marker stores never touch the fixture.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use bootcheck::report;
use bootcheck::{Config, Driver, JsonMarkerStore, MarkerStore, Problem, Project, Severity};

const CONFIGURATION: &str = "src/main/java/com/example/app/ExampleConfiguration.java";
const SERVICE: &str = "src/main/java/com/example/app/ExampleService.java";
const PACKAGE: &str = "src/main/java/com/example/app";

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("project")
}

fn copy_fixture() -> TempDir {
    let temp = TempDir::new().expect("should create temp dir");
    let fixture = fixture_path();
    for entry in WalkDir::new(&fixture) {
        let entry = entry.expect("should walk fixture");
        let relative = entry.path().strip_prefix(&fixture).unwrap();
        let target = temp.path().join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    temp
}

/// Driver configured the way the CLI configures it.
fn open_driver(root: &Path) -> Driver {
    let config = Config::load(root, None).expect("fixture config should load");
    let store = JsonMarkerStore::open(config.markers_path(root)).expect("store should open");
    Driver::new(Project::new(config.layout(root)), Box::new(store))
        .checks(config.enabled_checks())
        .missing_package_info(config.check_package_info())
        .excluded(config.excluded_globs().unwrap())
}

fn problems(driver: &Driver) -> Vec<Problem> {
    let mut problems: Vec<Problem> = driver
        .markers()
        .iter()
        .map(|m| m.problem().unwrap())
        .collect();
    problems.sort();
    problems
}

#[test]
fn test_full_analysis_finds_fixture_problems() {
    let temp = copy_fixture();
    let mut driver = open_driver(temp.path());
    let result = driver.analyze_full_project().expect("analysis should succeed");

    assert!(result.failures.is_empty());
    assert!(!result.cancelled);
    assert_eq!(result.analyzed.len(), 3, "legacy sources are excluded");
    assert_eq!(
        problems(&driver),
        vec![
            Problem::ConfigurationClassConstructorInjection,
            Problem::AutowiredSingleConstructor,
            Problem::MissingParenthesesAroundLambdaParameter,
            Problem::LambdaExpressionBodyIsSingleStatementBlock,
            Problem::IncompleteUseOfAssertThat,
            Problem::MissingPackageInfo,
            Problem::SingleCharacterStringLiteralIndexOf,
        ]
    );
    assert_eq!(result.error_count(), 1);
    assert!(result.passed(), "markers are advisory");

    let package = driver.store().markers(PACKAGE);
    assert_eq!(package.len(), 1);
    assert_eq!(package[0].severity, Severity::Warning);
    assert!(package[0].char_start.is_none());
}

#[test]
fn test_markers_do_not_accumulate_and_are_persisted() {
    let temp = copy_fixture();
    let mut driver = open_driver(temp.path());
    driver.analyze_full_project().unwrap();
    let first = driver.markers().len();
    driver.analyze_full_project().unwrap();
    assert_eq!(driver.markers().len(), first);

    let stored = JsonMarkerStore::open(temp.path().join(".bootcheck/markers.json")).unwrap();
    assert_eq!(stored.all_markers().len(), first);
}

#[test]
fn test_fixes_resolve_their_problems() {
    let temp = copy_fixture();
    let mut driver = open_driver(temp.path());
    driver.analyze_full_project().unwrap();

    loop {
        let next = driver.markers().into_iter().find_map(|marker| {
            let fixer = driver.resolutions_for(&marker).ok()?.into_iter().next()?;
            Some((marker, fixer))
        });
        let Some((marker, fixer)) = next else {
            break;
        };
        driver
            .apply_fix(&marker, fixer)
            .expect("fix should apply")
            .expect("fix should change the file");
    }

    let configuration = fs::read_to_string(temp.path().join(CONFIGURATION)).unwrap();
    assert!(configuration.contains("    private final ExampleService service;"));
    assert!(configuration.contains(
        "    public ExampleConfiguration(ExampleService service) {\n        this.service = service;\n    }"
    ));
    assert!(!configuration.contains("@Autowired"));

    let service = fs::read_to_string(temp.path().join(SERVICE)).unwrap();
    assert!(service.contains(".map((name) -> name.toUpperCase())"));

    let mut fresh = open_driver(temp.path());
    fresh.analyze_full_project().unwrap();
    let remaining = problems(&fresh);
    assert!(!remaining.contains(&Problem::ConfigurationClassConstructorInjection));
    assert!(!remaining.contains(&Problem::MissingParenthesesAroundLambdaParameter));
    assert!(remaining.contains(&Problem::AutowiredSingleConstructor));
    assert_eq!(remaining, problems(&driver));
}

#[test]
fn test_disabled_checks_are_not_run() {
    let temp = copy_fixture();
    fs::write(
        temp.path().join("bootcheck.yaml"),
        "excluded_paths: [\"**/legacy/**\"]\ndisabled_checks: [string-index-of, incomplete-assert-that]\nmissing_package_info: false\n",
    )
    .unwrap();
    let mut driver = open_driver(temp.path());
    let result = driver.analyze_full_project().unwrap();

    let found = problems(&driver);
    assert!(!found.contains(&Problem::SingleCharacterStringLiteralIndexOf));
    assert!(!found.contains(&Problem::IncompleteUseOfAssertThat));
    assert!(!found.contains(&Problem::MissingPackageInfo));
    assert!(result.passed());
}

#[test]
fn test_clean_removes_markers() {
    let temp = copy_fixture();
    let mut driver = open_driver(temp.path());
    driver.analyze_full_project().unwrap();
    driver.clean().unwrap();
    assert!(driver.markers().is_empty());
    let stored = JsonMarkerStore::open(temp.path().join(".bootcheck/markers.json")).unwrap();
    assert!(stored.all_markers().is_empty());
}

#[test]
fn test_json_report_of_fixture() {
    let temp = copy_fixture();
    let mut driver = open_driver(temp.path());
    let result = driver.analyze_full_project().unwrap();

    let json = report::render_json("project", &result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["passed"], true);
    assert_eq!(value["errors"], 1);
    assert_eq!(value["files_analyzed"], 3);
    assert_eq!(value["markers"].as_array().unwrap().len(), 7);

    let sarif = report::render_sarif(&result.markers).unwrap();
    let value: serde_json::Value = serde_json::from_str(&sarif).unwrap();
    assert_eq!(value["runs"][0]["results"].as_array().unwrap().len(), 7);
}
