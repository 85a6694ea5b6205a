//! Command-line interface for bootcheck.

use std::collections::HashSet;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::Project;
use crate::config::Config;
use crate::detect::{AnalysisResult, Check, Driver, JsonMarkerStore, MarkerStore, Problem};
use crate::fix::FixerRegistry;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

const FORMATS: &[&str] = &["pretty", "json", "sarif"];

/// Spring Boot convention checks for Java sources.
///
/// Analyzes a Maven or Gradle project, records problems as markers in
/// `.bootcheck/markers.json`, and applies the automatic fixes available for
/// some of them.
#[derive(Parser)]
#[command(name = "bootcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a project and record its markers
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Apply automatic fixes to recorded problems
    Fix(FixArgs),
    /// Print the markers recorded by the last analysis
    Markers(MarkersArgs),
    /// Delete all recorded markers
    Clean(ProjectArgs),
    /// List the problems bootcheck reports
    Problems,
}

/// Project location shared by every command.
#[derive(Args)]
pub struct ProjectArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Exit with a failure status when any error-severity marker is found
    #[arg(long)]
    pub fail_on_errors: bool,
}

#[derive(Args)]
pub struct MarkersArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

#[derive(Args)]
pub struct FixArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the changes as unified diffs without writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Only fix problems with this catalogue name, e.g.
    /// MISSING_PARENTHESES_AROUND_LAMBDA_PARAMETER
    #[arg(short, long)]
    pub problem: Option<String>,
}

/// Build a driver for the project at `args.path`.
fn open_driver(args: &ProjectArgs) -> anyhow::Result<(PathBuf, Driver)> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("cannot access path {}", args.path.display()))?;
    let config = Config::load(&root, args.config.as_deref())?;
    let store = JsonMarkerStore::open(config.markers_path(&root))?;
    let project = Project::new(config.layout(&root));
    let driver = Driver::new(project, Box::new(store))
        .checks(config.enabled_checks())
        .missing_package_info(config.check_package_info())
        .excluded(config.excluded_globs()?);
    Ok((root, driver))
}

fn validate_format(format: &str) -> bool {
    if FORMATS.contains(&format) {
        return true;
    }
    eprintln!(
        "Error: invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
        format
    );
    false
}

fn spinner(message: &str) -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn analyze(driver: &mut Driver, show_progress: bool) -> anyhow::Result<AnalysisResult> {
    let progress = if show_progress {
        spinner("Analyzing sources...")
    } else {
        None
    };
    let result = driver.analyze_full_project();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    Ok(result?)
}

/// Markers are advisory unless `fail_on_errors` is set. Resources that could
/// not be analyzed always fail.
fn exit_code(result: &AnalysisResult, fail_on_errors: bool) -> i32 {
    if !result.passed() || (fail_on_errors && result.error_count() > 0) {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    if !validate_format(&args.format) {
        return Ok(EXIT_ERROR);
    }
    let (root, mut driver) = open_driver(&args.project)?;
    let result = analyze(&mut driver, args.format == "pretty")?;

    let path = root.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path, &result)?,
        "sarif" => report::write_sarif(&result.markers)?,
        _ => report::write_pretty(&path, &result),
    }
    Ok(exit_code(&result, args.fail_on_errors))
}

/// Run the markers command.
pub fn run_markers(args: &MarkersArgs) -> anyhow::Result<i32> {
    if !validate_format(&args.format) {
        return Ok(EXIT_ERROR);
    }
    let root = args
        .project
        .path
        .canonicalize()
        .with_context(|| format!("cannot access path {}", args.project.path.display()))?;
    let config = Config::load(&root, args.project.config.as_deref())?;
    let store = JsonMarkerStore::open(config.markers_path(&root))?;
    let markers = store.all_markers();

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&markers)?),
        "sarif" => report::write_sarif(&markers)?,
        _ => {
            if markers.is_empty() {
                println!("No markers recorded in {}", store.path().display());
            } else {
                println!();
                report::write_markers(&markers);
            }
        }
    }
    Ok(EXIT_SUCCESS)
}

/// Run the clean command.
pub fn run_clean(args: &ProjectArgs) -> anyhow::Result<i32> {
    let (_, mut driver) = open_driver(args)?;
    driver.clean()?;
    println!("Markers deleted");
    Ok(EXIT_SUCCESS)
}

/// Run the fix command.
///
/// Applies the first resolution of each fixable marker. Each applied fix
/// re-analyzes its resource, so the remaining markers always match the
/// file on disk.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let only = match &args.problem {
        Some(name) => match Problem::ALL.iter().find(|p| p.name() == name.as_str()) {
            Some(problem) => Some(*problem),
            None => {
                eprintln!("Error: unknown problem {:?}", name);
                eprintln!("Run 'bootcheck problems' to see the catalogue");
                return Ok(EXIT_ERROR);
            }
        },
        None => None,
    };

    let (root, mut driver) = open_driver(&args.project)?;
    analyze(&mut driver, true)?;

    let mut attempted: HashSet<String> = HashSet::new();
    let mut seen_rewrites: HashSet<String> = HashSet::new();
    let mut fixed = 0usize;
    loop {
        let next = driver.markers().into_iter().find_map(|marker| {
            if attempted.contains(&marker.key()) {
                return None;
            }
            if only.is_some() && marker.problem().ok() != only {
                return None;
            }
            let fixer = driver.resolutions_for(&marker).ok()?.into_iter().next()?;
            Some((marker, fixer))
        });
        let Some((marker, fixer)) = next else {
            break;
        };
        attempted.insert(marker.key());

        if args.dry_run {
            match driver.preview_fix(&marker, fixer) {
                Ok(Some(rewrite)) => {
                    if seen_rewrites.insert(rewrite.fixed.clone()) {
                        print!("{}", rewrite.diff());
                        fixed += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => eprintln!("Warning: {}: {}", marker.resource, e),
            }
            continue;
        }

        match driver.apply_fix(&marker, fixer) {
            Ok(Some(rewrite)) => {
                println!("{}: {}", fixer.label(), rewrite.resource);
                fixed += 1;
            }
            Ok(None) => {}
            Err(e) => eprintln!("Warning: {}: {}", marker.resource, e),
        }
    }

    if fixed == 0 {
        println!("Nothing to fix in {}", root.display());
    } else if args.dry_run {
        println!("{} fix(es) available", fixed);
    } else {
        println!("Applied {} fix(es)", fixed);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the problems command.
pub fn run_problems() -> anyhow::Result<i32> {
    let registry = FixerRegistry::standard();
    println!("{:<4} {:<52} {:<36} fix", "id", "problem", "check");
    for problem in Problem::ALL {
        let check = Check::ALL
            .iter()
            .find(|c| c.problems().contains(&problem))
            .map(|c| c.as_str())
            .unwrap_or("package-info");
        let fix = registry
            .fixers_for(problem)
            .first()
            .map(|f| f.label())
            .unwrap_or("-");
        println!("{:<4} {:<52} {:<36} {}", problem.id(), problem.name(), check, fix);
    }
    Ok(EXIT_SUCCESS)
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Fix(args) => run_fix(args),
        Commands::Markers(args) => run_markers(args),
        Commands::Clean(args) => run_clean(args),
        Commands::Problems => run_problems(),
    }
}
