//! bootcheck - Spring Boot convention checks for Java sources.
//!
//! bootcheck parses the Java sources of a project, resolves the types,
//! methods and variables they reference, and runs a fixed set of checks
//! for Spring Boot coding conventions. Each problem found is recorded as a
//! marker; some problems can be fixed automatically.
//!
//! # Architecture
//!
//! - `parser`: tree-sitter-java front end producing owned syntax trees
//! - `syntax`: the syntax tree, visitors, edits and the printer
//! - `analysis`: type index, binding and the [`analysis::SemanticQuery`]
//!   that checks and fixers read through
//! - `detect`: the checks, the marker stores and the analysis [`Driver`]
//! - `fix`: fixers and the resolution engine
//! - `config`: YAML project configuration
//! - `report`: Output formatting (pretty, JSON, SARIF)

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod fix;
pub mod logging;
pub mod parser;
pub mod report;
pub mod syntax;

pub use analysis::{Project, ProjectLayout, SemanticQuery};
pub use config::Config;
pub use detect::{
    AnalysisResult, ChangeSet, Check, Driver, InMemoryMarkerStore, JsonMarkerStore, Marker,
    MarkerStore, Problem, Severity,
};
pub use error::{Error, Result};
pub use fix::{Fixer, FixerRegistry, ResolutionEngine, Rewrite};
