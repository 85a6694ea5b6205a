//! Error type for library operations.

use std::path::PathBuf;

use crate::detect::Problem;

/// Errors surfaced by the analysis driver, marker stores and fix engine.
///
/// Absent semantic information is never an error; checks skip silently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse { path: PathBuf },

    #[error("marker store {path} is corrupt: {source}")]
    MarkerStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no problem with id {0:?} exists")]
    UnknownProblem(String),

    #[error("fixer '{fixer}' does not resolve {problem:?}")]
    FixerMismatch { fixer: &'static str, problem: Problem },

    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error("marker no longer matches {path}")]
    StaleMarker { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
