//! Convention checks and the driver that runs them.

pub(crate) mod checks;
mod markers;
mod package_info;
mod reporter;
mod runner;
mod types;

pub use checks::Check;
pub use markers::{InMemoryMarkerStore, JsonMarkerStore, MarkerStore, DEFAULT_MARKERS_PATH};
pub use package_info::PACKAGE_INFO;
pub use reporter::{MarkerCollector, ProblemReporter};
pub use runner::{ChangeSet, Driver};
pub use types::{AnalysisResult, Marker, Problem, Severity};
