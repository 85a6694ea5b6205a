//! Sink for problems found by checks.

use crate::syntax::{NodeId, SyntaxTree};

use super::types::{Marker, Problem, Severity};

/// Receives the problems reported while visiting one resource.
///
/// Checks only ever talk to this trait, so how problems are surfaced or
/// persisted stays out of the visitors.
pub trait ProblemReporter {
    fn warning(&mut self, problem: Problem, node: NodeId, args: &[&str]);

    fn error(&mut self, problem: Problem, node: NodeId, args: &[&str]);

    /// A warning about the resource as a whole, with no source range.
    fn resource_warning(&mut self, problem: Problem, args: &[&str]);
}

/// Reporter that turns problems into [`Marker`]s for one resource.
pub struct MarkerCollector<'a> {
    resource: &'a str,
    tree: Option<&'a SyntaxTree>,
    markers: Vec<Marker>,
}

impl<'a> MarkerCollector<'a> {
    /// Collector for problems anchored at nodes of `tree`.
    pub fn for_unit(resource: &'a str, tree: &'a SyntaxTree) -> Self {
        Self {
            resource,
            tree: Some(tree),
            markers: Vec::new(),
        }
    }

    /// Collector for resources without a syntax tree, such as folders.
    pub fn for_resource(resource: &'a str) -> Self {
        Self {
            resource,
            tree: None,
            markers: Vec::new(),
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn into_markers(self) -> Vec<Marker> {
        self.markers
    }

    fn report(&mut self, problem: Problem, severity: Severity, node: Option<NodeId>, args: &[&str]) {
        let message_args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let mut marker = Marker {
            problem_id: problem.id().to_string(),
            severity,
            resource: self.resource.to_string(),
            char_start: None,
            char_end: None,
            line_number: None,
            message: problem.format(&message_args),
            message_args,
            location: None,
        };
        match (node, self.tree) {
            (Some(node), Some(tree)) => {
                let span = tree.span(node);
                let line = tree.line_number(span.start);
                marker.char_start = Some(span.start);
                marker.char_end = Some(span.end);
                marker.line_number = Some(line);
                marker.location = Some(format!("Line {}", line));
            }
            (Some(node), None) => {
                tracing::warn!(resource = self.resource, %node, "node reported without a tree");
            }
            (None, _) => {}
        }
        tracing::trace!(resource = self.resource, problem = %problem, "reported");
        self.markers.push(marker);
    }
}

impl ProblemReporter for MarkerCollector<'_> {
    fn warning(&mut self, problem: Problem, node: NodeId, args: &[&str]) {
        self.report(problem, Severity::Warning, Some(node), args);
    }

    fn error(&mut self, problem: Problem, node: NodeId, args: &[&str]) {
        self.report(problem, Severity::Error, Some(node), args);
    }

    fn resource_warning(&mut self, problem: Problem, args: &[&str]) {
        self.report(problem, Severity::Warning, None, args);
    }
}
