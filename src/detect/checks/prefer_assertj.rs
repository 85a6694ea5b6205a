//! `fail()` in a try block and `assertThat()` in a catch block, where
//! AssertJ's exception assertions would be clearer.

use crate::analysis::builtins::EXCEPTION;
use crate::analysis::SemanticQuery;
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

use super::{ASSERTIONS, JUNIT_ASSERT};

pub(super) fn run(query: &SemanticQuery<'_>, reporter: &mut dyn ProblemReporter) {
    let tree = query.tree();
    let mut visitor = PreferAssertj {
        query,
        reporter,
        handlers: Vec::new(),
    };
    walk(tree, tree.root(), &mut visitor);
}

/// Invocation that is unwanted in the innermost enclosing block.
#[derive(Debug, Clone, Copy)]
enum Unwanted {
    AssertFail,
    AssertThat,
}

impl Unwanted {
    fn target(self) -> (&'static str, &'static str) {
        match self {
            Unwanted::AssertFail => (JUNIT_ASSERT, "fail"),
            Unwanted::AssertThat => (ASSERTIONS, "assertThat"),
        }
    }
}

struct PreferAssertj<'q, 'r> {
    query: &'q SemanticQuery<'q>,
    reporter: &'r mut dyn ProblemReporter,
    handlers: Vec<Unwanted>,
}

impl Visitor for PreferAssertj<'_, '_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        match tree.kind(node) {
            NodeKind::TryStatement | NodeKind::TryWithResourcesStatement => {
                self.handlers.push(Unwanted::AssertFail)
            }
            NodeKind::CatchClause => self.handlers.push(Unwanted::AssertThat),
            NodeKind::MethodInvocation => {
                if let Some(&unwanted) = self.handlers.last() {
                    self.check(node, unwanted);
                }
            }
            _ => {}
        }
        true
    }

    fn leave(&mut self, tree: &SyntaxTree, node: NodeId) {
        if matches!(
            tree.kind(node),
            NodeKind::TryStatement | NodeKind::TryWithResourcesStatement | NodeKind::CatchClause
        ) {
            self.handlers.pop();
        }
    }
}

impl PreferAssertj<'_, '_> {
    fn check(&mut self, invocation: NodeId, unwanted: Unwanted) {
        let query = self.query;
        let Some(target) = query.method_binding(invocation) else {
            return;
        };
        let Some(method) =
            query.find_ancestor(invocation, |kind| kind == NodeKind::MethodDeclaration)
        else {
            return;
        };
        if self.returns_exception(method) {
            return;
        }
        let (declaring_type, name) = unwanted.target();
        if target.is(declaring_type, name) {
            self.reporter
                .warning(Problem::AssertjExceptionAssertionSupportNotUsed, invocation, &[]);
        }
    }

    /// Methods that hand back a caught exception keep their try/catch.
    fn returns_exception(&self, method: NodeId) -> bool {
        let Some((_, info)) = self.query.unit().method_at(method) else {
            return false;
        };
        let Some(return_type) = info.return_type.as_deref() else {
            return false;
        };
        let index = self.query.index();
        index.is_subtype_of(return_type, EXCEPTION) || index.is_subtype_of(EXCEPTION, return_type)
    }
}
