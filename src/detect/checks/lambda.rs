//! Lambda expression style.
//!
//! Both checks keep descending after a lambda, so lambdas nested in a
//! lambda body are checked as well.

use crate::analysis::SemanticQuery;
use crate::detect::reporter::ProblemReporter;
use crate::detect::types::Problem;
use crate::syntax::{walk, NodeId, NodeKind, SyntaxTree, Visitor};

/// Flags the parameter of `x -> ...` lambdas.
pub(super) fn parameter_parentheses(
    query: &SemanticQuery<'_>,
    reporter: &mut dyn ProblemReporter,
) {
    let tree = query.tree();
    walk(tree, tree.root(), &mut ParameterParentheses { reporter });
}

/// Flags the statement of `x -> { statement; }` lambdas when dropping the
/// braces would be safe.
pub(super) fn single_statement_block(
    query: &SemanticQuery<'_>,
    reporter: &mut dyn ProblemReporter,
) {
    let tree = query.tree();
    walk(tree, tree.root(), &mut SingleStatementBlock { reporter });
}

struct ParameterParentheses<'r> {
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for ParameterParentheses<'_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if tree.kind(node) == NodeKind::LambdaExpression {
            if let Some(parameter) = unparenthesized_parameter(tree, node) {
                self.reporter
                    .warning(Problem::MissingParenthesesAroundLambdaParameter, parameter, &[]);
            }
        }
        true
    }
}

/// The parameter of a lambda written without parentheses.
pub(crate) fn unparenthesized_parameter(tree: &SyntaxTree, lambda: NodeId) -> Option<NodeId> {
    if tree.node(lambda).parenthesized {
        return None;
    }
    tree.child_by_field(lambda, "parameters")
        .filter(|&p| tree.kind(p) == NodeKind::Identifier)
}

struct SingleStatementBlock<'r> {
    reporter: &'r mut dyn ProblemReporter,
}

impl Visitor for SingleStatementBlock<'_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if tree.kind(node) != NodeKind::LambdaExpression {
            return true;
        }
        let Some(body) = tree.child_by_field(node, "body") else {
            return true;
        };
        if tree.kind(body) != NodeKind::Block {
            return true;
        }
        let statements: Vec<NodeId> = tree
            .named_children(body)
            .filter(|&s| !tree.kind(s).is_comment())
            .collect();
        if let [statement] = statements.as_slice() {
            let statement = *statement;
            let exempt = matches!(
                tree.kind(statement),
                NodeKind::SwitchExpression | NodeKind::ThrowStatement
            );
            if !exempt && !contains_block(tree, statement) {
                self.reporter.warning(
                    Problem::LambdaExpressionBodyIsSingleStatementBlock,
                    statement,
                    &[],
                );
            }
        }
        true
    }
}

fn contains_block(tree: &SyntaxTree, statement: NodeId) -> bool {
    tree.descendants(statement)
        .into_iter()
        .any(|n| tree.kind(n) == NodeKind::Block)
}
