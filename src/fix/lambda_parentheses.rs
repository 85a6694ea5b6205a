//! Wraps a single inferred lambda parameter in parentheses.

use crate::analysis::SemanticQuery;
use crate::detect::checks::unparenthesized_parameter;
use crate::detect::Problem;
use crate::syntax::{Edit, NodeId, NodeKind};

use super::Fixer;

/// Wraps a lone lambda parameter in parentheses.
pub struct LambdaParentheses;

impl Fixer for LambdaParentheses {
    fn name(&self) -> &'static str {
        "lambda-parentheses"
    }

    fn label(&self) -> &'static str {
        "Add parentheses"
    }

    fn problem(&self) -> Problem {
        Problem::MissingParenthesesAroundLambdaParameter
    }

    fn rewrite(&self, query: &SemanticQuery<'_>, marked: NodeId) -> Option<Vec<Edit>> {
        let tree = query.tree();
        let lambda = if tree.kind(marked) == NodeKind::LambdaExpression {
            marked
        } else {
            tree.parent(marked)
                .filter(|&p| tree.kind(p) == NodeKind::LambdaExpression)?
        };
        unparenthesized_parameter(tree, lambda)?;
        Some(vec![Edit::Parenthesize(lambda)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::checks::testing::project;
    use crate::detect::checks::Check;
    use crate::detect::MarkerCollector;
    use crate::syntax::print;

    const RESOURCE: &str = "src/main/java/com/example/Example.java";

    fn fix_all(source: &str) -> String {
        let lambdas = project(&[(RESOURCE, source)]);
        let query = lambdas.query(RESOURCE).unwrap();
        let tree = query.tree();
        let mut collector = MarkerCollector::for_unit(RESOURCE, tree);
        Check::LambdaParameterParentheses.run(&query, &mut collector);

        let mut edits = Vec::new();
        for marker in collector.markers() {
            let marked = tree
                .covering_node(marker.char_start.unwrap(), marker.char_end.unwrap())
                .unwrap();
            edits.extend(LambdaParentheses.rewrite(&query, marked).unwrap());
        }
        let mut fixed = tree.clone();
        fixed.apply(&edits).unwrap();
        print(&fixed)
    }

    #[test]
    fn test_parenthesizes_every_marked_parameter() {
        let source = "package com.example;\nclass Example { java.util.function.Function<String, java.util.function.Function<String, String>> f = a -> b -> a + b; }\n";
        assert_eq!(
            fix_all(source),
            "package com.example;\nclass Example { java.util.function.Function<String, java.util.function.Function<String, String>> f = (a) -> (b) -> a + b; }\n"
        );
    }

    #[test]
    fn test_fix_is_idempotent() {
        let source = "package com.example;\nclass Example { Runnable r = () -> java.util.List.of(1).forEach(x -> x.hashCode()); }\n";
        let once = fix_all(source);
        assert!(once.contains("forEach((x) -> x.hashCode())"));
        assert_eq!(fix_all(&once), once);

        let checked = project(&[(RESOURCE, once.as_str())]);
        let query = checked.query(RESOURCE).unwrap();
        let mut collector = MarkerCollector::for_unit(RESOURCE, query.tree());
        Check::LambdaParameterParentheses.run(&query, &mut collector);
        assert!(collector.markers().is_empty());
    }

    #[test]
    fn test_parenthesized_lambdas_are_not_applicable() {
        let source = "package com.example;\nclass Example { java.util.function.Function<String, String> f = (s) -> s; }\n";
        let lambdas = project(&[(RESOURCE, source)]);
        let query = lambdas.query(RESOURCE).unwrap();
        let tree = query.tree();
        let lambda = tree
            .descendants(tree.root())
            .into_iter()
            .find(|&n| tree.kind(n) == NodeKind::LambdaExpression)
            .unwrap();
        assert!(LambdaParentheses.rewrite(&query, lambda).is_none());
    }
}
