//! Converts `@Autowired` fields of a class into constructor parameters.

use crate::analysis::SemanticQuery;
use crate::detect::checks::{has_modifier, members, AUTOWIRED};
use crate::detect::Problem;
use crate::syntax::{Edit, Insertion, NodeId, NodeKind, SyntaxTree};

use super::Fixer;

const OBJECT_PROVIDER: &str = "org.springframework.beans.factory.ObjectProvider";

/// Replaces field injection with a public constructor.
///
/// Fields injected with `required = false` become `ObjectProvider`
/// parameters resolved with `getIfAvailable()`.
pub struct ConstructorInjection;

struct InjectedField {
    declaration: NodeId,
    annotation: NodeId,
    name: String,
    type_text: String,
    optional: bool,
}

impl InjectedField {
    fn parameter(&self) -> String {
        if self.optional {
            format!("ObjectProvider<{}> {}Provider", self.type_text, self.name)
        } else {
            format!("{} {}", self.type_text, self.name)
        }
    }

    fn assignment(&self) -> String {
        if self.optional {
            format!("this.{0} = {0}Provider.getIfAvailable();", self.name)
        } else {
            format!("this.{0} = {0};", self.name)
        }
    }
}

impl Fixer for ConstructorInjection {
    fn name(&self) -> &'static str {
        "constructor-injection"
    }

    fn label(&self) -> &'static str {
        "Use constructor injection"
    }

    fn problem(&self) -> Problem {
        Problem::ConfigurationClassConstructorInjection
    }

    fn rewrite(&self, query: &SemanticQuery<'_>, marked: NodeId) -> Option<Vec<Edit>> {
        let tree = query.tree();
        let class = if tree.kind(marked) == NodeKind::ClassDeclaration {
            marked
        } else {
            query.find_ancestor(marked, |kind| kind == NodeKind::ClassDeclaration)?
        };
        let class_name = tree.text(tree.child_by_field(class, "name")?);

        let field_declarations: Vec<NodeId> = members(tree, class)
            .into_iter()
            .filter(|&m| tree.kind(m) == NodeKind::FieldDeclaration)
            .collect();
        let last_field = *field_declarations.last()?;
        let fields: Vec<InjectedField> = field_declarations
            .iter()
            .filter_map(|&declaration| injected_field(query, declaration))
            .collect();
        if fields.is_empty() {
            return None;
        }

        let mut edits = Vec::new();
        for field in &fields {
            make_final(tree, field, &mut edits)?;
        }

        let indent = indentation(tree, last_field);
        let unit = if indent.contains('\t') { "\t" } else { "    " };
        let parameters: Vec<String> = fields.iter().map(InjectedField::parameter).collect();
        let mut constructor = format!(
            "\n\n{}public {}({}) {{\n",
            indent,
            class_name,
            parameters.join(", ")
        );
        for field in &fields {
            constructor.push_str(&format!("{}{}{}\n", indent, unit, field.assignment()));
        }
        constructor.push_str(&format!("{}}}", indent));
        edits.push(Edit::InsertAfter {
            anchor: last_field,
            insertion: Insertion::Text(constructor),
        });

        if fields.iter().any(|f| f.optional) && !imports_object_provider(query) {
            edits.push(import_edit(tree));
        }
        Some(edits)
    }
}

fn injected_field(query: &SemanticQuery<'_>, declaration: NodeId) -> Option<InjectedField> {
    let tree = query.tree();
    let annotation = query.find_annotation(declaration, AUTOWIRED)?;
    let declarator = tree.child_by_field(declaration, "declarator")?;
    let name = tree.text(tree.child_by_field(declarator, "name")?).to_string();
    let type_text = tree
        .text(tree.child_by_field(declaration, "type")?)
        .to_string();
    let optional = query
        .annotation_value(annotation, "required")
        .and_then(|value| value.as_bool())
        == Some(false);
    Some(InjectedField {
        declaration,
        annotation,
        name,
        type_text,
        optional,
    })
}

/// Drop the annotation and add `final`.
///
/// When the annotation is the only modifier, the whole modifier list is
/// replaced so no stray line break is left before the type.
fn make_final(tree: &SyntaxTree, field: &InjectedField, edits: &mut Vec<Edit>) -> Option<()> {
    let modifiers = tree.child_of_kind(field.declaration, NodeKind::Modifiers)?;
    let others = tree
        .children(modifiers)
        .any(|c| c != field.annotation && !tree.kind(c).is_comment());
    if others {
        edits.push(Edit::Remove(field.annotation));
        if !has_modifier(tree, field.declaration, "final") {
            edits.push(Edit::Append {
                parent: modifiers,
                insertion: Insertion::Keyword("final"),
            });
        }
    } else {
        edits.push(Edit::Remove(modifiers));
        edits.push(Edit::Prepend {
            parent: field.declaration,
            insertion: Insertion::Keyword("final"),
        });
    }
    Some(())
}

/// Leading whitespace of the line `node` starts on.
fn indentation(tree: &SyntaxTree, node: NodeId) -> String {
    let start = tree.span(node).start;
    let line_start = tree.line_index().line_start(start);
    let prefix = &tree.source()[line_start..start];
    if prefix.chars().all(char::is_whitespace) {
        prefix.to_string()
    } else {
        "    ".to_string()
    }
}

fn imports_object_provider(query: &SemanticQuery<'_>) -> bool {
    let imports = &query.unit().header().imports;
    let package = OBJECT_PROVIDER
        .rsplit_once('.')
        .map(|(package, _)| package)
        .unwrap_or_default();
    imports.single.iter().any(|i| i == OBJECT_PROVIDER)
        || imports.on_demand.iter().any(|i| i == package)
}

/// Import placed after the last import, after the package declaration, or
/// at the top of the file.
fn import_edit(tree: &SyntaxTree) -> Edit {
    let statement = format!("import {};", OBJECT_PROVIDER);
    let root = tree.root();
    let last_import = tree
        .named_children(root)
        .filter(|&n| tree.kind(n) == NodeKind::ImportDeclaration)
        .last();
    if let Some(anchor) = last_import {
        return Edit::InsertAfter {
            anchor,
            insertion: Insertion::Text(format!("\n{}", statement)),
        };
    }
    match tree.child_of_kind(root, NodeKind::PackageDeclaration) {
        Some(anchor) => Edit::InsertAfter {
            anchor,
            insertion: Insertion::Text(format!("\n\n{}", statement)),
        },
        None => Edit::Prepend {
            parent: root,
            insertion: Insertion::Text(format!("{}\n\n", statement)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::checks::testing::project;
    use crate::detect::checks::Check;
    use crate::detect::MarkerCollector;
    use crate::syntax::print;

    const RESOURCE: &str = "src/main/java/com/example/ExampleConfiguration.java";

    /// Apply the fix at the first marker of the injection check.
    fn fix(source: &str) -> Option<String> {
        let configurations = project(&[(RESOURCE, source)]);
        let query = configurations.query(RESOURCE).unwrap();
        let tree = query.tree();
        let mut collector = MarkerCollector::for_unit(RESOURCE, tree);
        Check::ConfigurationConstructorInjection.run(&query, &mut collector);
        let marker = collector.markers().first()?;
        let marked = tree
            .covering_node(marker.char_start.unwrap(), marker.char_end.unwrap())
            .unwrap();
        let edits = ConstructorInjection.rewrite(&query, marked)?;
        let mut fixed = tree.clone();
        fixed.apply(&edits).unwrap();
        Some(print(&fixed))
    }

    fn remaining_markers(source: &str) -> usize {
        let configurations = project(&[(RESOURCE, source)]);
        let query = configurations.query(RESOURCE).unwrap();
        let mut collector = MarkerCollector::for_unit(RESOURCE, query.tree());
        Check::ConfigurationConstructorInjection.run(&query, &mut collector);
        collector.markers().len()
    }

    #[test]
    fn test_fields_become_constructor_parameters() {
        let source = "package com.example;

import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.context.annotation.Configuration;

@Configuration
class ExampleConfiguration {

\t@Autowired
\tprivate Environment environment;

\t@Autowired(required = false)
\tprivate Validator validator;

\tvoid other() {
\t}
}
";
        let expected = "package com.example;

import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.context.annotation.Configuration;
import org.springframework.beans.factory.ObjectProvider;

@Configuration
class ExampleConfiguration {

\tprivate final Environment environment;

\tprivate final Validator validator;

\tpublic ExampleConfiguration(Environment environment, ObjectProvider<Validator> validatorProvider) {
\t\tthis.environment = environment;
\t\tthis.validator = validatorProvider.getIfAvailable();
\t}

\tvoid other() {
\t}
}
";
        let fixed = fix(source).unwrap();
        assert_eq!(fixed, expected);
        assert_eq!(remaining_markers(&fixed), 0);
    }

    #[test]
    fn test_annotation_only_modifiers_are_replaced_by_final() {
        let source = "package com.example;

import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.context.annotation.Configuration;

@Configuration
class ExampleConfiguration {

    @Autowired
    Environment environment;

    String name = \"example\";
}
";
        let fixed = fix(source).unwrap();
        assert!(fixed.contains("    final Environment environment;\n"));
        assert!(fixed.contains(
            "    String name = \"example\";\n\n    public ExampleConfiguration(Environment environment) {\n        this.environment = environment;\n    }\n}"
        ));
        assert!(!fixed.contains("ObjectProvider"));
        assert_eq!(remaining_markers(&fixed), 0);
    }

    #[test]
    fn test_existing_object_provider_import_is_kept() {
        let source = "package com.example;

import org.springframework.beans.factory.*;
import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.context.annotation.Configuration;

@Configuration
class ExampleConfiguration {

    @Autowired(required = false)
    private Environment environment;
}
";
        let fixed = fix(source).unwrap();
        assert_eq!(fixed.matches("ObjectProvider;").count(), 0);
        assert!(fixed.contains("public ExampleConfiguration(ObjectProvider<Environment> environmentProvider)"));
    }

    #[test]
    fn test_trailing_annotation_leaves_single_space() {
        let source = "package com.example;

import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.context.annotation.Configuration;

@Configuration
class ExampleConfiguration {

    private @Autowired Environment environment;
}
";
        let fixed = fix(source).unwrap();
        assert!(fixed.contains("    private final Environment environment;\n"));
        assert_eq!(remaining_markers(&fixed), 0);
    }
}
