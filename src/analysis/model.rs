//! Semantic model: declared types, their members, and node bindings.

use crate::syntax::NodeId;

/// What sort of type a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    pub fn is_interface(&self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }
}

/// Modifier keywords, explicit or implied by the declaration context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub public: bool,
    pub protected: bool,
    pub private: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_default: bool,
}

impl Modifiers {
    /// Record one modifier keyword.
    pub fn set(&mut self, keyword: &str) {
        match keyword {
            "public" => self.public = true,
            "protected" => self.protected = true,
            "private" => self.private = true,
            "static" => self.is_static = true,
            "final" => self.is_final = true,
            "abstract" => self.is_abstract = true,
            "default" => self.is_default = true,
            _ => {}
        }
    }

    pub fn is_package_private(&self) -> bool {
        !self.public && !self.protected && !self.private
    }
}

/// A constant value of an annotation element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    Bool(bool),
    Str(String),
    /// Any other expression, kept as source text.
    Other(String),
}

impl AnnotationValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// An annotation applied to a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInfo {
    /// Qualified name when resolved, otherwise the name as written.
    pub type_name: String,
    pub resolved: bool,
    /// Explicit element values; a single unnamed value is keyed `value`.
    pub values: Vec<(String, AnnotationValue)>,
    pub node: Option<NodeId>,
}

impl AnnotationInfo {
    pub fn value(&self, element: &str) -> Option<&AnnotationValue> {
        self.values
            .iter()
            .find(|(name, _)| name == element)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    /// Qualified erasure when resolved, otherwise the written name.
    pub type_name: String,
    /// Declared as a type variable of the method or its type.
    pub type_variable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub varargs: bool,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationInfo>,
    pub is_constructor: bool,
    pub has_body: bool,
    /// Default of an annotation element.
    pub default_value: Option<AnnotationValue>,
    pub node: Option<NodeId>,
}

impl MethodInfo {
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.varargs {
            count + 1 >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotations.iter().any(|a| a.type_name == qualified_name)
    }

    pub fn is_abstract(&self) -> bool {
        !self.is_constructor
            && !self.has_body
            && !self.modifiers.is_static
            && !self.modifiers.is_default
            && !self.modifiers.private
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub type_name: Option<String>,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationInfo>,
}

/// A declared type, from source or from the built-in catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Empty for anonymous classes.
    pub qualified_name: String,
    pub simple_name: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    /// `java.lang.Object` for classes that declare no superclass.
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    /// A declared supertype could not be resolved.
    pub unresolved_supertypes: bool,
    pub annotations: Vec<AnnotationInfo>,
    pub methods: Vec<MethodInfo>,
    pub fields: Vec<FieldInfo>,
    pub type_parameters: Vec<String>,
    /// Whether `methods` lists every method the type declares.
    pub complete: bool,
    pub node: Option<NodeId>,
}

impl TypeInfo {
    pub fn is_anonymous(&self) -> bool {
        self.qualified_name.is_empty()
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodInfo> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.iter().filter(|m| m.is_constructor)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn annotation(&self, qualified_name: &str) -> Option<&AnnotationInfo> {
        self.annotations
            .iter()
            .find(|a| a.type_name == qualified_name)
    }

    /// Binary name as used in `spring.factories` (`a.b.Outer$Inner`).
    pub fn binary_name(&self, package: Option<&str>) -> String {
        match package {
            Some(package) if !package.is_empty() => {
                let nested = self
                    .qualified_name
                    .strip_prefix(package)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .unwrap_or(&self.qualified_name);
                format!("{}.{}", package, nested.replace('.', "$"))
            }
            _ => self.qualified_name.replace('.', "$"),
        }
    }
}

/// Resolved identity of a method invocation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub declaring_type: String,
    pub name: String,
    pub return_type: Option<String>,
    /// Qualified names of the annotations on the invoked method.
    pub annotations: Vec<String>,
    pub is_static: bool,
}

impl MethodRef {
    pub(crate) fn from_info(declaring_type: &str, method: &MethodInfo) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: method.name.clone(),
            return_type: method.return_type.clone(),
            annotations: method
                .annotations
                .iter()
                .filter(|a| a.resolved)
                .map(|a| a.type_name.clone())
                .collect(),
            is_static: method.modifiers.is_static,
        }
    }

    /// A target known only by its declaring type and name.
    pub(crate) fn opaque(declaring_type: &str, name: &str) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            return_type: None,
            annotations: Vec::new(),
            is_static: false,
        }
    }

    pub fn is(&self, declaring_type: &str, name: &str) -> bool {
        self.declaring_type == declaring_type && self.name == name
    }
}

/// Semantic fact attached to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Annotations, type declarations and Javadoc references.
    Type(String),
    /// Method invocations.
    Method(MethodRef),
    /// Simple-name references to a local variable or parameter, identified
    /// by the name node of its declaration.
    Variable(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_named(qualified_name: &str) -> TypeInfo {
        TypeInfo {
            qualified_name: qualified_name.to_string(),
            simple_name: qualified_name.rsplit('.').next().unwrap().to_string(),
            kind: TypeKind::Class,
            modifiers: Modifiers::default(),
            superclass: None,
            interfaces: Vec::new(),
            unresolved_supertypes: false,
            annotations: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            type_parameters: Vec::new(),
            complete: true,
            node: None,
        }
    }

    #[test]
    fn test_binary_name_uses_dollar_for_nesting() {
        let nested = type_named("com.example.Outer.Inner");
        assert_eq!(
            nested.binary_name(Some("com.example")),
            "com.example.Outer$Inner"
        );
        let top = type_named("com.example.Outer");
        assert_eq!(top.binary_name(Some("com.example")), "com.example.Outer");
    }

    #[test]
    fn test_varargs_arity() {
        let method = MethodInfo {
            name: "of".to_string(),
            params: vec![
                ParamInfo {
                    name: "first".to_string(),
                    type_name: "java.lang.String".to_string(),
                    type_variable: false,
                },
                ParamInfo {
                    name: "rest".to_string(),
                    type_name: "java.lang.String[]".to_string(),
                    type_variable: false,
                },
            ],
            varargs: true,
            return_type: None,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            is_constructor: false,
            has_body: true,
            default_value: None,
            node: None,
        };
        assert!(method.accepts_arity(1));
        assert!(method.accepts_arity(4));
        assert!(!method.accepts_arity(0));
    }
}
