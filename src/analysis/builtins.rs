//! Catalogue of well-known library types.
//!
//! Project sources only reference JDK, Spring and test-library types by
//! name, so the binder needs a summary of the ones the checks reason about:
//! their supertypes, meta-annotations, annotation element defaults and the
//! members invoked through them. Every abstract method of a listed type is
//! present; concrete members are listed only when a check needs them.

use phf::phf_map;

use super::model::{
    AnnotationInfo, AnnotationValue, MethodInfo, Modifiers, ParamInfo, TypeInfo, TypeKind,
};

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const THROWABLE: &str = "java.lang.Throwable";
pub const EXCEPTION: &str = "java.lang.Exception";

pub(crate) struct Builtin {
    kind: TypeKind,
    is_final: bool,
    is_abstract: bool,
    superclass: Option<&'static str>,
    interfaces: &'static [&'static str],
    /// Meta-annotations of annotation types.
    annotations: &'static [&'static str],
    methods: &'static [BuiltinMethod],
    /// Boolean annotation elements and their defaults.
    elements: &'static [(&'static str, bool)],
}

pub(crate) struct BuiltinMethod {
    name: &'static str,
    params: &'static [&'static str],
    returns: &'static str,
    is_static: bool,
    is_abstract: bool,
}

const fn class(superclass: &'static str) -> Builtin {
    Builtin {
        kind: TypeKind::Class,
        is_final: false,
        is_abstract: false,
        superclass: Some(superclass),
        interfaces: &[],
        annotations: &[],
        methods: &[],
        elements: &[],
    }
}

const fn interface(methods: &'static [BuiltinMethod]) -> Builtin {
    Builtin {
        kind: TypeKind::Interface,
        is_final: false,
        is_abstract: true,
        superclass: None,
        interfaces: &[],
        annotations: &[],
        methods,
        elements: &[],
    }
}

const fn annotation(meta: &'static [&'static str]) -> Builtin {
    Builtin {
        kind: TypeKind::Annotation,
        is_final: false,
        is_abstract: true,
        superclass: None,
        interfaces: &[],
        annotations: meta,
        methods: &[],
        elements: &[],
    }
}

const fn configuration(meta: &'static [&'static str], proxy_default: bool) -> Builtin {
    Builtin {
        elements: if proxy_default {
            &[("proxyBeanMethods", true)]
        } else {
            &[("proxyBeanMethods", false)]
        },
        ..annotation(meta)
    }
}

const fn abstract_method(
    name: &'static str,
    params: &'static [&'static str],
    returns: &'static str,
) -> BuiltinMethod {
    BuiltinMethod {
        name,
        params,
        returns,
        is_static: false,
        is_abstract: true,
    }
}

const fn static_method(
    name: &'static str,
    params: &'static [&'static str],
    returns: &'static str,
) -> BuiltinMethod {
    BuiltinMethod {
        name,
        params,
        returns,
        is_static: true,
        is_abstract: false,
    }
}

const fn method(name: &'static str, params: &'static [&'static str], returns: &'static str) -> BuiltinMethod {
    BuiltinMethod {
        name,
        params,
        returns,
        is_static: false,
        is_abstract: false,
    }
}

const ABSTRACT_ASSERT: &str = "org.assertj.core.api.AbstractAssert";
const THROWABLE_ASSERT: &str = "org.assertj.core.api.AbstractThrowableAssert";
const COMPONENT: &str = "org.springframework.stereotype.Component";
const CONFIGURATION: &str = "org.springframework.context.annotation.Configuration";

static BUILTINS: phf::Map<&'static str, Builtin> = phf_map! {
    "java.lang.Object" => Builtin {
        superclass: None,
        methods: &[
            method("equals", &["java.lang.Object"], "boolean"),
            method("hashCode", &[], "int"),
            method("toString", &[], "java.lang.String"),
            method("getClass", &[], "java.lang.Class"),
        ],
        ..class(OBJECT)
    },
    "java.lang.Throwable" => Builtin {
        methods: &[
            method("getMessage", &[], "java.lang.String"),
            method("getCause", &[], "java.lang.Throwable"),
        ],
        ..class(OBJECT)
    },
    "java.lang.Exception" => class(THROWABLE),
    "java.lang.Error" => class(THROWABLE),
    "java.lang.RuntimeException" => class(EXCEPTION),
    "java.lang.IllegalArgumentException" => class("java.lang.RuntimeException"),
    "java.lang.IllegalStateException" => class("java.lang.RuntimeException"),
    "java.lang.NullPointerException" => class("java.lang.RuntimeException"),
    "java.lang.UnsupportedOperationException" => class("java.lang.RuntimeException"),
    "java.lang.AssertionError" => class("java.lang.Error"),
    "java.io.IOException" => class(EXCEPTION),
    "java.io.UncheckedIOException" => class("java.lang.RuntimeException"),
    "java.lang.String" => Builtin {
        is_final: true,
        interfaces: &["java.lang.CharSequence", "java.lang.Comparable"],
        methods: &[
            method("indexOf", &["java.lang.String"], "int"),
            method("indexOf", &["int"], "int"),
            method("indexOf", &["java.lang.String", "int"], "int"),
            method("indexOf", &["int", "int"], "int"),
            method("lastIndexOf", &["java.lang.String"], "int"),
            method("lastIndexOf", &["int"], "int"),
            method("lastIndexOf", &["java.lang.String", "int"], "int"),
            method("lastIndexOf", &["int", "int"], "int"),
            method("substring", &["int"], "java.lang.String"),
            method("substring", &["int", "int"], "java.lang.String"),
            method("trim", &[], "java.lang.String"),
            method("toLowerCase", &[], "java.lang.String"),
            method("toUpperCase", &[], "java.lang.String"),
            method("strip", &[], "java.lang.String"),
            method("replace", &["java.lang.CharSequence", "java.lang.CharSequence"], "java.lang.String"),
            static_method("valueOf", &["java.lang.Object"], "java.lang.String"),
            static_method("format", &["java.lang.String", "java.lang.Object[]"], "java.lang.String"),
        ],
        ..class(OBJECT)
    },
    "java.lang.StringBuilder" => Builtin {
        is_final: true,
        methods: &[method("toString", &[], "java.lang.String")],
        ..class(OBJECT)
    },
    "java.lang.Enum" => Builtin { is_abstract: true, ..class(OBJECT) },
    "java.lang.Record" => Builtin { is_abstract: true, ..class(OBJECT) },
    "java.lang.Class" => Builtin { is_final: true, ..class(OBJECT) },
    "java.lang.CharSequence" => interface(&[
        abstract_method("length", &[], "int"),
        abstract_method("charAt", &["int"], "char"),
        abstract_method("subSequence", &["int", "int"], "java.lang.CharSequence"),
    ]),
    "java.lang.Comparable" => interface(&[abstract_method("compareTo", &["T"], "int")]),
    "java.lang.Runnable" => interface(&[abstract_method("run", &[], "void")]),
    "java.lang.AutoCloseable" => interface(&[abstract_method("close", &[], "void")]),
    "java.io.Closeable" => Builtin {
        interfaces: &["java.lang.AutoCloseable"],
        ..interface(&[abstract_method("close", &[], "void")])
    },
    "java.lang.Iterable" => interface(&[abstract_method("iterator", &[], "java.util.Iterator")]),
    "java.util.concurrent.Callable" => interface(&[abstract_method("call", &[], "V")]),
    "java.util.function.Supplier" => interface(&[abstract_method("get", &[], "T")]),
    "java.util.function.Consumer" => interface(&[abstract_method("accept", &["T"], "void")]),
    "java.util.function.Function" => interface(&[abstract_method("apply", &["T"], "R")]),
    "java.util.function.Predicate" => interface(&[abstract_method("test", &["T"], "boolean")]),
    "java.lang.Override" => annotation(&[]),
    "java.lang.Deprecated" => annotation(&[]),
    "java.lang.SuppressWarnings" => annotation(&[]),
    "java.lang.FunctionalInterface" => annotation(&[]),
    "java.lang.annotation.Documented" => annotation(&[]),
    "java.lang.annotation.Retention" => annotation(&[]),
    "java.lang.annotation.Target" => annotation(&[]),

    "org.springframework.stereotype.Component" => annotation(&[]),
    "org.springframework.stereotype.Service" => annotation(&[COMPONENT]),
    "org.springframework.stereotype.Repository" => annotation(&[COMPONENT]),
    "org.springframework.stereotype.Controller" => annotation(&[COMPONENT]),
    "org.springframework.web.bind.annotation.RestController" => {
        annotation(&["org.springframework.stereotype.Controller"])
    },
    "org.springframework.web.bind.annotation.ControllerAdvice" => annotation(&[COMPONENT]),
    "org.springframework.web.bind.annotation.RestControllerAdvice" => {
        annotation(&["org.springframework.web.bind.annotation.ControllerAdvice"])
    },
    "org.springframework.web.bind.annotation.ExceptionHandler" => annotation(&[]),
    "org.springframework.context.annotation.Configuration" => configuration(&[COMPONENT], true),
    "org.springframework.context.annotation.Bean" => annotation(&[]),
    "org.springframework.context.annotation.Import" => annotation(&[]),
    "org.springframework.boot.SpringBootConfiguration" => configuration(&[CONFIGURATION], true),
    "org.springframework.boot.autoconfigure.SpringBootApplication" => {
        configuration(&["org.springframework.boot.SpringBootConfiguration"], true)
    },
    "org.springframework.boot.autoconfigure.AutoConfiguration" => {
        configuration(&[CONFIGURATION], false)
    },
    "org.springframework.boot.test.context.TestConfiguration" => {
        configuration(&[CONFIGURATION], true)
    },
    "org.springframework.boot.actuate.autoconfigure.web.ManagementContextConfiguration" => {
        configuration(&[CONFIGURATION], true)
    },
    "org.springframework.beans.factory.annotation.Autowired" => Builtin {
        elements: &[("required", true)],
        ..annotation(&[])
    },
    "org.springframework.beans.factory.annotation.Qualifier" => annotation(&[]),
    "org.springframework.beans.factory.annotation.Value" => annotation(&[]),
    "org.springframework.beans.factory.ObjectProvider" => interface(&[
        abstract_method("getObject", &["java.lang.Object[]"], "T"),
        abstract_method("getIfAvailable", &[], "T"),
        abstract_method("getIfUnique", &[], "T"),
        abstract_method("getObject", &[], "T"),
    ]),
    "org.springframework.boot.diagnostics.FailureAnalyzer" => interface(&[abstract_method(
        "analyze",
        &["java.lang.Throwable"],
        "org.springframework.boot.diagnostics.FailureAnalysis",
    )]),
    "org.springframework.boot.diagnostics.AbstractFailureAnalyzer" => Builtin {
        is_abstract: true,
        interfaces: &["org.springframework.boot.diagnostics.FailureAnalyzer"],
        methods: &[
            method(
                "analyze",
                &["java.lang.Throwable"],
                "org.springframework.boot.diagnostics.FailureAnalysis",
            ),
            abstract_method(
                "analyze",
                &["java.lang.Throwable", "T"],
                "org.springframework.boot.diagnostics.FailureAnalysis",
            ),
        ],
        ..class(OBJECT)
    },
    "org.springframework.boot.diagnostics.FailureAnalysis" => class(OBJECT),

    "org.assertj.core.api.Assertions" => Builtin {
        methods: &[
            static_method("assertThat", &["T"], ABSTRACT_ASSERT),
            static_method("assertThatThrownBy", &["org.assertj.core.api.ThrowableAssert.ThrowingCallable"], THROWABLE_ASSERT),
            static_method("assertThatExceptionOfType", &["java.lang.Class"], "org.assertj.core.api.ThrowableTypeAssert"),
            static_method("assertThatIllegalStateException", &[], "org.assertj.core.api.ThrowableTypeAssert"),
            static_method("assertThatIllegalArgumentException", &[], "org.assertj.core.api.ThrowableTypeAssert"),
            static_method("fail", &["java.lang.String"], "T"),
        ],
        ..class(OBJECT)
    },
    "org.junit.Assert" => Builtin {
        methods: &[
            static_method("fail", &[], "void"),
            static_method("fail", &["java.lang.String"], "void"),
            static_method("assertEquals", &["java.lang.Object", "java.lang.Object"], "void"),
            static_method("assertTrue", &["boolean"], "void"),
            static_method("assertFalse", &["boolean"], "void"),
            static_method("assertNotNull", &["java.lang.Object"], "void"),
        ],
        ..class(OBJECT)
    },
    "org.junit.Test" => annotation(&[]),
    "org.junit.jupiter.api.Test" => annotation(&[]),
};

/// Whether `qualified_name` is a catalogued library type.
pub fn is_builtin(qualified_name: &str) -> bool {
    BUILTINS.contains_key(qualified_name)
}

/// Summaries of every catalogued type.
pub(crate) fn all() -> impl Iterator<Item = TypeInfo> {
    BUILTINS
        .entries()
        .map(|(name, builtin)| to_type_info(name, builtin))
}

fn to_type_info(qualified_name: &str, builtin: &Builtin) -> TypeInfo {
    let simple_name = qualified_name
        .rsplit('.')
        .next()
        .unwrap_or(qualified_name)
        .to_string();

    let mut methods: Vec<MethodInfo> = builtin
        .methods
        .iter()
        .map(|m| MethodInfo {
            name: m.name.to_string(),
            params: m
                .params
                .iter()
                .enumerate()
                .map(|(i, p)| ParamInfo {
                    name: format!("arg{}", i),
                    type_name: p.to_string(),
                    type_variable: p.len() == 1,
                })
                .collect(),
            varargs: m.params.last().map_or(false, |p| p.ends_with("[]")),
            return_type: Some(m.returns.to_string()),
            modifiers: Modifiers {
                public: true,
                is_static: m.is_static,
                is_abstract: m.is_abstract,
                ..Modifiers::default()
            },
            annotations: Vec::new(),
            is_constructor: false,
            has_body: !m.is_abstract,
            default_value: None,
            node: None,
        })
        .collect();

    methods.extend(builtin.elements.iter().map(|(name, default)| MethodInfo {
        name: name.to_string(),
        params: Vec::new(),
        varargs: false,
        return_type: Some("boolean".to_string()),
        modifiers: Modifiers {
            public: true,
            is_abstract: true,
            ..Modifiers::default()
        },
        annotations: Vec::new(),
        is_constructor: false,
        has_body: false,
        default_value: Some(AnnotationValue::Bool(*default)),
        node: None,
    }));

    TypeInfo {
        qualified_name: qualified_name.to_string(),
        simple_name,
        kind: builtin.kind,
        modifiers: Modifiers {
            public: true,
            is_final: builtin.is_final,
            is_abstract: builtin.is_abstract,
            ..Modifiers::default()
        },
        superclass: builtin.superclass.map(str::to_string),
        interfaces: builtin.interfaces.iter().map(|i| i.to_string()).collect(),
        unresolved_supertypes: false,
        annotations: builtin
            .annotations
            .iter()
            .map(|a| AnnotationInfo {
                type_name: a.to_string(),
                resolved: true,
                values: Vec::new(),
                node: None,
            })
            .collect(),
        methods,
        fields: Vec::new(),
        type_parameters: Vec::new(),
        complete: false,
        node: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_is_the_root() {
        let object = all().find(|t| t.qualified_name == OBJECT).unwrap();
        assert_eq!(object.superclass, None);
        let exception = all().find(|t| t.qualified_name == EXCEPTION).unwrap();
        assert_eq!(exception.superclass.as_deref(), Some(THROWABLE));
    }

    #[test]
    fn test_configuration_annotations_carry_proxy_defaults() {
        let auto = all()
            .find(|t| t.qualified_name == "org.springframework.boot.autoconfigure.AutoConfiguration")
            .unwrap();
        let element = auto.methods_named("proxyBeanMethods").next().unwrap();
        assert_eq!(element.default_value, Some(AnnotationValue::Bool(false)));
        assert_eq!(auto.annotations[0].type_name, CONFIGURATION);
    }

    #[test]
    fn test_type_variables_are_single_letters() {
        let supplier = all()
            .find(|t| t.qualified_name == "java.util.function.Consumer")
            .unwrap();
        assert!(supplier.methods[0].params[0].type_variable);
        assert!(is_builtin("org.junit.Assert"));
    }
}
