//! Semantic analysis of Java sources.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files │────▶│ parser       │────▶│ SyntaxTree    │
//! └──────────────┘     └──────────────┘     └───────────────┘
//!                                                   │
//!                      ┌──────────────┐             ▼
//!                      │ TypeIndex    │◀──── declare (names, signatures)
//!                      │ (+ builtins) │             │
//!                      └──────────────┘             ▼
//!                             │             bind (types, methods,
//!                             └───────────▶  variables)
//!                                                   │
//!                                                   ▼
//!                                           ┌───────────────┐
//!                                           │ SemanticQuery │
//!                                           └───────────────┘
//! ```
//!
//! The [`Project`] drives the pipeline. Checks and fixers only ever see a
//! [`SemanticQuery`] over one [`CompilationUnit`].

mod binder;
pub mod builtins;
mod context;
mod declare;
mod index;
mod location;
mod manifest;
mod model;
mod query;
mod resolve;
mod unit;

pub use context::Project;
pub use declare::{declare_types, declared_names, DeclaredName, Declarations};
pub use index::TypeIndex;
pub use location::{ProjectLayout, SourceLocation, MAIN_ROOT, TEST_ROOTS};
pub use manifest::{SpringFactories, FAILURE_ANALYZER_KEY};
pub use model::{
    AnnotationInfo, AnnotationValue, Binding, FieldInfo, MethodInfo, MethodRef, Modifiers,
    ParamInfo, TypeInfo, TypeKind,
};
pub use query::SemanticQuery;
pub(crate) use query::is_override_equivalent;
pub use resolve::TypeResolver;
pub use unit::CompilationUnit;
