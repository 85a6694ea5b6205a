//! Project-wide index of declared types.

use std::collections::{HashMap, HashSet};

use super::builtins;
use super::model::{TypeInfo, TypeKind};

/// Every type known to the analysis: the built-in catalogue plus the named
/// types declared by the project's compilation units.
#[derive(Debug, Clone)]
pub struct TypeIndex {
    /// Names and kinds, available before signatures are built.
    names: HashMap<String, TypeKind>,
    types: HashMap<String, TypeInfo>,
}

impl Default for TypeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeIndex {
    /// An index holding only the built-in catalogue.
    pub fn new() -> Self {
        let mut index = Self {
            names: HashMap::new(),
            types: HashMap::new(),
        };
        for info in builtins::all() {
            index.insert(info);
        }
        index
    }

    /// Make a project type name known ahead of its signature.
    pub fn declare(&mut self, qualified_name: &str, kind: TypeKind) {
        self.names.insert(qualified_name.to_string(), kind);
    }

    pub fn insert(&mut self, info: TypeInfo) {
        if info.is_anonymous() {
            return;
        }
        self.names.insert(info.qualified_name.clone(), info.kind);
        self.types.insert(info.qualified_name.clone(), info);
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.names.contains_key(qualified_name)
    }

    pub fn kind_of(&self, qualified_name: &str) -> Option<TypeKind> {
        self.names.get(qualified_name).copied()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&TypeInfo> {
        self.types.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Superclasses of `info`, nearest first. Stops at the first type that is
    /// not indexed and guards against cyclic declarations.
    pub fn superclasses<'a>(&'a self, info: &'a TypeInfo) -> Vec<&'a TypeInfo> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = info.superclass.as_deref();
        while let Some(name) = next {
            if !seen.insert(name) {
                break;
            }
            match self.get(name) {
                Some(superclass) => {
                    chain.push(superclass);
                    next = superclass.superclass.as_deref();
                }
                None => break,
            }
        }
        chain
    }

    /// All indexed supertypes of `info`, breadth first, superclass before
    /// interfaces at each level.
    pub fn supertypes<'a>(&'a self, info: &'a TypeInfo) -> Vec<&'a TypeInfo> {
        let mut out: Vec<&TypeInfo> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: Vec<&TypeInfo> = vec![info];
        let mut cursor = 0;
        while cursor < queue.len() {
            let current = queue[cursor];
            cursor += 1;
            let direct = current
                .superclass
                .iter()
                .chain(current.interfaces.iter());
            for name in direct {
                if !seen.insert(name.as_str()) {
                    continue;
                }
                if let Some(supertype) = self.get(name) {
                    out.push(supertype);
                    queue.push(supertype);
                }
            }
        }
        out
    }

    /// Whether any supertype of `info`, at any depth, failed to resolve or is
    /// missing from the index.
    pub fn has_unknown_supertypes(&self, info: &TypeInfo) -> bool {
        if info.unresolved_supertypes {
            return true;
        }
        let direct_missing = |t: &TypeInfo| {
            t.superclass
                .iter()
                .chain(t.interfaces.iter())
                .any(|name| self.get(name).is_none())
        };
        direct_missing(info)
            || self
                .supertypes(info)
                .into_iter()
                .any(|t| t.unresolved_supertypes || direct_missing(t))
    }

    /// Whether `qualified_name` is `target` or one of its indexed subtypes.
    pub fn is_subtype_of(&self, qualified_name: &str, target: &str) -> bool {
        if qualified_name == target {
            return true;
        }
        match self.get(qualified_name) {
            Some(info) => self
                .supertypes(info)
                .iter()
                .any(|t| t.qualified_name == target),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::builtins::{EXCEPTION, OBJECT, THROWABLE};

    #[test]
    fn test_builtins_are_indexed() {
        let index = TypeIndex::new();
        assert!(index.contains(OBJECT));
        assert_eq!(index.kind_of("java.lang.Runnable"), Some(TypeKind::Interface));
        assert!(!index.is_empty());
    }

    #[test]
    fn test_exception_hierarchy() {
        let index = TypeIndex::new();
        assert!(index.is_subtype_of("java.io.IOException", THROWABLE));
        assert!(index.is_subtype_of(EXCEPTION, EXCEPTION));
        assert!(!index.is_subtype_of("java.lang.String", THROWABLE));
        assert!(!index.is_subtype_of("com.example.Unknown", THROWABLE));

        let io = index.get("java.io.IOException").unwrap();
        let chain: Vec<&str> = index
            .superclasses(io)
            .iter()
            .map(|t| t.qualified_name.as_str())
            .collect();
        assert_eq!(chain, vec![EXCEPTION, THROWABLE, OBJECT]);
    }

    #[test]
    fn test_supertypes_include_interfaces() {
        let index = TypeIndex::new();
        let analyzer = index
            .get("org.springframework.boot.diagnostics.AbstractFailureAnalyzer")
            .unwrap();
        assert!(index
            .supertypes(analyzer)
            .iter()
            .any(|t| t.qualified_name == "org.springframework.boot.diagnostics.FailureAnalyzer"));
        assert!(!index.has_unknown_supertypes(analyzer));
    }
}
