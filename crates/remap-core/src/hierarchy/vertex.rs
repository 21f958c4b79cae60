//! Graph element for one class in the inheritance hierarchy.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::symbol::{ClassSymbol, MemberSymbol};

/// A vertex wraps one class symbol together with memoized relationship sets.
///
/// Vertices are immutable snapshots. The graph stamps every cached vertex
/// with the generation counter at creation and discards it wholesale once the
/// counter advances, so the memoized sets never need selective clearing.
///
/// Relationship sets are stored as class names rather than vertex handles;
/// the graph maps them back to live vertices on access. Equality and hashing
/// are based on the class name alone.
pub struct Vertex {
    symbol: Arc<ClassSymbol>,
    owned: bool,
    parents: OnceLock<Vec<String>>,
    children: OnceLock<Vec<String>>,
    all_parents: OnceLock<Vec<String>>,
    family: OnceLock<Vec<String>>,
}

impl Vertex {
    pub(crate) fn new(symbol: Arc<ClassSymbol>, owned: bool) -> Self {
        Vertex {
            symbol,
            owned,
            parents: OnceLock::new(),
            children: OnceLock::new(),
            all_parents: OnceLock::new(),
            family: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    pub fn symbol(&self) -> &ClassSymbol {
        &self.symbol
    }

    /// True when the class originates from the analyzed scope rather than a
    /// read-only library dependency.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn has_field(&self, name: &str, descriptor: &str) -> bool {
        self.symbol.has_field(name, descriptor)
    }

    pub fn has_method(&self, name: &str, descriptor: &str) -> bool {
        self.symbol.has_method(name, descriptor)
    }

    pub fn field(&self, name: &str, descriptor: &str) -> Option<&MemberSymbol> {
        self.symbol.field(name, descriptor)
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MemberSymbol> {
        self.symbol.method(name, descriptor)
    }

    pub(crate) fn parents_cached(&self, compute: impl FnOnce() -> Vec<String>) -> &[String] {
        self.parents.get_or_init(compute)
    }

    pub(crate) fn children_cached(&self, compute: impl FnOnce() -> Vec<String>) -> &[String] {
        self.children.get_or_init(compute)
    }

    pub(crate) fn all_parents_cached(&self, compute: impl FnOnce() -> Vec<String>) -> &[String] {
        self.all_parents.get_or_init(compute)
    }

    pub(crate) fn family_cached(&self, compute: impl FnOnce() -> Vec<String>) -> &[String] {
        self.family.get_or_init(compute)
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Vertex {}

impl std::hash::Hash for Vertex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vertex")
            .field("name", &self.name())
            .field("owned", &self.owned)
            .finish()
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_name_based() {
        let a = Vertex::new(Arc::new(ClassSymbol::new("a/Foo")), true);
        let b = Vertex::new(
            Arc::new(ClassSymbol::new("a/Foo").with_super("a/Bar")),
            false,
        );
        let c = Vertex::new(Arc::new(ClassSymbol::new("a/Bar")), true);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn member_lookups_delegate_to_symbol() {
        let vertex = Vertex::new(
            Arc::new(
                ClassSymbol::new("a/Foo")
                    .with_field(MemberSymbol::field("x", "I"))
                    .with_method(MemberSymbol::method("run", "()V")),
            ),
            true,
        );
        assert!(vertex.has_field("x", "I"));
        assert!(vertex.has_method("run", "()V"));
        assert!(vertex.method("run", "(I)V").is_none());
    }
}
