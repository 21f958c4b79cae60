//! Member linkage over the hierarchy graph.
//!
//! Resolution answers "which declaration does this member reference bind
//! to". Virtual members walk the single-inheritance superclass chain; method
//! resolution falls back to a maximally-specific search over implemented
//! interfaces when the chain misses; static and special references bind to
//! the exact owner.
//!
//! Every outcome is a value. Expected absence is [`Resolution::NotFound`]
//! and conflicting interface defaults are [`Resolution::Ambiguous`]; neither
//! is an error. Results are memoized per owner, name, descriptor and kind,
//! stamped with the graph generation and dropped wholesale once it advances,
//! since a single super-type edge change can alter any number of previously
//! memoized lookups.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use crate::hierarchy::{HierarchyGraph, Vertex};
use crate::store::SymbolStore;
use crate::symbol::{ClassSymbol, MemberSymbol};

/// Which linkage rule to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionKind {
    VirtualMethod,
    StaticMethod,
    SpecialMethod,
    InterfaceMethod,
    StaticField,
    VirtualField,
}

/// Outcome of a linkage query.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The member was found; `owner` is the vertex declaring it.
    Resolved {
        owner: Arc<Vertex>,
        member: MemberSymbol,
    },
    /// No declaration with the signature is reachable under the kind's rules.
    NotFound,
    /// More than one maximally-specific interface declares the signature.
    Ambiguous { candidates: Vec<String> },
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }

    /// Name of the declaring class, when resolved.
    pub fn owner_name(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { owner, .. } => Some(owner.name()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    owner: String,
    name: String,
    descriptor: String,
    kind: ResolutionKind,
}

struct CachedResolution {
    generation: u64,
    resolution: Resolution,
}

struct CachedLibraryBound {
    generation: u64,
    bound: bool,
}

/// Memoized member resolution. Stateless apart from its caches; safe to
/// populate from multiple threads because results are pure functions of the
/// current graph generation.
#[derive(Default)]
pub struct LinkResolver {
    cache: RwLock<HashMap<CacheKey, CachedResolution>>,
    library_cache: RwLock<HashMap<CacheKey, CachedLibraryBound>>,
}

impl LinkResolver {
    pub fn new() -> Self {
        LinkResolver::default()
    }

    /// Resolve a member reference under the given linkage rule.
    pub fn resolve<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        kind: ResolutionKind,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Resolution {
        let generation = graph.generation();
        let key = CacheKey {
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            kind,
        };
        if let Some(cached) = self
            .cache
            .read()
            .expect("resolution cache RwLock poisoned")
            .get(&key)
        {
            if cached.generation == generation {
                return cached.resolution.clone();
            }
        }
        let resolution = self.resolve_uncached(graph, kind, owner, name, descriptor);
        self.cache
            .write()
            .expect("resolution cache RwLock poisoned")
            .insert(
                key,
                CachedResolution {
                    generation,
                    resolution: resolution.clone(),
                },
            );
        resolution
    }

    pub fn resolve_virtual_method<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Resolution {
        self.resolve(graph, ResolutionKind::VirtualMethod, owner, name, descriptor)
    }

    pub fn resolve_static_method<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Resolution {
        self.resolve(graph, ResolutionKind::StaticMethod, owner, name, descriptor)
    }

    pub fn resolve_special_method<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Resolution {
        self.resolve(graph, ResolutionKind::SpecialMethod, owner, name, descriptor)
    }

    pub fn resolve_interface_method<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Resolution {
        self.resolve(
            graph,
            ResolutionKind::InterfaceMethod,
            owner,
            name,
            descriptor,
        )
    }

    pub fn resolve_static_field<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Resolution {
        self.resolve(graph, ResolutionKind::StaticField, owner, name, descriptor)
    }

    pub fn resolve_virtual_field<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Resolution {
        self.resolve(graph, ResolutionKind::VirtualField, owner, name, descriptor)
    }

    /// True when the signature overrides a member declared in a non-owned
    /// vertex, on the owner itself or any of its transitive parents. Such
    /// members cannot be renamed without breaking external contracts.
    pub fn is_library_bound<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> bool {
        let generation = graph.generation();
        let key = CacheKey {
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            kind: ResolutionKind::VirtualMethod,
        };
        if let Some(cached) = self
            .library_cache
            .read()
            .expect("library cache RwLock poisoned")
            .get(&key)
        {
            if cached.generation == generation {
                return cached.bound;
            }
        }
        let bound = match graph.vertex(owner) {
            Some(vertex) => {
                (!vertex.is_owned() && vertex.has_method(name, descriptor))
                    || graph
                        .all_parents(&vertex)
                        .iter()
                        .any(|parent| !parent.is_owned() && parent.has_method(name, descriptor))
            }
            None => false,
        };
        self.library_cache
            .write()
            .expect("library cache RwLock poisoned")
            .insert(
                key,
                CachedLibraryBound {
                    generation,
                    bound,
                },
            );
        bound
    }

    // ------------------------------------------------------------------
    // Resolution rules
    // ------------------------------------------------------------------

    fn resolve_uncached<S: SymbolStore>(
        &self,
        graph: &HierarchyGraph<S>,
        kind: ResolutionKind,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Resolution {
        let Some(owner_vertex) = graph.vertex(owner) else {
            return Resolution::NotFound;
        };
        match kind {
            ResolutionKind::VirtualMethod | ResolutionKind::InterfaceMethod => {
                let chain = superclass_chain(graph, &owner_vertex);
                if let Some(found) = find_in_chain(&chain, name, descriptor, member_methods) {
                    return found;
                }
                // The superclass chain missed; look for a maximally-specific
                // interface declaration.
                resolve_in_interfaces(graph, &chain, name, descriptor)
            }
            ResolutionKind::VirtualField => {
                let chain = superclass_chain(graph, &owner_vertex);
                find_in_chain(&chain, name, descriptor, member_fields)
                    .unwrap_or(Resolution::NotFound)
            }
            ResolutionKind::StaticMethod => {
                bind_exact(&owner_vertex, name, descriptor, member_methods, true)
            }
            ResolutionKind::SpecialMethod => {
                bind_exact(&owner_vertex, name, descriptor, member_methods, false)
            }
            ResolutionKind::StaticField => {
                bind_exact(&owner_vertex, name, descriptor, member_fields, true)
            }
        }
    }
}

fn member_methods(symbol: &ClassSymbol) -> &[MemberSymbol] {
    &symbol.methods
}

fn member_fields(symbol: &ClassSymbol) -> &[MemberSymbol] {
    &symbol.fields
}

/// The single-inheritance superclass chain starting at `start`, cycle
/// guarded. Interfaces are never entered here.
fn superclass_chain<S: SymbolStore>(
    graph: &HierarchyGraph<S>,
    start: &Arc<Vertex>,
) -> Vec<Arc<Vertex>> {
    let mut chain = vec![Arc::clone(start)];
    let mut visited = HashSet::new();
    visited.insert(start.name().to_string());
    let mut current = Arc::clone(start);
    while let Some(super_name) = current.symbol().super_name.clone() {
        if !visited.insert(super_name.clone()) {
            break;
        }
        let Some(next) = graph.vertex(&super_name) else {
            break;
        };
        chain.push(Arc::clone(&next));
        current = next;
    }
    chain
}

/// Walk the chain looking for a visible, non-static, non-private member.
/// The first match wins: overriding for methods, shadowing for fields.
fn find_in_chain(
    chain: &[Arc<Vertex>],
    name: &str,
    descriptor: &str,
    members: fn(&ClassSymbol) -> &[MemberSymbol],
) -> Option<Resolution> {
    for vertex in chain {
        if let Some(member) = members(vertex.symbol())
            .iter()
            .find(|m| {
                m.name == name
                    && m.descriptor == descriptor
                    && !m.access.is_static
                    && !m.access.is_private
            })
        {
            return Some(Resolution::Resolved {
                owner: Arc::clone(vertex),
                member: member.clone(),
            });
        }
    }
    None
}

/// Bind to the exact declaring owner, validated only for existence and the
/// expected static-ness.
fn bind_exact(
    owner: &Arc<Vertex>,
    name: &str,
    descriptor: &str,
    members: fn(&ClassSymbol) -> &[MemberSymbol],
    want_static: bool,
) -> Resolution {
    match members(owner.symbol())
        .iter()
        .find(|m| m.name == name && m.descriptor == descriptor && m.access.is_static == want_static)
    {
        Some(member) => Resolution::Resolved {
            owner: Arc::clone(owner),
            member: member.clone(),
        },
        None => Resolution::NotFound,
    }
}

/// Breadth-first walk of every interface implemented by the chain, directly
/// or through superinterfaces, collecting concrete declarations of the
/// signature and keeping only maximally-specific ones.
fn resolve_in_interfaces<S: SymbolStore>(
    graph: &HierarchyGraph<S>,
    chain: &[Arc<Vertex>],
    name: &str,
    descriptor: &str,
) -> Resolution {
    let mut queue: VecDeque<String> = chain
        .iter()
        .flat_map(|v| v.symbol().interfaces.iter().cloned())
        .collect();
    let mut visited = HashSet::new();
    let mut candidates: Vec<Arc<Vertex>> = Vec::new();
    while let Some(interface_name) = queue.pop_front() {
        if !visited.insert(interface_name.clone()) {
            continue;
        }
        let Some(interface) = graph.vertex(&interface_name) else {
            continue;
        };
        let declares_default = interface.symbol().methods.iter().any(|m| {
            m.name == name
                && m.descriptor == descriptor
                && !m.access.is_static
                && !m.access.is_private
                && !m.access.is_abstract
        });
        if declares_default {
            candidates.push(Arc::clone(&interface));
        }
        for super_interface in &interface.symbol().interfaces {
            if !visited.contains(super_interface) {
                queue.push_back(super_interface.clone());
            }
        }
    }
    if candidates.is_empty() {
        return Resolution::NotFound;
    }

    // A candidate is maximally specific when it is not a superinterface of
    // any other candidate.
    let maximal: Vec<&Arc<Vertex>> = candidates
        .iter()
        .filter(|candidate| {
            !candidates.iter().any(|other| {
                other.name() != candidate.name()
                    && graph
                        .all_parents(other)
                        .iter()
                        .any(|parent| parent.name() == candidate.name())
            })
        })
        .collect();
    match maximal.as_slice() {
        [single] => {
            let member = single
                .symbol()
                .methods
                .iter()
                .find(|m| m.name == name && m.descriptor == descriptor)
                .cloned();
            match member {
                Some(member) => Resolution::Resolved {
                    owner: Arc::clone(single),
                    member,
                },
                None => Resolution::NotFound,
            }
        }
        _ => {
            let mut names: Vec<String> = if maximal.is_empty() {
                candidates.iter().map(|c| c.name().to_string()).collect()
            } else {
                maximal.iter().map(|c| c.name().to_string()).collect()
            };
            names.sort();
            Resolution::Ambiguous { candidates: names }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::DEFAULT_ROOT;
    use crate::store::InMemorySymbolStore;
    use crate::symbol::{ClassAccess, ClassSymbol, MemberAccess};

    fn interface_access() -> ClassAccess {
        ClassAccess {
            is_interface: true,
            is_abstract: true,
            ..ClassAccess::default()
        }
    }

    fn abstract_member() -> MemberAccess {
        MemberAccess {
            is_abstract: true,
            ..MemberAccess::default()
        }
    }

    fn graph_over(store: Arc<InMemorySymbolStore>) -> HierarchyGraph<Arc<InMemorySymbolStore>> {
        let graph = HierarchyGraph::new(Arc::clone(&store));
        graph.rebuild_index(store.names());
        graph
    }

    fn base_store() -> Arc<InMemorySymbolStore> {
        let store = Arc::new(InMemorySymbolStore::new());
        store.insert(
            ClassSymbol::new(DEFAULT_ROOT)
                .with_method(MemberSymbol::method("toString", "()Ljava/lang/String;")),
            false,
        );
        store
    }

    mod virtual_members {
        use super::*;

        #[test]
        fn closest_declaration_wins() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Base")
                    .with_super(DEFAULT_ROOT)
                    .with_method(MemberSymbol::method("run", "()V")),
                true,
            );
            store.insert(
                ClassSymbol::new("a/Child")
                    .with_super("a/Base")
                    .with_method(MemberSymbol::method("run", "()V")),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_method(&graph, "a/Child", "run", "()V");
            assert_eq!(resolution.owner_name(), Some("a/Child"));
        }

        #[test]
        fn inherited_declaration_is_found_upward() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Base")
                    .with_super(DEFAULT_ROOT)
                    .with_method(MemberSymbol::method("run", "()V")),
                true,
            );
            store.insert(ClassSymbol::new("a/Child").with_super("a/Base"), true);
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_method(&graph, "a/Child", "run", "()V");
            assert_eq!(resolution.owner_name(), Some("a/Base"));
        }

        #[test]
        fn static_and_private_members_are_skipped_in_the_walk() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Base")
                    .with_super(DEFAULT_ROOT)
                    .with_method(MemberSymbol::method("run", "()V").with_access(MemberAccess {
                        is_static: true,
                        ..MemberAccess::default()
                    })),
                true,
            );
            store.insert(ClassSymbol::new("a/Child").with_super("a/Base"), true);
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_method(&graph, "a/Child", "run", "()V");
            assert!(matches!(resolution, Resolution::NotFound));
        }

        #[test]
        fn field_shadowing_binds_to_the_closest_declaration() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Base")
                    .with_super(DEFAULT_ROOT)
                    .with_field(MemberSymbol::field("value", "I")),
                true,
            );
            store.insert(
                ClassSymbol::new("a/Child")
                    .with_super("a/Base")
                    .with_field(MemberSymbol::field("value", "I")),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_field(&graph, "a/Child", "value", "I");
            assert_eq!(resolution.owner_name(), Some("a/Child"));
        }

        #[test]
        fn fields_never_resolve_through_interfaces() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Constants")
                    .with_super(DEFAULT_ROOT)
                    .with_access(interface_access())
                    .with_field(MemberSymbol::field("MAX", "I").with_access(MemberAccess {
                        is_static: true,
                        is_final: true,
                        ..MemberAccess::default()
                    })),
                true,
            );
            store.insert(
                ClassSymbol::new("a/User")
                    .with_super(DEFAULT_ROOT)
                    .with_interface("a/Constants"),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_field(&graph, "a/User", "MAX", "I");
            assert!(matches!(resolution, Resolution::NotFound));
        }
    }

    mod exact_binding {
        use super::*;

        #[test]
        fn static_binding_checks_existence_on_the_exact_owner() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Util")
                    .with_super(DEFAULT_ROOT)
                    .with_method(MemberSymbol::method("of", "()La/Util;").with_access(
                        MemberAccess {
                            is_static: true,
                            ..MemberAccess::default()
                        },
                    )),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let hit = resolver.resolve_static_method(&graph, "a/Util", "of", "()La/Util;");
            assert_eq!(hit.owner_name(), Some("a/Util"));

            let miss = resolver.resolve_static_method(&graph, "a/Util", "absent", "()V");
            assert!(matches!(miss, Resolution::NotFound));
        }

        #[test]
        fn special_binding_requires_an_instance_member() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Foo")
                    .with_super(DEFAULT_ROOT)
                    .with_method(MemberSymbol::method("<init>", "()V")),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let hit = resolver.resolve_special_method(&graph, "a/Foo", "<init>", "()V");
            assert_eq!(hit.owner_name(), Some("a/Foo"));
        }
    }

    mod interface_defaults {
        use super::*;

        fn default_method() -> MemberSymbol {
            MemberSymbol::method("run", "()V")
        }

        #[test]
        fn single_default_resolves() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Task")
                    .with_super(DEFAULT_ROOT)
                    .with_access(interface_access())
                    .with_method(default_method()),
                true,
            );
            store.insert(
                ClassSymbol::new("a/Impl")
                    .with_super(DEFAULT_ROOT)
                    .with_interface("a/Task"),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_method(&graph, "a/Impl", "run", "()V");
            assert_eq!(resolution.owner_name(), Some("a/Task"));
        }

        #[test]
        fn more_derived_interface_wins() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Task")
                    .with_super(DEFAULT_ROOT)
                    .with_access(interface_access())
                    .with_method(default_method()),
                true,
            );
            store.insert(
                ClassSymbol::new("a/Refined")
                    .with_super(DEFAULT_ROOT)
                    .with_access(interface_access())
                    .with_interface("a/Task")
                    .with_method(default_method()),
                true,
            );
            store.insert(
                ClassSymbol::new("a/Impl")
                    .with_super(DEFAULT_ROOT)
                    .with_interface("a/Task")
                    .with_interface("a/Refined"),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_method(&graph, "a/Impl", "run", "()V");
            assert_eq!(resolution.owner_name(), Some("a/Refined"));
        }

        #[test]
        fn unrelated_defaults_are_ambiguous() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Left")
                    .with_super(DEFAULT_ROOT)
                    .with_access(interface_access())
                    .with_method(default_method()),
                true,
            );
            store.insert(
                ClassSymbol::new("a/Right")
                    .with_super(DEFAULT_ROOT)
                    .with_access(interface_access())
                    .with_method(default_method()),
                true,
            );
            store.insert(
                ClassSymbol::new("a/Impl")
                    .with_super(DEFAULT_ROOT)
                    .with_interface("a/Left")
                    .with_interface("a/Right"),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_method(&graph, "a/Impl", "run", "()V");
            match resolution {
                Resolution::Ambiguous { candidates } => {
                    assert_eq!(candidates, vec!["a/Left", "a/Right"]);
                }
                other => panic!("expected ambiguous resolution, got {other:?}"),
            }
        }

        #[test]
        fn abstract_declarations_do_not_count_as_defaults() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Task")
                    .with_super(DEFAULT_ROOT)
                    .with_access(interface_access())
                    .with_method(default_method().with_access(abstract_member())),
                true,
            );
            store.insert(
                ClassSymbol::new("a/Impl")
                    .with_super(DEFAULT_ROOT)
                    .with_interface("a/Task"),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            let resolution = resolver.resolve_virtual_method(&graph, "a/Impl", "run", "()V");
            assert!(matches!(resolution, Resolution::NotFound));
        }
    }

    mod library_binding {
        use super::*;

        #[test]
        fn override_of_library_declaration_is_bound() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("lib/Stream")
                    .with_super(DEFAULT_ROOT)
                    .with_method(MemberSymbol::method("close", "()V")),
                false,
            );
            store.insert(
                ClassSymbol::new("a/Wrapper")
                    .with_super("lib/Stream")
                    .with_method(MemberSymbol::method("close", "()V"))
                    .with_method(MemberSymbol::method("flush", "()V")),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            assert!(resolver.is_library_bound(&graph, "a/Wrapper", "close", "()V"));
            assert!(!resolver.is_library_bound(&graph, "a/Wrapper", "flush", "()V"));
        }

        #[test]
        fn library_interfaces_also_bind() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("lib/Closeable")
                    .with_super(DEFAULT_ROOT)
                    .with_access(interface_access())
                    .with_method(MemberSymbol::method("close", "()V").with_access(abstract_member())),
                false,
            );
            store.insert(
                ClassSymbol::new("a/Resource")
                    .with_super(DEFAULT_ROOT)
                    .with_interface("lib/Closeable")
                    .with_method(MemberSymbol::method("close", "()V")),
                true,
            );
            let graph = graph_over(store);
            let resolver = LinkResolver::new();

            assert!(resolver.is_library_bound(&graph, "a/Resource", "close", "()V"));
        }
    }

    mod caching {
        use super::*;

        #[test]
        fn results_are_invalidated_by_graph_mutation() {
            let store = base_store();
            store.insert(
                ClassSymbol::new("a/Base")
                    .with_super(DEFAULT_ROOT)
                    .with_method(MemberSymbol::method("run", "()V")),
                true,
            );
            store.insert(ClassSymbol::new("a/Child").with_super("a/Base"), true);
            let graph = graph_over(Arc::clone(&store));
            let resolver = LinkResolver::new();

            let before = resolver.resolve_virtual_method(&graph, "a/Child", "run", "()V");
            assert_eq!(before.owner_name(), Some("a/Base"));

            // Re-parent the child away from Base; the memoized result must
            // not survive the generation bump.
            let event = store.insert(ClassSymbol::new("a/Child").with_super(DEFAULT_ROOT), true);
            graph.on_event(&event);

            let after = resolver.resolve_virtual_method(&graph, "a/Child", "run", "()V");
            assert!(matches!(after, Resolution::NotFound));
        }
    }
}
