//! Class inheritance as a navigable graph.
//!
//! The graph pulls class symbols lazily from a [`SymbolStore`] and memoizes
//! one [`Vertex`] per name in a concurrent cache. A parent→children index,
//! rebuilt eagerly on bulk universe replacement and patched incrementally on
//! single mutations, provides the downward direction.
//!
//! # Invalidation
//!
//! All cached state is tied to a single monotonically increasing generation
//! counter. Every cached vertex is stamped with the generation at creation;
//! a mutation event bumps the counter, which makes every stamped entry stale
//! at once. Membership queries always re-derive from the current adjacency
//! index, so there is no need to enumerate affected neighbors on mutation.
//! [`LinkResolver`](crate::resolve::LinkResolver) shares the same counter
//! for its memoization.
//!
//! # The universal root
//!
//! Nearly every class is transitively reachable through the universal root
//! type (`java/lang/Object` by default). Family traversal therefore never
//! expands the root's children; the root itself appears in a family only
//! when requested and actually reached as a declared parent.
//!
//! # Malformed input
//!
//! Lookups of names that were never part of the universe yield `None` or
//! empty results. Cyclic or self-referential parent chains are treated as
//! "no further parents": every traversal carries a visited set, and the
//! first detected cycle is logged.

mod vertex;

pub use vertex::Vertex;

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::store::{StoredClass, SymbolEvent, SymbolStore};
use crate::symbol::ClassSymbol;

/// Default universal root type name.
pub const DEFAULT_ROOT: &str = "java/lang/Object";

struct CachedLookup {
    generation: u64,
    vertex: Option<Arc<Vertex>>,
}

/// Lazy inheritance graph over an externally supplied symbol universe.
pub struct HierarchyGraph<S> {
    store: S,
    root: String,
    generation: AtomicU64,
    vertices: RwLock<HashMap<String, CachedLookup>>,
    children: RwLock<HashMap<String, BTreeSet<String>>>,
    cycle_warned: AtomicBool,
}

impl<S: SymbolStore> HierarchyGraph<S> {
    /// Create a graph rooted at [`DEFAULT_ROOT`].
    pub fn new(store: S) -> Self {
        Self::with_root(store, DEFAULT_ROOT)
    }

    /// Create a graph with an explicit universal root type name.
    pub fn with_root(store: S, root: impl Into<String>) -> Self {
        HierarchyGraph {
            store,
            root: root.into(),
            generation: AtomicU64::new(0),
            vertices: RwLock::new(HashMap::new()),
            children: RwLock::new(HashMap::new()),
            cycle_warned: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Name of the universal root type.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Current cache generation. Advances on every universe mutation; cache
    /// entries stamped with an older value are stale.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Vertex access
    // ------------------------------------------------------------------

    /// Vertex for the given class name.
    ///
    /// Returns `None` only when the store has no symbol for the name. Array
    /// type names have no vertex. Results, including negative ones, are
    /// memoized until the generation advances.
    pub fn vertex(&self, name: &str) -> Option<Arc<Vertex>> {
        if name.is_empty() || name.starts_with('[') {
            return None;
        }
        let generation = self.generation();
        if let Some(entry) = self
            .vertices
            .read()
            .expect("vertex cache RwLock poisoned")
            .get(name)
        {
            if entry.generation == generation {
                return entry.vertex.clone();
            }
        }

        // Resolve outside the lock, then insert-or-fetch: if another thread
        // won the race for the current generation, use its entry.
        let resolved = self
            .store
            .lookup(name)
            .map(|StoredClass { symbol, owned }| Arc::new(Vertex::new(symbol, owned)));
        let mut cache = self.vertices.write().expect("vertex cache RwLock poisoned");
        match cache.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                if slot.get().generation == generation {
                    return slot.get().vertex.clone();
                }
                slot.insert(CachedLookup {
                    generation,
                    vertex: resolved.clone(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(CachedLookup {
                    generation,
                    vertex: resolved.clone(),
                });
            }
        }
        resolved
    }

    /// Classes the vertex directly extends or implements.
    pub fn parents(&self, vertex: &Arc<Vertex>) -> Vec<Arc<Vertex>> {
        let names = vertex.parents_cached(|| self.compute_parent_names(vertex));
        names.iter().filter_map(|name| self.vertex(name)).collect()
    }

    /// Classes that directly extend or implement the vertex.
    pub fn children(&self, vertex: &Arc<Vertex>) -> Vec<Arc<Vertex>> {
        let names = vertex.children_cached(|| self.compute_child_names(vertex));
        names.iter().filter_map(|name| self.vertex(name)).collect()
    }

    /// All classes the vertex transitively extends or implements, in
    /// breadth-first order, the vertex itself excluded.
    pub fn all_parents(&self, vertex: &Arc<Vertex>) -> Vec<Arc<Vertex>> {
        let names = vertex.all_parents_cached(|| self.compute_all_parent_names(vertex));
        names.iter().filter_map(|name| self.vertex(name)).collect()
    }

    /// All classes transitively extending or implementing the vertex, in
    /// breadth-first order, the vertex itself excluded. Computed per call;
    /// only the upward direction is memoized on the vertex.
    pub fn all_children(&self, vertex: &Arc<Vertex>) -> Vec<Arc<Vertex>> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(vertex.name().to_string());
        let mut queue: VecDeque<Arc<Vertex>> = self.children(vertex).into();
        while let Some(next) = queue.pop_front() {
            if !visited.insert(next.name().to_string()) {
                continue;
            }
            for child in self.children(&next) {
                if !visited.contains(child.name()) {
                    queue.push_back(child);
                }
            }
            order.push(next);
        }
        order
    }

    // ------------------------------------------------------------------
    // Family and ancestor queries
    // ------------------------------------------------------------------

    /// Complete inheritance family of the class: every vertex connected to it
    /// through direct or transitive superclass/interface relationships.
    ///
    /// Traversal never crosses through the universal root to its children.
    /// The root appears in the result only when `include_root` is set and the
    /// root was actually reached as a declared parent. A `module-info` symbol
    /// is its own whole family. Unknown names yield an empty set.
    pub fn family(&self, name: &str, include_root: bool) -> Vec<Arc<Vertex>> {
        let Some(seed) = self.vertex(name) else {
            return Vec::new();
        };
        if seed.symbol().is_module() {
            return vec![seed];
        }
        let names = seed.family_cached(|| self.compute_family_names(&seed));
        names
            .iter()
            .filter(|n| include_root || n.as_str() != self.root)
            .filter_map(|n| self.vertex(n))
            .collect()
    }

    /// Common ancestor of two classes, falling back to the universal root.
    ///
    /// The upward chain of `first` is checked for `second` directly, then
    /// `second`'s ancestors are walked breadth-first until one appears in
    /// `first`'s chain. The result is the first common ancestor encountered,
    /// which under multiple interface inheritance is not necessarily the
    /// most-derived one.
    pub fn common_ancestor(&self, first: &str, second: &str) -> String {
        if first == self.root || second == self.root {
            return self.root.clone();
        }
        let Some(first_vertex) = self.vertex(first) else {
            return self.root.clone();
        };

        // Upward chain of `first`, self included, root forced in as the
        // guaranteed tail.
        let mut first_chain: HashSet<String> = self
            .all_parents(&first_vertex)
            .iter()
            .map(|v| v.name().to_string())
            .collect();
        first_chain.insert(first.to_string());
        first_chain.insert(self.root.clone());

        if first_chain.contains(second) {
            return second.to_string();
        }

        let mut queue = VecDeque::from([second.to_string()]);
        let mut visited = HashSet::new();
        while let Some(next) = queue.pop_front() {
            if next == self.root {
                break;
            }
            if !visited.insert(next.clone()) {
                continue;
            }
            let Some(vertex) = self.vertex(&next) else {
                break;
            };
            for parent in self.parents(&vertex) {
                let parent_name = parent.name();
                if parent_name == self.root {
                    continue;
                }
                if first_chain.contains(parent_name) {
                    return parent_name.to_string();
                }
                queue.push_back(parent_name.to_string());
            }
        }
        self.root.clone()
    }

    /// True when `first` is assignable from `second`, i.e. `second` is the
    /// same type as `first` or reaches it through its parents.
    pub fn is_assignable_from(&self, first: &str, second: &str) -> bool {
        if first == self.root || first == second {
            return true;
        }
        match self.vertex(second) {
            Some(vertex) => self
                .all_parents(&vertex)
                .iter()
                .any(|parent| parent.name() == first),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Apply one symbol universe mutation.
    ///
    /// Patches the parent→children index for exactly the changed edges and
    /// advances the generation counter, which invalidates all memoized
    /// vertices and every resolver cache sharing the counter.
    pub fn on_event(&self, event: &SymbolEvent) {
        match event {
            SymbolEvent::Added(symbol) => self.add_edges(symbol),
            SymbolEvent::Updated { old, new } => {
                if old.name == new.name {
                    self.diff_edges(old, new);
                } else {
                    self.remove_edges(old);
                    self.add_edges(new);
                }
            }
            SymbolEvent::Removed(symbol) => self.remove_edges(symbol),
        }
        let mut cache = self.vertices.write().expect("vertex cache RwLock poisoned");
        match event {
            SymbolEvent::Added(symbol) | SymbolEvent::Removed(symbol) => {
                cache.remove(&symbol.name);
            }
            SymbolEvent::Updated { old, new } => {
                cache.remove(&old.name);
                cache.remove(&new.name);
            }
        }
        drop(cache);
        self.bump_generation();
    }

    /// Rebuild the parent→children index from scratch.
    ///
    /// Used when the universe is wholesale-replaced, e.g. when a library is
    /// attached. `names` must span the whole universe, owned and library
    /// classes both.
    pub fn rebuild_index<I>(&self, names: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut index: HashMap<String, BTreeSet<String>> = HashMap::new();
        for name in names {
            let Some(stored) = self.store.lookup(name.as_ref()) else {
                continue;
            };
            let symbol = &stored.symbol;
            if symbol.is_module() {
                continue;
            }
            if let Some(super_name) = &symbol.super_name {
                if super_name != &symbol.name {
                    index
                        .entry(super_name.clone())
                        .or_default()
                        .insert(symbol.name.clone());
                }
            }
            for interface in &symbol.interfaces {
                if interface != &symbol.name {
                    index
                        .entry(interface.clone())
                        .or_default()
                        .insert(symbol.name.clone());
                }
            }
        }
        let parent_count = index.len();
        *self.children.write().expect("child index RwLock poisoned") = index;
        self.vertices
            .write()
            .expect("vertex cache RwLock poisoned")
            .clear();
        self.bump_generation();
        tracing::debug!(parents = parent_count, "rebuilt parent to child index");
    }

    /// Drop all cached state. Called on workspace/scope close.
    pub fn clear(&self) {
        self.children
            .write()
            .expect("child index RwLock poisoned")
            .clear();
        self.vertices
            .write()
            .expect("vertex cache RwLock poisoned")
            .clear();
        self.bump_generation();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn add_edges(&self, symbol: &ClassSymbol) {
        if symbol.is_module() {
            return;
        }
        let mut children = self.children.write().expect("child index RwLock poisoned");
        if let Some(super_name) = &symbol.super_name {
            if super_name != &symbol.name {
                children
                    .entry(super_name.clone())
                    .or_default()
                    .insert(symbol.name.clone());
            }
        }
        for interface in &symbol.interfaces {
            if interface != &symbol.name {
                children
                    .entry(interface.clone())
                    .or_default()
                    .insert(symbol.name.clone());
            }
        }
    }

    fn remove_edges(&self, symbol: &ClassSymbol) {
        let mut children = self.children.write().expect("child index RwLock poisoned");
        let mut detach = |parent: &str| {
            if let Some(set) = children.get_mut(parent) {
                set.remove(&symbol.name);
                if set.is_empty() {
                    children.remove(parent);
                }
            }
        };
        if let Some(super_name) = &symbol.super_name {
            detach(super_name);
        }
        for interface in &symbol.interfaces {
            detach(interface);
        }
    }

    fn diff_edges(&self, old: &ClassSymbol, new: &ClassSymbol) {
        let name = &new.name;
        let mut children = self.children.write().expect("child index RwLock poisoned");
        let detach = |children: &mut HashMap<String, BTreeSet<String>>, parent: &str| {
            if let Some(set) = children.get_mut(parent) {
                set.remove(name);
                if set.is_empty() {
                    children.remove(parent);
                }
            }
        };
        let attach = |children: &mut HashMap<String, BTreeSet<String>>, parent: &str| {
            if parent != name {
                children
                    .entry(parent.to_string())
                    .or_default()
                    .insert(name.clone());
            }
        };

        if old.super_name != new.super_name {
            if let Some(super_name) = &old.super_name {
                detach(&mut children, super_name);
            }
            if let Some(super_name) = &new.super_name {
                attach(&mut children, super_name);
            }
        }

        let old_interfaces: HashSet<&String> = old.interfaces.iter().collect();
        let new_interfaces: HashSet<&String> = new.interfaces.iter().collect();
        for removed in old_interfaces.difference(&new_interfaces) {
            detach(&mut children, removed.as_str());
        }
        for added in new_interfaces.difference(&old_interfaces) {
            attach(&mut children, added.as_str());
        }
    }

    fn compute_parent_names(&self, vertex: &Arc<Vertex>) -> Vec<String> {
        let symbol = vertex.symbol();
        if symbol.is_module() {
            return Vec::new();
        }
        let own = vertex.name();
        let mut names = Vec::new();
        if let Some(super_name) = &symbol.super_name {
            if super_name != own && self.vertex(super_name).is_some() {
                names.push(super_name.clone());
            }
        }
        for interface in &symbol.interfaces {
            if interface != own
                && !names.contains(interface)
                && self.vertex(interface).is_some()
            {
                names.push(interface.clone());
            }
        }
        names
    }

    fn compute_child_names(&self, vertex: &Arc<Vertex>) -> Vec<String> {
        if vertex.symbol().is_module() {
            return Vec::new();
        }
        self.children
            .read()
            .expect("child index RwLock poisoned")
            .get(vertex.name())
            .map(|set| {
                set.iter()
                    .filter(|name| name.as_str() != vertex.name())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn compute_all_parent_names(&self, vertex: &Arc<Vertex>) -> Vec<String> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(vertex.name().to_string());
        let mut queue: VecDeque<Arc<Vertex>> = self.parents(vertex).into();
        while let Some(next) = queue.pop_front() {
            if !visited.insert(next.name().to_string()) {
                continue;
            }
            order.push(next.name().to_string());
            for parent in self.parents(&next) {
                if parent.name() == vertex.name() {
                    self.warn_cycle(vertex.name());
                    continue;
                }
                if !visited.contains(parent.name()) {
                    queue.push_back(parent);
                }
            }
        }
        order
    }

    fn compute_family_names(&self, seed: &Arc<Vertex>) -> Vec<String> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([Arc::clone(seed)]);
        while let Some(next) = queue.pop_front() {
            if next.symbol().is_module() {
                continue;
            }
            if !visited.insert(next.name().to_string()) {
                continue;
            }
            order.push(next.name().to_string());
            if next.name() == self.root {
                // Reached as a declared parent; never expanded, or the
                // family would swallow the whole universe.
                continue;
            }
            for vertex in self.parents(&next) {
                if !visited.contains(vertex.name()) {
                    queue.push_back(vertex);
                }
            }
            for vertex in self.children(&next) {
                if !visited.contains(vertex.name()) {
                    queue.push_back(vertex);
                }
            }
        }
        order
    }

    fn warn_cycle(&self, name: &str) {
        if !self.cycle_warned.swap(true, Ordering::AcqRel) {
            tracing::warn!(class = name, "inheritance cycle detected, traversal bounded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySymbolStore;
    use crate::symbol::ClassAccess;

    fn object() -> ClassSymbol {
        ClassSymbol::new(DEFAULT_ROOT)
    }

    fn graph_over(store: Arc<InMemorySymbolStore>) -> HierarchyGraph<Arc<InMemorySymbolStore>> {
        let graph = HierarchyGraph::new(Arc::clone(&store));
        graph.rebuild_index(store.names());
        graph
    }

    /// Universe used by most tests:
    ///
    /// Object <- Base <- Mid <- Leaf, Base also under interface Runnable.
    /// Lone has no declared parents at all.
    fn sample_store() -> Arc<InMemorySymbolStore> {
        let store = Arc::new(InMemorySymbolStore::new());
        store.insert(object(), false);
        store.insert(
            ClassSymbol::new("a/Runnable")
                .with_super(DEFAULT_ROOT)
                .with_access(ClassAccess {
                    is_interface: true,
                    ..ClassAccess::default()
                }),
            true,
        );
        store.insert(
            ClassSymbol::new("a/Base")
                .with_super(DEFAULT_ROOT)
                .with_interface("a/Runnable"),
            true,
        );
        store.insert(ClassSymbol::new("a/Mid").with_super("a/Base"), true);
        store.insert(ClassSymbol::new("a/Leaf").with_super("a/Mid"), true);
        store.insert(ClassSymbol::new("a/Lone"), true);
        store
    }

    mod vertex_lookup {
        use super::*;

        #[test]
        fn unknown_names_yield_none() {
            let graph = graph_over(sample_store());
            assert!(graph.vertex("a/Missing").is_none());
            assert!(graph.vertex("").is_none());
            assert!(graph.vertex("[La/Base;").is_none());
        }

        #[test]
        fn lookups_are_memoized_per_generation() {
            let graph = graph_over(sample_store());
            let first = graph.vertex("a/Base").expect("known class");
            let second = graph.vertex("a/Base").expect("known class");
            assert!(Arc::ptr_eq(&first, &second));
        }

        #[test]
        fn ownership_comes_from_the_store() {
            let graph = graph_over(sample_store());
            assert!(graph.vertex("a/Base").expect("owned").is_owned());
            assert!(!graph.vertex(DEFAULT_ROOT).expect("library").is_owned());
        }
    }

    mod relations {
        use super::*;

        #[test]
        fn parents_follow_super_and_interfaces() {
            let graph = graph_over(sample_store());
            let base = graph.vertex("a/Base").expect("known class");
            let parents = graph.parents(&base);
            let names: Vec<&str> = parents.iter().map(|v| v.name()).collect();
            assert_eq!(names, vec![DEFAULT_ROOT, "a/Runnable"]);
        }

        #[test]
        fn children_come_from_the_index() {
            let graph = graph_over(sample_store());
            let base = graph.vertex("a/Base").expect("known class");
            let children = graph.children(&base);
            let names: Vec<&str> = children.iter().map(|v| v.name()).collect();
            assert_eq!(names, vec!["a/Mid"]);
        }

        #[test]
        fn all_parents_walk_the_whole_chain() {
            let graph = graph_over(sample_store());
            let leaf = graph.vertex("a/Leaf").expect("known class");
            let ancestors = graph.all_parents(&leaf);
            let names: Vec<&str> = ancestors.iter().map(|v| v.name()).collect();
            assert_eq!(names, vec!["a/Mid", "a/Base", DEFAULT_ROOT, "a/Runnable"]);
        }

        #[test]
        fn all_children_walk_downward() {
            let graph = graph_over(sample_store());
            let base = graph.vertex("a/Base").expect("known class");
            let descendants = graph.all_children(&base);
            let names: Vec<&str> = descendants.iter().map(|v| v.name()).collect();
            assert_eq!(names, vec!["a/Mid", "a/Leaf"]);
        }
    }

    mod families {
        use super::*;

        #[test]
        fn parentless_class_is_its_own_family() {
            let graph = graph_over(sample_store());
            let family: Vec<String> = graph
                .family("a/Lone", false)
                .iter()
                .map(|v| v.name().to_string())
                .collect();
            assert_eq!(family, vec!["a/Lone"]);
        }

        #[test]
        fn family_spans_parents_and_children_but_not_the_root() {
            let graph = graph_over(sample_store());
            let family: BTreeSet<String> = graph
                .family("a/Mid", false)
                .iter()
                .map(|v| v.name().to_string())
                .collect();
            let expected: BTreeSet<String> = ["a/Mid", "a/Base", "a/Leaf", "a/Runnable"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            assert_eq!(family, expected);
        }

        #[test]
        fn root_is_included_only_on_request() {
            let graph = graph_over(sample_store());
            let family: BTreeSet<String> = graph
                .family("a/Mid", true)
                .iter()
                .map(|v| v.name().to_string())
                .collect();
            assert!(family.contains(DEFAULT_ROOT));
        }

        #[test]
        fn family_never_crosses_through_the_root() {
            // Unrelated hangs off the root only; it must not leak into
            // a/Mid's family even with the root included.
            let store = sample_store();
            store.insert(ClassSymbol::new("b/Unrelated").with_super(DEFAULT_ROOT), true);
            let graph = graph_over(store);
            let family: BTreeSet<String> = graph
                .family("a/Mid", true)
                .iter()
                .map(|v| v.name().to_string())
                .collect();
            assert!(!family.contains("b/Unrelated"));
        }

        #[test]
        fn unknown_seed_yields_empty_family() {
            let graph = graph_over(sample_store());
            assert!(graph.family("a/Missing", true).is_empty());
        }

        #[test]
        fn module_symbol_is_a_singleton_family() {
            let store = sample_store();
            store.insert(
                ClassSymbol::new("module-info").with_access(ClassAccess {
                    is_module: true,
                    ..ClassAccess::default()
                }),
                true,
            );
            let graph = graph_over(store);
            let family = graph.family("module-info", false);
            assert_eq!(family.len(), 1);
            assert_eq!(family[0].name(), "module-info");
        }
    }

    mod ancestors {
        use super::*;

        #[test]
        fn ancestor_of_related_classes_is_the_nearer_type() {
            let graph = graph_over(sample_store());
            assert_eq!(graph.common_ancestor("a/Base", "a/Leaf"), "a/Base");
            assert_eq!(graph.common_ancestor("a/Leaf", "a/Base"), "a/Base");
        }

        #[test]
        fn siblings_meet_at_their_shared_parent() {
            let store = sample_store();
            store.insert(ClassSymbol::new("a/Other").with_super("a/Base"), true);
            let graph = graph_over(store);
            assert_eq!(graph.common_ancestor("a/Leaf", "a/Other"), "a/Base");
        }

        #[test]
        fn unrelated_classes_fall_back_to_the_root() {
            let store = sample_store();
            store.insert(ClassSymbol::new("b/Unrelated").with_super(DEFAULT_ROOT), true);
            let graph = graph_over(store);
            assert_eq!(graph.common_ancestor("a/Leaf", "b/Unrelated"), DEFAULT_ROOT);
        }

        #[test]
        fn unknown_input_falls_back_to_the_root() {
            let graph = graph_over(sample_store());
            assert_eq!(graph.common_ancestor("a/Missing", "a/Leaf"), DEFAULT_ROOT);
        }

        #[test]
        fn assignability_checks_the_upward_chain() {
            let graph = graph_over(sample_store());
            assert!(graph.is_assignable_from("a/Base", "a/Leaf"));
            assert!(graph.is_assignable_from("a/Runnable", "a/Leaf"));
            assert!(graph.is_assignable_from(DEFAULT_ROOT, "a/Leaf"));
            assert!(graph.is_assignable_from("a/Leaf", "a/Leaf"));
            assert!(!graph.is_assignable_from("a/Leaf", "a/Base"));
        }
    }

    mod mutation {
        use super::*;

        #[test]
        fn events_bump_the_generation() {
            let store = sample_store();
            let graph = graph_over(Arc::clone(&store));
            let before = graph.generation();
            let event = store.insert(ClassSymbol::new("a/New").with_super("a/Base"), true);
            graph.on_event(&event);
            assert!(graph.generation() > before);
        }

        #[test]
        fn added_class_shows_up_as_a_child() {
            let store = sample_store();
            let graph = graph_over(Arc::clone(&store));
            let event = store.insert(ClassSymbol::new("a/New").with_super("a/Base"), true);
            graph.on_event(&event);

            let base = graph.vertex("a/Base").expect("known class");
            let children = graph.children(&base);
            let names: Vec<&str> = children.iter().map(|v| v.name()).collect();
            assert_eq!(names, vec!["a/Mid", "a/New"]);
        }

        #[test]
        fn update_diffs_super_edges() {
            let store = sample_store();
            let graph = graph_over(Arc::clone(&store));

            // Re-parent Leaf from Mid to Base.
            let event = store.insert(ClassSymbol::new("a/Leaf").with_super("a/Base"), true);
            graph.on_event(&event);

            let mid = graph.vertex("a/Mid").expect("known class");
            assert!(graph.children(&mid).is_empty());
            let base = graph.vertex("a/Base").expect("known class");
            let children = graph.children(&base);
            let names: Vec<&str> = children.iter().map(|v| v.name()).collect();
            assert_eq!(names, vec!["a/Leaf", "a/Mid"]);
        }

        #[test]
        fn removed_class_disappears_from_the_index() {
            let store = sample_store();
            let graph = graph_over(Arc::clone(&store));
            let event = store.remove("a/Leaf").expect("known class");
            graph.on_event(&event);

            assert!(graph.vertex("a/Leaf").is_none());
            let mid = graph.vertex("a/Mid").expect("known class");
            assert!(graph.children(&mid).is_empty());
        }

        #[test]
        fn clear_drops_all_cached_state() {
            let store = sample_store();
            let graph = graph_over(Arc::clone(&store));
            graph.clear();
            let base = graph.vertex("a/Base").expect("store still has it");
            assert!(graph.children(&base).is_empty());
        }
    }

    mod malformed {
        use super::*;

        #[test]
        fn self_referential_super_terminates() {
            let store = Arc::new(InMemorySymbolStore::new());
            store.insert(ClassSymbol::new("a/Selfish").with_super("a/Selfish"), true);
            let graph = graph_over(store);
            let vertex = graph.vertex("a/Selfish").expect("known class");
            assert!(graph.all_parents(&vertex).is_empty());
            assert_eq!(graph.family("a/Selfish", false).len(), 1);
        }

        #[test]
        fn two_class_cycle_terminates() {
            let store = Arc::new(InMemorySymbolStore::new());
            store.insert(ClassSymbol::new("a/Ping").with_super("a/Pong"), true);
            store.insert(ClassSymbol::new("a/Pong").with_super("a/Ping"), true);
            let graph = graph_over(store);

            let ping = graph.vertex("a/Ping").expect("known class");
            let ancestors = graph.all_parents(&ping);
            let names: Vec<&str> = ancestors.iter().map(|v| v.name()).collect();
            assert_eq!(names, vec!["a/Pong"]);

            // The family converges on both members instead of looping.
            assert_eq!(graph.family("a/Ping", false).len(), 2);
            assert_eq!(graph.common_ancestor("a/Ping", "a/Pong"), "a/Pong");
        }
    }

    #[test]
    fn graph_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HierarchyGraph<InMemorySymbolStore>>();
    }
}
