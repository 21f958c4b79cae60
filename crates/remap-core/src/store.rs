//! Symbol universe boundary.
//!
//! The hierarchy graph never owns class data. It pulls symbols on demand from
//! a [`SymbolStore`] and is told about universe mutations through
//! [`SymbolEvent`] values, which the store's owner forwards to
//! [`HierarchyGraph::on_event`](crate::hierarchy::HierarchyGraph::on_event).
//!
//! [`InMemorySymbolStore`] is a thread-safe reference implementation whose
//! mutators return the event to forward.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::symbol::ClassSymbol;

/// A class yielded by a [`SymbolStore`] lookup.
#[derive(Debug, Clone)]
pub struct StoredClass {
    pub symbol: Arc<ClassSymbol>,
    /// True when the symbol originates from the analyzed scope, false when it
    /// comes from a read-only library dependency.
    pub owned: bool,
}

/// Read access to a mutable universe of owned and library classes.
pub trait SymbolStore: Send + Sync {
    /// Look up a class by internal name. `None` means the name is not part of
    /// the universe at all.
    fn lookup(&self, name: &str) -> Option<StoredClass>;
}

impl<S: SymbolStore + ?Sized> SymbolStore for Arc<S> {
    fn lookup(&self, name: &str) -> Option<StoredClass> {
        (**self).lookup(name)
    }
}

/// A single mutation of the symbol universe.
///
/// Updates replace the symbol wholesale; the old and new value are both
/// carried so consumers can diff the edges that changed.
#[derive(Debug, Clone)]
pub enum SymbolEvent {
    Added(Arc<ClassSymbol>),
    Updated {
        old: Arc<ClassSymbol>,
        new: Arc<ClassSymbol>,
    },
    Removed(Arc<ClassSymbol>),
}

/// In-memory symbol store.
#[derive(Debug, Default)]
pub struct InMemorySymbolStore {
    classes: RwLock<BTreeMap<String, StoredClass>>,
}

impl InMemorySymbolStore {
    pub fn new() -> Self {
        InMemorySymbolStore::default()
    }

    /// Insert or replace a class, returning the event to forward to graph
    /// consumers.
    pub fn insert(&self, symbol: ClassSymbol, owned: bool) -> SymbolEvent {
        let symbol = Arc::new(symbol);
        let prior = self
            .classes
            .write()
            .expect("symbol store RwLock poisoned")
            .insert(
                symbol.name.clone(),
                StoredClass {
                    symbol: Arc::clone(&symbol),
                    owned,
                },
            );
        match prior {
            Some(prior) => SymbolEvent::Updated {
                old: prior.symbol,
                new: symbol,
            },
            None => SymbolEvent::Added(symbol),
        }
    }

    /// Remove a class by name, returning the event to forward if it existed.
    pub fn remove(&self, name: &str) -> Option<SymbolEvent> {
        self.classes
            .write()
            .expect("symbol store RwLock poisoned")
            .remove(name)
            .map(|stored| SymbolEvent::Removed(stored.symbol))
    }

    /// All class names currently in the universe, sorted.
    pub fn names(&self) -> Vec<String> {
        self.classes
            .read()
            .expect("symbol store RwLock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl SymbolStore for InMemorySymbolStore {
    fn lookup(&self, name: &str) -> Option<StoredClass> {
        self.classes
            .read()
            .expect("symbol store RwLock poisoned")
            .get(name)
            .cloned()
    }
}
