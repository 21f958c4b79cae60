//! Mapping generation over inheritance families.
//!
//! Renaming one class at a time breaks polymorphism: an overriding method
//! renamed in a child but not in its parent no longer overrides anything.
//! The generator therefore works on whole inheritance families.
//!
//! For each family it first collects which member signatures are
//! *inheritable* (declared non-private anywhere in the family, so a rename
//! must cover every declaring member) and which method signatures are
//! *library-locked* (overriding a declaration in a non-owned class; never
//! renamed, regardless of the filter). It then assigns names: one shared
//! name propagated to every declaring relative for inheritable signatures,
//! an independent name otherwise. Method propagation is all-or-nothing: if
//! the filter rejects the signature on any declaring family member, none of
//! them is renamed.
//!
//! Generation is deterministic for a deterministic [`NameGenerator`]: the
//! scope is consumed from a sorted work-list, one family at a time, and
//! every family member is removed from the work-list once its family has
//! been processed.

pub mod filter;
pub mod naming;

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::hierarchy::{HierarchyGraph, Vertex};
use crate::mapping::Mapping;
use crate::resolve::LinkResolver;
use crate::store::SymbolStore;
use crate::symbol::MemberKey;

use filter::{ExcludeEnumIntrinsics, GenerationFilter};
use naming::NameGenerator;

/// Reserved name of the instance self-reference in slot 0.
const SELF_VARIABLE: &str = "this";

/// Generates rename mappings for a scope of classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingGenerator;

impl MappingGenerator {
    pub fn new() -> Self {
        MappingGenerator
    }

    /// Generate a fresh mapping for `scope`.
    ///
    /// `scope` is the set of class names to consider; classes pulled into a
    /// family that are not owned contribute no entries of their own. A
    /// family with zero owned vertices contributes nothing at all.
    pub fn generate<S, I>(
        &self,
        scope: I,
        graph: &HierarchyGraph<S>,
        resolver: &LinkResolver,
        names: &mut dyn NameGenerator,
        filter: &dyn GenerationFilter,
    ) -> Mapping
    where
        S: SymbolStore,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut mapping = Mapping::new();
        self.generate_into(&mut mapping, scope, graph, resolver, names, filter);
        mapping
    }

    /// Extend an existing mapping.
    ///
    /// Entries already present are left untouched and suppress regeneration,
    /// which makes repeated runs over an unchanged graph idempotent.
    pub fn generate_into<S, I>(
        &self,
        mapping: &mut Mapping,
        scope: I,
        graph: &HierarchyGraph<S>,
        resolver: &LinkResolver,
        names: &mut dyn NameGenerator,
        filter: &dyn GenerationFilter,
    ) where
        S: SymbolStore,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let filter = ExcludeEnumIntrinsics::new(filter);
        let mut worklist: BTreeSet<String> = scope.into_iter().map(Into::into).collect();

        // Pull a class, map its whole family, then drop every family member
        // from the work-list so each family is processed exactly once.
        while let Some(first) = worklist.first().cloned() {
            let family = graph.family(&first, false);
            if family.is_empty() {
                worklist.remove(&first);
                continue;
            }
            for vertex in &family {
                worklist.remove(vertex.name());
            }
            self.map_family(mapping, &family, graph, resolver, names, &filter);
        }
    }

    fn map_family<S: SymbolStore>(
        &self,
        mapping: &mut Mapping,
        family: &[Arc<Vertex>],
        graph: &HierarchyGraph<S>,
        resolver: &LinkResolver,
        names: &mut dyn NameGenerator,
        filter: &dyn GenerationFilter,
    ) {
        // Methods can be indirectly linked by two interfaces describing the
        // same signature and a child implementing both, so any non-private
        // signature anywhere in the family gets family-wide treatment.
        // Fields cannot be linked that way but are still reachable through
        // child owners, so they get the same bookkeeping.
        let mut inheritable_fields: HashSet<MemberKey> = HashSet::new();
        let mut inheritable_methods: HashSet<MemberKey> = HashSet::new();
        let mut locked_methods: HashSet<MemberKey> = HashSet::new();
        for vertex in family {
            if vertex.symbol().is_module() {
                continue;
            }
            for field in &vertex.symbol().fields {
                if field.access.is_private {
                    continue;
                }
                inheritable_fields.insert(field.key());
            }
            for method in &vertex.symbol().methods {
                if method.access.is_private {
                    continue;
                }
                let key = method.key();
                if resolver.is_library_bound(graph, vertex.name(), &method.name, &method.descriptor)
                {
                    locked_methods.insert(key.clone());
                }
                inheritable_methods.insert(key);
            }
        }

        // Member names.
        for vertex in family {
            if !vertex.is_owned() || vertex.symbol().is_module() {
                continue;
            }
            let owner = vertex.symbol();
            let owner_name = vertex.name();

            for field in &owner.fields {
                if !filter.should_map_field(owner, field) {
                    continue;
                }
                if mapping
                    .mapped_field_name(owner_name, &field.name, &field.descriptor)
                    .is_some()
                {
                    continue;
                }
                let mapped = names.map_field(owner, field);
                if inheritable_fields.contains(&field.key()) {
                    // One name for every relative that actually declares the
                    // field, parents and children alike.
                    let mut targets = vec![Arc::clone(vertex)];
                    targets.extend(graph.all_parents(vertex));
                    targets.extend(graph.all_children(vertex));
                    let mut seen = HashSet::new();
                    for target in targets {
                        if !seen.insert(target.name().to_string()) {
                            continue;
                        }
                        if target.has_field(&field.name, &field.descriptor) {
                            mapping.add_field(
                                target.name(),
                                &field.name,
                                &field.descriptor,
                                &mapped,
                            );
                        }
                    }
                } else {
                    mapping.add_field(owner_name, &field.name, &field.descriptor, &mapped);
                }
            }

            for method in &owner.methods {
                // Local variables are named independently of the method name
                // decision; constructors and static initializers get theirs
                // too even though the method name itself is reserved.
                for variable in &method.variables {
                    if mapping
                        .mapped_variable_name(
                            owner_name,
                            &method.name,
                            &method.descriptor,
                            &variable.name,
                            &variable.descriptor,
                            variable.index,
                        )
                        .is_some()
                    {
                        continue;
                    }
                    if variable.index == 0 && !method.access.is_static {
                        // The self reference gets its reserved name back if
                        // it carries anything else.
                        if variable.name != SELF_VARIABLE {
                            mapping.add_variable(
                                owner_name,
                                &method.name,
                                &method.descriptor,
                                &variable.descriptor,
                                &variable.name,
                                variable.index,
                                SELF_VARIABLE,
                            );
                        }
                        continue;
                    }
                    if !filter.should_map_local_variable(owner, method, variable) {
                        continue;
                    }
                    let mapped = names.map_variable(owner, method, variable);
                    mapping.add_variable(
                        owner_name,
                        &method.name,
                        &method.descriptor,
                        &variable.descriptor,
                        &variable.name,
                        variable.index,
                        &mapped,
                    );
                }

                if method.name.starts_with('<') {
                    continue;
                }
                // Library locks are checked ahead of the filter; no filter
                // may opt a locked signature back in.
                let key = method.key();
                if locked_methods.contains(&key) {
                    continue;
                }
                if mapping
                    .mapped_method_name(owner_name, &method.name, &method.descriptor)
                    .is_some()
                {
                    continue;
                }
                if !filter.should_map_method(owner, method) {
                    continue;
                }
                let mapped = names.map_method(owner, method);
                if mapped == method.name {
                    continue;
                }
                if inheritable_methods.contains(&key) {
                    // All or nothing: if any declaring family member is
                    // filtered out, committing the rest would leave a
                    // partially renamed override set.
                    let declaring: Vec<&Arc<Vertex>> = family
                        .iter()
                        .filter(|v| v.has_method(&method.name, &method.descriptor))
                        .collect();
                    let all_pass = declaring.iter().all(|v| {
                        v.method(&method.name, &method.descriptor)
                            .is_some_and(|m| filter.should_map_method(v.symbol(), m))
                    });
                    if all_pass {
                        for declarer in &declaring {
                            mapping.add_method(
                                declarer.name(),
                                &method.name,
                                &method.descriptor,
                                &mapped,
                            );
                        }
                    }
                } else {
                    mapping.add_method(owner_name, &method.name, &method.descriptor, &mapped);
                }
            }
        }

        // Class names last, independent of member results.
        for vertex in family {
            if !vertex.is_owned() || vertex.symbol().is_module() {
                continue;
            }
            let symbol = vertex.symbol();
            if !filter.should_map_class(symbol) {
                continue;
            }
            if mapping.mapped_class_name(vertex.name()).is_some() {
                continue;
            }
            let mapped = names.map_class(symbol);
            mapping.add_class(vertex.name(), &mapped);
        }
    }
}
