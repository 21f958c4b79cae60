//! Aggregated mapping composition.
//!
//! Successive generation passes rename renamed names: pass one maps `a` to
//! `b`, pass two maps `b` to `c`. The aggregate compresses such chains down
//! to their net result (`a` to `c`) so the whole history can be re-applied
//! to the original classes in one step.
//!
//! The composer owns a forward [`Mapping`] keyed by original names plus a
//! reverse class map (current name to original name) with the invariant
//! `reverse[forward[x]] == x` for every class entry. Member entries are
//! bridged by consuming the stale aggregate entry whose new name matches the
//! batch entry's old name. Descriptors are always stored translated through
//! the reverse map, so they stay anchored to original type names no matter
//! how often classes get renamed.
//!
//! Composition never fails: a batch referring to names the aggregate has
//! never produced degrades to first-time entries, and a reverse map that
//! disagrees with the forward map is rebuilt from it rather than reported.

use std::collections::HashMap;

use crate::descriptor::remap_descriptor;
use crate::mapping::Mapping;

/// Running original→current mapping built by composing generation passes.
///
/// One instance lives per analysis session. Composition takes `&mut self`,
/// so a shared aggregate is serialized by whatever lock its owner wraps it
/// in; readers never observe a half-composed batch.
#[derive(Debug, Default)]
pub struct AggregatedMapping {
    forward: Mapping,
    /// Current class name to original class name.
    reverse_classes: HashMap<String, String>,
}

impl AggregatedMapping {
    pub fn new() -> Self {
        AggregatedMapping::default()
    }

    /// The aggregated forward mapping, anchored to original names.
    pub fn mapping(&self) -> &Mapping {
        &self.forward
    }

    /// Original name of a class, given its current name.
    pub fn reverse_class_lookup(&self, current: &str) -> Option<&str> {
        self.reverse_classes.get(current).map(String::as_str)
    }

    /// Original name of a field, given its current owner, name and
    /// descriptor.
    pub fn reverse_field_lookup(
        &self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Option<&str> {
        let original_owner = self.original_owner(owner);
        let original_descriptor = translate(&self.reverse_classes, descriptor);
        self.forward
            .class_field_renames(original_owner)
            .iter()
            .find(|f| f.new_name == name && f.descriptor == original_descriptor)
            .map(|f| f.old_name.as_str())
    }

    /// Original name of a method, given its current owner, name and
    /// descriptor.
    pub fn reverse_method_lookup(
        &self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Option<&str> {
        let original_owner = self.original_owner(owner);
        let original_descriptor = translate(&self.reverse_classes, descriptor);
        self.forward
            .class_method_renames(original_owner)
            .iter()
            .find(|m| m.new_name == name && m.descriptor == original_descriptor)
            .map(|m| m.old_name.as_str())
    }

    /// Original name of a local variable, given the current names of its
    /// owner, declaring method and itself.
    pub fn reverse_variable_lookup(
        &self,
        owner: &str,
        method_name: &str,
        method_descriptor: &str,
        name: &str,
        descriptor: &str,
        index: u16,
    ) -> Option<&str> {
        let original_owner = self.original_owner(owner);
        let original_method_descriptor = translate(&self.reverse_classes, method_descriptor);
        let original_variable_descriptor = translate(&self.reverse_classes, descriptor);
        let original_method_name = self
            .forward
            .class_method_renames(original_owner)
            .iter()
            .find(|m| m.new_name == method_name && m.descriptor == original_method_descriptor)
            .map(|m| m.old_name.as_str())
            .unwrap_or(method_name);
        self.forward
            .method_variable_renames(
                original_owner,
                original_method_name,
                &original_method_descriptor,
            )
            .iter()
            .find(|v| {
                v.index == index
                    && v.new_name == name
                    && v.descriptor == original_variable_descriptor
            })
            .map(|v| v.old_name.as_str())
    }

    /// Reset forward and reverse state together.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse_classes.clear();
    }

    /// Fold one freshly generated mapping into the aggregate.
    ///
    /// Returns true when any chain bridging occurred, i.e. some batch entry
    /// continued a rename chain from an earlier pass.
    pub fn compose(&mut self, batch: &Mapping) -> bool {
        // Member entries refer to names as they were when the batch was
        // produced, so they bridge through a snapshot of the reverse map
        // taken before class composition rewrites it.
        let sources = self.reverse_classes.clone();
        let mut bridged = self.compose_classes(batch);
        // Variables resolve their declaring method through the method
        // entries as they stood before this batch, so they fold in first.
        bridged |= self.compose_variables(batch, &sources);
        bridged |= self.compose_fields(batch, &sources);
        bridged |= self.compose_methods(batch, &sources);
        bridged
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    fn compose_classes(&mut self, batch: &Mapping) -> bool {
        let mut bridged = false;
        for entry in batch.classes() {
            match self.chain_source(&entry.old_name) {
                Some(original) => {
                    // Continuation of a prior chain: commit original→new and
                    // drop the stale reverse entry for the old current name.
                    bridged = true;
                    self.reverse_classes.remove(&entry.old_name);
                    self.record_class(&original, &entry.new_name);
                }
                None => self.record_class(&entry.old_name, &entry.new_name),
            }
        }
        bridged
    }

    /// Original name behind `current`, verified against the forward map.
    /// A mismatch means the reverse map lost sync; it is rebuilt from the
    /// forward map instead of failing the composition.
    fn chain_source(&mut self, current: &str) -> Option<String> {
        let original = self.reverse_classes.get(current)?.clone();
        if self.forward.mapped_class_name(&original) != Some(current) {
            tracing::warn!(
                class = current,
                "reverse class map out of sync, rebuilding from forward mapping"
            );
            self.rebuild_reverse();
            return self.reverse_classes.get(current).cloned();
        }
        Some(original)
    }

    fn rebuild_reverse(&mut self) {
        self.reverse_classes = self
            .forward
            .classes()
            .map(|c| (c.new_name.clone(), c.old_name.clone()))
            .collect();
    }

    fn record_class(&mut self, original: &str, current: &str) {
        if original == current {
            // The chain collapsed back onto the original name; nothing is
            // renamed anymore.
            self.forward.remove_class(original);
            return;
        }
        self.forward.add_class(original, current);
        self.reverse_classes
            .insert(current.to_string(), original.to_string());
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn compose_fields(&mut self, batch: &Mapping, sources: &HashMap<String, String>) -> bool {
        let mut bridged = false;
        for entry in batch.field_renames() {
            let (owner, owner_bridged) = resolve_owner(sources, &entry.owner);
            bridged |= owner_bridged;
            let descriptor = translate(sources, &entry.descriptor);
            let old_name = if owner_bridged {
                // The batch's old name is a name produced by an earlier
                // pass; the matching stale entry carries the true original
                // name and is consumed here.
                self.forward
                    .take_field_rename(&owner, |f| {
                        f.new_name == entry.old_name && f.descriptor == descriptor
                    })
                    .map(|f| f.old_name)
                    .unwrap_or_else(|| entry.old_name.clone())
            } else {
                entry.old_name.clone()
            };
            self.forward
                .add_field(&owner, &old_name, &descriptor, &entry.new_name);
        }
        bridged
    }

    fn compose_methods(&mut self, batch: &Mapping, sources: &HashMap<String, String>) -> bool {
        let mut bridged = false;
        for entry in batch.method_renames() {
            let (owner, owner_bridged) = resolve_owner(sources, &entry.owner);
            bridged |= owner_bridged;
            let descriptor = translate(sources, &entry.descriptor);
            let old_name = if owner_bridged {
                self.forward
                    .take_method_rename(&owner, |m| {
                        m.new_name == entry.old_name && m.descriptor == descriptor
                    })
                    .map(|m| m.old_name)
                    .unwrap_or_else(|| entry.old_name.clone())
            } else {
                entry.old_name.clone()
            };
            self.forward
                .add_method(&owner, &old_name, &descriptor, &entry.new_name);
        }
        bridged
    }

    fn compose_variables(&mut self, batch: &Mapping, sources: &HashMap<String, String>) -> bool {
        let mut bridged = false;
        for entry in batch.variable_renames() {
            let (owner, owner_bridged) = resolve_owner(sources, &entry.owner);
            bridged |= owner_bridged;
            let method_descriptor = translate(sources, &entry.method_descriptor);
            let method_name = if owner_bridged {
                // Original name of the declaring method, left in place; the
                // method entry itself is bridged by compose_methods.
                self.forward
                    .class_method_renames(&owner)
                    .iter()
                    .find(|m| {
                        m.new_name == entry.method_name && m.descriptor == method_descriptor
                    })
                    .map(|m| m.old_name.clone())
                    .unwrap_or_else(|| entry.method_name.clone())
            } else {
                entry.method_name.clone()
            };
            let descriptor = translate(sources, &entry.descriptor);
            let old_name = match self.forward.take_variable_rename(
                &owner,
                &method_name,
                &method_descriptor,
                |v| {
                    v.new_name == entry.old_name
                        && v.index == entry.index
                        && v.descriptor == descriptor
                },
            ) {
                Some(prior) => {
                    bridged = true;
                    prior.old_name
                }
                None => entry.old_name.clone(),
            };
            self.forward.add_variable(
                &owner,
                &method_name,
                &method_descriptor,
                &descriptor,
                &old_name,
                entry.index,
                &entry.new_name,
            );
        }
        bridged
    }

    fn original_owner<'a>(&'a self, owner: &'a str) -> &'a str {
        self.reverse_classes
            .get(owner)
            .map(String::as_str)
            .unwrap_or(owner)
    }
}

fn resolve_owner(sources: &HashMap<String, String>, owner: &str) -> (String, bool) {
    match sources.get(owner) {
        Some(original) => (original.clone(), true),
        None => (owner.to_string(), false),
    }
}

/// Translate every class name embedded in a descriptor back to its original
/// name. Malformed descriptors pass through untranslated; composition must
/// keep going on whatever the batch handed over.
fn translate(sources: &HashMap<String, String>, descriptor: &str) -> String {
    match remap_descriptor(descriptor, |name| sources.get(name).cloned()) {
        Ok(mapped) => mapped,
        Err(error) => {
            tracing::debug!(%error, descriptor, "descriptor left untranslated");
            descriptor.to_string()
        }
    }
}
