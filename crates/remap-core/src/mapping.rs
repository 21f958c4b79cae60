//! Rename mapping value type.
//!
//! A [`Mapping`] holds the output of one generation pass: class renames plus
//! per-owner field, method and local variable renames. Entries are keyed the
//! way they are queried, iteration order is deterministic, and identity
//! renames (old name equal to new name) are dropped on insert.
//!
//! Mappings are plain values. Persisting them in a concrete mapping file
//! format is the job of external collaborators; everything here derives
//! serde traits so those collaborators can do that without re-modeling.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A class rename entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRename {
    pub old_name: String,
    pub new_name: String,
}

/// A field rename entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRename {
    pub owner: String,
    pub old_name: String,
    pub descriptor: String,
    pub new_name: String,
}

/// A method rename entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRename {
    pub owner: String,
    pub old_name: String,
    pub descriptor: String,
    pub new_name: String,
}

/// A local variable rename entry, keyed under its declaring method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRename {
    pub owner: String,
    pub method_name: String,
    pub method_descriptor: String,
    pub descriptor: String,
    pub old_name: String,
    pub index: u16,
    pub new_name: String,
}

/// A rename mapping across one scope of classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    classes: BTreeMap<String, ClassRename>,
    fields: BTreeMap<String, Vec<FieldRename>>,
    methods: BTreeMap<String, Vec<MethodRename>>,
    variables: BTreeMap<String, Vec<VariableRename>>,
}

fn variable_key(owner: &str, method_name: &str, method_descriptor: &str) -> String {
    format!("{owner}\t{method_name}\t{method_descriptor}")
}

impl Mapping {
    pub fn new() -> Self {
        Mapping::default()
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    pub fn add_class(&mut self, old_name: &str, new_name: &str) {
        if old_name == new_name {
            return;
        }
        self.classes.insert(
            old_name.to_string(),
            ClassRename {
                old_name: old_name.to_string(),
                new_name: new_name.to_string(),
            },
        );
    }

    pub fn add_field(&mut self, owner: &str, old_name: &str, descriptor: &str, new_name: &str) {
        if old_name == new_name {
            return;
        }
        self.fields
            .entry(owner.to_string())
            .or_default()
            .push(FieldRename {
                owner: owner.to_string(),
                old_name: old_name.to_string(),
                descriptor: descriptor.to_string(),
                new_name: new_name.to_string(),
            });
    }

    pub fn add_method(&mut self, owner: &str, old_name: &str, descriptor: &str, new_name: &str) {
        if old_name == new_name {
            return;
        }
        self.methods
            .entry(owner.to_string())
            .or_default()
            .push(MethodRename {
                owner: owner.to_string(),
                old_name: old_name.to_string(),
                descriptor: descriptor.to_string(),
                new_name: new_name.to_string(),
            });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_variable(
        &mut self,
        owner: &str,
        method_name: &str,
        method_descriptor: &str,
        descriptor: &str,
        old_name: &str,
        index: u16,
        new_name: &str,
    ) {
        if old_name == new_name {
            return;
        }
        self.variables
            .entry(variable_key(owner, method_name, method_descriptor))
            .or_default()
            .push(VariableRename {
                owner: owner.to_string(),
                method_name: method_name.to_string(),
                method_descriptor: method_descriptor.to_string(),
                descriptor: descriptor.to_string(),
                old_name: old_name.to_string(),
                index,
                new_name: new_name.to_string(),
            });
    }

    // ------------------------------------------------------------------
    // Forward lookup
    // ------------------------------------------------------------------

    pub fn mapped_class_name(&self, name: &str) -> Option<&str> {
        self.classes.get(name).map(|c| c.new_name.as_str())
    }

    pub fn mapped_field_name(&self, owner: &str, name: &str, descriptor: &str) -> Option<&str> {
        self.class_field_renames(owner)
            .iter()
            .find(|f| f.old_name == name && f.descriptor == descriptor)
            .map(|f| f.new_name.as_str())
    }

    pub fn mapped_method_name(&self, owner: &str, name: &str, descriptor: &str) -> Option<&str> {
        self.class_method_renames(owner)
            .iter()
            .find(|m| m.old_name == name && m.descriptor == descriptor)
            .map(|m| m.new_name.as_str())
    }

    pub fn mapped_variable_name(
        &self,
        owner: &str,
        method_name: &str,
        method_descriptor: &str,
        name: &str,
        descriptor: &str,
        index: u16,
    ) -> Option<&str> {
        self.method_variable_renames(owner, method_name, method_descriptor)
            .iter()
            .find(|v| v.old_name == name && v.descriptor == descriptor && v.index == index)
            .map(|v| v.new_name.as_str())
    }

    // ------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------

    /// Class rename entries in old-name order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassRename> {
        self.classes.values()
    }

    /// All field rename entries, grouped by owner in owner order.
    pub fn field_renames(&self) -> impl Iterator<Item = &FieldRename> {
        self.fields.values().flatten()
    }

    /// All method rename entries, grouped by owner in owner order.
    pub fn method_renames(&self) -> impl Iterator<Item = &MethodRename> {
        self.methods.values().flatten()
    }

    /// All variable rename entries, grouped by declaring method.
    pub fn variable_renames(&self) -> impl Iterator<Item = &VariableRename> {
        self.variables.values().flatten()
    }

    pub fn class_field_renames(&self, owner: &str) -> &[FieldRename] {
        self.fields.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn class_method_renames(&self, owner: &str) -> &[MethodRename] {
        self.methods.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn method_variable_renames(
        &self,
        owner: &str,
        method_name: &str,
        method_descriptor: &str,
    ) -> &[VariableRename] {
        self.variables
            .get(&variable_key(owner, method_name, method_descriptor))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Names of classes that have a class rename or any member rename.
    pub fn classes_with_mappings(&self) -> BTreeSet<&str> {
        self.classes
            .keys()
            .chain(self.fields.keys())
            .chain(self.methods.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.fields.is_empty()
            && self.methods.is_empty()
            && self.variables.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
        self.fields.clear();
        self.methods.clear();
        self.variables.clear();
    }

    // ------------------------------------------------------------------
    // Composition support
    // ------------------------------------------------------------------

    pub(crate) fn remove_class(&mut self, old_name: &str) -> Option<ClassRename> {
        self.classes.remove(old_name)
    }

    pub(crate) fn take_field_rename<F>(&mut self, owner: &str, predicate: F) -> Option<FieldRename>
    where
        F: Fn(&FieldRename) -> bool,
    {
        let list = self.fields.get_mut(owner)?;
        let position = list.iter().position(|entry| predicate(entry))?;
        let entry = list.remove(position);
        if list.is_empty() {
            self.fields.remove(owner);
        }
        Some(entry)
    }

    pub(crate) fn take_method_rename<F>(
        &mut self,
        owner: &str,
        predicate: F,
    ) -> Option<MethodRename>
    where
        F: Fn(&MethodRename) -> bool,
    {
        let list = self.methods.get_mut(owner)?;
        let position = list.iter().position(|entry| predicate(entry))?;
        let entry = list.remove(position);
        if list.is_empty() {
            self.methods.remove(owner);
        }
        Some(entry)
    }

    pub(crate) fn take_variable_rename<F>(
        &mut self,
        owner: &str,
        method_name: &str,
        method_descriptor: &str,
        predicate: F,
    ) -> Option<VariableRename>
    where
        F: Fn(&VariableRename) -> bool,
    {
        let key = variable_key(owner, method_name, method_descriptor);
        let list = self.variables.get_mut(&key)?;
        let position = list.iter().position(|entry| predicate(entry))?;
        let entry = list.remove(position);
        if list.is_empty() {
            self.variables.remove(&key);
        }
        Some(entry)
    }
}
