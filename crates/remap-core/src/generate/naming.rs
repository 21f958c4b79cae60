//! Name generation for mapping output.

use std::collections::BTreeSet;

use crate::symbol::{ClassSymbol, LocalVariable, MemberSymbol};

/// Produces replacement names for classes, members and variables.
///
/// Implementations hold their own state: two generation runs over different
/// scopes must not share counters, so nothing here is process-wide.
pub trait NameGenerator {
    fn map_class(&mut self, class: &ClassSymbol) -> String;
    fn map_field(&mut self, owner: &ClassSymbol, field: &MemberSymbol) -> String;
    fn map_method(&mut self, owner: &ClassSymbol, method: &MemberSymbol) -> String;
    fn map_variable(
        &mut self,
        owner: &ClassSymbol,
        method: &MemberSymbol,
        variable: &LocalVariable,
    ) -> String;
}

/// Deterministic counter-based generator: `Class1`, `field1`, `method1`,
/// `var1` and so on.
///
/// Candidates colliding with the reserved name set are skipped, so seeding
/// the set with names that already exist in the scope guarantees fresh
/// output. Counters are per kind and never reset.
#[derive(Debug, Clone, Default)]
pub struct IncrementingNameGenerator {
    reserved: BTreeSet<String>,
    class_index: u64,
    field_index: u64,
    method_index: u64,
    variable_index: u64,
}

impl IncrementingNameGenerator {
    pub fn new() -> Self {
        IncrementingNameGenerator::default()
    }

    /// Create a generator that will never produce any of `names`.
    pub fn with_reserved<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        IncrementingNameGenerator {
            reserved: names.into_iter().map(Into::into).collect(),
            ..IncrementingNameGenerator::default()
        }
    }

    /// Add one name to the reserved set.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    fn next(index: &mut u64, prefix: &str, reserved: &BTreeSet<String>) -> String {
        loop {
            *index += 1;
            let candidate = format!("{prefix}{index}");
            if !reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl NameGenerator for IncrementingNameGenerator {
    fn map_class(&mut self, _class: &ClassSymbol) -> String {
        Self::next(&mut self.class_index, "Class", &self.reserved)
    }

    fn map_field(&mut self, _owner: &ClassSymbol, _field: &MemberSymbol) -> String {
        Self::next(&mut self.field_index, "field", &self.reserved)
    }

    fn map_method(&mut self, _owner: &ClassSymbol, _method: &MemberSymbol) -> String {
        Self::next(&mut self.method_index, "method", &self.reserved)
    }

    fn map_variable(
        &mut self,
        _owner: &ClassSymbol,
        _method: &MemberSymbol,
        _variable: &LocalVariable,
    ) -> String {
        Self::next(&mut self.variable_index, "var", &self.reserved)
    }
}
