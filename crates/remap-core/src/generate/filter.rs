//! Generation filters.
//!
//! Filters limit which classes and members receive generated names. Every
//! method defaults to accepting, so implementations only override what they
//! care about.

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;

use crate::symbol::{ClassSymbol, LocalVariable, MemberSymbol};

/// Limits which classes and members get renamed.
pub trait GenerationFilter {
    fn should_map_class(&self, _class: &ClassSymbol) -> bool {
        true
    }

    fn should_map_field(&self, _owner: &ClassSymbol, _field: &MemberSymbol) -> bool {
        true
    }

    fn should_map_method(&self, _owner: &ClassSymbol, _method: &MemberSymbol) -> bool {
        true
    }

    fn should_map_local_variable(
        &self,
        _owner: &ClassSymbol,
        _method: &MemberSymbol,
        _variable: &LocalVariable,
    ) -> bool {
        true
    }
}

/// Accepts every class and member.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl GenerationFilter for AcceptAll {}

/// Rejects enum intrinsics, delegating everything else to the wrapped
/// filter.
///
/// `values()` and `valueOf(String)` on an enum are looked up reflectively by
/// the runtime, so renaming them breaks the class even though nothing in the
/// analyzed scope appears to reference them. The generator composes this
/// over every caller-supplied filter.
pub struct ExcludeEnumIntrinsics<'a> {
    inner: &'a dyn GenerationFilter,
}

impl<'a> ExcludeEnumIntrinsics<'a> {
    pub fn new(inner: &'a dyn GenerationFilter) -> Self {
        ExcludeEnumIntrinsics { inner }
    }
}

fn is_enum_intrinsic(owner: &ClassSymbol, method: &MemberSymbol) -> bool {
    let values_descriptor = format!("()[L{};", owner.name);
    let value_of_descriptor = format!("(Ljava/lang/String;)L{};", owner.name);
    (method.name == "values" && method.descriptor == values_descriptor)
        || (method.name == "valueOf" && method.descriptor == value_of_descriptor)
}

impl GenerationFilter for ExcludeEnumIntrinsics<'_> {
    fn should_map_class(&self, class: &ClassSymbol) -> bool {
        self.inner.should_map_class(class)
    }

    fn should_map_field(&self, owner: &ClassSymbol, field: &MemberSymbol) -> bool {
        self.inner.should_map_field(owner, field)
    }

    fn should_map_method(&self, owner: &ClassSymbol, method: &MemberSymbol) -> bool {
        if owner.access.is_enum && is_enum_intrinsic(owner, method) {
            return false;
        }
        self.inner.should_map_method(owner, method)
    }

    fn should_map_local_variable(
        &self,
        owner: &ClassSymbol,
        method: &MemberSymbol,
        variable: &LocalVariable,
    ) -> bool {
        self.inner.should_map_local_variable(owner, method, variable)
    }
}

/// Error for invalid filter patterns.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Glob pattern that failed to compile.
    #[error("invalid name pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Include/exclude filter over class names using glob patterns.
///
/// A class passes when it matches no exclude pattern and, if any include
/// patterns were given, matches at least one of them. Members follow their
/// owning class.
#[derive(Debug)]
pub struct NamePatternFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl NamePatternFilter {
    pub fn new(include: &[&str], exclude: &[&str]) -> Result<Self, FilterError> {
        let include = if include.is_empty() {
            None
        } else {
            Some(build_set(include)?)
        };
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_set(exclude)?)
        };
        Ok(NamePatternFilter { include, exclude })
    }

    fn accepts(&self, name: &str) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(name) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(name),
            None => true,
        }
    }
}

fn build_set(patterns: &[&str]) -> Result<GlobSet, FilterError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| FilterError::InvalidPattern {
            pattern: (*pattern).to_string(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| FilterError::InvalidPattern {
        pattern: patterns.join(","),
        message: e.to_string(),
    })
}

impl GenerationFilter for NamePatternFilter {
    fn should_map_class(&self, class: &ClassSymbol) -> bool {
        self.accepts(&class.name)
    }

    fn should_map_field(&self, owner: &ClassSymbol, _field: &MemberSymbol) -> bool {
        self.accepts(&owner.name)
    }

    fn should_map_method(&self, owner: &ClassSymbol, _method: &MemberSymbol) -> bool {
        self.accepts(&owner.name)
    }

    fn should_map_local_variable(
        &self,
        owner: &ClassSymbol,
        _method: &MemberSymbol,
        _variable: &LocalVariable,
    ) -> bool {
        self.accepts(&owner.name)
    }
}
