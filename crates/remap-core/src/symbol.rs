//! Symbol model for the analyzed type universe.
//!
//! Classes are identified by their internal name (e.g. `com/example/Foo`),
//! members by their `(name, descriptor)` pair. The pair is the unit of
//! override compatibility throughout the crate; never the full member value,
//! which may carry extra data such as local variable tables.
//!
//! Symbols are immutable values. An update to a class replaces its
//! [`ClassSymbol`] wholesale, so caches built over a prior version can be
//! discarded safely.

use serde::{Deserialize, Serialize};

// ============================================================================
// Access Flags
// ============================================================================

/// Modifier flags of a class symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAccess {
    pub is_interface: bool,
    pub is_module: bool,
    pub is_enum: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

/// Modifier flags of a field or method symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAccess {
    pub is_public: bool,
    pub is_protected: bool,
    pub is_private: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
}

// ============================================================================
// Members
// ============================================================================

/// A local variable slot within a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariable {
    /// Slot index. Slot 0 of an instance method holds the self reference.
    pub index: u16,
    pub name: String,
    pub descriptor: String,
}

impl LocalVariable {
    pub fn new(index: u16, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        LocalVariable {
            index,
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// Hierarchy identity of a member.
///
/// Hashing and equality are based only on the name and descriptor so that
/// additional data such as local variable tables cannot interfere with
/// override bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub name: String,
    pub descriptor: String,
}

impl MemberKey {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        MemberKey {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// A field or method of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSymbol {
    pub name: String,
    pub descriptor: String,
    pub access: MemberAccess,
    /// Thrown type names. Methods only; empty for fields.
    pub thrown: Vec<String>,
    /// Local variable table. Methods only; empty for fields.
    pub variables: Vec<LocalVariable>,
}

impl MemberSymbol {
    /// Create a field symbol with default access.
    pub fn field(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        MemberSymbol {
            name: name.into(),
            descriptor: descriptor.into(),
            access: MemberAccess::default(),
            thrown: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Create a method symbol with default access.
    pub fn method(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        MemberSymbol {
            name: name.into(),
            descriptor: descriptor.into(),
            access: MemberAccess::default(),
            thrown: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn with_access(mut self, access: MemberAccess) -> Self {
        self.access = access;
        self
    }

    pub fn with_thrown(mut self, name: impl Into<String>) -> Self {
        self.thrown.push(name.into());
        self
    }

    pub fn with_variable(mut self, variable: LocalVariable) -> Self {
        self.variables.push(variable);
        self
    }

    /// The `(name, descriptor)` identity of this member.
    pub fn key(&self) -> MemberKey {
        MemberKey::new(self.name.clone(), self.descriptor.clone())
    }
}

// ============================================================================
// Classes
// ============================================================================

/// One class in the universe.
///
/// Interfaces are kept in declaration order. The super type of `interface`
/// symbols is the universal root, as in class files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub access: ClassAccess,
    pub fields: Vec<MemberSymbol>,
    pub methods: Vec<MemberSymbol>,
}

impl ClassSymbol {
    /// Create a class with no super type, no interfaces and no members.
    pub fn new(name: impl Into<String>) -> Self {
        ClassSymbol {
            name: name.into(),
            super_name: None,
            interfaces: Vec::new(),
            access: ClassAccess::default(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_super(mut self, name: impl Into<String>) -> Self {
        self.super_name = Some(name.into());
        self
    }

    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn with_access(mut self, access: ClassAccess) -> Self {
        self.access = access;
        self
    }

    pub fn with_field(mut self, field: MemberSymbol) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MemberSymbol) -> Self {
        self.methods.push(method);
        self
    }

    /// Find a declared field by name and descriptor.
    pub fn field(&self, name: &str, descriptor: &str) -> Option<&MemberSymbol> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.descriptor == descriptor)
    }

    /// Find a declared method by name and descriptor.
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MemberSymbol> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    pub fn has_field(&self, name: &str, descriptor: &str) -> bool {
        self.field(name, descriptor).is_some()
    }

    pub fn has_method(&self, name: &str, descriptor: &str) -> bool {
        self.method(name, descriptor).is_some()
    }

    /// True for `module-info` style symbols, which never participate in
    /// inheritance traversal.
    pub fn is_module(&self) -> bool {
        self.access.is_module && self.super_name.is_none()
    }
}
