//! Core analysis for JVM class universes.
//!
//! This crate is the analysis heart of a class remapping pipeline. It models
//! a mutable universe of class symbols and answers two kinds of question
//! over it: structural hierarchy queries (family membership, common
//! ancestors, member linkage) and identifier-renaming queries (generating
//! hierarchy-consistent rename mappings and composing successive passes into
//! one original→current mapping).
//!
//! - [`symbol`]: class/member symbol model, keyed by name and descriptor
//! - [`store`]: the symbol universe boundary and its mutation events
//! - [`hierarchy`]: lazy inheritance graph with family and ancestor queries
//! - [`resolve`]: memoized member linkage per JVM-style rules
//! - [`mapping`]: rename mapping value type
//! - [`generate`]: mapping generation over inheritance families
//! - [`aggregate`]: composition of successive mapping passes
//! - [`descriptor`]: descriptor translation utilities
//!
//! Everything surrounding this core, such as frontends, archive loading,
//! search indexes or mapping file formats, consumes these interfaces from
//! the outside; no I/O happens here.

pub mod aggregate;
pub mod descriptor;
pub mod generate;
pub mod hierarchy;
pub mod mapping;
pub mod resolve;
pub mod store;
pub mod symbol;
