//! Identifier, collection and interning types shared by every crate.

pub mod collections;
pub mod identifiers;
pub mod interning;

pub use collections::{FxHashMap, FxHashSet};
pub use identifiers::{FileId, SymbolId};
