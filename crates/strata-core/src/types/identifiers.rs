//! Deterministic identifiers for graph entities.
//!
//! Ids are derived from content that is stable across runs (the file path
//! and the symbol's declaration order), never from insertion order. The
//! same tree therefore always produces the same ids, and re-indexing one
//! file never renumbers symbols of another.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw stored id.
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw id as stored in SQLite.
            pub fn raw(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// File identifier derived from the repository-relative path.
    FileId
);

define_id!(
    /// Symbol identifier derived from (file path, declaration ordinal).
    SymbolId
);

/// SQLite INTEGER PRIMARY KEY is signed; keep ids non-negative.
const ID_MASK: u64 = i64::MAX as u64;

impl FileId {
    /// Derive the id of the file at `path` (forward-slash, repo-relative).
    pub fn derive(path: &str) -> Self {
        Self((xxh3_64(path.as_bytes()) & ID_MASK) as i64)
    }
}

impl SymbolId {
    /// Derive the id of the `ordinal`-th symbol declared in `path`.
    pub fn derive(path: &str, ordinal: u32) -> Self {
        let mut key = Vec::with_capacity(path.len() + 12);
        key.extend_from_slice(path.as_bytes());
        key.push(0);
        key.extend_from_slice(ordinal.to_string().as_bytes());
        Self((xxh3_64(&key) & ID_MASK) as i64)
    }
}
