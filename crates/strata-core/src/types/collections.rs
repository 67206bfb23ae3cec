//! Collection aliases used on hot paths.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// Inline storage for per-name candidate lists in the resolver, which
/// rarely hold more than a handful of symbols.
pub type SmallVec4<T> = SmallVec<[T; 4]>;
