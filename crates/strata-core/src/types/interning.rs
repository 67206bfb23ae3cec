//! Name interning and path normalisation.

use lasso::{RodeoReader, Spur, ThreadedRodeo};

/// Interner filled while a symbol index is built. Safe to share across
/// threads; [`NameInterner::freeze`] turns it into a lock-free lookup
/// table once building is done.
#[derive(Default)]
pub struct NameInterner {
    rodeo: ThreadedRodeo,
}

impl NameInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, name: &str) -> Spur {
        self.rodeo.get_or_intern(name)
    }

    /// Key for `name` if it was interned already. Never inserts.
    pub fn get(&self, name: &str) -> Option<Spur> {
        self.rodeo.get(name)
    }

    pub fn resolve(&self, key: &Spur) -> &str {
        self.rodeo.resolve(key)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }

    pub fn freeze(self) -> FrozenNames {
        FrozenNames {
            reader: self.rodeo.into_reader(),
        }
    }
}

/// Read-only view of a finished interner. Keys stay valid.
pub struct FrozenNames {
    reader: RodeoReader,
}

impl FrozenNames {
    pub fn get(&self, name: &str) -> Option<Spur> {
        self.reader.get(name)
    }

    pub fn resolve(&self, key: &Spur) -> &str {
        self.reader.resolve(key)
    }

    pub fn len(&self) -> usize {
        self.reader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }
}

/// Storage form of a repository-relative path: forward slashes, no
/// leading `./`, no empty segments, no trailing slash (except `/` itself).
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|s| !s.is_empty())
        .skip_while(|s| *s == ".")
        .collect();
    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}
