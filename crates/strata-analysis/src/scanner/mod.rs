//! Scanner subsystem: file discovery, content hashing, role classification
//! and incremental change detection.

pub mod change_detect;
pub mod discovery;
pub mod hasher;
pub mod language_detect;
pub mod roles;
pub mod types;

pub use change_detect::{classify, resolve_mode};
pub use discovery::discover;
pub use language_detect::Language;
pub use roles::{classify_role, FileRole};
pub use types::{ChangeSet, ClassifiedFile, DiscoveredFile, Discovery, FileClass, FingerprintModeUsed};
