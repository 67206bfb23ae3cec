//! Reference resolution: cached references → confidence-tagged edges.

pub mod bridges;
pub mod diagnostics;
pub mod index;
pub mod resolver;

pub use bridges::{default_bridges, Bridge, NamingBridge, ProtobufBridge};
pub use diagnostics::ResolutionDiagnostics;
pub use index::SymbolIndex;
pub use resolver::{ReferencingFile, Resolution, ResolveOutput, Resolver, Tier};
