//! # strata-core
//!
//! Foundation crate for the Strata index engine: errors, configuration,
//! tracing setup, cancellation, deterministic identifiers and shared
//! constants. Every other workspace crate depends on this one.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::StrataConfig;
pub use errors::StrataErrorCode;
pub use traits::{Cancellable, CancellationToken};
pub use types::{FileId, SymbolId};
