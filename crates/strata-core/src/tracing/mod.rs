//! Log setup and the structured field names indexing events share.

pub mod metrics;
pub mod setup;

pub use setup::init_tracing;
