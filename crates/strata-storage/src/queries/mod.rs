//! Query modules for each domain table.

pub mod util;
pub mod files;
pub mod symbols;
pub mod edges;
pub mod file_edges;
pub mod refs;
pub mod metrics;
pub mod history;
pub mod snapshots;
pub mod runs;
