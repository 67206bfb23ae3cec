//! Incremental rebuild coordinator: run lock, phases, staging and the
//! end-of-run report.

pub mod context;
pub mod indexer;
pub mod lock;
pub mod phase;
pub mod report;

pub use context::IndexContext;
pub use indexer::{index_repository, Indexer, RunOptions};
pub use lock::{LockRecord, RunLock};
pub use phase::{Phase, PhaseTracker};
pub use report::{FileCounts, HistoryReport, ParseFailures, RunReport, RunStatus};
