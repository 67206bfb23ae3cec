//! Version-control history: commit walking and per-file signals.

pub mod git_reader;
pub mod signals;

pub use git_reader::{current_head, read_history, CommitChanges, HistoryDelta};
pub use signals::{compute_signals, FileSignals};
