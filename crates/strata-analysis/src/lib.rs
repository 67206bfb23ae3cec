//! # strata-analysis
//!
//! The index engine: file discovery and change detection, tree-sitter
//! extraction, reference resolution, graph analytics over the resolved
//! symbol graph, git history signals, health scoring, and the
//! incremental rebuild coordinator that ties them into one run.

pub mod extract;
pub mod graph;
pub mod health;
pub mod history;
pub mod pipeline;
pub mod resolve;
pub mod scanner;
pub mod stats;

pub use pipeline::{index_repository, IndexContext, Indexer, RunOptions, RunReport};
