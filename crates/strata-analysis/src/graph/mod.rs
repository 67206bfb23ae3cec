//! Symbol graph arena and analytics.

pub mod analytics;
pub mod arena;
pub mod centrality;
pub mod communities;
pub mod cycles;
pub mod layers;
pub mod pagerank;
pub mod paths;
pub mod propagation;
pub mod propagation_cost;
pub mod size_guard;
pub mod spectral;

pub use analytics::{analyze, AnalyticsOutput, AnalyticsSummary, FileGraphFlags};
pub use arena::{Adjacency, EdgeData, SymbolGraph, SymbolNode};
pub use size_guard::{Precision, SizeGuard, SizeGuardNotice};
