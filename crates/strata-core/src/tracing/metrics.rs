//! Structured span field definitions.
//!
//! These constants name the fields recorded on indexing spans and events
//! so log queries stay stable across subsystems.

/// Coordinator: current phase name.
pub const PHASE: &str = "phase";

/// Coordinator: run identifier.
pub const RUN_ID: &str = "run_id";

/// Scanner: files discovered.
pub const FILES_DISCOVERED: &str = "files_discovered";

/// Scanner: discovery phase duration in milliseconds.
pub const DISCOVERY_DURATION: &str = "discovery_duration";

/// Parser: files parsed in this run.
pub const FILES_PARSED: &str = "files_parsed";

/// Parser: parse cache hit rate (0.0 - 1.0).
pub const CACHE_HIT_RATE: &str = "cache_hit_rate";

/// Resolver: fraction of references resolved.
pub const RESOLUTION_RATE: &str = "resolution_rate";

/// Storage: staged write time in milliseconds.
pub const STAGE_WRITE_TIME: &str = "stage_write_time";

/// Analytics: total analytics time in milliseconds.
pub const ANALYTICS_TIME: &str = "analytics_time";

/// Analytics: node count of the analysed graph.
pub const GRAPH_NODES: &str = "graph_nodes";

/// History: commits walked in this refresh.
pub const COMMITS_WALKED: &str = "commits_walked";
