//! # strata-storage
//!
//! SQLite graph store for Strata: a serialized writer plus a read-only
//! connection pool over one WAL-mode database file, additive migrations
//! tracked by `user_version`, the batched id-list query discipline, and
//! typed query modules per table.

pub mod batching;
pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
