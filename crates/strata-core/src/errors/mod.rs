//! Typed errors, one enum per subsystem. Each carries a stable code via
//! [`StrataErrorCode`] and converts into [`PipelineError`] at run level.

mod config_error;
pub mod error_code;
mod graph_error;
mod history_error;
mod lock_error;
mod parse_error;
mod pipeline_error;
mod scan_error;
mod storage_error;

pub use config_error::ConfigError;
pub use error_code::StrataErrorCode;
pub use graph_error::GraphError;
pub use history_error::HistoryError;
pub use lock_error::LockError;
pub use parse_error::ParseError;
pub use pipeline_error::PipelineError;
pub use scan_error::ScanError;
pub use storage_error::StorageError;
