//! Shared helpers for query modules.

use rusqlite::ErrorCode;
use strata_core::errors::StorageError;

/// Map a rusqlite error onto the storage taxonomy.
///
/// Busy, full and corrupt databases get their own variants so the
/// coordinator can report storage exhaustion distinctly from query bugs.
pub fn sqlite_err(e: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = e {
        match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => return StorageError::DbBusy,
            ErrorCode::DiskFull => return StorageError::DiskFull,
            ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase => {
                return StorageError::DbCorrupt {
                    details: e.to_string(),
                }
            }
            _ => {}
        }
    }
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// `Option` adapter for single-row queries.
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StorageError>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StorageError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(sqlite_err(e)),
        }
    }
}

/// Collect mapped rows, converting the first row error.
pub fn collect_rows<T, I>(rows: I) -> Result<Vec<T>, StorageError>
where
    I: Iterator<Item = Result<T, rusqlite::Error>>,
{
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Current wall-clock time in unix seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
