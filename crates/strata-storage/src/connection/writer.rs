//! Write connection utilities: BEGIN IMMEDIATE transactions.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use strata_core::errors::StorageError;

use crate::queries::util::sqlite_err;

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
///
/// The write lock is taken at transaction start, so a second writer fails
/// up front instead of midway through. If `f` returns an error the
/// transaction is rolled back when the guard drops, and nothing `f` wrote
/// becomes visible to readers.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
{
    with_immediate_transaction_as(conn, f)
}

/// [`with_immediate_transaction`] for callers whose error type wraps
/// [`StorageError`].
pub fn with_immediate_transaction_as<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<StorageError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| E::from(sqlite_err(e)))?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| E::from(sqlite_err(e)))?;

    Ok(result)
}
