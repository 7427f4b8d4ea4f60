pub mod applications;
pub mod connection;
pub mod jobs;
pub mod users;

pub use connection::Database;

use rusqlite::{ErrorCode, TransactionBehavior};

use crate::errors::ServerError;

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Opens a write transaction that takes the database lock up front, so two
/// lifecycle operations never interleave their reads and writes.
pub fn write_tx(conn: &mut rusqlite::Connection) -> Result<rusqlite::Transaction<'_>, ServerError> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))
}

pub fn commit(tx: rusqlite::Transaction<'_>) -> Result<(), ServerError> {
    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))
}

#[cfg(test)]
pub(crate) fn test_conn() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    connection::configure(&conn).unwrap();
    connection::apply_schema(&conn, include_str!("../../sql/schema.sql")).unwrap();
    conn
}
