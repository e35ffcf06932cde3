//! Storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    #[error("Query error: {0}")]
    Query(#[source] sqlx::Error),

    /// A unique constraint rejected the write (completion gate, duplicate
    /// username/email).
    #[error("Duplicate row")]
    Duplicate,
}

impl StorageError {
    /// Classify a query error, surfacing unique violations as `Duplicate`.
    pub fn from_query(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StorageError::Duplicate;
            }
        }
        StorageError::Query(err)
    }
}
