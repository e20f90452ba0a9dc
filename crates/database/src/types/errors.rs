//! Error types for the database layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Database query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Stored document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DatabaseError {
    /// Map a UNIQUE constraint violation onto [`DatabaseError::Duplicate`].
    pub(crate) fn from_insert(error: sqlx::Error, entity: &str) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Duplicate(entity.to_string())
            }
            _ => DatabaseError::Query(error),
        }
    }
}
