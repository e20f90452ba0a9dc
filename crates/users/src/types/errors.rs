//! Error types for the profile store.

use nexa_database::{DatabaseError, ValidationErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("profile not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ProfileError {
    fn from(error: sqlx::Error) -> Self {
        ProfileError::Database(DatabaseError::Query(error))
    }
}
