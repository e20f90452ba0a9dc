//! Shared types and result types for the database layer

pub mod errors;
pub mod validation;

pub use errors::DatabaseError;
pub use validation::{FieldError, ValidationErrors};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
