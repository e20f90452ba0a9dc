//! Shared types for the profile store.

pub mod errors;
pub mod requests;

pub use errors::ProfileError;
pub use requests::ProfileUpdate;

pub type ProfileResult<T> = Result<T, ProfileError>;
