//! Database repository implementations

pub mod notification_repository;
pub mod profile_repository;
pub mod user_repository;

pub use notification_repository::*;
pub use profile_repository::*;
pub use user_repository::*;
