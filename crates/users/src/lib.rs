//! # NexaUI Users Crate
//!
//! Profile store: a one-to-one extension record per account, created lazily
//! on first read and updated field by field.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nexa_users::{ProfileService, ProfileUpdate};
//!
//! let profiles = ProfileService::new(pool);
//! let profile = profiles.get_profile(user_id).await?;
//! ```

pub mod services;
pub mod types;
pub mod utils;

pub use nexa_database::{ProfileView, PublicProfileView};
pub use services::ProfileService;
pub use types::{ProfileError, ProfileResult, ProfileUpdate};
