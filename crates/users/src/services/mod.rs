//! Business logic services for the profile store.

pub mod profile_service;

pub use profile_service::ProfileService;
