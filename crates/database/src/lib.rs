//! NexaUI Database Crate
//!
//! Connection management, migrations, entities and repositories shared by
//! the credential and profile services.

use sqlx::SqlitePool;
use nexa_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{NotificationRepository, ProfileRepository, UserRepository};

pub use entities::{
    notification::{NewNotification, Notification, NotificationPriority, NotificationType},
    profile::{ProfileChanges, ProfileView, PublicProfileView},
    user::{NewUser, User, UserRecord, UserRole},
};

pub use types::{
    errors::DatabaseError,
    validation::{FieldError, ValidationErrors},
    DatabaseResult,
};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
