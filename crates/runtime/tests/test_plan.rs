use std::path::Path;

use anyhow::{Context, Result};
use nexa_auth::Registration;
use nexa_backend_runtime::BackendServices;
use nexa_config::{AppConfig, PasswordHashConfig};
use tempfile::TempDir;

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, max_connections: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = max_connections;
    config.auth.jwt_secret = Some("runtime-test-secret".into());
    config.auth.password = PasswordHashConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/init.db");
    let config = build_config(sqlite_url(&db_path), 4);

    let services = initialise(&config).await?;
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'user_profiles', 'notifications') ORDER BY name",
    )
    .fetch_all(&services.db_pool)
    .await?;

    assert_eq!(tables, vec!["notifications", "user_profiles", "users"]);

    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_fails_without_signing_secret() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/nosecret.db");
    let mut config = build_config(sqlite_url(&db_path), 1);
    config.auth.jwt_secret = None;

    let error = match BackendServices::initialise(&config).await {
        Ok(_) => panic!("expected initialisation to fail without a signing secret"),
        Err(error) => error,
    };
    let message = format!("{error:?}");
    assert!(
        message.contains("failed to initialise credential service"),
        "expected credential service context, got {message}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn services_share_one_pool() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/shared.db");
    let config = build_config(sqlite_url(&db_path), 2);

    let services = initialise(&config).await?;
    let session = services
        .authenticator
        .register(&Registration {
            full_name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            password: "secret1".into(),
        })
        .await?;

    let profile = services.profiles.get_profile(session.user.id).await?;
    assert_eq!(profile.email, "jane@x.com");

    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn prepare_database_creates_sqlite_directory_if_missing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_dir = temp_dir.path().join("nested");
    let db_path = db_dir.join("prepared.db");
    let config = build_config(sqlite_url(&db_path), 2);

    assert!(!db_dir.exists());

    let services = initialise(&config).await?;
    assert!(db_dir.exists(), "database directory should be created");
    assert!(db_path.exists(), "sqlite database file should be created");
    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn prepare_database_enables_sqlite_foreign_keys() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/foreign_keys.db");
    let config = build_config(sqlite_url(&db_path), 2);

    let services = initialise(&config).await?;

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&services.db_pool)
        .await?;
    assert_eq!(1, enabled, "foreign key enforcement must be enabled");

    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn prepare_database_applies_max_connections_setting() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/max_conn.db");
    let max_connections = 3;
    let config = build_config(sqlite_url(&db_path), max_connections);

    let services = initialise(&config).await?;
    assert_eq!(
        max_connections,
        services.db_pool.options().get_max_connections()
    );

    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_closes_the_pool() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/shutdown.db");
    let config = build_config(sqlite_url(&db_path), 1);

    let services = initialise(&config).await?;
    let pool = services.db_pool.clone();
    services.shutdown().await;

    assert!(pool.is_closed());
    Ok(())
}
