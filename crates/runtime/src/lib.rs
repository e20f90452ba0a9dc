use anyhow::{Context, Result};
use nexa_auth::Authenticator;
use nexa_config::AppConfig;
use nexa_database::initialize_database;
use nexa_users::ProfileService;
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub profiles: ProfileService,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone())
            .context("failed to initialise credential service")?;
        let profiles = ProfileService::new(db_pool.clone());

        info!(
            token_ttl_seconds = authenticator.jwt().token_duration().num_seconds(),
            "backend services ready"
        );

        Ok(Self {
            db_pool,
            authenticator,
            profiles,
        })
    }

    /// Close the pool once the server has drained.
    pub async fn shutdown(self) {
        self.db_pool.close().await;
        info!("database pool closed");
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
