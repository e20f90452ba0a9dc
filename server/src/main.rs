use anyhow::Context;
use clap::{Parser, Subcommand};
use nexa_backend_api::{build_router, AppState};
use nexa_backend_runtime::{telemetry, BackendServices};
use nexa_config::load as load_config;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "nexa-backend")]
#[command(about = "NexaUI account and profile backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Migrate => run_migrations().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting NexaUI backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = AppState::new(services.authenticator.clone(), services.profiles.clone());
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(nexa_backend_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    services.shutdown().await;
    info!("backend shut down");
    Ok(())
}

async fn run_migrations() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    let pool = nexa_database::initialize_database(&config.database)
        .await
        .context("failed to apply migrations")?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = TRUE")
        .fetch_one(&pool)
        .await
        .context("failed to read migration history")?;

    info!(url = %config.database.url, applied, "database schema is up to date");
    pool.close().await;
    Ok(())
}
