//! DashboardX Server: REST API and event stream for MQTT dashboards.
//!
//! Main entry point that wires all crates together and starts the server.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use dashx_api::{AppState, Repositories};
use dashx_cache::CacheManager;
use dashx_core::config::AppConfig;
use dashx_core::error::AppError;
use dashx_core::traits::CacheProvider;
use dashx_database::DatabasePool;
use dashx_service::MailService;

/// DashboardX server
#[derive(Parser, Debug)]
#[command(name = "dashx-server", version, about)]
struct Cli {
    /// Configuration environment (overrides DASHX_ENV)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the API (default)
    Serve,
    /// Insert demo users, brokers and devices
    Seed,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let env = cli
        .env
        .or_else(|| std::env::var("DASHX_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(%env, "Configuration loaded");

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run(config).await,
        Command::Seed => seed(config).await,
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Connect and health-check the database and the key-value store.
async fn connect(config: &AppConfig) -> Result<(DatabasePool, CacheManager), AppError> {
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;
    if !db.health_check().await? {
        return Err(AppError::database("Database health check failed"));
    }

    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = CacheManager::new(&config.cache).await?;
    if !cache.health_check().await? {
        return Err(AppError::cache("Cache health check failed"));
    }

    Ok((db, cache))
}

/// Check the backing stores, then serve until shutdown.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DashboardX v{}", env!("CARGO_PKG_VERSION"));
    let (db, cache) = connect(&config).await?;
    dashx_api::run_server(config, db, cache).await
}

/// Insert the demo data set into the configured database.
async fn seed(config: AppConfig) -> Result<(), AppError> {
    let (db, cache) = connect(&config).await?;
    let repos = Repositories::postgres(db.pool().clone());
    let mail = MailService::from_config(&config.mail)?;
    let state = AppState::new(config, repos, cache, mail)?;

    let report = dashx_service::seed_demo_data(
        &state.user_service,
        &state.broker_service,
        &state.device_service,
    )
    .await?;

    println!(
        "Seeded {} users, {} brokers, {} devices",
        report.users, report.brokers, report.devices
    );
    db.close().await;
    Ok(())
}
