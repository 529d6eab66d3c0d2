//! PostgreSQL pool backing the repositories.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use dashx_core::config::DatabaseConfig;
use dashx_core::error::{AppError, ErrorKind};

/// Name reported to the server in `pg_stat_activity`.
const APPLICATION_NAME: &str = "dashboardx";

/// Shared sqlx pool for the `Pg*` repositories.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let options = connect_options(config)?;
        info!(
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or_default(),
            user = options.get_username(),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = pool_options(config)?
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `SELECT 1` on a pooled connection.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Parse the URL once so the password never reaches a log line.
fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, AppError> {
    PgConnectOptions::from_str(&config.url)
        .map(|options| options.application_name(APPLICATION_NAME))
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "database.url is not a valid PostgreSQL URL",
                e,
            )
        })
}

fn pool_options(config: &DatabaseConfig) -> Result<PgPoolOptions, AppError> {
    if config.max_connections == 0 || config.min_connections > config.max_connections {
        return Err(AppError::configuration(format!(
            "database pool bounds are invalid: min {} max {}",
            config.min_connections, config.max_connections
        )));
    }

    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds)))
}
