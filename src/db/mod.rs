// ============================================================================
// Database Layer
// ============================================================================
//
// PostgreSQL implementation of the customer repository port plus pool setup.
// The in-memory repository backs unit tests with the same contract.
//
// ============================================================================

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::InMemoryCustomerRepository;
pub use postgres::PgCustomerRepository;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};

use crate::config::PostgresConfig;

/// Open a connection pool from configuration.
pub async fn connect(config: &PostgresConfig) -> anyhow::Result<PgPool> {
    let ssl_mode: PgSslMode = config.ssl_mode.parse()?;

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.db_name)
        .ssl_mode(ssl_mode);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .max_lifetime(config.max_lifetime())
        .idle_timeout(config.idle_timeout())
        .connect_with(options)
        .await?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        db_name = %config.db_name,
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );

    Ok(pool)
}

/// Apply the migrations embedded from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
