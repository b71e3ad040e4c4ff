use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggerConfig;

// ============================================================================
// Logging Setup
// ============================================================================
//
// `RUST_LOG` wins over `logger.level` when set.
// Example: RUST_LOG=debug,rdkafka=info cargo run
//
// ============================================================================

pub fn init(config: &LoggerConfig, development: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.is_json() {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(development)
                    .with_thread_ids(development),
            )
            .try_init()?;
    }

    Ok(())
}
