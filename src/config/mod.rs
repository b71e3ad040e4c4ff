//! Service configuration.
//!
//! Values come from environment variables (optionally via a `.env` file) with
//! the `CUSTOMER_LOYALTY` prefix and `__` between nested keys:
//!
//! - `CUSTOMER_LOYALTY__SERVER__HTTP_PORT=8084` -> `server.http_port`
//! - `CUSTOMER_LOYALTY__POSTGRES__HOST=db` -> `postgres.host`
//! - `CUSTOMER_LOYALTY__KAFKA__BROKERS=a:9092,b:9092` -> `kafka.brokers`
//!
//! Every setting has a default suitable for local development.

mod error;

pub use error::{ConfigError, ValidationError};

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use sqlx::postgres::PgSslMode;
use std::time::Duration;

const ENV_PREFIX: &str = "CUSTOMER_LOYALTY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logger: LoggerConfig,
    pub postgres: PostgresConfig,
    pub kafka: KafkaConfig,
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// Load `.env` if present, read the environment, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.logger.validate()?;
        self.postgres.validate()?;
        self.kafka.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub app_env: String,
    pub http_port: u16,
}

impl ServerConfig {
    pub fn is_development(&self) -> bool {
        matches!(self.app_env.as_str(), "dev" | "development" | "local")
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.http_port == 0 {
            return Err(ValidationError::InvalidPort("server.http_port"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_env: "dev".to_string(),
            http_port: 8084,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,customer_loyalty=debug`.
    pub level: String,
    /// `json` or `console`.
    pub encoding: String,
}

impl LoggerConfig {
    pub fn is_json(&self) -> bool {
        self.encoding.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self.encoding.to_ascii_lowercase().as_str() {
            "json" | "console" => Ok(()),
            _ => Err(ValidationError::InvalidLogEncoding(self.encoding.clone())),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            encoding: "console".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub db_name: String,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub idle_timeout_secs: u64,
    /// Apply embedded migrations on startup.
    pub run_migrations: bool,
}

impl PostgresConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingRequired("postgres.host"));
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort("postgres.port"));
        }
        if self.db_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("postgres.db_name"));
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.ssl_mode.parse::<PgSslMode>().is_err() {
            return Err(ValidationError::InvalidSslMode(self.ssl_mode.clone()));
        }
        Ok(())
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5433,
            user: "omnipos".to_string(),
            password: "omnipos".to_string(),
            db_name: "omnipos_customer_db".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 10,
            min_connections: 5,
            acquire_timeout_secs: 5,
            max_lifetime_secs: 300,
            idle_timeout_secs: 60,
            run_migrations: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Comma-separated `host:port` list.
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

impl KafkaConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.brokers.split(',').all(|b| b.trim().is_empty()) {
            return Err(ValidationError::MissingRequired("kafka.brokers"));
        }
        if self.topic.trim().is_empty() {
            return Err(ValidationError::MissingRequired("kafka.topic"));
        }
        if self.group_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("kafka.group_id"));
        }
        Ok(())
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:29092".to_string(),
            topic: "orders.events".to_string(),
            group_id: "customer-service".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub port: u16,
}

impl MetricsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort("metrics.port"));
        }
        Ok(())
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { port: 9090 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ConfigBuilder<DefaultState> {
        config::Config::builder()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_builder(builder()).unwrap();

        assert_eq!(config.server.app_env, "dev");
        assert_eq!(config.server.http_port, 8084);
        assert!(config.server.is_development());
        assert_eq!(config.logger.level, "info");
        assert!(!config.logger.is_json());
        assert_eq!(config.postgres.host, "localhost");
        assert_eq!(config.postgres.port, 5433);
        assert_eq!(config.postgres.db_name, "omnipos_customer_db");
        assert_eq!(config.postgres.acquire_timeout(), Duration::from_secs(5));
        assert!(!config.postgres.run_migrations);
        assert_eq!(config.kafka.brokers, "localhost:29092");
        assert_eq!(config.kafka.topic, "orders.events");
        assert_eq!(config.kafka.group_id, "customer-service");
        assert_eq!(config.metrics.port, 9090);
    }

    #[test]
    fn test_overrides() {
        let b = builder()
            .set_override("server.app_env", "production")
            .unwrap()
            .set_override("server.http_port", 9000)
            .unwrap()
            .set_override("logger.encoding", "json")
            .unwrap()
            .set_override("postgres.host", "db.internal")
            .unwrap()
            .set_override("postgres.max_connections", 20)
            .unwrap()
            .set_override("postgres.run_migrations", true)
            .unwrap()
            .set_override("kafka.brokers", "k1:9092,k2:9092")
            .unwrap();

        let config = AppConfig::from_builder(b).unwrap();

        assert!(!config.server.is_development());
        assert_eq!(config.server.http_port, 9000);
        assert!(config.logger.is_json());
        assert_eq!(config.postgres.host, "db.internal");
        assert_eq!(config.postgres.max_connections, 20);
        assert_eq!(config.postgres.min_connections, 5);
        assert!(config.postgres.run_migrations);
        assert_eq!(config.kafka.brokers, "k1:9092,k2:9092");
    }

    #[test]
    fn test_rejects_zero_port() {
        let b = builder().set_override("metrics.port", 0).unwrap();
        let err = AppConfig::from_builder(b).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationFailed(ValidationError::InvalidPort("metrics.port"))
        ));
    }

    #[test]
    fn test_rejects_inverted_pool_bounds() {
        let mut config = AppConfig::default();
        config.postgres.min_connections = 20;
        config.postgres.max_connections = 10;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPoolSize));
    }

    #[test]
    fn test_rejects_empty_kafka_settings() {
        let mut config = AppConfig::default();
        config.kafka.brokers = " , ".to_string();
        assert_eq!(config.validate(), Err(ValidationError::MissingRequired("kafka.brokers")));

        let mut config = AppConfig::default();
        config.kafka.topic = String::new();
        assert_eq!(config.validate(), Err(ValidationError::MissingRequired("kafka.topic")));

        let mut config = AppConfig::default();
        config.kafka.group_id = "  ".to_string();
        assert_eq!(config.validate(), Err(ValidationError::MissingRequired("kafka.group_id")));
    }

    #[test]
    fn test_rejects_unknown_encoding_and_ssl_mode() {
        let mut config = AppConfig::default();
        config.logger.encoding = "xml".to_string();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidLogEncoding("xml".to_string()))
        );

        let mut config = AppConfig::default();
        config.postgres.ssl_mode = "sometimes".to_string();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidSslMode("sometimes".to_string()))
        );
    }
}
