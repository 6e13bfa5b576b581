//! # Settings
//!
//! Layered configuration: struct defaults, then `config/default.toml`, then the
//! file named by `CATALOG_CONFIG`, then `CATALOG__*` environment variables.
//! A `.env` file is read first so it can feed the environment layer.

use std::net::SocketAddr;

use config::{Config, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "CATALOG";
pub const CONFIG_PATH_VAR: &str = "CATALOG_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    pub ratings: RatingSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl DatabaseSettings {
    pub fn url(&self) -> Option<&str> {
        self.url.as_ref().map(|url| url.expose_secret())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// The star values a visitor may submit.
    pub star_values: Vec<i16>,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            star_values: (1..=10).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
        }
    }
}

impl Settings {
    /// Loads settings from every layer and validates them.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder =
            Config::builder().add_source(File::with_name("config/default").required(false));
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            builder = builder.add_source(File::with_name(&path));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("ratings.star_values"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parses a TOML document on top of the defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ratings.star_values.is_empty() {
            return Err(ConfigError::Invalid("ratings.star_values must not be empty".into()));
        }
        if let Some(bad) = self.ratings.star_values.iter().find(|v| **v <= 0) {
            return Err(ConfigError::Invalid(format!(
                "ratings.star_values must be positive, got {bad}"
            )));
        }
        if self.storage.backend == StorageBackend::Postgres
            && self.database.url().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Invalid(
                "database.url is required for the postgres backend".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server address: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.ratings.star_values, (1..=10).collect::<Vec<i16>>());
        assert_eq!(settings.bind_addr().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn toml_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            [server]
            port = 9000

            [storage]
            backend = "postgres"

            [database]
            url = "postgres://catalog@localhost/catalog"

            [ratings]
            star_values = [1, 2, 3, 4, 5]
            "#,
        )
        .unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
        assert_eq!(settings.database.url(), Some("postgres://catalog@localhost/catalog"));
        assert_eq!(settings.ratings.star_values, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn postgres_backend_requires_a_url() {
        let err = Settings::from_toml("[storage]\nbackend = \"postgres\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn star_values_must_be_positive() {
        let err = Settings::from_toml("[ratings]\nstar_values = [0, 1]").unwrap_err();
        assert!(err.to_string().contains("positive"));

        let err = Settings::from_toml("[ratings]\nstar_values = []").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn database_url_is_redacted_in_debug_output() {
        let settings =
            Settings::from_toml("[database]\nurl = \"postgres://user:hunter2@db/catalog\"")
                .unwrap();
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
