//! # Configuration Management
//!
//! This module loads the operator service's configuration from multiple sources:
//! - TOML configuration files (config.toml)
//! - Environment variables (with APP__ prefix)
//! - Default values (built into the code)
//!
//! It also parses the serialized client-configuration blob (`botoConfig`) that
//! tunes the outbound HTTP client used for the object store and the dataplane.
//!
//! ## Configuration Priority (highest to lowest):
//! 1. `HOST` / `PORT` (deployment platforms)
//! 2. Environment variables (`APP__SERVER__PORT`, `APP__DATAPLANE__ENDPOINT`, etc.)
//! 3. Configuration file (config.toml)
//! 4. Default values (defined in the Default impl)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable holding the serialized client configuration.
pub const CLIENT_CONFIG_ENV: &str = "botoConfig";

/// Main application configuration.
///
/// ## Sections:
/// - `server`: where the HTTP interface listens
/// - `object_store`: where transcript documents are read from
/// - `dataplane`: where results are persisted
/// - `operator`: naming of the operator and its diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub object_store: ObjectStoreConfig,
    pub dataplane: DataplaneConfig,
    pub operator: OperatorConfig,
}

/// Server-specific configuration settings.
///
/// ## Common values:
/// - `host = "127.0.0.1"`: Only accept connections from localhost (development)
/// - `host = "0.0.0.0"`: Accept connections from any IP address (production)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which object store implementation to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStoreBackend {
    /// Path-style HTTP GET against `endpoint`
    Http,
    /// Files under `root/{bucket}/{key}`
    Filesystem,
}

/// Object store settings. Only the field matching `backend` is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub backend: ObjectStoreBackend,
    pub endpoint: String,
    pub root: String,
}

/// Metadata store (dataplane API) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataplaneConfig {
    /// Base URL; metadata is posted to `{endpoint}/metadata/{asset_id}`
    pub endpoint: String,
}

/// Operator behaviour settings.
///
/// ## Fields:
/// - `default_name`: operator name used when the event has no `Name`
/// - `error_metadata_key`: `MetaData` key holding failure descriptions.
///   Defaults to `TranslateError`, the key existing workflow consumers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub default_name: String,
    pub error_metadata_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            object_store: ObjectStoreConfig {
                backend: ObjectStoreBackend::Filesystem,
                endpoint: "http://127.0.0.1:9000".to_string(),
                root: "./data".to_string(),
            },
            dataplane: DataplaneConfig {
                endpoint: "http://127.0.0.1:8081".to_string(),
            },
            operator: OperatorConfig {
                default_name: "WordFrequency".to_string(),
                error_metadata_key: "TranslateError".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources in priority order.
    ///
    /// ## Configuration Loading Process:
    /// 1. Start with built-in defaults
    /// 2. Override with values from config.toml (if it exists)
    /// 3. Override with environment variables prefixed with APP__
    /// 4. Handle special cases for HOST and PORT environment variables
    ///
    /// ## Environment Variable Examples:
    /// - `APP__SERVER__PORT=3000`: Override server port
    /// - `APP__OBJECT_STORE__BACKEND=http`: Read transcripts over HTTP
    /// - `APP__DATAPLANE__ENDPOINT=https://dataplane.internal`: Dataplane base URL
    /// - `PORT=3000`: Special case for deployment platforms
    pub fn load() -> Result<Self> {
        let mut settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&AppConfig::default())?)
            .add_source(::config::File::with_name("config").required(false))
            // Double underscores keep field names like `object_store` intact
            .add_source(
                ::config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            );

        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// ## What this checks:
    /// - Server port is not 0
    /// - The selected object store backend has its location configured
    /// - The dataplane endpoint is set
    /// - The error metadata key is not empty
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        match self.object_store.backend {
            ObjectStoreBackend::Http if self.object_store.endpoint.trim().is_empty() => {
                return Err(anyhow::anyhow!("Object store endpoint is required for the http backend"));
            }
            ObjectStoreBackend::Filesystem if self.object_store.root.trim().is_empty() => {
                return Err(anyhow::anyhow!("Object store root is required for the filesystem backend"));
            }
            _ => {}
        }

        if self.dataplane.endpoint.trim().is_empty() {
            return Err(anyhow::anyhow!("Dataplane endpoint cannot be empty"));
        }

        if self.operator.error_metadata_key.trim().is_empty() {
            return Err(anyhow::anyhow!("Operator error metadata key cannot be empty"));
        }

        Ok(())
    }
}

/// Outbound HTTP client settings, shipped as one serialized JSON blob.
///
/// ## Example (`botoConfig`):
/// ```json
/// {"user_agent_extra": "AwsSolution/SO0163/v1", "connect_timeout": 5, "read_timeout": 30}
/// ```
///
/// Unknown keys (such as retry settings) are accepted and ignored; the
/// operator never retries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub user_agent_extra: Option<String>,

    /// Seconds allowed to establish a connection
    #[serde(default)]
    pub connect_timeout: Option<f64>,

    /// Seconds allowed between reads of a response
    #[serde(default)]
    pub read_timeout: Option<f64>,
}

impl ClientConfig {
    /// Read the blob from [`CLIENT_CONFIG_ENV`]; absent means defaults.
    pub fn from_env() -> Result<Self> {
        match env::var(CLIENT_CONFIG_ENV) {
            Ok(blob) => Self::from_json(&blob),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_json(blob: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(blob)
            .with_context(|| format!("{} is not a valid client configuration", CLIENT_CONFIG_ENV))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("connect_timeout", self.connect_timeout),
            ("read_timeout", self.read_timeout),
        ] {
            if let Some(seconds) = value {
                if !seconds.is_finite() || seconds <= 0.0 {
                    return Err(anyhow::anyhow!("{} must be a positive number of seconds", name));
                }
            }
        }
        Ok(())
    }

    /// User agent sent on every outbound request.
    pub fn user_agent(&self) -> String {
        let base = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        match &self.user_agent_extra {
            Some(extra) if !extra.is_empty() => format!("{} {}", base, extra),
            _ => base,
        }
    }

    pub fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent());

        if let Some(seconds) = self.connect_timeout {
            builder = builder.connect_timeout(Duration::from_secs_f64(seconds));
        }
        if let Some(seconds) = self.read_timeout {
            builder = builder.read_timeout(Duration::from_secs_f64(seconds));
        }

        builder.build().context("failed to build HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that the default configuration is valid and has expected values.
    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.object_store.backend, ObjectStoreBackend::Filesystem);
        assert_eq!(config.operator.error_metadata_key, "TranslateError");
        assert!(config.validate().is_ok());
    }

    /// Test that validation catches invalid configurations.
    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.object_store.backend = ObjectStoreBackend::Http;
        config.object_store.endpoint = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.dataplane.endpoint = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.operator.error_metadata_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_names() {
        let backend: ObjectStoreBackend = serde_json::from_str(r#""http""#).unwrap();
        assert_eq!(backend, ObjectStoreBackend::Http);
        assert!(serde_json::from_str::<ObjectStoreBackend>(r#""s4""#).is_err());
    }

    #[test]
    fn test_client_config_blob() {
        let config = ClientConfig::from_json(
            r#"{"user_agent_extra": "Solution/v1", "connect_timeout": 2.5, "retries": {"max_attempts": 3}}"#,
        )
        .unwrap();
        assert_eq!(config.user_agent_extra.as_deref(), Some("Solution/v1"));
        assert_eq!(config.connect_timeout, Some(2.5));
        assert_eq!(config.read_timeout, None);
        assert!(config.user_agent().ends_with(" Solution/v1"));
        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_client_config_rejects_bad_input() {
        assert!(ClientConfig::from_json("not json").is_err());
        assert!(ClientConfig::from_json(r#"{"read_timeout": -1}"#).is_err());
    }

    #[test]
    fn test_default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(
            config.user_agent(),
            format!("word-frequency-operator/{}", env!("CARGO_PKG_VERSION"))
        );
    }
}
