//! Configuration loading.
//!
//! Settings are layered with [`figment`]: compiled-in defaults, then an
//! optional `.env` file (loaded via `dotenvy` before figment ever reads the
//! environment), then `SERVICEATLAS_*` environment variables. This mirrors
//! the env-first configuration style used across the example service pack;
//! there is no required config file.

use anyhow::Result;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,

    pub host: String,
    pub port: u16,

    pub database_url: String,

    /// Seconds between active-probe / heartbeat-timeout sweep ticks.
    pub health_check_interval: u64,
    /// Per-probe HTTP timeout, seconds.
    pub health_check_timeout: u64,
    /// Consecutive probe failures before a service is marked unhealthy.
    pub unhealthy_threshold: u32,
    /// Seconds since last heartbeat before a service is marked unhealthy.
    pub heartbeat_timeout: u64,

    /// Prefix under which the JSON API is mounted.
    pub api_prefix: String,

    /// Whether the registry registers itself as a (non-gateway) service.
    pub self_register: bool,
    pub service_id: String,
    pub base_path: Option<String>,

    /// Path to the declarative bootstrap document (services/dependencies/routes).
    pub bootstrap_config_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "ServiceAtlas".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),

            host: "127.0.0.1".to_string(),
            port: 9000,

            database_url: "sqlite://./serviceatlas.db".to_string(),

            health_check_interval: 30,
            health_check_timeout: 5,
            unhealthy_threshold: 3,
            heartbeat_timeout: 60,

            api_prefix: "/api/v1".to_string(),

            self_register: true,
            service_id: "serviceatlas".to_string(),
            base_path: None,

            bootstrap_config_path: "services.yaml".to_string(),
        }
    }
}

impl Config {
    /// Load configuration: compiled-in defaults, overridden by `.env` (if
    /// present) and then `SERVICEATLAS_*` environment variables.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("loaded environment overrides from {}", path.display()),
            Err(dotenvy::Error::Io(_)) => {}
            Err(e) => tracing::warn!("failed to parse .env: {}", e),
        }

        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("SERVICEATLAS_"))
            .extract()?;

        Ok(config)
    }
}
