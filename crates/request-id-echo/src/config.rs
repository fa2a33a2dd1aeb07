//! Configuration types and loading logic.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use request_id_tracing::TracingConfig;
use serde::Deserialize;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EchoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

fn default_listen_address() -> String {
    "0.0.0.0:3080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl EchoConfig {
    /// Load configuration from a TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (REQUEST_ID_ prefix, __ for nesting)
    /// 2. TOML config file (missing file is fine)
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("REQUEST_ID_").split("__"))
            .extract()?;
        Ok(config)
    }
}
