use anyhow::{Context, Result};
use extract::ModelConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "incident-relay";
const ENV_PREFIX: &str = "INCIDENT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Answer error envelopes with 200 instead of a gateway status.
    pub uniform_ok_status: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `incident-relay.toml` if present, then `INCIDENT__*` variables.
    pub fn load() -> Result<Self> {
        Self::load_with(env_source())
    }

    fn load_with(env: config::Environment) -> Result<Self> {
        Self::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
