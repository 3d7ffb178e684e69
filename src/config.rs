use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin used when building shareable watchlist links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Tick period of live watchlist views, in milliseconds
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_refresh_interval_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: default_db_max_connections(),
            host: default_host(),
            port: default_port(),
            public_base_url: default_public_base_url(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.refresh_interval_ms == 0 {
            anyhow::bail!("REFRESH_INTERVAL_MS must be greater than zero");
        }

        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
