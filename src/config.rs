//! Process configuration, loaded from the environment.
//!
//! Grounded in the `envy` + local-default pattern already present in the
//! pack (SpacetimeDB's `client-api`, zed's `zed-server`): a plain struct
//! deserialized from environment variables via `envy`, with `.env` support
//! for local development via `dotenvy`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_worker_pool_size() -> usize {
    16
}

fn default_subscriber_queue_capacity() -> usize {
    1024
}

fn default_keepalive_secs() -> u64 {
    20
}

fn default_resource_dir() -> PathBuf {
    PathBuf::from("./var/resources")
}

fn default_users_home_dir() -> PathBuf {
    PathBuf::from("./var/users")
}

/// `WEBCLI_`-prefixed environment configuration for the server process.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    #[serde(default = "default_subscriber_queue_capacity")]
    pub subscriber_queue_capacity: usize,

    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    #[serde(default = "default_resource_dir")]
    pub resource_dir: PathBuf,

    #[serde(default = "default_users_home_dir")]
    pub users_home_dir: PathBuf,

    /// PEM-encoded RSA private key used to sign bearer tokens.
    pub jwt_private_key_path: PathBuf,

    /// PEM-encoded RSA public key used to verify bearer tokens.
    pub jwt_public_key_path: PathBuf,
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        let config = envy::prefixed("WEBCLI_").from_env::<Config>()?;
        Ok(config)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}
