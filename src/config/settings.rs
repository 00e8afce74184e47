//! Server settings read from the environment.

use std::env;

/// Default policy directory.
pub const DEFAULT_POLICY_DIR: &str = "./config/policies";

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Settings for the HTTP server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Directory holding the policy YAML documents (`POLICY_DIR`).
    pub policy_dir: String,
    /// Socket address to listen on (`BIND_ADDR`).
    pub bind_addr: String,
}

impl ServerSettings {
    /// Reads settings from the environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            policy_dir: env::var("POLICY_DIR").unwrap_or_else(|_| DEFAULT_POLICY_DIR.to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
