//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_admin_home() -> String {
    "/admin".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    pub secret: String,
    /// Origin of the Eventify REST backend, including the `/api` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Where admins land after signing in.
    #[serde(default = "default_admin_home")]
    pub admin_home: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
