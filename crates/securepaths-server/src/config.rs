//! Server configuration from environment.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub server_port: u16,
    /// Shared secret expected as `Authorization: Bearer <key>` on `/api`
    pub api_key: String,
    pub maps_base_url: String,
    pub maps_api_key: String,
    pub geocoding_api_key: String,
    pub cors_origin: String,
    pub upstream_timeout_s: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let maps_api_key = env::var("OLA_MAPS_API_KEY").unwrap_or_default();
        Self {
            host: env::var("SECUREPATHS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SECUREPATHS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            api_key: env::var("SECUREPATHS_API_KEY").unwrap_or_default(),
            maps_base_url: env::var("OLA_MAPS_BASE_URL")
                .unwrap_or_else(|_| securepaths_maps::client::DEFAULT_BASE_URL.to_string()),
            geocoding_api_key: env::var("OLA_GEOCODING_API_KEY")
                .unwrap_or_else(|_| maps_api_key.clone()),
            maps_api_key,
            cors_origin: env::var("SECUREPATHS_CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5001".to_string()),
            upstream_timeout_s: env::var("SECUREPATHS_UPSTREAM_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_s)
    }
}
