use serde::{Deserialize, Serialize};

use crate::race::RaceConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub race: RaceConfig,
}

/// Upstream bus API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL all endpoints hang off (e.g., "https://bus-med.1337.ma/api")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Session token sent as a cookie. Usually supplied through `BUS_TOKEN`.
    #[serde(default)]
    pub token: String,
    /// Name of the cookie carrying the token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Overall request timeout in seconds (default: 8)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// TCP connect timeout in seconds (default: 5)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u32,
    /// Only connect over IPv4
    #[serde(default = "default_true")]
    pub force_ipv4: bool,
    /// Never negotiate HTTP/2
    #[serde(default = "default_true")]
    pub http1_only: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            cookie_name: default_cookie_name(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            force_ipv4: true,
            http1_only: true,
        }
    }
}

fn default_base_url() -> String {
    "https://bus-med.1337.ma/api".to_string()
}

fn default_cookie_name() -> String {
    "le_token".to_string()
}

fn default_timeout() -> u32 {
    8
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Sanitized config for logging (token redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub race: RaceConfig,
}

/// Sanitized API config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub cookie_name: String,
    pub token_configured: bool,
    pub timeout_secs: u32,
    pub connect_timeout_secs: u32,
    pub force_ipv4: bool,
    pub http1_only: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                cookie_name: config.api.cookie_name.clone(),
                token_configured: !config.api.token.is_empty(),
                timeout_secs: config.api.timeout_secs,
                connect_timeout_secs: config.api.connect_timeout_secs,
                force_ipv4: config.api.force_ipv4,
                http1_only: config.api.http1_only,
            },
            race: config.race.clone(),
        }
    }
}
