use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://polyneural.ai";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const API_KEY_PREFIX: &str = "kg_";

/// Flat settings as read from defaults, the optional TOML file and the environment
#[derive(Debug, Clone, Deserialize)]
pub struct RawSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Raw `DEBUG` value, see [`debug_enabled`]
    #[serde(default)]
    pub debug: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Interpret a `DEBUG` value. Anything not recognised as true switches debug off.
pub fn debug_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )
    })
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BridgeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Immutable backend settings shared by every outbound call.
#[derive(Clone)]
pub struct BridgeConfig {
    pub api_url: String,
    pub api_key: String,
    pub debug: bool,
    pub timeout: Duration,
}

impl BridgeConfig {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            debug: false,
            timeout,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Timeout as advertised to the backend
    pub fn timeout_ms(&self) -> u128 {
        self.timeout.as_millis()
    }

    pub fn masked_api_key(&self) -> String {
        if self.api_key.starts_with(API_KEY_PREFIX) {
            format!("{}***", API_KEY_PREFIX)
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.masked_api_key())
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .finish()
    }
}
