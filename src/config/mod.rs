pub mod types;

use crate::error::{BridgeError, Result};
use config::{Config, Environment, File};
use reqwest::Url;
use std::path::Path;
use std::time::Duration;
pub use types::*;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 2] = ["pretty", "json"];

/// Load configuration from the optional TOML file and the process environment
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    load_config_from(path, Environment::default().ignore_empty(true))
}

/// Same as [`load_config`] with an explicit environment source
pub fn load_config_from(path: Option<&Path>, env: Environment) -> Result<AppConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }

    let settings: RawSettings = builder
        .add_source(env)
        .build()
        .map_err(|e| BridgeError::Config(format!("Failed to load settings: {}", e)))?
        .try_deserialize()?;

    validate_settings(settings)
}

/// Validate raw settings and turn them into the immutable runtime configuration
pub fn validate_settings(settings: RawSettings) -> Result<AppConfig> {
    let api_key = match settings.api_key {
        Some(key) if !key.trim().is_empty() => key,
        _ => {
            return Err(BridgeError::Config(
                "API_KEY environment variable is required".to_string(),
            ));
        }
    };

    if !api_key.starts_with(API_KEY_PREFIX) {
        return Err(BridgeError::Config(format!(
            "API_KEY must start with \"{}\" (PolyNeural.ai format)",
            API_KEY_PREFIX
        )));
    }

    let url = Url::parse(&settings.api_url)
        .map_err(|e| BridgeError::Config(format!("Invalid API_URL '{}': {}", settings.api_url, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BridgeError::Config(format!(
            "API_URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if settings.timeout == 0 {
        return Err(BridgeError::Config(
            "TIMEOUT must be at least 1 second".to_string(),
        ));
    }

    let debug = debug_enabled(settings.debug.as_deref());
    let level = resolve_level(settings.log_level, debug);
    validate_logging(&level, &settings.log_format)?;

    let backend = BridgeConfig::new(
        settings.api_url,
        api_key,
        Duration::from_secs(settings.timeout),
    )
    .with_debug(debug);

    Ok(AppConfig {
        backend,
        logging: LoggingConfig {
            level,
            format: settings.log_format,
        },
    })
}

/// Pick the crate's log level. Debug mode never logs less than `debug`.
pub fn resolve_level(explicit: Option<String>, debug: bool) -> String {
    match explicit {
        Some(level) if debug && matches!(level.as_str(), "info" | "warn" | "error") => {
            "debug".to_string()
        }
        Some(level) => level,
        None if debug => "debug".to_string(),
        None => LoggingConfig::default().level,
    }
}

/// Validate log level and format, also used for CLI overrides
pub fn validate_logging(level: &str, format: &str) -> Result<()> {
    if !VALID_LEVELS.contains(&level) {
        return Err(BridgeError::Config(format!(
            "Invalid log level '{}'. Valid levels: {}",
            level,
            VALID_LEVELS.join(", ")
        )));
    }

    if !VALID_FORMATS.contains(&format) {
        return Err(BridgeError::Config(format!(
            "Invalid log format '{}'. Valid formats: {}",
            format,
            VALID_FORMATS.join(", ")
        )));
    }

    Ok(())
}
