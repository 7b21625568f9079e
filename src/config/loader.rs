//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::StorefrontConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file (or defaults when `path` is `None`),
/// apply process environment overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<StorefrontConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => StorefrontConfig::default(),
    };

    apply_env_overrides(&mut config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the deployment environment variables on top of the file config.
pub fn apply_env_overrides<I>(config: &mut StorefrontConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        match key.as_str() {
            "PORT" => {
                let port: u16 = parse_env("PORT", &value)?;
                let host = config
                    .listener
                    .bind_address
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string());
                config.listener.bind_address = format!("{host}:{port}");
            }
            "ADMIN_USER" => config.admin.username = value,
            "ADMIN_PASS" => config.admin.password = value,
            "ADMIN_IP_WHITELIST" => {
                config.admin.default_whitelist = value
                    .split(',')
                    .map(str::trim)
                    .filter(|ip| !ip.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "ADMIN_IP_BYPASS" => config.admin.default_ip_bypass = value.eq_ignore_ascii_case("true"),
            "ADMIN_MAX_FAILS" => config.admin.max_failures = parse_env("ADMIN_MAX_FAILS", &value)?,
            "ADMIN_WINDOW_MS" => config.admin.window_ms = parse_env("ADMIN_WINDOW_MS", &value)?,
            "ADMIN_LOCK_MS" => config.admin.lock_ms = parse_env("ADMIN_LOCK_MS", &value)?,
            "MEDIA_BASE_URL" => {
                config.media.base_url = value;
                config.media.enabled = true;
            }
            "MEDIA_API_KEY" => config.media.api_key = value,
            _ => {}
        }
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}
