//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds and durations > 0)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: StorefrontConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::StorefrontConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    BadAddress { field: &'static str, value: String },

    #[error("{field} is not a valid URL: {value}")]
    BadUrl { field: &'static str, value: String },
}

pub fn validate_config(config: &StorefrontConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let admin = &config.admin;
    if admin.username.is_empty() {
        errors.push(ValidationError::Empty { field: "admin.username" });
    }
    if admin.password.is_empty() {
        errors.push(ValidationError::Empty { field: "admin.password" });
    }
    if admin.max_failures == 0 {
        errors.push(ValidationError::Zero { field: "admin.max_failures" });
    }
    if admin.window_ms == 0 {
        errors.push(ValidationError::Zero { field: "admin.window_ms" });
    }
    if admin.lock_ms == 0 {
        errors.push(ValidationError::Zero { field: "admin.lock_ms" });
    }

    if config.media.enabled {
        if url::Url::parse(&config.media.base_url).is_err() {
            errors.push(ValidationError::BadUrl {
                field: "media.base_url",
                value: config.media.base_url.clone(),
            });
        }
        if config.media.api_key.is_empty() {
            errors.push(ValidationError::Empty { field: "media.api_key" });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&StorefrontConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = StorefrontConfig::default();
        config.admin.password.clear();
        config.admin.max_failures = 0;
        config.listener.bind_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Empty { field: "admin.password" }));
        assert!(errors.contains(&ValidationError::Zero { field: "admin.max_failures" }));
    }

    #[test]
    fn media_url_checked_only_when_enabled() {
        let mut config = StorefrontConfig::default();
        config.media.base_url = "not a url".into();
        assert!(validate_config(&config).is_ok());

        config.media.enabled = true;
        config.media.api_key = "k".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::BadUrl { .. }));
    }
}
