//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the storefront.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Placeholder shipped in the default admin password.
pub const PLACEHOLDER_PASSWORD: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root configuration for the storefront backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where documents and static assets live.
    pub storage: StorageConfig,

    /// Admin credentials and brute-force policy.
    pub admin: AdminConfig,

    /// Remote media host.
    pub media: MediaConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON documents.
    pub data_dir: PathBuf,

    /// Directory served as static site (HTML, CSS, JS, images).
    pub static_dir: PathBuf,

    /// Admin page, served only behind the admin gate. Keep it outside `static_dir`.
    pub admin_page: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            static_dir: PathBuf::from("public"),
            admin_page: PathBuf::from("admin/admin.html"),
        }
    }
}

/// Admin access configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Basic auth username.
    pub username: String,

    /// Basic auth password.
    pub password: String,

    /// Failures within the window before the IP is locked.
    pub max_failures: u32,

    /// Length of the failure window in milliseconds.
    pub window_ms: u64,

    /// Lock duration in milliseconds.
    pub lock_ms: u64,

    /// Take the client IP from the first `X-Forwarded-For` entry.
    pub trust_forwarded_for: bool,

    /// Security settings file, relative to the data directory.
    pub security_config_file: PathBuf,

    /// Whitelist written when the security settings file does not exist yet.
    pub default_whitelist: Vec<String>,

    /// Bypass flag written when the security settings file does not exist yet.
    pub default_ip_bypass: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            password: PLACEHOLDER_PASSWORD.to_string(),
            max_failures: 8,
            window_ms: 15 * 60 * 1000,
            lock_ms: 30 * 60 * 1000,
            trust_forwarded_for: true,
            security_config_file: PathBuf::from("admin-config.json"),
            default_whitelist: Vec::new(),
            default_ip_bypass: true,
        }
    }
}

impl AdminConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn lock_duration(&self) -> Duration {
        Duration::from_millis(self.lock_ms)
    }
}

/// Remote file-hosting service used for media.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Enable the media proxy endpoints.
    pub enabled: bool,

    /// API root of the hosting service (e.g., "https://files.example.com/v1/").
    pub base_url: String,

    /// Bearer token sent with every call.
    pub api_key: String,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://localhost/".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 25 * 1024 * 1024, // 25MB, media uploads go through here
        }
    }
}
