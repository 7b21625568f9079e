//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PORT, ADMIN_*, MEDIA_*)
//!     → validation.rs (semantic checks)
//!     → StorefrontConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! The live IP bypass settings are not part of this file; they are owned by
//! `security::settings` and change at runtime through the admin API.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::StorefrontConfig;
pub use schema::{AdminConfig, ListenerConfig, MediaConfig, StorageConfig};
