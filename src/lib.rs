//! Storefront backend library.
//!
//! Catalog documents, an admin access gate and a media-host proxy behind one
//! Axum router. `main.rs` and the integration tests both start the server
//! through [`HttpServer`].

pub mod admin;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod media;
pub mod observability;
pub mod persist;
pub mod security;

pub use config::schema::StorefrontConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
