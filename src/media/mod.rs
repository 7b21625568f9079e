//! Media proxy.
//!
//! # Data Flow
//! ```text
//! POST /api/media?name=  → client.rs upload → { id, name, ... }
//! GET  /api/media        → client.rs list
//! DELETE /api/media/{id} → client.rs delete
//! GET  /media/{id}       → client.rs download → bytes with upstream content type
//! ```
//!
//! Returns 503 while `media.enabled` is off.

pub mod client;
pub mod handlers;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::http::server::AppState;

pub use client::{MediaClient, MediaContent, MediaError, MediaFile};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/media", get(handlers::list_media).post(handlers::upload_media))
        .route("/api/media/{id}", delete(handlers::delete_media))
        .route("/media/{id}", get(handlers::download_media))
}
