//! Admin surface.
//!
//! - `GET /admin.html` behind the full gate (bypass list, Basic, lockout)
//! - `/api/admin/*` behind the strict gate (Basic only)
//!
//! The write gate for the rest of `/api/` is layered in `http::server`.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use crate::http::server::AppState;

use self::auth::{admin_page_gate, security_config_gate};
use self::handlers::*;

pub fn routes(state: AppState) -> Router<AppState> {
    let page = Router::new()
        .route("/admin.html", get(admin_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_page_gate));

    let api = Router::new()
        .route(
            "/api/admin/security-config",
            get(get_security_config).put(put_security_config),
        )
        .route("/api/admin/status", get(get_status))
        .route_layer(middleware::from_fn_with_state(state, security_config_gate));

    page.merge(api)
}
