use std::io::ErrorKind;

use axum::{
    extract::State,
    response::Html,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::http::server::AppState;
use crate::security::{SecuritySettings, SettingsUpdate};

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    pub version: &'static str,
    pub tracked_ips: usize,
    pub bypass_active: bool,
    pub media_enabled: bool,
}

pub async fn admin_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let path = &state.config.storage.admin_page;
    match tokio::fs::read_to_string(path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound("admin page not found".to_string()))
        }
        Err(e) => Err(AppError::Internal(format!("reading admin page: {e}"))),
    }
}

pub async fn get_security_config(State(state): State<AppState>) -> Json<SecuritySettings> {
    Json(SecuritySettings::clone(&state.gate.settings().current()))
}

pub async fn put_security_config(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let update = SettingsUpdate::from_json(&body)?;
    let settings = state.gate.settings().clone();

    let saved = tokio::task::spawn_blocking(move || settings.apply(update))
        .await?
        .map_err(|e| AppError::Internal(format!("saving security settings: {e}")))?;

    tracing::info!(
        whitelist = saved.ip_whitelist.len(),
        ip_bypass = saved.ip_bypass,
        "Security settings updated"
    );
    Ok(Json(json!({ "success": true, "config": &*saved })))
}

pub async fn get_status(State(state): State<AppState>) -> Json<AdminStatus> {
    Json(AdminStatus {
        version: env!("CARGO_PKG_VERSION"),
        tracked_ips: state.gate.attempts().len(),
        bypass_active: state.gate.settings().current().bypass_active(),
        media_enabled: state.media.is_some(),
    })
}
