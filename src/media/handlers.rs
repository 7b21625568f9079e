use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::http::server::AppState;
use crate::media::{MediaClient, MediaError, MediaFile};

fn media(state: &AppState) -> Result<&MediaClient, AppError> {
    state.media.as_deref().ok_or(AppError::Media(MediaError::Disabled))
}

pub async fn list_media(State(state): State<AppState>) -> Result<Json<Vec<MediaFile>>, AppError> {
    Ok(Json(media(&state)?.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    name: Option<String>,
}

pub async fn upload_media(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MediaFile>, AppError> {
    let client = media(&state)?;
    let name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("name query parameter is required".to_string()))?;
    if body.is_empty() {
        return Err(AppError::BadRequest("empty upload".to_string()));
    }
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());

    Ok(Json(client.upload(name.trim(), content_type, body).await?))
}

pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    media(&state)?.delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn download_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let content = media(&state)?.download(&id).await?;
    let content_type = content
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    Ok(([(header::CONTENT_TYPE, content_type)], content.bytes).into_response())
}
