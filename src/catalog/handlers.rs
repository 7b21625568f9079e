use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::document::{id_of, DocumentStore};
use crate::catalog::entries::{prepare_computer, stamp_archived, stamp_pending_review};
use crate::catalog::explorer::{list_directory, DirEntry};
use crate::catalog::media_audit::{audit_media, MediaReport};
use crate::catalog::ordering::{clean_order, reconcile, stored_order};
use crate::catalog::Catalog;
use crate::error::AppError;
use crate::http::server::AppState;

type JsonResult = Result<Json<Value>, AppError>;

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub async fn read_document(
    State(state): State<AppState>,
    select: fn(&Catalog) -> &DocumentStore,
) -> JsonResult {
    Ok(Json(select(&state.catalog).read().await?))
}

pub async fn replace_document(
    State(state): State<AppState>,
    Json(body): Json<Value>,
    select: fn(&Catalog) -> &DocumentStore,
) -> JsonResult {
    let store = select(&state.catalog);
    store.replace_all(body).await?;
    tracing::info!(store = store.name(), "Document replaced");
    Ok(success())
}

pub async fn append_item(
    State(state): State<AppState>,
    Json(item): Json<Value>,
    select: fn(&Catalog) -> &DocumentStore,
) -> JsonResult {
    let store = select(&state.catalog);
    let count = store.append(item).await?;
    tracing::info!(store = store.name(), count, "Item appended");
    Ok(success())
}

pub async fn list_articles(State(state): State<AppState>) -> JsonResult {
    let articles = state.catalog.articles.get_all().await?;
    tracing::debug!(count = articles.len(), "Articles listed");
    Ok(Json(Value::Array(articles)))
}

pub async fn create_article(State(state): State<AppState>, Json(article): Json<Value>) -> JsonResult {
    let store = &state.catalog.articles;
    if let Some(id) = id_of(&article) {
        if store.contains_id(&id).await? {
            return Err(AppError::BadRequest("id already exists".to_string()));
        }
    }
    store.append(article).await?;
    Ok(success())
}

pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(article): Json<Value>,
) -> JsonResult {
    if !state.catalog.articles.update_by_id(&id, article).await? {
        return Err(AppError::NotFound("article not found".to_string()));
    }
    Ok(success())
}

pub async fn delete_article(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    if !state.catalog.articles.delete_by_id(&id).await? {
        return Err(AppError::NotFound("article not found".to_string()));
    }
    tracing::info!(article_id = %id, "Article deleted");
    Ok(success())
}

pub async fn save_computer(State(state): State<AppState>, Json(body): Json<Value>) -> JsonResult {
    let computer = prepare_computer(body, now_ms()).map_err(AppError::BadRequest)?;
    let id = id_of(&Value::Object(computer.clone()))
        .ok_or_else(|| AppError::BadRequest("computer id must be a string or a number".to_string()))?;

    let replaced = state
        .catalog
        .articles
        .upsert_by_id(&id, Value::Object(computer.clone()))
        .await?;
    tracing::info!(article_id = %id, replaced, "Computer saved");
    Ok(Json(json!({ "success": true, "article": computer })))
}

pub async fn submit_pending_review(State(state): State<AppState>, Json(body): Json<Value>) -> JsonResult {
    let review = stamp_pending_review(body, now_ms(), &now_iso()).map_err(AppError::BadRequest)?;
    state.catalog.pending_reviews.append(review).await?;
    Ok(success())
}

/// Move every published review into the archive.
pub async fn archive_reviews(State(state): State<AppState>) -> JsonResult {
    let catalog = &state.catalog;
    let reviews = catalog.evidence.get_all().await?;
    if reviews.is_empty() {
        return Ok(Json(json!({ "success": true, "count": 0, "message": "no reviews to archive" })));
    }

    let stamp = now_iso();
    let count = reviews.len();
    let mut archived = catalog.archived_reviews.get_all().await?;
    archived.extend(reviews.into_iter().map(|review| stamp_archived(review, &stamp)));

    catalog.archived_reviews.replace_all(Value::Array(archived)).await?;
    catalog.evidence.replace_all(json!([])).await?;

    tracing::info!(count, "Reviews archived");
    Ok(Json(json!({ "success": true, "count": count })))
}

pub async fn get_ordering(State(state): State<AppState>) -> JsonResult {
    let stored = stored_order(&state.catalog.ordering.read().await?);
    let live: Vec<String> = state
        .catalog
        .articles
        .get_all()
        .await?
        .iter()
        .filter_map(id_of)
        .collect();
    Ok(Json(json!({ "order": reconcile(&stored, &live) })))
}

pub async fn put_ordering(State(state): State<AppState>, Json(body): Json<Value>) -> JsonResult {
    let Some(items) = body.get("order").and_then(Value::as_array) else {
        return Err(AppError::BadRequest("expected { order: [ids...] }".to_string()));
    };
    let order = clean_order(items);
    let count = order.len();
    state.catalog.ordering.replace_all(json!({ "order": order })).await?;
    Ok(Json(json!({ "success": true, "count": count })))
}

#[derive(Debug, Deserialize)]
pub struct CheckMediaQuery {
    detailed: Option<String>,
}

impl CheckMediaQuery {
    fn detailed(&self) -> bool {
        matches!(self.detailed.as_deref(), Some(v) if !v.is_empty() && v != "0" && v != "false")
    }
}

pub async fn check_media(
    State(state): State<AppState>,
    Query(query): Query<CheckMediaQuery>,
) -> Result<Json<MediaReport>, AppError> {
    let articles = state.catalog.articles.get_all().await?;
    let root = state.catalog.static_dir().to_path_buf();
    let detailed = query.detailed();
    let report = tokio::task::spawn_blocking(move || audit_media(&articles, &root, detailed)).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ExplorerQuery {
    #[serde(default)]
    path: String,
}

pub async fn explore_images(
    State(state): State<AppState>,
    Query(query): Query<ExplorerQuery>,
) -> Result<Json<Vec<DirEntry>>, AppError> {
    Ok(Json(list_directory(&state.catalog.image_dir(), &query.path).await?))
}
