//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use storefront::config::StorefrontConfig;
use storefront::http::HttpServer;
use storefront::lifecycle::Shutdown;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "s3cret";
pub const WHITELISTED_IP: &str = "10.0.0.1";
pub const MEDIA_KEY: &str = "media-key";

pub fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
}

pub fn admin_auth() -> String {
    basic(ADMIN_USER, ADMIN_PASS)
}

/// Config rooted in `dir`, with a one-entry bypass whitelist and a lockout after 3 failures.
pub fn test_config(dir: &std::path::Path) -> StorefrontConfig {
    let mut config = StorefrontConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.storage.data_dir = dir.join("data");
    config.storage.static_dir = dir.join("public");
    config.storage.admin_page = dir.join("admin").join("admin.html");
    config.admin.username = ADMIN_USER.to_string();
    config.admin.password = ADMIN_PASS.to_string();
    config.admin.max_failures = 3;
    config.admin.default_whitelist = vec![WHITELISTED_IP.to_string()];
    config.admin.default_ip_bypass = true;

    std::fs::create_dir_all(&config.storage.static_dir).unwrap();
    std::fs::create_dir_all(dir.join("admin")).unwrap();
    std::fs::write(&config.storage.admin_page, "<h1>admin</h1>").unwrap();
    std::fs::write(config.storage.static_dir.join("index.html"), "<h1>shop</h1>").unwrap();
    config
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub dir: TempDir,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn data_file(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join("data").join(name)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn_server() -> TestServer {
    spawn_server_with(|_| {}).await
}

/// Start a server on an ephemeral port; `adjust` edits the config first.
pub async fn spawn_server_with(adjust: impl FnOnce(&mut StorefrontConfig)) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    adjust(&mut config);

    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stopped = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, stopped).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestServer {
        addr,
        client,
        dir,
        shutdown,
    }
}

#[derive(Clone, Default)]
struct MockMedia {
    files: Arc<Mutex<HashMap<String, (String, Option<String>, Bytes)>>>,
    next_id: Arc<AtomicU64>,
}

#[derive(Deserialize)]
struct NameQuery {
    name: String,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {MEDIA_KEY}"))
}

async fn mock_list(State(mock): State<MockMedia>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let files = mock.files.lock().await;
    let mut list: Vec<_> = files
        .iter()
        .map(|(id, (name, _, bytes))| json!({ "id": id, "name": name, "size": bytes.len() }))
        .collect();
    list.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));
    Json(list).into_response()
}

async fn mock_upload(
    State(mock): State<MockMedia>,
    Query(query): Query<NameQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = format!("f{}", mock.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let size = body.len();
    mock.files
        .lock()
        .await
        .insert(id.clone(), (query.name.clone(), content_type.clone(), body));
    Json(json!({ "id": id, "name": query.name, "size": size, "contentType": content_type })).into_response()
}

async fn mock_delete(State(mock): State<MockMedia>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match mock.files.lock().await.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn mock_content(State(mock): State<MockMedia>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match mock.files.lock().await.get(&id) {
        Some((_, content_type, bytes)) => {
            let content_type = content_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string());
            ([(header::CONTENT_TYPE, content_type)], bytes.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "no such file").into_response(),
    }
}

/// In-memory file host speaking the media host contract. Returns its base URL.
pub async fn start_mock_media_host() -> String {
    let app = Router::new()
        .route("/files", get(mock_list).post(mock_upload))
        .route("/files/{id}", delete(mock_delete))
        .route("/files/{id}/content", get(mock_content))
        .with_state(MockMedia::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/")
}
