//! Storefront documents.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → handlers.rs (shape & validate body)
//!     → document.rs (read-modify-write of one JSON file)
//!     → data_dir/<store>.json
//! ```
//!
//! # Design Decisions
//! - One file per resource, created at startup with its default content
//! - No locking: concurrent writers to the same file race, last rename wins
//! - Mutating routes sit behind the write gate installed by the HTTP server

pub mod document;
pub mod entries;
pub mod explorer;
pub mod handlers;
pub mod media_audit;
pub mod ordering;

use std::path::{Path, PathBuf};

use axum::{
    extract::State,
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::StorageConfig;
use crate::http::server::AppState;
use crate::persist;

use self::document::{id_of, DocumentStore};
use self::handlers::*;

/// Every document store of the site.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub articles: DocumentStore,
    pub categories: DocumentStore,
    pub scam_categories: DocumentStore,
    pub offers: DocumentStore,
    pub scam_reports: DocumentStore,
    pub evidence: DocumentStore,
    pub pending_reviews: DocumentStore,
    pub archived_reviews: DocumentStore,
    pub announcements: DocumentStore,
    pub info: DocumentStore,
    pub ordering: DocumentStore,
    static_dir: PathBuf,
}

impl Catalog {
    pub fn new(storage: &StorageConfig) -> Self {
        let dir = storage.data_dir.as_path();
        Self {
            articles: DocumentStore::list(dir, "articles", "articles.json"),
            categories: DocumentStore::list(dir, "categories", "categories.json"),
            scam_categories: DocumentStore::list(dir, "scam categories", "scam-categories.json"),
            offers: DocumentStore::list(dir, "offers", "offers.json"),
            scam_reports: DocumentStore::list(dir, "scam reports", "scam-reports.json"),
            evidence: DocumentStore::list(dir, "evidence", "evidence.json"),
            pending_reviews: DocumentStore::list(dir, "pending reviews", "reviews-pending.json"),
            archived_reviews: DocumentStore::list(dir, "archived reviews", "reviews-archived.json"),
            announcements: DocumentStore::list(dir, "announcements", "announcements.json"),
            info: DocumentStore::new(dir, "info page", "info.json", json!({})),
            ordering: DocumentStore::new(dir, "ordering", "ordering.json", json!({ "order": [] })),
            static_dir: storage.static_dir.clone(),
        }
    }

    /// Create missing files. The ordering file starts from the current article ids.
    pub fn open(storage: &StorageConfig) -> std::io::Result<Self> {
        let catalog = Self::new(storage);
        for store in [
            &catalog.articles,
            &catalog.categories,
            &catalog.scam_categories,
            &catalog.offers,
            &catalog.scam_reports,
            &catalog.evidence,
            &catalog.pending_reviews,
            &catalog.archived_reviews,
            &catalog.announcements,
            &catalog.info,
        ] {
            store.ensure()?;
        }
        catalog.seed_ordering()?;
        Ok(catalog)
    }

    fn seed_ordering(&self) -> std::io::Result<()> {
        if self.ordering.path().exists() {
            return Ok(());
        }
        let ids: Vec<String> = std::fs::read_to_string(self.articles.path())
            .ok()
            .and_then(|text| serde_json::from_str::<Vec<Value>>(&text).ok())
            .map(|articles| articles.iter().filter_map(id_of).collect())
            .unwrap_or_default();
        persist::write_json(self.ordering.path(), &json!({ "order": ids }))?;
        tracing::info!(count = ids.len(), "Ordering file created");
        Ok(())
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn image_dir(&self) -> PathBuf {
        self.static_dir.join("img")
    }
}

/// Read / append / replace on one list store.
fn collection(select: fn(&Catalog) -> &DocumentStore) -> MethodRouter<AppState> {
    document(select).post(move |state: State<AppState>, body: Json<Value>| append_item(state, body, select))
}

/// Read / replace on one store.
fn document(select: fn(&Catalog) -> &DocumentStore) -> MethodRouter<AppState> {
    get(move |state: State<AppState>| read_document(state, select))
        .put(move |state: State<AppState>, body: Json<Value>| replace_document(state, body, select))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/articles.json", get(list_articles))
        .route("/api/articles", get(list_articles).post(create_article))
        .route("/api/articles/{id}", put(update_article).delete(delete_article))
        .route("/api/computers", post(save_computer))
        .route("/api/categories", document(|c| &c.categories))
        .route("/api/scam-categories", document(|c| &c.scam_categories))
        .route("/api/offers", collection(|c| &c.offers))
        .route("/api/scam-reports", collection(|c| &c.scam_reports))
        .route("/api/evidence", collection(|c| &c.evidence))
        .route(
            "/api/reviews/pending",
            document(|c| &c.pending_reviews).post(submit_pending_review),
        )
        .route("/api/reviews/archived", collection(|c| &c.archived_reviews))
        .route("/api/reviews/archive", post(archive_reviews))
        .route("/api/announcements", collection(|c| &c.announcements))
        .route("/api/info", document(|c| &c.info))
        .route("/api/ordering", get(get_ordering).put(put_ordering))
        .route("/api/check-media", get(check_media))
        .route("/api/explorer", get(explore_images))
}
