//! Flat JSON document files.
//!
//! Each store is one file holding either a list of items or a single object.
//! Operations are plain read-modify-write cycles without locking.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::observability::metrics;
use crate::persist;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot read {store}: {source}")]
    Read {
        store: &'static str,
        source: std::io::Error,
    },

    #[error("cannot write {store}: {source}")]
    Write {
        store: &'static str,
        source: std::io::Error,
    },

    #[error("cannot parse {store}: {source}")]
    Parse {
        store: &'static str,
        source: serde_json::Error,
    },

    #[error("{store} does not hold a list")]
    NotList { store: &'static str },
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    name: &'static str,
    path: PathBuf,
    default: Value,
}

impl DocumentStore {
    pub fn new(dir: &Path, name: &'static str, file: &str, default: Value) -> Self {
        Self {
            name,
            path: dir.join(file),
            default,
        }
    }

    /// Store whose document is a list, empty by default.
    pub fn list(dir: &Path, name: &'static str, file: &str) -> Self {
        Self::new(dir, name, file, Value::Array(Vec::new()))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its default content. Returns whether it was created.
    pub fn ensure(&self) -> std::io::Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        persist::write_json(&self.path, &self.default)?;
        tracing::info!(store = self.name, path = %self.path.display(), "Document created");
        Ok(true)
    }

    /// Whole document. A missing or blank file reads as the default.
    pub async fn read(&self) -> Result<Value, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(self.default.clone()),
            Err(source) => return Err(self.fail(StoreError::Read { store: self.name, source })),
        };
        if text.trim().is_empty() {
            return Ok(self.default.clone());
        }
        serde_json::from_str(&text).map_err(|source| self.fail(StoreError::Parse { store: self.name, source }))
    }

    pub async fn write(&self, value: &Value) -> Result<(), StoreError> {
        persist::write_json_async(&self.path, value)
            .await
            .map_err(|source| self.fail(StoreError::Write { store: self.name, source }))
    }

    pub async fn get_all(&self) -> Result<Vec<Value>, StoreError> {
        match self.read().await? {
            Value::Array(items) => Ok(items),
            _ => Err(self.fail(StoreError::NotList { store: self.name })),
        }
    }

    pub async fn replace_all(&self, value: Value) -> Result<(), StoreError> {
        self.write(&value).await
    }

    /// Push one item. Returns the new length.
    pub async fn append(&self, item: Value) -> Result<usize, StoreError> {
        let mut items = self.get_all().await?;
        items.push(item);
        self.write(&Value::Array(items.clone())).await?;
        Ok(items.len())
    }

    pub async fn contains_id(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.get_all().await?.iter().any(|item| id_matches(item, id)))
    }

    /// Replace the item with `id`. Returns `false` when absent.
    pub async fn update_by_id(&self, id: &str, item: Value) -> Result<bool, StoreError> {
        let mut items = self.get_all().await?;
        let Some(slot) = items.iter_mut().find(|existing| id_matches(existing, id)) else {
            return Ok(false);
        };
        *slot = item;
        self.write(&Value::Array(items)).await?;
        Ok(true)
    }

    /// Replace the item with `id`, or append it. Returns `true` when replaced.
    pub async fn upsert_by_id(&self, id: &str, item: Value) -> Result<bool, StoreError> {
        let mut items = self.get_all().await?;
        let replaced = match items.iter_mut().find(|existing| id_matches(existing, id)) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => {
                items.push(item);
                false
            }
        };
        self.write(&Value::Array(items)).await?;
        Ok(replaced)
    }

    /// Remove every item with `id`. Returns `false` when none matched.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let items = self.get_all().await?;
        let before = items.len();
        let kept: Vec<Value> = items.into_iter().filter(|item| !id_matches(item, id)).collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.write(&Value::Array(kept)).await?;
        Ok(true)
    }

    fn fail(&self, err: StoreError) -> StoreError {
        metrics::record_store_error(self.name);
        err
    }
}

/// String form of an item's `id`: strings as-is, numbers in decimal.
pub fn id_of(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn id_matches(item: &Value, id: &str) -> bool {
    id_of(item).is_some_and(|own| own == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(dir: &Path) -> DocumentStore {
        DocumentStore::list(dir, "articles", "articles.json")
    }

    #[tokio::test]
    async fn missing_and_blank_files_read_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert_eq!(store.get_all().await.unwrap(), Vec::<Value>::new());

        std::fs::write(store.path(), "  \n").unwrap();
        assert_eq!(store.read().await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn ensure_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path(), "info", "info.json", json!({}));
        assert!(store.ensure().unwrap());
        assert!(!store.ensure().unwrap());
        assert_eq!(store.read().await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn crud_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.append(json!({ "id": "a", "nom": "one" })).await.unwrap();
        store.append(json!({ "id": 7, "nom": "seven" })).await.unwrap();
        assert!(store.contains_id("7").await.unwrap());

        assert!(store.update_by_id("a", json!({ "id": "a", "nom": "uno" })).await.unwrap());
        assert!(!store.update_by_id("zzz", json!({})).await.unwrap());

        assert!(store.delete_by_id("7").await.unwrap());
        assert!(!store.delete_by_id("7").await.unwrap());

        assert_eq!(store.get_all().await.unwrap(), vec![json!({ "id": "a", "nom": "uno" })]);
    }

    #[tokio::test]
    async fn upsert_appends_then_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert!(!store.upsert_by_id("pc", json!({ "id": "pc", "prix": 1 })).await.unwrap());
        assert!(store.upsert_by_id("pc", json!({ "id": "pc", "prix": 2 })).await.unwrap());
        assert_eq!(store.get_all().await.unwrap(), vec![json!({ "id": "pc", "prix": 2 })]);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::write(store.path(), "[{").unwrap();
        assert!(matches!(store.get_all().await, Err(StoreError::Parse { .. })));

        std::fs::write(store.path(), "{}").unwrap();
        assert!(matches!(store.append(json!(1)).await, Err(StoreError::NotList { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_replace_all_never_fails_or_corrupts() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::list(dir.path(), "offers", "offers.json");
        store.ensure().unwrap();

        for _ in 0..20 {
            let writers: Vec<_> = (0..16usize)
                .map(|n| {
                    let store = store.clone();
                    let doc = Value::Array(vec![json!({ "id": n, "titre": "x".repeat(n * 40) }); n + 1]);
                    tokio::spawn(async move { store.replace_all(doc).await })
                })
                .collect();
            for writer in writers {
                writer.await.unwrap().unwrap();
            }

            let items = store.get_all().await.unwrap();
            let n = items[0]["id"].as_u64().unwrap() as usize;
            assert_eq!(items.len(), n + 1);
        }
    }

    #[test]
    fn ids_match_strings_and_numbers() {
        assert!(id_matches(&json!({ "id": "abc" }), "abc"));
        assert!(id_matches(&json!({ "id": 12 }), "12"));
        assert!(!id_matches(&json!({ "id": "" }), ""));
        assert!(!id_matches(&json!({ "name": "x" }), "x"));
    }
}
