//! Cross-check of article media references against the static directory.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaCheck {
    pub article_id: Value,
    pub kind: String,
    pub path: String,
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaReport {
    pub total_articles: usize,
    pub total_media: usize,
    pub existing: Vec<String>,
    pub missing: Vec<String>,
    /// References served by the media host rather than from disk.
    pub remote: Vec<String>,
    pub missing_count: usize,
    pub ok_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed: Option<Vec<MediaCheck>>,
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://") || reference.starts_with("/media/")
}

/// Whether `reference` names an existing file below `root`.
/// References that climb out of `root` are never found.
fn exists_under(root: &Path, reference: &str) -> bool {
    let relative = Path::new(reference.trim_start_matches('/'));
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return false;
    }
    root.join(relative).exists()
}

fn references(article: &Value) -> Vec<(String, &str)> {
    let mut refs = Vec::new();
    for kind in ["image", "video", "thumbnail"] {
        if let Some(path) = article.get(kind).and_then(Value::as_str).filter(|p| !p.is_empty()) {
            refs.push((kind.to_string(), path));
        }
    }
    if let Some(medias) = article.get("medias").and_then(Value::as_array) {
        for (i, media) in medias.iter().enumerate() {
            if let Some(path) = media.get("path").and_then(Value::as_str).filter(|p| !p.is_empty()) {
                refs.push((format!("medias[{i}]"), path));
            }
        }
    }
    refs
}

pub fn audit_media(articles: &[Value], root: &Path, detailed: bool) -> MediaReport {
    let mut existing = BTreeSet::new();
    let mut missing = BTreeSet::new();
    let mut remote = BTreeSet::new();
    let mut checks = Vec::new();
    let mut total_media = 0;

    for article in articles {
        for (kind, path) in references(article) {
            total_media += 1;
            let exists = if is_remote(path) {
                remote.insert(path.to_string());
                true
            } else if exists_under(root, path) {
                existing.insert(path.to_string());
                true
            } else {
                missing.insert(path.to_string());
                false
            };
            if detailed {
                checks.push(MediaCheck {
                    article_id: article.get("id").cloned().unwrap_or(Value::Null),
                    kind,
                    path: path.to_string(),
                    exists,
                });
            }
        }
    }

    MediaReport {
        total_articles: articles.len(),
        total_media,
        missing_count: missing.len(),
        ok_count: existing.len(),
        existing: existing.into_iter().collect(),
        missing: missing.into_iter().collect(),
        remote: remote.into_iter().collect(),
        detailed: detailed.then_some(checks),
    }
}
