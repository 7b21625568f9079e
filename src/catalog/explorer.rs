//! Browsing of the image folder from the admin page.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Resolve `relative` under `base`, refusing anything that could leave it.
pub fn resolve(base: &Path, relative: &str) -> Result<PathBuf, AppError> {
    let relative = Path::new(relative);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !safe {
        return Err(AppError::BadRequest("invalid path".to_string()));
    }
    Ok(base.join(relative))
}

/// Entries of `base/relative`, sorted by name.
pub async fn list_directory(base: &Path, relative: &str) -> Result<Vec<DirEntry>, AppError> {
    let target = resolve(base, relative)?;
    let unreadable = |e: std::io::Error| {
        tracing::warn!(path = %target.display(), error = %e, "Cannot read directory");
        AppError::Internal("cannot read directory".to_string())
    };

    let mut reader = tokio::fs::read_dir(&target).await.map_err(unreadable)?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(unreadable)? {
        let is_directory = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_directory,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
