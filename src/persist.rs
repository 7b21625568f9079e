//! Pretty-printed JSON files written through a temp file and a rename.
//!
//! Each write gets its own temp file in the target directory, so concurrent
//! writers to one path never share a partially written file; readers always
//! see one complete document.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

fn target_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = target_dir(path);
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Blocking variant, used at startup and by the security settings store.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> std::io::Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes(path, &bytes)
}

pub async fn write_json_async<T: Serialize + ?Sized>(path: &Path, value: &T) -> std::io::Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_bytes(&path, &bytes))
        .await
        .map_err(std::io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leftovers(dir: &Path, keep: &str) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name != keep)
            .collect()
    }

    #[test]
    fn writes_pretty_json_and_cleans_temp() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let path = nested.join("doc.json");

        write_json(&path, &serde_json::json!({ "a": [1, 2] })).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        assert!(leftovers(&nested, "doc.json").is_empty());
    }

    #[tokio::test]
    async fn async_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        write_json_async(&path, &[1]).await.unwrap();
        write_json_async(&path, &[2, 3]).await.unwrap();

        let value: Vec<u8> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value, vec![2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_writers_leave_one_complete_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        for _ in 0..20 {
            let writers: Vec<_> = (0..16usize)
                .map(|n| {
                    let path = path.clone();
                    tokio::spawn(async move { write_json_async(&path, &vec![n; n * 50]).await })
                })
                .collect();
            for writer in writers {
                writer.await.unwrap().unwrap();
            }

            let value: Vec<usize> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
            let n = value.first().copied().unwrap_or(0);
            assert_eq!(value, vec![n; n * 50]);
        }
        assert!(leftovers(dir.path(), "doc.json").is_empty());
    }
}
