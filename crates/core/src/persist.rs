//! Atomic JSON snapshot files shared by the stores.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

/// Load a snapshot, treating a missing or blank file as empty.
pub(crate) async fn load_snapshot<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if tokio::fs::metadata(path).await.is_err() {
        return Ok(T::default());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&content)
        .map_err(|e| Error::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Replace `path` with `snapshot` via temp file + rename. On failure the
/// previous file is restored.
pub(crate) async fn write_snapshot<T>(path: &Path, snapshot: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let content = serde_json::to_string_pretty(snapshot)
        .map_err(|e| Error::Storage(format!("Failed to serialize snapshot: {}", e)))?;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;

    let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4().as_hyphenated()));
    tokio::fs::write(&temp_path, content)
        .await
        .map_err(|e| Error::Storage(format!("Failed to write temp snapshot: {}", e)))?;

    let backup_path = parent.join(format!(".{}.bak", Uuid::new_v4().as_hyphenated()));

    let mut had_original = false;
    if tokio::fs::metadata(path).await.is_ok() {
        had_original = true;
        if let Err(err) = tokio::fs::rename(path, &backup_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::Storage(format!(
                "Failed to prepare atomic write: {}",
                err
            )));
        }
    }

    if let Err(err) = tokio::fs::rename(&temp_path, path).await {
        if had_original {
            let _ = tokio::fs::rename(&backup_path, path).await;
        }
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(Error::Storage(format!(
            "Failed to finalize atomic write: {}",
            err
        )));
    }

    if had_original {
        let _ = tokio::fs::remove_file(&backup_path).await;
    }

    Ok(())
}
