//! Grain-file storage
//!
//! Raw measurement files uploaded with an inspection are kept on disk under
//! the configured upload directory so a batch can be re-examined later.

use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Disk store for uploaded grain measurement files
#[derive(Clone)]
pub struct GrainFileStore {
    root: PathBuf,
}

impl GrainFileStore {
    /// Create a store rooted at the configured upload directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist an uploaded file under a timestamped name, returning the
    /// stored path
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        let file_name = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        Ok(path.to_string_lossy().into_owned())
    }

    /// Remove a stored file; missing files are not an error
    pub async fn delete(&self, stored_path: &str) -> AppResult<()> {
        match tokio::fs::remove_file(stored_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(e.to_string())),
        }
    }
}

/// Keep only the final path component and replace awkward characters
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.json".to_string());

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_path_traversal() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("batch 01.json"), "batch_01.json");
        assert_eq!(sanitize_file_name(""), "upload.json");
    }
}
