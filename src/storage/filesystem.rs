//! File system storage backend
//!
//! Implements StorageBackend on top of a directory on the local disk. Each
//! collection becomes a sub-directory and each document a file in it.
//!
//! ## Security
//!
//! Every path is resolved under the base directory. Paths containing ".."
//! are rejected, and resolved paths that escape the base directory (for
//! example through a symlink) are refused.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File system storage backend
pub struct FileSystemStorageBackend {
    base_path: PathBuf,
}

impl FileSystemStorageBackend {
    /// Create a backend rooted at `base_path`
    ///
    /// The directory does not have to exist yet; it is created on first write.
    ///
    /// # Example
    ///
    /// ```rust
    /// use docmodel_sdk::storage::filesystem::FileSystemStorageBackend;
    ///
    /// let backend = FileSystemStorageBackend::new("/var/lib/docmodel");
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn canonical_base(&self) -> PathBuf {
        self.base_path
            .canonicalize()
            .unwrap_or_else(|_| self.base_path.clone())
    }

    /// Fail unless `candidate` (an existing entry) canonicalises under the base
    ///
    /// A symlink that cannot be followed is refused: its target could be
    /// created outside the base later.
    fn ensure_contained(
        &self,
        candidate: &Path,
        is_symlink: bool,
    ) -> Result<PathBuf, StorageError> {
        let canonical = candidate.canonicalize().map_err(|e| {
            if is_symlink {
                StorageError::PermissionDenied(format!(
                    "{} is a dangling symlink",
                    candidate.display()
                ))
            } else {
                StorageError::IoError(format!(
                    "Failed to resolve {}: {}",
                    candidate.display(),
                    e
                ))
            }
        })?;
        if !canonical.starts_with(self.canonical_base()) {
            return Err(StorageError::PermissionDenied(format!(
                "{} escapes the storage directory",
                candidate.display()
            )));
        }
        Ok(canonical)
    }

    /// Resolve a relative storage path to a location on disk
    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = path.trim_start_matches('/');
        if relative.contains("..") {
            return Err(StorageError::PermissionDenied(
                "Path traversal (..) not allowed".to_string(),
            ));
        }

        let full = self.base_path.join(relative);
        if full
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(StorageError::PermissionDenied(
                "Path traversal not allowed".to_string(),
            ));
        }

        // The nearest entry on disk decides containment. `symlink_metadata`
        // sees dangling links that `exists()` reports as missing.
        let mut current = full.as_path();
        while current.starts_with(&self.base_path) && current != self.base_path {
            match std::fs::symlink_metadata(current) {
                Ok(metadata) => {
                    let is_target = current == full.as_path();
                    let canonical =
                        self.ensure_contained(current, metadata.file_type().is_symlink())?;
                    return Ok(if is_target { canonical } else { full });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error("inspect", path, e)),
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Ok(full)
    }
}

fn io_error(action: &str, path: &str, e: std::io::Error) -> StorageError {
    StorageError::IoError(format!("Failed to {} {}: {}", action, path, e))
}

#[async_trait(?Send)]
impl StorageBackend for FileSystemStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve_path(path)?;
        debug!("Reading {}", full_path.display());

        fs::read(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("read file", path, e),
        })
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", path, e))?;
        }

        fs::write(&full_path, content)
            .await
            .map_err(|e| io_error("write file", path, e))?;
        debug!("Wrote {} bytes to {}", content.len(), full_path.display());
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let full_path = self.resolve_path(dir)?;

        let mut read_dir = fs::read_dir(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::DirectoryNotFound(dir.to_string()),
            _ => io_error("read directory", dir, e),
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| io_error("read entry in", dir, e))?
        {
            if let Ok(file_type) = entry.file_type().await
                && file_type.is_file()
                && let Some(file_name) = entry.file_name().to_str()
            {
                entries.push(file_name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;

        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("check file", path, e)),
        }
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;

        fs::remove_file(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("delete file", path, e),
        })
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;

        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| io_error("create directory", path, e))?;
        info!("Created directory {}", full_path.display());
        Ok(())
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;

        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("check directory", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_traversal_blocked() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        let result = backend.resolve_path("../etc/passwd");
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));

        let result = backend.resolve_path("/records/../../../etc/passwd");
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
    }

    #[test]
    fn test_valid_paths_allowed() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        assert!(backend.resolve_path("records").is_ok());
        assert!(backend.resolve_path("records/65a1b2c3d4e5f60718293a4b.json").is_ok());
        // Leading slash is stripped
        let resolved = backend.resolve_path("/records").unwrap();
        assert!(resolved.starts_with(temp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_blocked() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();

        let backend = FileSystemStorageBackend::new(temp.path());
        let result = backend.resolve_path("link/file.json");
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_blocked() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("records")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("evil.json"),
            temp.path().join("records").join("x.json"),
        )
        .unwrap();

        let backend = FileSystemStorageBackend::new(temp.path());
        let result = backend.resolve_path("records/x.json");
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_ancestor_above_missing_parent_blocked() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();

        let backend = FileSystemStorageBackend::new(temp.path());
        let result = backend.resolve_path("link/sub/deeper/file.json");
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_base_allowed() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("alias")).unwrap();

        let backend = FileSystemStorageBackend::new(temp.path());
        assert!(backend.resolve_path("alias/new/file.json").is_ok());
    }
}
