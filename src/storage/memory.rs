//! In-memory storage backend
//!
//! Keeps file contents in a map keyed by normalised path. Nothing survives
//! the process; useful for tests and for short-lived stores.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

/// Storage backend holding everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStorageBackend {
    state: RwLock<MemoryState>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StorageError> {
        self.state
            .read()
            .map_err(|_| StorageError::BackendError("Memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StorageError> {
        self.state
            .write()
            .map_err(|_| StorageError::BackendError("Memory storage lock poisoned".to_string()))
    }
}

/// Trim surrounding slashes and reject traversal
fn normalize(path: &str) -> Result<String, StorageError> {
    let trimmed = path.trim_matches('/');
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(StorageError::PermissionDenied(format!(
            "Path traversal (..) not allowed: {}",
            path
        )));
    }
    Ok(trimmed.to_string())
}

/// All ancestor directories of a normalised file path
fn parents(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(i, _)| &path[..i])
}

/// Refuse to nest anything under a path that is already a file
fn check_parents(state: &MemoryState, key: &str, path: &str) -> Result<(), StorageError> {
    match parents(key).find(|parent| state.files.contains_key(*parent)) {
        Some(parent) => Err(StorageError::IoError(format!(
            "Cannot create {}: {} is a file",
            path, parent
        ))),
        None => Ok(()),
    }
}

#[async_trait(?Send)]
impl StorageBackend for MemoryStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = normalize(path)?;
        self.read()?
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let key = normalize(path)?;
        if key.is_empty() {
            return Err(StorageError::BackendError("Empty file path".to_string()));
        }

        let mut state = self.write()?;
        if state.dirs.contains(&key) {
            return Err(StorageError::IoError(format!("{} is a directory", path)));
        }
        check_parents(&state, &key, path)?;
        for parent in parents(&key) {
            state.dirs.insert(parent.to_string());
        }
        state.files.insert(key, content.to_vec());
        debug!("Wrote {} bytes to memory path {}", content.len(), path);
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let key = normalize(dir)?;
        let state = self.read()?;
        if !key.is_empty() && !state.dirs.contains(&key) {
            return Err(StorageError::DirectoryNotFound(dir.to_string()));
        }

        let prefix = if key.is_empty() {
            String::new()
        } else {
            format!("{}/", key)
        };
        Ok(state
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect())
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = normalize(path)?;
        Ok(self.read()?.files.contains_key(&key))
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize(path)?;
        self.write()?
            .files
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize(path)?;
        if key.is_empty() {
            return Ok(());
        }

        let mut state = self.write()?;
        if state.files.contains_key(&key) {
            return Err(StorageError::IoError(format!("{} is a file", path)));
        }
        check_parents(&state, &key, path)?;
        for parent in parents(&key) {
            state.dirs.insert(parent.to_string());
        }
        state.dirs.insert(key);
        Ok(())
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = normalize(path)?;
        Ok(key.is_empty() || self.read()?.dirs.contains(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        block_on(async {
            let backend = MemoryStorageBackend::new();
            backend.write_file("a/b/c.json", b"{}").await.unwrap();
            assert!(backend.dir_exists("a").await.unwrap());
            assert!(backend.dir_exists("/a/b/").await.unwrap());
            assert!(!backend.dir_exists("a/b/c.json").await.unwrap());
        });
    }

    #[test]
    fn test_list_is_one_level_deep() {
        block_on(async {
            let backend = MemoryStorageBackend::new();
            backend.write_file("dir/one.json", b"1").await.unwrap();
            backend.write_file("dir/two.json", b"2").await.unwrap();
            backend.write_file("dir/nested/three.json", b"3").await.unwrap();
            backend.write_file("dirx/four.json", b"4").await.unwrap();

            let files = backend.list_files("dir").await.unwrap();
            assert_eq!(files, vec!["one.json".to_string(), "two.json".to_string()]);
        });
    }

    #[test]
    fn test_missing_directory() {
        block_on(async {
            let backend = MemoryStorageBackend::new();
            let result = backend.list_files("nowhere").await;
            assert!(matches!(result, Err(StorageError::DirectoryNotFound(_))));

            backend.create_dir("nowhere").await.unwrap();
            assert!(backend.list_files("nowhere").await.unwrap().is_empty());
        });
    }

    #[test]
    fn test_traversal_rejected() {
        block_on(async {
            let backend = MemoryStorageBackend::new();
            let result = backend.write_file("a/../../b", b"x").await;
            assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
        });
    }

    #[test]
    fn test_delete_missing_file() {
        block_on(async {
            let backend = MemoryStorageBackend::new();
            let result = backend.delete_file("ghost.json").await;
            assert!(matches!(result, Err(StorageError::FileNotFound(_))));
        });
    }

    #[test]
    fn test_cannot_nest_under_a_file() {
        block_on(async {
            let backend = MemoryStorageBackend::new();
            backend.write_file("a.json", b"{}").await.unwrap();

            let result = backend.write_file("a.json/b", b"x").await;
            assert!(matches!(result, Err(StorageError::IoError(_))));
            let result = backend.create_dir("a.json/sub").await;
            assert!(matches!(result, Err(StorageError::IoError(_))));

            assert!(!backend.dir_exists("a.json").await.unwrap());
            assert!(backend.file_exists("a.json").await.unwrap());
            assert!(!backend.file_exists("a.json/b").await.unwrap());
        });
    }
}
