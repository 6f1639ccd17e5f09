//! Storage backend abstraction
//!
//! Defines the StorageBackend trait that document collections write through:
//! - MemoryStorageBackend: in-process map (tests, ephemeral stores)
//! - FileSystemStorageBackend: native file system (feature `native-fs`)

use async_trait::async_trait;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Trait for storage backends
///
/// Paths are `/`-separated and relative to the backend's root. Document
/// collections only ever address one directory level deep.
#[async_trait(?Send)]
pub trait StorageBackend: Send + Sync {
    /// Read a file from storage
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a file to storage, replacing any previous content
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// List file names directly inside a directory
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError>;

    /// Check if a file exists
    async fn file_exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Delete a file
    async fn delete_file(&self, path: &str) -> Result<(), StorageError>;

    /// Create a directory
    async fn create_dir(&self, path: &str) -> Result<(), StorageError>;

    /// Check if a directory exists
    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError>;
}

/// Borrowed backends, so several collections can share one store
#[async_trait(?Send)]
impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        (**self).read_file(path).await
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        (**self).write_file(path, content).await
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        (**self).list_files(dir).await
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        (**self).file_exists(path).await
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        (**self).delete_file(path).await
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        (**self).create_dir(path).await
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        (**self).dir_exists(path).await
    }
}

pub mod memory;

#[cfg(feature = "native-fs")]
pub mod filesystem;

pub use memory::MemoryStorageBackend;
