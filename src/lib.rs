//! docmodel SDK - record data models and a document store for them
//!
//! Provides:
//! - Record models (`Pair`, `Value`, `RecordDataModel`) with their document layout
//! - Store-assigned identifiers (`ObjectId`)
//! - Document collections over pluggable storage backends
//! - TOML store configuration

pub mod cli;
pub mod collection;
#[cfg(feature = "config")]
pub mod config;
pub mod document;
pub mod models;
pub mod storage;

// Re-export commonly used types
#[cfg(feature = "native-fs")]
pub use storage::filesystem::FileSystemStorageBackend;
pub use storage::{MemoryStorageBackend, StorageBackend, StorageError};

pub use collection::{Collection, CollectionError};
#[cfg(feature = "config")]
pub use config::{ConfigError, StoreConfig};
pub use document::{Document, DocumentError, DocumentFormat};

// Re-export models
pub use models::{ObjectId, ObjectIdError, Pair, RecordDataModel, Value, ValueKind};
