//! Document collections
//!
//! A [`Collection`] persists typed documents through a storage backend.
//! It owns identifier assignment: records arrive without an id, and the
//! collection generates one on insert and writes it back into the record.
//!
//! Layout: one file per document at `<collection>/<hex id>.<ext>`.

use crate::document::{Document, DocumentError, DocumentFormat};
use crate::models::ObjectId;
use crate::storage::{StorageBackend, StorageError};
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// Maximum allowed length for collection names
const MAX_COLLECTION_NAME_LENGTH: usize = 64;

/// Error type for collection operations
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("Invalid collection name: {0}")]
    InvalidName(String),
    #[error("Document with id {0} already exists")]
    DuplicateKey(ObjectId),
    #[error("Document with id {0} not found")]
    NotFound(ObjectId),
    #[error("Document has no id; insert it before replacing")]
    MissingId,
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Validate a collection name for use as a directory name
///
/// Only ASCII alphanumerics, hyphens and underscores are allowed.
pub fn validate_collection_name(name: &str) -> Result<(), CollectionError> {
    if name.is_empty() {
        return Err(CollectionError::InvalidName(
            "Collection name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return Err(CollectionError::InvalidName(format!(
            "Collection name too long (max {} characters)",
            MAX_COLLECTION_NAME_LENGTH
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CollectionError::InvalidName(format!(
            "'{}' may only contain letters, digits, '-' and '_'",
            name
        )));
    }

    Ok(())
}

/// A named set of documents of type `T` stored in backend `B`
pub struct Collection<B: StorageBackend, T: Document> {
    storage: B,
    name: String,
    format: DocumentFormat,
    _marker: PhantomData<fn() -> T>,
}

impl<B: StorageBackend, T: Document> Collection<B, T> {
    /// Open a collection. Nothing is written until the first insert.
    pub fn new(storage: B, name: impl Into<String>) -> Result<Self, CollectionError> {
        let name = name.into();
        validate_collection_name(&name)?;
        Ok(Self {
            storage,
            name,
            format: DocumentFormat::default(),
            _marker: PhantomData,
        })
    }

    /// Use a different on-disk encoding
    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn storage(&self) -> &B {
        &self.storage
    }

    fn document_path(&self, id: &ObjectId) -> String {
        format!("{}/{}.{}", self.name, id, self.format.extension())
    }

    async fn write(&self, id: &ObjectId, doc: &T) -> Result<(), CollectionError> {
        let bytes = self.format.encode(doc)?;
        self.storage
            .write_file(&self.document_path(id), &bytes)
            .await?;
        Ok(())
    }

    async fn read(&self, path: &str, expected: &ObjectId) -> Result<T, CollectionError> {
        let bytes = self.storage.read_file(path).await?;
        let doc: T = self.format.decode(&bytes)?;
        match doc.id() {
            Some(id) if id == *expected => Ok(doc),
            Some(id) => Err(DocumentError::Decode(format!(
                "{} holds document {} instead of {}",
                path, id, expected
            ))
            .into()),
            None => Err(DocumentError::Decode(format!("{} has no _id", path)).into()),
        }
    }

    /// Insert a document, assigning an id if it has none
    ///
    /// The assigned id is written back into `doc` and returned. Inserting a
    /// document whose id is already stored fails with `DuplicateKey`.
    pub async fn insert_one(&self, doc: &mut T) -> Result<ObjectId, CollectionError> {
        let id = match doc.id() {
            Some(id) => {
                if self.storage.file_exists(&self.document_path(&id)).await? {
                    return Err(CollectionError::DuplicateKey(id));
                }
                id
            }
            None => ObjectId::generate(),
        };

        if !self.storage.dir_exists(&self.name).await? {
            self.storage.create_dir(&self.name).await?;
        }

        doc.set_id(id);
        self.write(&id, doc).await?;
        info!("Inserted document {} into '{}'", id, self.name);
        Ok(id)
    }

    /// Fetch a document by id
    pub async fn find_one(&self, id: &ObjectId) -> Result<Option<T>, CollectionError> {
        let path = self.document_path(id);
        if !self.storage.file_exists(&path).await? {
            debug!("Document {} not found in '{}'", id, self.name);
            return Ok(None);
        }
        self.read(&path, id).await.map(Some)
    }

    /// Ids of every stored document, ascending
    pub async fn ids(&self) -> Result<Vec<ObjectId>, CollectionError> {
        if !self.storage.dir_exists(&self.name).await? {
            return Ok(Vec::new());
        }

        let suffix = format!(".{}", self.format.extension());
        let mut ids: Vec<ObjectId> = self
            .storage
            .list_files(&self.name)
            .await?
            .iter()
            .filter_map(|file_name| file_name.strip_suffix(&suffix))
            // Only the canonical lowercase name addresses a document
            .filter_map(|stem| {
                stem.parse::<ObjectId>()
                    .ok()
                    .filter(|id| id.to_hex() == stem)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Load every document, ordered by id
    ///
    /// Documents that fail to decode are skipped with a warning.
    pub async fn find_all(&self) -> Result<Vec<T>, CollectionError> {
        let mut docs = Vec::new();
        for id in self.ids().await? {
            let path = self.document_path(&id);
            match self.read(&path, &id).await {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!("Skipping unreadable document {}: {}", path, e),
            }
        }

        debug!("Loaded {} documents from '{}'", docs.len(), self.name);
        Ok(docs)
    }

    /// Overwrite a stored document with the same id
    pub async fn replace_one(&self, doc: &T) -> Result<(), CollectionError> {
        let id = doc.id().ok_or(CollectionError::MissingId)?;
        if !self.storage.file_exists(&self.document_path(&id)).await? {
            return Err(CollectionError::NotFound(id));
        }

        self.write(&id, doc).await?;
        info!("Replaced document {} in '{}'", id, self.name);
        Ok(())
    }

    /// Delete a document; returns whether anything was removed
    pub async fn delete_one(&self, id: &ObjectId) -> Result<bool, CollectionError> {
        match self.storage.delete_file(&self.document_path(id)).await {
            Ok(()) => {
                info!("Deleted document {} from '{}'", id, self.name);
                Ok(true)
            }
            Err(StorageError::FileNotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn count(&self) -> Result<usize, CollectionError> {
        Ok(self.ids().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pair, RecordDataModel, Value};
    use crate::storage::MemoryStorageBackend;
    use std::collections::HashMap;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn record(int: i32) -> RecordDataModel {
        RecordDataModel::new(
            int,
            format!("record {}", int),
            vec![int],
            Value::Int(int),
            Vec::new(),
            Pair::new(int, None),
            HashMap::new(),
        )
    }

    #[test]
    fn test_collection_name_validation() {
        assert!(validate_collection_name("records").is_ok());
        assert!(validate_collection_name("my-records_2").is_ok());
        assert!(matches!(
            validate_collection_name(""),
            Err(CollectionError::InvalidName(_))
        ));
        assert!(validate_collection_name("../etc").is_err());
        assert!(validate_collection_name("a/b").is_err());
        assert!(validate_collection_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_insert_assigns_and_writes_back_id() {
        block_on(async {
            let coll: Collection<_, RecordDataModel> =
                Collection::new(MemoryStorageBackend::new(), "records").unwrap();
            let mut rec = record(1);
            let id = coll.insert_one(&mut rec).await.unwrap();
            assert_eq!(rec.id(), Some(id));

            let path = format!("records/{}.json", id);
            assert!(coll.storage().file_exists(&path).await.unwrap());
        });
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        block_on(async {
            let coll: Collection<_, RecordDataModel> =
                Collection::new(MemoryStorageBackend::new(), "records").unwrap();
            let mut rec = record(1);
            let id = coll.insert_one(&mut rec).await.unwrap();

            let mut again = rec.clone();
            let result = coll.insert_one(&mut again).await;
            assert!(matches!(result, Err(CollectionError::DuplicateKey(dup)) if dup == id));
            assert_eq!(coll.count().await.unwrap(), 1);
        });
    }

    #[test]
    fn test_empty_collection() {
        block_on(async {
            let coll: Collection<_, RecordDataModel> =
                Collection::new(MemoryStorageBackend::new(), "records").unwrap();
            assert_eq!(coll.count().await.unwrap(), 0);
            assert!(coll.find_all().await.unwrap().is_empty());
            let id: ObjectId = "65a1b2c3d4e5f60718293a4b".parse().unwrap();
            assert!(coll.find_one(&id).await.unwrap().is_none());
            assert!(!coll.delete_one(&id).await.unwrap());
        });
    }

    #[test]
    fn test_replace_requires_existing_id() {
        block_on(async {
            let coll: Collection<_, RecordDataModel> =
                Collection::new(MemoryStorageBackend::new(), "records").unwrap();

            let fresh = record(1);
            assert!(matches!(
                coll.replace_one(&fresh).await,
                Err(CollectionError::MissingId)
            ));

            let mut unknown = record(2);
            unknown.id = Some("65a1b2c3d4e5f60718293a4b".parse().unwrap());
            assert!(matches!(
                coll.replace_one(&unknown).await,
                Err(CollectionError::NotFound(_))
            ));
        });
    }

    #[test]
    fn test_find_all_skips_foreign_and_corrupt_files() {
        block_on(async {
            let storage = MemoryStorageBackend::new();
            storage.write_file("records/README.md", b"notes").await.unwrap();
            storage
                .write_file("records/65a1b2c3d4e5f60718293a4b.json", b"{broken")
                .await
                .unwrap();

            let coll: Collection<_, RecordDataModel> = Collection::new(storage, "records").unwrap();
            let mut rec = record(3);
            coll.insert_one(&mut rec).await.unwrap();

            let all = coll.find_all().await.unwrap();
            assert_eq!(all, vec![rec]);
            // Corrupt documents still count as stored ids
            assert_eq!(coll.count().await.unwrap(), 2);
        });
    }

    #[test]
    fn test_mismatched_id_is_decode_error() {
        block_on(async {
            let storage = MemoryStorageBackend::new();
            let mut rec = record(4);
            rec.id = Some("65a1b2c3d4e5f60718293a4b".parse().unwrap());
            let bytes = DocumentFormat::Json.encode(&rec).unwrap();
            storage
                .write_file("records/000000000000000000000001.json", &bytes)
                .await
                .unwrap();

            let coll: Collection<_, RecordDataModel> = Collection::new(storage, "records").unwrap();
            let id: ObjectId = "000000000000000000000001".parse().unwrap();
            let result = coll.find_one(&id).await;
            assert!(matches!(
                result,
                Err(CollectionError::Document(DocumentError::Decode(_)))
            ));
        });
    }

    #[test]
    fn test_non_canonical_file_names_ignored() {
        block_on(async {
            let storage = MemoryStorageBackend::new();
            let mut rec = record(5);
            rec.id = Some("65a1b2c3d4e5f60718293a4b".parse().unwrap());
            let bytes = DocumentFormat::Json.encode(&rec).unwrap();
            storage
                .write_file("records/65A1B2C3D4E5F60718293A4B.json", &bytes)
                .await
                .unwrap();

            let coll: Collection<_, RecordDataModel> = Collection::new(storage, "records").unwrap();
            assert_eq!(coll.count().await.unwrap(), 0);
            assert!(coll.ids().await.unwrap().is_empty());
            assert!(coll.find_all().await.unwrap().is_empty());
        });
    }
}
