//! Command handlers for the docmodel binary
//!
//! Handlers are generic over the storage backend so they can be driven
//! against an in-memory store in tests.

use crate::cli::error::CliError;
use crate::collection::Collection;
use crate::document::Document;
use crate::models::{ObjectId, RecordDataModel};
use crate::storage::StorageBackend;
use std::io::Read;
use std::path::PathBuf;

pub type RecordCollection<B> = Collection<B, RecordDataModel>;

/// Load input content from file or stdin (`-`)
pub fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Parse a record from its JSON document form
pub fn parse_record(content: &str) -> Result<RecordDataModel, CliError> {
    serde_json::from_str(content).map_err(|e| CliError::InvalidDocument(e.to_string()))
}

pub fn parse_id(id: &str) -> Result<ObjectId, CliError> {
    id.trim()
        .parse()
        .map_err(|e| CliError::InvalidArgument(format!("{}: {}", id, e)))
}

pub async fn handle_insert<B: StorageBackend>(
    collection: &RecordCollection<B>,
    content: &str,
) -> Result<ObjectId, CliError> {
    let mut record = parse_record(content)?;
    Ok(collection.insert_one(&mut record).await?)
}

pub async fn handle_get<B: StorageBackend>(
    collection: &RecordCollection<B>,
    id: &str,
) -> Result<RecordDataModel, CliError> {
    let oid = parse_id(id)?;
    collection
        .find_one(&oid)
        .await?
        .ok_or_else(|| CliError::NotFound(oid.to_string()))
}

pub async fn handle_list<B: StorageBackend>(
    collection: &RecordCollection<B>,
) -> Result<Vec<RecordDataModel>, CliError> {
    Ok(collection.find_all().await?)
}

/// Replace a stored record; the document must carry its `_id`
pub async fn handle_replace<B: StorageBackend>(
    collection: &RecordCollection<B>,
    content: &str,
) -> Result<ObjectId, CliError> {
    let record = parse_record(content)?;
    let id = record
        .id()
        .ok_or_else(|| CliError::InvalidDocument("Document has no _id".to_string()))?;
    collection.replace_one(&record).await?;
    Ok(id)
}

pub async fn handle_delete<B: StorageBackend>(
    collection: &RecordCollection<B>,
    id: &str,
) -> Result<(), CliError> {
    let oid = parse_id(id)?;
    if collection.delete_one(&oid).await? {
        Ok(())
    } else {
        Err(CliError::NotFound(oid.to_string()))
    }
}

pub async fn handle_count<B: StorageBackend>(
    collection: &RecordCollection<B>,
) -> Result<usize, CliError> {
    Ok(collection.count().await?)
}
