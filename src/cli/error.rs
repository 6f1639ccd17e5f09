//! CLI error type

use crate::collection::CollectionError;
use crate::config::ConfigError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),
    #[error("Invalid record document: {0}")]
    InvalidDocument(String),
    #[error("No record with id {0}")]
    NotFound(String),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
