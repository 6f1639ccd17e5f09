//! Document encoding
//!
//! Records are persisted as self-contained documents. The [`Document`]
//! trait gives the store access to the identifier slot, and
//! [`DocumentFormat`] picks the on-disk encoding.

use crate::models::ObjectId;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use std::str::FromStr;

/// A record the store can persist and assign an identifier to
pub trait Document: Serialize + DeserializeOwned {
    /// Identifier, if one has been assigned
    fn id(&self) -> Option<ObjectId>;

    /// Record the identifier assigned by the store
    fn set_id(&mut self, id: ObjectId);
}

/// Error type for document encoding and decoding
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to encode document: {0}")]
    Encode(String),
    #[error("Failed to decode document: {0}")]
    Decode(String),
    #[error("Invalid UTF-8 in document: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// On-disk encoding of stored documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    #[serde(alias = "yml")]
    Yaml,
}

impl DocumentFormat {
    /// File extension used for documents in this format
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }

    pub fn encode<T: Serialize>(&self, doc: &T) -> Result<Vec<u8>, DocumentError> {
        match self {
            DocumentFormat::Json => serde_json::to_vec_pretty(doc)
                .map_err(|e| DocumentError::Encode(e.to_string())),
            DocumentFormat::Yaml => serde_yaml::to_string(doc)
                .map(String::into_bytes)
                .map_err(|e| DocumentError::Encode(e.to_string())),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DocumentError> {
        match self {
            DocumentFormat::Json => {
                serde_json::from_slice(bytes).map_err(|e| DocumentError::Decode(e.to_string()))
            }
            DocumentFormat::Yaml => {
                let text = String::from_utf8(bytes.to_vec())?;
                serde_yaml::from_str(&text).map_err(|e| DocumentError::Decode(e.to_string()))
            }
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            other => Err(format!("Unknown document format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pair, Value};

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<DocumentFormat>(), Ok(DocumentFormat::Json));
        assert_eq!("yml".parse::<DocumentFormat>(), Ok(DocumentFormat::Yaml));
        assert!("bson".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn test_yaml_keeps_discriminator() {
        let value = Value::Pair(Pair::new(3, Some("c".to_string())));
        let bytes = DocumentFormat::Yaml.encode(&value).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("_t: PairValue"));

        let back: Value = DocumentFormat::Yaml.decode(&bytes).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_decode_garbage() {
        let result: Result<Value, _> = DocumentFormat::Json.decode(b"{not json");
        assert!(matches!(result, Err(DocumentError::Decode(_))));

        let result: Result<Value, _> = DocumentFormat::Yaml.decode(&[0xff, 0xfe]);
        assert!(matches!(result, Err(DocumentError::InvalidUtf8(_))));
    }
}
