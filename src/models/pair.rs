//! Pair model

use serde::{Deserialize, Serialize};

/// A required integer paired with optional text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Pair {
    pub first: i32,
    #[serde(default)]
    pub second: Option<String>,
}

impl Pair {
    /// Both fields must be supplied; pass `None` for an absent `second`.
    pub fn new(first: i32, second: Option<String>) -> Self {
        Self { first, second }
    }
}
