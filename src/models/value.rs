//! Value union
//!
//! A `Value` holds exactly one of an integer, a string, or a [`Pair`].
//! Stored documents carry a `_t` discriminator naming the variant and the
//! payload under `Value`, the layout document database drivers use for
//! polymorphic records.

use super::pair::Pair;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "_t", content = "Value")]
pub enum Value {
    #[serde(rename = "IntValue")]
    Int(i32),
    #[serde(rename = "StringValue")]
    String(String),
    #[serde(rename = "PairValue")]
    Pair(Pair),
}

/// Which variant of [`Value`] is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    String,
    Pair,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "IntValue",
            ValueKind::String => "StringValue",
            ValueKind::Pair => "PairValue",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::String(_) => ValueKind::String,
            Value::Pair(_) => ValueKind::Pair,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&Pair> {
        match self {
            Value::Pair(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Pair> for Value {
    fn from(v: Pair) -> Self {
        Value::Pair(v)
    }
}
