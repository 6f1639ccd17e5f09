//! Record data model
//!
//! `RecordDataModel` exercises every field shape a stored document can
//! take: scalars, text, integer arrays, the [`Value`] union, arrays of
//! values, nested [`Pair`]s, and a string-keyed map. Each shape appears
//! once as a required field and, except for the map, once as an optional
//! one.

use super::object_id::ObjectId;
use super::pair::Pair;
use super::value::Value;
use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RecordDataModel {
    /// Assigned by the store on first insert
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub int: i32,
    #[serde(default)]
    pub int_opt: Option<i32>,

    pub string: String,
    #[serde(default)]
    pub string_opt: Option<String>,

    pub array: Vec<i32>,
    #[serde(default)]
    pub array_opt: Option<Vec<i32>>,

    pub value: Value,
    #[serde(default)]
    pub value_opt: Option<Value>,

    pub value_array: Vec<Value>,
    #[serde(default)]
    pub value_array_opt: Option<Vec<Value>>,

    pub record: Pair,
    #[serde(default)]
    pub record_opt: Option<Pair>,

    pub map: HashMap<String, i32>,
}

impl RecordDataModel {
    /// Create a record from its required fields. Optional fields start absent.
    pub fn new(
        int: i32,
        string: impl Into<String>,
        array: Vec<i32>,
        value: Value,
        value_array: Vec<Value>,
        record: Pair,
        map: HashMap<String, i32>,
    ) -> Self {
        Self {
            id: None,
            int,
            int_opt: None,
            string: string.into(),
            string_opt: None,
            array,
            array_opt: None,
            value,
            value_opt: None,
            value_array,
            value_array_opt: None,
            record,
            record_opt: None,
            map,
        }
    }

    pub fn with_int_opt(mut self, v: i32) -> Self {
        self.int_opt = Some(v);
        self
    }

    pub fn with_string_opt(mut self, v: impl Into<String>) -> Self {
        self.string_opt = Some(v.into());
        self
    }

    pub fn with_array_opt(mut self, v: Vec<i32>) -> Self {
        self.array_opt = Some(v);
        self
    }

    pub fn with_value_opt(mut self, v: Value) -> Self {
        self.value_opt = Some(v);
        self
    }

    pub fn with_value_array_opt(mut self, v: Vec<Value>) -> Self {
        self.value_array_opt = Some(v);
        self
    }

    pub fn with_record_opt(mut self, v: Pair) -> Self {
        self.record_opt = Some(v);
        self
    }
}

impl Document for RecordDataModel {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}
