//! Opaque document identifier
//!
//! An `ObjectId` is assigned by the document store when a record is first
//! inserted. Callers never mint one themselves; they receive it from a
//! [`Collection`](crate::collection::Collection) or parse its hex form.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

/// Extended-JSON key used for identifiers in stored documents
const OID_KEY: &str = "$oid";

const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Error parsing an ObjectId from its textual form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectIdError {
    #[error("ObjectId must be 24 hex characters, got {0}")]
    InvalidLength(usize),
    #[error("ObjectId contains a non-hex character: {0:?}")]
    InvalidHex(char),
}

/// 12-byte identifier: 4-byte timestamp, 5-byte process value, 3-byte counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh identifier. Only the store hands these out.
    pub(crate) fn generate() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let counter = next_counter();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_value());
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Raw bytes of the identifier
    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Creation time embedded in the identifier (second precision)
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(seconds as i64, 0)
            .single()
            .unwrap_or_default()
    }

    /// Lowercase hex form, 24 characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

fn process_value() -> &'static [u8; 5] {
    static PROCESS_VALUE: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS_VALUE.get_or_init(rand::random)
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter =
        COUNTER.get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK));
    counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 {
            return Err(ObjectIdError::InvalidLength(s.len()));
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { c, .. } => ObjectIdError::InvalidHex(c),
            _ => ObjectIdError::InvalidLength(s.len()),
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(OID_KEY, &self.to_hex())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ObjectIdVisitor)
    }
}

struct ObjectIdVisitor;

impl<'de> Visitor<'de> for ObjectIdVisitor {
    type Value = ObjectId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 24 character hex string or {\"$oid\": <hex>}")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ObjectId, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ObjectId, A::Error> {
        let mut hex: Option<String> = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == OID_KEY {
                hex = Some(map.next_value()?);
            } else {
                return Err(de::Error::unknown_field(&key, &[OID_KEY]));
            }
        }
        let hex = hex.ok_or_else(|| de::Error::missing_field(OID_KEY))?;
        hex.parse().map_err(de::Error::custom)
    }
}
