//! Models module for the SDK
//!
//! Defines the record shapes exchanged with the document store.

pub mod object_id;
pub mod pair;
pub mod record;
pub mod value;

pub use object_id::{ObjectId, ObjectIdError};
pub use pair::Pair;
pub use record::RecordDataModel;
pub use value::{Value, ValueKind};
