//! Identifier newtypes and operation acknowledgements
//!
//! - ObjectId: Opaque string identifier for persisted documents
//! - TrackToken: Handle associating a live object with its registered baseline
//! - InsertResult / UpdateResult / DeleteResult: Store acknowledgements

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::Value;

/// Reserved top-level identifier field of every persisted document.
///
/// The change-diff engine never emits an operator for this field, and the
/// store's unique constraint on it is what the pessimistic lock builds on.
pub const ID_FIELD: &str = "_id";

/// Opaque document identifier
///
/// Generated by the store on insert when the document carries none. The
/// generated form is a UUIDv4 in simple hex, but any non-empty string a
/// caller assigns is honored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        ObjectId(Uuid::new_v4().simple().to_string())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        ObjectId(s)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        ObjectId(s.to_string())
    }
}

impl From<&ObjectId> for Value {
    fn from(id: &ObjectId) -> Self {
        Value::String(id.0.clone())
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::String(id.0)
    }
}

/// Handle tying a live object to its baseline registry entry
///
/// Allocated by the change tracker on first registration and stored on the
/// object itself; the registry never holds a reference to the object, so
/// dropping the object (without `forget`) leaves only an orphaned snapshot
/// entry behind, never a leaked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackToken(u64);

impl TrackToken {
    /// Wrap a raw token value
    pub fn new(raw: u64) -> Self {
        TrackToken(raw)
    }

    /// The raw token value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Acknowledgement of a single-document insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertResult {
    /// Identifier under which the document was stored
    pub inserted_id: ObjectId,
    /// Whether the store acknowledged the write
    pub acknowledged: bool,
}

/// Acknowledgement of a single-document update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents matched by the criteria
    pub matched_count: u64,
    /// Documents actually modified
    pub modified_count: u64,
    /// Whether the store acknowledged the write
    pub acknowledged: bool,
}

impl UpdateResult {
    /// Acknowledged result of an update that had nothing to write
    pub fn noop() -> Self {
        UpdateResult {
            matched_count: 0,
            modified_count: 0,
            acknowledged: true,
        }
    }
}

/// Acknowledgement of a single-document delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    /// Documents removed
    pub deleted_count: u64,
    /// Whether the store acknowledged the write
    pub acknowledged: bool,
}
