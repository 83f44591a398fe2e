//! Update patches in the store's operator vocabulary
//!
//! An [`UpdateOps`] carries the minimal set of update operators needed to move
//! a stored document from one state to another:
//!
//! - `$set`: whole-value replacement of a top-level field
//! - `$unset`: field removal (empty-string markers)
//! - `$push` with `$each`: elements appended to the tail of an array field
//!
//! The serialized form is bit-exact with the backing store's update command:
//! empty operator groups are omitted entirely, so a no-op patch serializes to
//! `{}`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{Document, Value};

/// Appended-elements wrapper for the `$push` operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEach {
    /// Elements appended to the array tail, in order
    #[serde(rename = "$each")]
    pub each: Vec<Value>,
}

/// Minimal update patch grouped by operator
///
/// Produced by the change-diff engine and applied verbatim by the store.
/// Only non-empty groups appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOps {
    /// Top-level field replacements
    #[serde(rename = "$set", default, skip_serializing_if = "IndexMap::is_empty")]
    pub set: Document,

    /// Removed fields, marked with empty strings
    #[serde(rename = "$unset", default, skip_serializing_if = "IndexMap::is_empty")]
    pub unset: IndexMap<String, String>,

    /// Appended array tails
    #[serde(rename = "$push", default, skip_serializing_if = "IndexMap::is_empty")]
    pub push: IndexMap<String, PushEach>,
}

impl UpdateOps {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no operator group has any entry
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty() && self.push.is_empty()
    }

    /// Record a whole-value replacement for `field`
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.set.insert(field.into(), value);
    }

    /// Record a removal of `field`
    pub fn unset(&mut self, field: impl Into<String>) {
        self.unset.insert(field.into(), String::new());
    }

    /// Record `values` appended to the tail of the array at `field`
    pub fn push_each(&mut self, field: impl Into<String>, values: Vec<Value>) {
        self.push.insert(field.into(), PushEach { each: values });
    }

    /// True when any group mentions `field`
    pub fn touches(&self, field: &str) -> bool {
        self.set.contains_key(field)
            || self.unset.contains_key(field)
            || self.push.contains_key(field)
    }

    /// Apply this patch to a document with store semantics.
    ///
    /// `$push` onto a missing field creates the array; `$push` onto a
    /// non-array field is a command error, matching the backing store.
    pub fn apply(&self, document: &mut Document) -> Result<()> {
        for (field, value) in &self.set {
            document.insert(field.clone(), value.clone());
        }
        for field in self.unset.keys() {
            document.shift_remove(field);
        }
        for (field, push) in &self.push {
            match document.get_mut(field) {
                None => {
                    document.insert(field.clone(), Value::Array(push.each.clone()));
                }
                Some(Value::Array(items)) => {
                    items.extend(push.each.iter().cloned());
                }
                Some(other) => {
                    return Err(Error::Command(format!(
                        "cannot push onto non-array field \"{}\" of type {}",
                        field,
                        other.type_name()
                    )));
                }
            }
        }
        Ok(())
    }
}
