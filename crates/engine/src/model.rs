//! Schemaless model over a plain document
//!
//! [`RawModel`] holds its persisted values as a raw document plus the
//! identifier and tracking slots the mapper needs. It is the no-mapping
//! baseline: useful in tests, migrations, and anywhere a dedicated struct
//! per collection is not worth having. [`RawHydrator`] pairs with it as the
//! identity mapping.

use docmap_core::{
    delete_at_path, get_at_path, set_at_path, Document, Hydrator, ObjectId, Persistable,
    TrackToken, Value,
};

/// Typed object whose values are the raw document itself
///
/// The identifier is not part of the values; it lives in its own slot and is
/// managed by the storage layer.
#[derive(Debug, Clone, Default)]
pub struct RawModel {
    values: Document,
    id: Option<ObjectId>,
    token: Option<TrackToken>,
}

impl RawModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model over existing values
    pub fn from_values(values: Document) -> Self {
        RawModel {
            values,
            id: None,
            token: None,
        }
    }

    /// The raw values
    pub fn values(&self) -> &Document {
        &self.values
    }

    /// Mutable access to the raw values
    pub fn values_mut(&mut self) -> &mut Document {
        &mut self.values
    }

    /// Read the value at a dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_at_path(&self.values, path)
    }

    /// Write the value at a dotted path, creating intermediate documents
    pub fn set(&mut self, path: &str, value: Value) {
        set_at_path(&mut self.values, path, value);
    }

    /// Remove the value at a dotted path
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        delete_at_path(&mut self.values, path)
    }

    /// Append to the array at a top-level field.
    ///
    /// Creates the array when the field is missing; a non-array value at the
    /// field is replaced by a one-element array.
    pub fn push(&mut self, field: &str, value: Value) {
        let slot = self
            .values
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(value),
            other => *other = Value::Array(vec![value]),
        }
    }
}

impl Persistable for RawModel {
    fn object_id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn set_object_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn track_token(&self) -> Option<TrackToken> {
        self.token
    }

    fn set_track_token(&mut self, token: TrackToken) {
        self.token = Some(token);
    }
}

/// Identity mapping between documents and [`RawModel`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawHydrator;

impl Hydrator for RawHydrator {
    type Object = RawModel;

    fn hydrate(&self, raw: Document) -> RawModel {
        RawModel::from_values(raw)
    }

    fn dehydrate(&self, object: &RawModel) -> Document {
        object.values.clone()
    }
}
