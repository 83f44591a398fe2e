//! In-memory collection backend
//!
//! This module implements the `Collection` seam using:
//! - `IndexMap<String, Document>` keyed by identifier, preserving insert order
//! - `parking_lot::RwLock` for thread-safe access
//! - Map-key uniqueness as the identifier's unique constraint
//!
//! # Design Notes
//!
//! - **Insert-if-absent is atomic**: the existence check and the insert run
//!   under one write lock, which is what makes this backend a valid base for
//!   the pessimistic lock.
//! - **Identifiers are strings**: a caller-provided `_id` must be a string
//!   value; id-less documents get a store-generated `ObjectId`.
//! - **`_id` is immutable**: update patches touching the identifier field are
//!   rejected as command errors, matching the backing-store contract.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use docmap_core::{
    Collection, CollectionFactory, DeleteResult, Document, DocumentCursor, Error, InsertResult,
    ObjectId, Result, UpdateOps, UpdateResult, Value, ID_FIELD,
};

use crate::criteria::matches;

/// Thread-safe in-memory document collection
pub struct MemoryCollection {
    name: String,
    /// Identifier → document, in insertion order
    documents: RwLock<IndexMap<String, Document>>,
    /// Fields with a declared unique index
    unique_indexes: RwLock<HashSet<String>>,
}

impl MemoryCollection {
    /// Create a new empty collection under `name`
    pub fn new(name: impl Into<String>) -> Self {
        MemoryCollection {
            name: name.into(),
            documents: RwLock::new(IndexMap::new()),
            unique_indexes: RwLock::new(HashSet::new()),
        }
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// True when no documents are stored
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// True when a unique index was declared on `field`
    pub fn has_unique_index(&self, field: &str) -> bool {
        self.unique_indexes.read().contains(field)
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_one(&self, mut document: Document) -> Result<InsertResult> {
        let id = match document.get(ID_FIELD) {
            Some(Value::String(s)) => ObjectId::from(s.as_str()),
            Some(other) => {
                return Err(Error::Command(format!(
                    "identifier must be a string, got {}",
                    other.type_name()
                )));
            }
            None => {
                let id = ObjectId::new();
                document.shift_insert(0, ID_FIELD.to_string(), Value::from(&id));
                id
            }
        };

        let mut documents = self.documents.write();
        if documents.contains_key(id.as_str()) {
            return Err(Error::DuplicateKey {
                collection: self.name.clone(),
                id: id.to_string(),
            });
        }
        documents.insert(id.to_string(), document);
        debug!(collection = %self.name, id = %id, "inserted document");

        Ok(InsertResult {
            inserted_id: id,
            acknowledged: true,
        })
    }

    fn update_one(&self, criteria: &Document, update: &UpdateOps) -> Result<UpdateResult> {
        if update.touches(ID_FIELD) {
            return Err(Error::Command(format!(
                "update operators may not modify \"{ID_FIELD}\""
            )));
        }

        let mut documents = self.documents.write();
        for document in documents.values_mut() {
            if !matches(document, criteria) {
                continue;
            }
            let before = document.clone();
            update.apply(document)?;
            let modified = u64::from(*document != before);
            debug!(collection = %self.name, modified, "updated document");
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: modified,
                acknowledged: true,
            });
        }

        Ok(UpdateResult {
            matched_count: 0,
            modified_count: 0,
            acknowledged: true,
        })
    }

    fn delete_one(&self, criteria: &Document) -> Result<DeleteResult> {
        let mut documents = self.documents.write();
        let key = documents
            .iter()
            .find(|(_, document)| matches(document, criteria))
            .map(|(key, _)| key.clone());

        let deleted = match key {
            Some(key) => {
                documents.shift_remove(&key);
                debug!(collection = %self.name, id = %key, "deleted document");
                1
            }
            None => 0,
        };

        Ok(DeleteResult {
            deleted_count: deleted,
            acknowledged: true,
        })
    }

    fn find(&self, criteria: &Document) -> Result<DocumentCursor> {
        let documents = self.documents.read();
        let found: Vec<Document> = documents
            .values()
            .filter(|document| matches(document, criteria))
            .cloned()
            .collect();
        Ok(Box::new(found.into_iter()))
    }

    fn count(&self, criteria: &Document) -> Result<u64> {
        let documents = self.documents.read();
        Ok(documents
            .values()
            .filter(|document| matches(document, criteria))
            .count() as u64)
    }

    fn create_unique_index(&self, field: &str) -> Result<()> {
        if field != ID_FIELD {
            return Err(Error::Command(format!(
                "only \"{ID_FIELD}\" supports a unique index in the memory backend"
            )));
        }
        self.unique_indexes.write().insert(field.to_string());
        Ok(())
    }
}

/// Collection factory over named in-memory collections
///
/// Handles are shared: every `collection("name")` call returns the same
/// underlying collection, so independent mapper and lock instances built from
/// one database observe each other's writes.
#[derive(Default)]
pub struct MemoryDatabase {
    collections: DashMap<String, Arc<MemoryCollection>>,
}

impl MemoryDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionFactory for MemoryDatabase {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::new(name)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        match Value::from(v) {
            Value::Object(d) => d,
            other => panic!("expected object, got {}", other.type_name()),
        }
    }

    fn id_criteria(id: &ObjectId) -> Document {
        let mut criteria = Document::new();
        criteria.insert(ID_FIELD.to_string(), Value::from(id));
        criteria
    }

    #[test]
    fn test_insert_generates_id_as_first_field() {
        let collection = MemoryCollection::new("test");
        let result = collection.insert_one(doc(json!({"foo": "bar"}))).unwrap();
        assert!(result.acknowledged);

        let stored = collection.find_one(&id_criteria(&result.inserted_id)).unwrap().unwrap();
        let keys: Vec<&str> = stored.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys[0], ID_FIELD);
        assert_eq!(stored.get("foo"), Some(&Value::from("bar")));
    }

    #[test]
    fn test_insert_honors_provided_id() {
        let collection = MemoryCollection::new("test");
        let result = collection
            .insert_one(doc(json!({"_id": "fixed", "foo": 1})))
            .unwrap();
        assert_eq!(result.inserted_id, ObjectId::from("fixed"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_insert_duplicate_id_fails() {
        let collection = MemoryCollection::new("locks");
        collection.insert_one(doc(json!({"_id": "1"}))).unwrap();
        let err = collection.insert_one(doc(json!({"_id": "1"}))).unwrap_err();
        assert!(err.is_duplicate_key());
        assert!(err.to_string().contains("\"locks\""));
    }

    #[test]
    fn test_insert_non_string_id_fails() {
        let collection = MemoryCollection::new("test");
        let err = collection.insert_one(doc(json!({"_id": 42}))).unwrap_err();
        assert!(matches!(err, Error::Command(_)));
    }

    #[test]
    fn test_update_one_applies_patch() {
        let collection = MemoryCollection::new("test");
        let result = collection
            .insert_one(doc(json!({"foo": "old", "gone": 1})))
            .unwrap();

        let mut ops = UpdateOps::new();
        ops.set("foo", Value::from("new"));
        ops.unset("gone");
        let update = collection
            .update_one(&id_criteria(&result.inserted_id), &ops)
            .unwrap();
        assert_eq!(update.matched_count, 1);
        assert_eq!(update.modified_count, 1);

        let stored = collection.find_one(&id_criteria(&result.inserted_id)).unwrap().unwrap();
        assert_eq!(stored.get("foo"), Some(&Value::from("new")));
        assert!(stored.get("gone").is_none());
    }

    #[test]
    fn test_update_one_without_match() {
        let collection = MemoryCollection::new("test");
        let mut ops = UpdateOps::new();
        ops.set("foo", Value::Int(1));
        let update = collection
            .update_one(&doc(json!({"_id": "none"})), &ops)
            .unwrap();
        assert_eq!(update.matched_count, 0);
        assert_eq!(update.modified_count, 0);
    }

    #[test]
    fn test_update_one_rejects_id_mutation() {
        let collection = MemoryCollection::new("test");
        collection.insert_one(doc(json!({"_id": "1"}))).unwrap();
        let mut ops = UpdateOps::new();
        ops.set(ID_FIELD, Value::from("2"));
        let err = collection.update_one(&doc(json!({"_id": "1"})), &ops).unwrap_err();
        assert!(matches!(err, Error::Command(_)));
    }

    #[test]
    fn test_delete_one() {
        let collection = MemoryCollection::new("test");
        let result = collection.insert_one(doc(json!({"foo": 1}))).unwrap();

        let delete = collection.delete_one(&id_criteria(&result.inserted_id)).unwrap();
        assert_eq!(delete.deleted_count, 1);
        assert!(collection.is_empty());

        let delete = collection.delete_one(&id_criteria(&result.inserted_id)).unwrap();
        assert_eq!(delete.deleted_count, 0);
    }

    #[test]
    fn test_find_preserves_insert_order() {
        let collection = MemoryCollection::new("test");
        collection.insert_one(doc(json!({"n": 1}))).unwrap();
        collection.insert_one(doc(json!({"n": 2}))).unwrap();
        collection.insert_one(doc(json!({"n": 3}))).unwrap();

        let ns: Vec<i64> = collection
            .find(&Document::new())
            .unwrap()
            .filter_map(|d| d.get("n").and_then(Value::as_int))
            .collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[test]
    fn test_find_with_dotted_criteria() {
        let collection = MemoryCollection::new("test");
        collection
            .insert_one(doc(json!({"address": {"city": "Kyiv"}})))
            .unwrap();
        collection
            .insert_one(doc(json!({"address": {"city": "Lviv"}})))
            .unwrap();

        let found: Vec<Document> = collection
            .find(&doc(json!({"address.city": "Kyiv"})))
            .unwrap()
            .collect();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_count() {
        let collection = MemoryCollection::new("test");
        collection.insert_one(doc(json!({"kind": "a"}))).unwrap();
        collection.insert_one(doc(json!({"kind": "a"}))).unwrap();
        collection.insert_one(doc(json!({"kind": "b"}))).unwrap();
        assert_eq!(collection.count(&Document::new()).unwrap(), 3);
        assert_eq!(collection.count(&doc(json!({"kind": "a"}))).unwrap(), 2);
    }

    #[test]
    fn test_create_unique_index_idempotent() {
        let collection = MemoryCollection::new("locks");
        assert!(!collection.has_unique_index(ID_FIELD));
        collection.create_unique_index(ID_FIELD).unwrap();
        collection.create_unique_index(ID_FIELD).unwrap();
        assert!(collection.has_unique_index(ID_FIELD));
        assert!(collection.create_unique_index("other").is_err());
    }

    #[test]
    fn test_factory_returns_shared_handles() {
        let database = MemoryDatabase::new();
        let a = database.collection("orders");
        let b = database.collection("orders");
        a.insert_one(doc(json!({"n": 1}))).unwrap();
        assert_eq!(b.count(&Document::new()).unwrap(), 1);

        let other = database.collection("users");
        assert_eq!(other.count(&Document::new()).unwrap(), 0);
    }
}
