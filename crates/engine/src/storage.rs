//! Storage orchestrator
//!
//! [`Storage`] composes the collaborator seams into the mapper workflow:
//! hydration maps documents to typed objects, the change tracker supplies
//! baselines, the diff engine turns mutations into operator patches, and the
//! optional pessimistic lock serializes guarded read-modify-write cycles.
//!
//! Reads register what they return: every object coming out of `find` /
//! `find_one` already has its baseline snapshot in the tracker, so a later
//! `update` writes only what the caller changed.

use std::sync::Arc;

use tracing::{debug, trace};

use docmap_concurrency::PessimisticLock;
use docmap_core::{
    Collection, CollectionFactory, DeleteResult, Document, Error, Hydrator, InsertResult,
    ObjectId, Persistable, Result, UpdateResult, Value, ID_FIELD,
};

use crate::changes::{changes, ChangeTracker};

/// Data mapper over one collection
///
/// Cheap to construct; holds the collection handle, the hydrator, its own
/// baseline registry, and optionally a pessimistic lock for
/// [`lock`](Self::lock).
pub struct Storage<H: Hydrator> {
    collection: Arc<dyn Collection>,
    hydrator: H,
    tracker: ChangeTracker,
    lock: Option<Arc<PessimisticLock>>,
}

impl<H: Hydrator> Storage<H> {
    /// Create a mapper over the collection registered under `name`
    pub fn new(name: &str, factory: &dyn CollectionFactory, hydrator: H) -> Self {
        Storage {
            collection: factory.collection(name),
            hydrator,
            tracker: ChangeTracker::new(),
            lock: None,
        }
    }

    /// Create a mapper with a pessimistic lock enabling [`lock`](Self::lock)
    pub fn with_lock(
        name: &str,
        factory: &dyn CollectionFactory,
        hydrator: H,
        lock: Arc<PessimisticLock>,
    ) -> Self {
        Storage {
            collection: factory.collection(name),
            hydrator,
            tracker: ChangeTracker::new(),
            lock: Some(lock),
        }
    }

    /// The underlying collection handle
    pub fn collection(&self) -> &dyn Collection {
        self.collection.as_ref()
    }

    /// Produce a new, unpersisted object with empty values.
    ///
    /// Does not touch the store.
    pub fn create(&self) -> H::Object {
        self.hydrator.create()
    }

    /// Persist a new object.
    ///
    /// A pre-assigned object id is honored; otherwise the store generates
    /// one, and either way the resulting id is written back onto the object.
    /// The inserted snapshot becomes the object's baseline.
    pub fn insert(&self, model: &mut H::Object) -> Result<InsertResult> {
        let snapshot = self.hydrator.dehydrate(model);

        let mut document = snapshot.clone();
        if let Some(id) = model.object_id() {
            document.shift_insert(0, ID_FIELD.to_string(), Value::from(id));
        }

        let result = self.collection.insert_one(document)?;
        debug!(collection = %self.collection.name(), id = %result.inserted_id, "inserted model");

        model.set_object_id(result.inserted_id.clone());
        self.tracker.register(model, snapshot);
        Ok(result)
    }

    /// Persist the changes made to `model` since its baseline.
    ///
    /// An empty diff is a valid no-op, acknowledged without touching the
    /// store. An object that was never registered is written as a
    /// whole-document patch. Either way the current snapshot becomes the new
    /// baseline.
    pub fn update(&self, model: &mut H::Object) -> Result<UpdateResult> {
        let id = self.require_id(model)?;
        let snapshot = self.hydrator.dehydrate(model);
        let original = self.tracker.original_values(model);

        let ops = changes(&snapshot, &original);
        if ops.is_empty() {
            trace!(collection = %self.collection.name(), id = %id, "update without changes");
            self.tracker.register(model, snapshot);
            return Ok(UpdateResult::noop());
        }

        let result = self.collection.update_one(&id_criteria(&id), &ops)?;
        debug!(collection = %self.collection.name(), id = %id, "updated model");

        self.tracker.register(model, snapshot);
        Ok(result)
    }

    /// Remove the persisted document of `model` and forget its baseline
    pub fn delete(&self, model: &H::Object) -> Result<DeleteResult> {
        let id = self.require_id(model)?;
        let result = self.collection.delete_one(&id_criteria(&id))?;
        debug!(collection = %self.collection.name(), id = %id, "deleted model");

        self.tracker.forget(model);
        Ok(result)
    }

    /// Query objects matching `criteria`.
    ///
    /// Documents are hydrated and baseline-registered one by one as the
    /// iterator is consumed. The sequence is finite and forward-only;
    /// re-querying requires a fresh call.
    pub fn find<'a>(
        &'a self,
        criteria: &Document,
    ) -> Result<impl Iterator<Item = H::Object> + 'a> {
        let cursor = self.collection.find(criteria)?;
        Ok(cursor.map(move |document| self.revive(document)))
    }

    /// Query a single object matching `criteria`, baseline-registered on hit
    pub fn find_one(&self, criteria: &Document) -> Result<Option<H::Object>> {
        Ok(self.collection.find_one(criteria)?.map(|document| self.revive(document)))
    }

    /// Count documents matching `criteria` without hydrating them
    pub fn count(&self, criteria: &Document) -> Result<u64> {
        self.collection.count(criteria)
    }

    /// Run `operation` on a freshly loaded copy of the document under the
    /// pessimistic lock for `id`.
    ///
    /// Blocks for the lock (default timeout), reloads the document from the
    /// store, and releases the lock on every exit path - normal return, error
    /// return, and unwind. Mutations are not persisted automatically; call
    /// [`update`](Self::update) inside the operation.
    pub fn lock<F, R>(&self, id: &ObjectId, operation: F) -> Result<R>
    where
        F: FnOnce(&mut H::Object, &Self) -> Result<R>,
    {
        let lock = self.lock.as_ref().ok_or_else(|| {
            Error::InvalidOperation(format!(
                "collection \"{}\" has no pessimistic lock configured",
                self.collection.name()
            ))
        })?;

        let _guard = lock.acquire(id.as_str())?;
        let mut model = self
            .find_one(&id_criteria(id))?
            .ok_or_else(|| Error::ModelNotFound { id: id.to_string() })?;

        operation(&mut model, self)
    }

    /// Turn a raw document into a tracked, identified object
    fn revive(&self, mut document: Document) -> H::Object {
        let id = match document.shift_remove(ID_FIELD) {
            Some(Value::String(s)) => Some(ObjectId::from(s)),
            _ => None,
        };

        let snapshot = document.clone();
        let mut model = self.hydrator.hydrate(document);
        if let Some(id) = id {
            model.set_object_id(id);
        }
        self.tracker.register(&mut model, snapshot);
        model
    }

    fn require_id(&self, model: &H::Object) -> Result<ObjectId> {
        model.object_id().cloned().ok_or_else(|| {
            Error::InvalidOperation(
                "model has no identifier assigned; insert it first".to_string(),
            )
        })
    }
}

fn id_criteria(id: &ObjectId) -> Document {
    let mut criteria = Document::new();
    criteria.insert(ID_FIELD.to_string(), Value::from(id));
    criteria
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawHydrator, RawModel};
    use docmap_core::Persistable;
    use docmap_storage::MemoryDatabase;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        match Value::from(v) {
            Value::Object(d) => d,
            other => panic!("expected object, got {}", other.type_name()),
        }
    }

    fn storage(database: &MemoryDatabase) -> Storage<RawHydrator> {
        Storage::new("storage_test", database, RawHydrator)
    }

    #[test]
    fn test_revive_strips_identifier_and_registers() {
        let database = MemoryDatabase::new();
        let storage = storage(&database);

        let mut model = RawModel::from_values(doc(json!({"foo": "fooVal"})));
        storage.insert(&mut model).unwrap();
        let id = model.object_id().unwrap().clone();

        let found = storage.find_one(&id_criteria(&id)).unwrap().unwrap();
        assert!(found.values().get(ID_FIELD).is_none());
        assert_eq!(found.object_id(), Some(&id));
        assert!(found.track_token().is_some());

        // a registered, unmodified model updates as a no-op
        let mut found = found;
        let result = storage.update(&mut found).unwrap();
        assert_eq!(result, UpdateResult::noop());
    }

    #[test]
    fn test_update_without_id_is_invalid() {
        let database = MemoryDatabase::new();
        let storage = storage(&database);

        let mut model = RawModel::new();
        let err = storage.update(&mut model).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }

    #[test]
    fn test_update_of_unregistered_model_writes_whole_document() {
        let database = MemoryDatabase::new();
        let first = storage(&database);

        let mut model = RawModel::from_values(doc(json!({"foo": "fooVal"})));
        first.insert(&mut model).unwrap();
        let id = model.object_id().unwrap().clone();

        // fresh mapper instance: same collection, empty baseline registry
        let second = storage(&database);
        let mut detached = RawModel::from_values(doc(json!({"foo": "newVal", "extra": 1})));
        detached.set_object_id(id.clone());
        second.update(&mut detached).unwrap();

        let found = second.find_one(&id_criteria(&id)).unwrap().unwrap();
        assert_eq!(
            Value::Object(found.values().clone()),
            Value::from(json!({"foo": "newVal", "extra": 1}))
        );
    }

    #[test]
    fn test_insert_honors_preassigned_id() {
        let database = MemoryDatabase::new();
        let storage = storage(&database);

        let mut model = RawModel::new();
        model.set_object_id(ObjectId::from("fixed"));
        let result = storage.insert(&mut model).unwrap();
        assert_eq!(result.inserted_id, ObjectId::from("fixed"));

        let mut clash = RawModel::new();
        clash.set_object_id(ObjectId::from("fixed"));
        assert!(storage.insert(&mut clash).unwrap_err().is_duplicate_key());
    }

    #[test]
    fn test_lock_requires_configuration() {
        let database = MemoryDatabase::new();
        let storage = storage(&database);

        let err = storage
            .lock(&ObjectId::from("1"), |_model, _storage| Ok(()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }
}
