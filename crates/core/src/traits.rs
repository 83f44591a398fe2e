//! Collaborator seams consumed by the mapper
//!
//! The mapper core never talks to a concrete store, model type, or mapping
//! scheme; it goes through these traits:
//!
//! - [`Collection`]: One operable document collection. The atomicity contract
//!   is per-call: a single insert either fully lands or fails, and an insert
//!   of an existing identifier fails with a duplicate-key error.
//! - [`CollectionFactory`]: Resolves a logical collection name to a handle.
//! - [`Hydrator`]: Maps raw documents to typed objects and back.
//! - [`Persistable`]: Identifier and baseline-token accessors on a typed
//!   object.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{DeleteResult, InsertResult, ObjectId, TrackToken, UpdateResult};
use crate::update::UpdateOps;
use crate::value::Document;

/// Forward-only stream of documents produced by a query.
///
/// Finite and not restartable; re-querying requires a fresh `find` call.
pub type DocumentCursor = Box<dyn Iterator<Item = Document> + Send>;

/// One operable document collection
///
/// Implementations must give per-document atomicity for each call and enforce
/// a uniqueness constraint on the identifier field; the pessimistic lock is
/// built entirely on the insert-if-absent behavior of [`Collection::insert_one`].
pub trait Collection: Send + Sync {
    /// Logical name of this collection
    fn name(&self) -> &str;

    /// Insert a single document.
    ///
    /// A document without an identifier field gets a store-generated
    /// [`ObjectId`]. Inserting an identifier that already exists fails with
    /// [`Error::DuplicateKey`](crate::Error::DuplicateKey).
    fn insert_one(&self, document: Document) -> Result<InsertResult>;

    /// Apply an update patch to the first document matching `criteria`
    fn update_one(&self, criteria: &Document, update: &UpdateOps) -> Result<UpdateResult>;

    /// Remove the first document matching `criteria`
    fn delete_one(&self, criteria: &Document) -> Result<DeleteResult>;

    /// Query documents matching `criteria`
    fn find(&self, criteria: &Document) -> Result<DocumentCursor>;

    /// Query a single document matching `criteria`
    fn find_one(&self, criteria: &Document) -> Result<Option<Document>> {
        let mut cursor = self.find(criteria)?;
        Ok(cursor.next())
    }

    /// Count documents matching `criteria`
    fn count(&self, criteria: &Document) -> Result<u64>;

    /// Ensure a unique index exists on `field`; idempotent
    fn create_unique_index(&self, field: &str) -> Result<()>;
}

/// Resolves logical collection names to operable handles
pub trait CollectionFactory: Send + Sync {
    /// Get or create the collection registered under `name`
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}

/// Maps between raw documents and typed objects
///
/// The identifier field is not part of the mapped values; the storage layer
/// strips it before hydration and carries it through [`Persistable`].
pub trait Hydrator {
    /// The typed object this hydrator produces
    type Object: Persistable;

    /// Produce a fresh, empty object
    fn create(&self) -> Self::Object {
        self.hydrate(Document::new())
    }

    /// Build a typed object from its raw persisted values
    fn hydrate(&self, raw: Document) -> Self::Object;

    /// Extract the raw persisted values of a typed object
    fn dehydrate(&self, object: &Self::Object) -> Document;
}

/// Identifier and baseline-token storage on a typed object
pub trait Persistable {
    /// The assigned document identifier, if the object was ever persisted
    fn object_id(&self) -> Option<&ObjectId>;

    /// Assign the document identifier
    fn set_object_id(&mut self, id: ObjectId);

    /// The baseline-registry token, if the object is tracked
    fn track_token(&self) -> Option<TrackToken>;

    /// Attach a baseline-registry token
    fn set_track_token(&mut self, token: TrackToken);
}
