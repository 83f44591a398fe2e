//! Core types and traits for docmap
//!
//! This crate defines the foundational pieces used throughout the system:
//! - Value: Unified enum for document field values
//! - Document: Insertion-ordered field map (the persisted shape of an object)
//! - UpdateOps: Minimal update patch in the store's operator vocabulary
//! - ObjectId / TrackToken: Identifier newtypes
//! - Error: Error type hierarchy
//! - Traits: Collaborator seams (Collection, CollectionFactory, Hydrator, Persistable)
//! - Dotted-path helpers: get_at_path, set_at_path, delete_at_path

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod path;
pub mod traits;
pub mod types;
pub mod update;
pub mod value;

pub use error::{Error, Result};
pub use path::{delete_at_path, get_at_path, set_at_path};
pub use traits::{Collection, CollectionFactory, DocumentCursor, Hydrator, Persistable};
pub use types::{DeleteResult, InsertResult, ObjectId, TrackToken, UpdateResult, ID_FIELD};
pub use update::{PushEach, UpdateOps};
pub use value::{Document, Value};
