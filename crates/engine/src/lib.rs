//! Mapper engine for docmap
//!
//! This crate composes the core seams into the data-mapper workflow:
//! - changes(): minimal update patch between two snapshots
//! - ChangeTracker: per-object baseline registry keyed by identity token
//! - Storage: create / insert / update / delete / find / find_one / lock
//! - RawModel / RawHydrator: schemaless model over a plain document
//!
//! The update path is: load or create a typed object, register its snapshot
//! as baseline, mutate in place, then `update` writes only the computed
//! operator patch and re-registers the new baseline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod changes;
pub mod model;
pub mod storage;

pub use changes::{changes, ChangeTracker};
pub use model::{RawHydrator, RawModel};
pub use storage::Storage;
