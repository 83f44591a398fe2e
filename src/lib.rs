//! docmap - data mapper for document stores
//!
//! docmap persists plain objects as nested documents, writes updates as
//! minimal operator patches (`$set` / `$unset` / `$push` + `$each`) computed
//! against a per-object baseline, and serializes cross-process critical
//! sections with a pessimistic lock built on the store's unique-index insert.
//!
//! # Quick Start
//!
//! ```
//! use docmap::{MemoryDatabase, RawHydrator, Storage, Value};
//!
//! let database = MemoryDatabase::new();
//! let storage = Storage::new("orders", &database, RawHydrator);
//!
//! // create, fill, persist
//! let mut order = storage.create();
//! order.set("status", Value::from("new"));
//! storage.insert(&mut order)?;
//!
//! // mutate in place; update writes only the diff
//! order.set("status", Value::from("paid"));
//! storage.update(&mut order)?;
//! # Ok::<(), docmap::Error>(())
//! ```
//!
//! # Architecture
//!
//! The facade re-exports four crates: `docmap-core` (values, patches, errors,
//! collaborator seams), `docmap-storage` (in-memory collection backend),
//! `docmap-concurrency` (pessimistic lock), and `docmap-engine` (change
//! tracking and the [`Storage`] orchestrator).

pub use docmap_concurrency::*;
pub use docmap_core::*;
pub use docmap_engine::*;
pub use docmap_storage::*;
