//! Store backend for docmap
//!
//! This crate implements the collection seam of `docmap-core` with:
//! - MemoryCollection: RwLock over an insertion-ordered id → document map
//! - MemoryDatabase: collection factory keyed by logical name
//! - Criteria matching: dotted-path equality filters
//!
//! The memory backend gives the same per-call atomicity contract a remote
//! document store would: each insert/update/delete runs under one write lock,
//! and inserting an existing identifier fails with a duplicate-key error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod criteria;
pub mod memory;

pub use criteria::matches;
pub use memory::{MemoryCollection, MemoryDatabase};
