//! Concurrency layer for docmap
//!
//! This crate implements the cross-process pessimistic lock:
//! - PessimisticLock: acquire/release keyed by resource id, with the store's
//!   unique-index insert as the mutual-exclusion primitive
//! - LockGuard: scoped ownership that releases on drop, including unwind
//!
//! The lock serializes critical sections across independent processes sharing
//! one store; within a single lock instance, re-locking an already-held id
//! returns immediately.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pessimistic;

pub use pessimistic::{LockGuard, PessimisticLock, DEFAULT_LOCK_TIMEOUT, DEFAULT_POLL_INTERVAL};
