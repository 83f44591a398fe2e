//! Change-diff engine
//!
//! Computes the minimal operator patch that moves a stored document from a
//! registered baseline snapshot to the object's current snapshot, at
//! top-level field granularity: a change anywhere inside a nested field
//! replaces that whole field, never individual leaves.
//!
//! The [`ChangeTracker`] keeps one baseline per live tracked object, keyed by
//! an identity token stored on the object itself. Two structurally identical
//! objects are tracked independently, and the registry holds snapshots only,
//! never the objects.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use docmap_core::{Document, Persistable, TrackToken, UpdateOps, Value, ID_FIELD};

/// Compute the minimal update patch from `original` to `current`.
///
/// Per top-level field (the identifier field is always skipped):
/// - absent in the baseline, non-null now: whole-value `$set`, whatever the
///   shape (a brand-new array is a `$set`, never a `$push`)
/// - present in the baseline, null or absent now: `$unset`
/// - both arrays and the baseline is an exact prefix of the current value:
///   `$push` of the appended tail under `$each`
/// - otherwise unequal (including any scalar/array/document type change):
///   whole-value `$set`
/// - deeply equal: nothing
///
/// With an empty `original` (object never registered) every present field
/// degrades to a whole-value `$set`.
pub fn changes(current: &Document, original: &Document) -> UpdateOps {
    let mut ops = UpdateOps::new();

    for (field, value) in current {
        if field == ID_FIELD {
            continue;
        }
        match original.get(field) {
            None => {
                // a field born null was never persisted; nothing to write
                if !value.is_null() {
                    ops.set(field.clone(), value.clone());
                }
            }
            Some(original_value) => {
                if value.is_null() {
                    if !original_value.is_null() {
                        ops.unset(field.clone());
                    }
                } else if let (Value::Array(old_items), Value::Array(new_items)) =
                    (original_value, value)
                {
                    if new_items.len() > old_items.len()
                        && new_items[..old_items.len()] == old_items[..]
                    {
                        ops.push_each(field.clone(), new_items[old_items.len()..].to_vec());
                    } else if old_items != new_items {
                        ops.set(field.clone(), value.clone());
                    }
                } else if original_value != value {
                    ops.set(field.clone(), value.clone());
                }
            }
        }
    }

    for field in original.keys() {
        if field == ID_FIELD {
            continue;
        }
        if !current.contains_key(field) {
            ops.unset(field.clone());
        }
    }

    ops
}

/// Per-object baseline registry
///
/// Associates each tracked object with the snapshot of its last persisted
/// state. The association is by identity, not value: the token minted on
/// first registration lives on the object, the snapshot lives here, and
/// nothing keeps the object alive. Entries are overwritten on
/// re-registration and dropped only by [`forget`](Self::forget); cleanup
/// ownership rests with whoever holds the object.
pub struct ChangeTracker {
    baselines: DashMap<TrackToken, Document>,
    next_token: AtomicU64,
}

impl ChangeTracker {
    /// Create an empty registry
    pub fn new() -> Self {
        ChangeTracker {
            baselines: DashMap::new(),
            next_token: AtomicU64::new(1),
        }
    }

    /// Store `snapshot` as the baseline for `object`, overwriting any prior
    /// baseline. Mints and attaches an identity token on first registration.
    pub fn register(&self, object: &mut dyn Persistable, snapshot: Document) {
        let token = match object.track_token() {
            Some(token) => token,
            None => {
                let token = TrackToken::new(self.next_token.fetch_add(1, Ordering::Relaxed));
                object.set_track_token(token);
                token
            }
        };
        self.baselines.insert(token, snapshot);
    }

    /// The registered baseline of `object`, or an empty document when the
    /// object was never registered
    pub fn original_values(&self, object: &dyn Persistable) -> Document {
        object
            .track_token()
            .and_then(|token| self.baselines.get(&token).map(|entry| entry.value().clone()))
            .unwrap_or_default()
    }

    /// Drop the baseline entry of `object`, if any
    pub fn forget(&self, object: &dyn Persistable) {
        if let Some(token) = object.track_token() {
            self.baselines.remove(&token);
        }
    }

    /// True when `object` has a registered baseline
    pub fn is_tracked(&self, object: &dyn Persistable) -> bool {
        object
            .track_token()
            .map_or(false, |token| self.baselines.contains_key(&token))
    }

    /// Number of registered baselines
    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}
