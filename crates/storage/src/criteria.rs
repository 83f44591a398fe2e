//! Criteria matching for queries
//!
//! Criteria are plain documents mapping dotted field paths to expected
//! values: `{"_id": "..."}`, `{"address.city": "Kyiv"}`. A document matches
//! when every path resolves to a structurally equal value. The empty criteria
//! document matches everything.
//!
//! Equality is the only supported predicate; richer query operators belong to
//! the backing store's own query language, not this layer.

use docmap_core::{get_at_path, Document};

/// True when `document` satisfies every path → value pair in `criteria`
pub fn matches(document: &Document, criteria: &Document) -> bool {
    criteria
        .iter()
        .all(|(path, expected)| get_at_path(document, path) == Some(expected))
}
