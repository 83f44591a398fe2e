//! Dotted-path access to document trees
//!
//! Fields inside nested documents are addressed with dotted paths (`a.b.c`).
//! Reads resolve array index segments (`items.0.name`); writes create missing
//! intermediate documents and replace non-document intermediates, so setting
//! `a.b` on `{"a": "scalar"}` yields `{"a": {"b": ...}}`.

use crate::value::{Document, Value};

/// Resolve a dotted path inside a document.
///
/// Returns `None` when any segment is missing, when an array segment is not a
/// valid index, or when the path descends into a scalar.
pub fn get_at_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }

    Some(current)
}

/// Set the value at a dotted path, creating intermediate documents as needed.
///
/// An intermediate that exists but is not a document is replaced by one; the
/// prior value at that position is discarded.
pub fn set_at_path(document: &mut Document, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = match segments.pop() {
        Some(last) => last,
        None => return,
    };

    let mut current = document;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Document::new()));
        if !slot.is_object() {
            *slot = Value::Object(Document::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }

    current.insert(last.to_string(), value);
}

/// Remove the value at a dotted path.
///
/// Returns the removed value, or `None` when the path does not resolve.
/// Intermediate segments must be documents; array elements cannot be removed
/// through this helper.
pub fn delete_at_path(document: &mut Document, path: &str) -> Option<Value> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop()?;

    let mut current = document;
    for segment in segments {
        current = match current.get_mut(segment) {
            Some(Value::Object(map)) => map,
            _ => return None,
        };
    }

    current.shift_remove(last)
}
