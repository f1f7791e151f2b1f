//! `$set`-style field merging.

use super::compare::values_equal;
use super::MemoryStoreError;
use bson::{Bson, Document};

/// Validate a set of fields before any document is touched.
pub(crate) fn check_fields(fields: &Document) -> Result<(), MemoryStoreError> {
    if fields.is_empty() {
        return Err(MemoryStoreError::EmptyUpdate);
    }
    for key in fields.keys() {
        if key.starts_with('$') {
            return Err(MemoryStoreError::UnsupportedOperator(key.clone()));
        }
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(MemoryStoreError::PathConflict(key.clone()));
        }
    }
    Ok(())
}

/// Merge `fields` into `document`. Dotted keys address nested documents and
/// create missing ones. Returns whether the document changed.
///
/// On error the document is left untouched.
pub(crate) fn apply_set(document: &mut Document, fields: &Document) -> Result<bool, MemoryStoreError> {
    let mut updated = document.clone();
    let mut changed = false;
    for (path, value) in fields {
        changed |= set_path(&mut updated, path, path, value)?;
    }
    if changed {
        *document = updated;
    }
    Ok(changed)
}

fn set_path(
    document: &mut Document,
    full_path: &str,
    path: &str,
    value: &Bson,
) -> Result<bool, MemoryStoreError> {
    match path.split_once('.') {
        None => {
            if path == "_id" {
                return match document.get("_id") {
                    Some(current) if values_equal(current, value) => Ok(false),
                    _ => Err(MemoryStoreError::ImmutableField("_id".to_string())),
                };
            }
            match document.get(path) {
                Some(current) if current == value => Ok(false),
                _ => {
                    document.insert(path, value.clone());
                    Ok(true)
                }
            }
        }
        Some((head, rest)) => {
            if head == "_id" {
                return Err(MemoryStoreError::ImmutableField(full_path.to_string()));
            }
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }
            match document.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, full_path, rest, value),
                _ => Err(MemoryStoreError::PathConflict(full_path.to_string())),
            }
        }
    }
}
