//! Merging parsed configuration documents into one logical document.
//!
//! Documents are given highest precedence first. For every key:
//! - scalars: the first document that defines the key wins outright
//! - sequences: concatenated in document order, duplicates kept
//! - tables: merged one level deep, keys already present are kept
//!
//! Null values contribute nothing, so `channels:` with no entries does not
//! shadow a later file's channel list.

use crate::keys::{canonical_key, is_alias};
use config::{Map, Value, ValueKind};
use std::path::Path;

/// Merge `documents`, ordered highest precedence first.
pub fn merge_documents<I>(documents: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut merged = Map::new();

    for document in documents {
        for (key, value) in document {
            if matches!(value.kind, ValueKind::Nil) {
                continue;
            }
            match merged.get_mut(&key) {
                Some(current) => merge_value(current, value),
                None => {
                    merged.insert(key, value);
                }
            }
        }
    }

    merged
}

fn merge_value(current: &mut Value, lower: Value) {
    match (&mut current.kind, lower.kind) {
        (ValueKind::Array(items), ValueKind::Array(more)) => items.extend(more),
        (ValueKind::Table(table), ValueKind::Table(more)) => {
            for (key, value) in more {
                table.entry(key).or_insert(value);
            }
        }
        // Scalar or mismatched shapes: the higher-precedence value stands.
        _ => {}
    }
}

/// Rewrite alias keys (`channel`, `yes`, ...) to their canonical names.
///
/// When a document sets both spellings, the canonical key wins unless it is
/// null.
pub(crate) fn canonicalize(mut document: Map<String, Value>, path: &Path) -> Map<String, Value> {
    let aliases: Vec<String> = document.keys().filter(|k| is_alias(k)).cloned().collect();

    for alias in aliases {
        let Some(value) = document.remove(&alias) else {
            continue;
        };
        let canonical = canonical_key(&alias).to_string();
        let canonical_set = document
            .get(&canonical)
            .is_some_and(|current| !matches!(current.kind, ValueKind::Nil));
        if canonical_set {
            tracing::warn!(
                path = %path.display(),
                "Key {alias} is an alias of {canonical}; setting value with latter"
            );
        } else {
            tracing::debug!(
                path = %path.display(),
                alias = %alias,
                canonical = %canonical,
                "resolved key alias"
            );
            document.insert(canonical, value);
        }
    }

    document
}
