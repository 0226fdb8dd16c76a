//! Parsing, shape validation, and normalization of corpus documents.
//!
//! All stores go through [`parse`] on read and [`ensure_notes_container`]
//! before mutating, so legacy or partial documents are coerced into the
//! canonical shape the same way everywhere.

use serde_json::{Map, Value};

use crate::error::{CorpusError, CorpusResult};
use crate::models::{CorpusDocument, Note};

/// Parse raw bytes into a [`CorpusDocument`].
///
/// Fails with [`CorpusError::MalformedDocument`] when the bytes are not
/// valid JSON, the top-level value is not a mapping, or `meta` / `content`
/// are present but neither `null` nor mappings.
pub fn parse(raw: &[u8]) -> CorpusResult<CorpusDocument> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| CorpusError::MalformedDocument(e.to_string()))?;
    from_value(value)
}

/// Validate an already-decoded JSON value as a [`CorpusDocument`].
pub fn from_value(value: Value) -> CorpusResult<CorpusDocument> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(CorpusError::MalformedDocument(format!(
                "top-level value must be a mapping, found {}",
                type_name(&other)
            )))
        }
    };
    for key in ["meta", "content"] {
        match map.get(key) {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(other) => {
                return Err(CorpusError::MalformedDocument(format!(
                    "'{}' must be a mapping, found {}",
                    key,
                    type_name(other)
                )))
            }
        }
    }
    Ok(CorpusDocument::from_map(map))
}

/// Make sure `content` exists and `content.notes` is a sequence, and
/// return that sequence for mutation.
///
/// A missing or `null` `content` becomes an empty mapping; a missing or
/// non-sequence `notes` becomes an empty sequence. Existing keys keep their
/// position. Running it twice is the same as running it once.
pub fn ensure_notes_container(doc: &mut CorpusDocument) -> &mut Vec<Value> {
    let content = object_slot(
        doc.as_map_mut()
            .entry("content")
            .or_insert_with(|| Value::Object(Map::new())),
    );
    array_slot(
        content
            .entry("notes")
            .or_insert_with(|| Value::Array(Vec::new())),
    )
}

fn object_slot(slot: &mut Value) -> &mut Map<String, Value> {
    match slot {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            object_slot(other)
        }
    }
}

fn array_slot(slot: &mut Value) -> &mut Vec<Value> {
    match slot {
        Value::Array(items) => items,
        other => {
            *other = Value::Array(Vec::new());
            array_slot(other)
        }
    }
}

/// Trim caller text, rejecting empty or all-whitespace input.
pub fn prepare_text(raw: &str) -> CorpusResult<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CorpusError::InvalidInput);
    }
    Ok(trimmed)
}

/// Normalize the notes container and append `note` to the end of it.
///
/// Returns the resulting number of notes.
pub fn append_note(doc: &mut CorpusDocument, note: Note) -> usize {
    let notes = ensure_notes_container(doc);
    notes.push(Value::from(note));
    notes.len()
}

/// Serialize with stable 2-space indentation.
pub fn to_pretty_json(doc: &CorpusDocument) -> CorpusResult<String> {
    serde_json::to_string_pretty(doc).map_err(|e| CorpusError::PersistFailure(e.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
