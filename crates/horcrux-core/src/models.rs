//! Corpus document data model.
//!
//! The document is held as the ordered JSON mapping it was read from, with
//! typed accessors over the parts this crate understands (`meta`,
//! `content.notes`). Every key keeps its value and its position through a
//! read-modify-write cycle, `null`s included. Only `content.notes` is ever
//! changed by this crate.
//!
//! ```text
//! {
//!   "meta":    { free-form mapping },
//!   "content": { "notes": [ Note, ... ], ... },
//!   ... other top-level sections (skills, projects, interviews, ...)
//! }
//! ```

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source tag stamped on every note appended through this crate.
pub const INGEST_SOURCE: &str = "web-ingest";

/// Free-form descriptive fields (name, title, location, updated, version, ...).
pub type Meta = Map<String, Value>;

/// The single JSON document holding a person's professional context.
///
/// Build one with [`crate::validate::parse`] or
/// [`crate::validate::from_value`]; both check the top-level shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpusDocument(Map<String, Value>);

/// An append-only text record with identity and timestamp.
///
/// This is a read view over a notes entry and the builder for new ones.
/// Existing entries are never rewritten through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Note {
    /// Build a fresh ingest note: new UUID, the given text, the fixed
    /// [`INGEST_SOURCE`] tag, and the current UTC time.
    ///
    /// The caller is responsible for trimming and rejecting blank text.
    pub fn ingest(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            source: Some(INGEST_SOURCE.to_string()),
            created_at: Some(now_iso()),
            extra: Map::new(),
        }
    }

    /// Typed view of a notes entry. Legacy entries without a string `id`
    /// and `text` yield `None`.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        serde_json::from_value(entry.clone()).ok()
    }
}

impl From<Note> for Value {
    fn from(note: Note) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(note.id));
        map.insert("text".to_string(), Value::String(note.text));
        if let Some(source) = note.source {
            map.insert("source".to_string(), Value::String(source));
        }
        if let Some(created_at) = note.created_at {
            map.insert("created_at".to_string(), Value::String(created_at));
        }
        map.extend(note.extra);
        Value::Object(map)
    }
}

/// Current UTC time as ISO-8601 with millisecond precision, e.g.
/// `2026-10-18T09:30:00.123Z`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl CorpusDocument {
    /// Wrap a mapping without checking `meta` / `content` shapes.
    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// The `meta` mapping, if present and not `null`.
    pub fn meta(&self) -> Option<&Meta> {
        self.0.get("meta")?.as_object()
    }

    /// The `content` mapping, if present and not `null`.
    pub fn content(&self) -> Option<&Map<String, Value>> {
        self.0.get("content")?.as_object()
    }

    /// The notes sequence, or an empty slice when `content.notes` is
    /// missing or not a sequence.
    pub fn notes(&self) -> &[Value] {
        self.content()
            .and_then(|c| c.get("notes"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn notes_count(&self) -> usize {
        self.notes().len()
    }

    /// A string-valued `meta` field, if present.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta()?.get(key)?.as_str()
    }

    /// A top-level section by key (e.g. `skills`).
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}
