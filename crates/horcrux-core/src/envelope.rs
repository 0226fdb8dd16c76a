//! Normalization of remote collaborator responses.
//!
//! A `get_horcrux` call can come back in one of two envelopes:
//!
//! | Shape | Produced by |
//! |-------|-------------|
//! | `{ "result": { "content": doc } }` | JSON-RPC `tools/call` |
//! | `{ "content": doc }` | REST-style tool endpoints |
//!
//! Both resolve to the same canonical [`CorpusDocument`] through
//! [`normalize_remote`]. Some servers answer with MCP text content
//! (`"content": [{"type": "text", "text": "<json>"}]`); the first text
//! item is then decoded as the document.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CorpusError, CorpusResult};
use crate::models::CorpusDocument;
use crate::validate;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RemoteEnvelope {
    Rpc { result: ContentEnvelope },
    Direct(ContentEnvelope),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentEnvelope {
    pub content: Value,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl RemoteEnvelope {
    fn into_inner(self) -> ContentEnvelope {
        match self {
            RemoteEnvelope::Rpc { result } => result,
            RemoteEnvelope::Direct(inner) => inner,
        }
    }

    /// Unwrap the envelope into a validated document.
    pub fn into_document(self) -> CorpusResult<CorpusDocument> {
        let inner = self.into_inner();
        if inner.is_error {
            return Err(CorpusError::RemoteUnavailable(format!(
                "tool reported an error: {}",
                text_items(&inner.content).next().unwrap_or("(no message)")
            )));
        }
        match inner.content {
            Value::Array(ref items) if is_text_content(items) => {
                let text = text_items(&inner.content).next().unwrap_or_default();
                validate::parse(text.as_bytes())
            }
            other => validate::from_value(other),
        }
    }
}

/// Decode a remote response body into the canonical document.
///
/// Bodies matching neither envelope shape fail with
/// [`CorpusError::MalformedDocument`].
pub fn normalize_remote(body: Value) -> CorpusResult<CorpusDocument> {
    let envelope: RemoteEnvelope = serde_json::from_value(body).map_err(|_| {
        CorpusError::MalformedDocument(
            "response matches neither {result:{content}} nor {content}".to_string(),
        )
    })?;
    envelope.into_document()
}

fn is_text_content(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|item| item.get("type").and_then(Value::as_str).is_some())
}

fn text_items(content: &Value) -> impl Iterator<Item = &str> {
    content
        .as_array()
        .into_iter()
        .flatten()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|item| item.get("text").and_then(Value::as_str))
}
