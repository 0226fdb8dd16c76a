//! Append service: the externally reachable "add a note" operation.
//!
//! A thin translation layer over [`CorpusStore::append_note`]:
//!
//! 1. In production mode every call fails with `ServiceDisabled` before the
//!    request body is even looked at, and the store is never touched.
//! 2. The body must be a JSON object with a non-blank string `text`; a body
//!    that is not valid JSON counts as an empty object.
//! 3. Store failures are passed through with their kind.
//!
//! Used by both `horcrux append` and `POST /api/ingest`.

use std::sync::Arc;

use horcrux_core::store::CorpusStore;
use horcrux_core::{CorpusError, CorpusResult};
use serde::Serialize;
use serde_json::Value;

use crate::config::DeploymentMode;

/// Success body for an append: `{ "ok": true, "notesCount": n }`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngestResponse {
    pub ok: bool,
    #[serde(rename = "notesCount")]
    pub notes_count: usize,
}

#[derive(Clone)]
pub struct IngestService {
    mode: DeploymentMode,
    store: Arc<dyn CorpusStore>,
}

impl IngestService {
    pub fn new(mode: DeploymentMode, store: Arc<dyn CorpusStore>) -> Self {
        Self { mode, store }
    }

    /// Handle a raw request body.
    pub async fn ingest_body(&self, body: &[u8]) -> CorpusResult<IngestResponse> {
        self.ensure_enabled()?;
        let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        self.ingest(&payload).await
    }

    /// Handle an already-decoded payload.
    pub async fn ingest(&self, payload: &Value) -> CorpusResult<IngestResponse> {
        self.ensure_enabled()?;
        let text = extract_text(payload)?;
        let outcome = self.store.append_note(text).await?;
        Ok(IngestResponse {
            ok: true,
            notes_count: outcome.notes_count,
        })
    }

    /// Append plain text (CLI path).
    pub async fn ingest_text(&self, text: &str) -> CorpusResult<IngestResponse> {
        self.ingest(&serde_json::json!({ "text": text })).await
    }

    fn ensure_enabled(&self) -> CorpusResult<()> {
        if self.mode.ingest_enabled() {
            Ok(())
        } else {
            Err(CorpusError::ServiceDisabled)
        }
    }
}

/// The non-blank string `text` field of `payload`.
fn extract_text(payload: &Value) -> CorpusResult<&str> {
    payload
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .ok_or(CorpusError::InvalidInput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use horcrux_core::store::memory::InMemoryStore;
    use horcrux_core::CorpusDocument;
    use serde_json::json;

    fn service(mode: DeploymentMode) -> (IngestService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new(CorpusDocument::default()));
        (IngestService::new(mode, store.clone()), store)
    }

    #[tokio::test]
    async fn appends_and_reports_count() {
        let (svc, store) = service(DeploymentMode::Development);
        let res = svc.ingest(&json!({"text": "hello"})).await.unwrap();
        assert_eq!(
            res,
            IngestResponse {
                ok: true,
                notes_count: 1
            }
        );
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!({"ok": true, "notesCount": 1})
        );
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn rejects_missing_blank_and_non_string_text() {
        let (svc, store) = service(DeploymentMode::Development);
        for payload in [
            json!({}),
            json!({"text": ""}),
            json!({"text": "   "}),
            json!({"text": null}),
            json!({"text": 42}),
            json!({"text": ["a"]}),
            json!("text"),
            Value::Null,
        ] {
            let err = svc.ingest(&payload).await.unwrap_err();
            assert_eq!(err, CorpusError::InvalidInput, "payload {}", payload);
        }
        assert_eq!(store.reads(), 0);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn invalid_json_body_counts_as_missing_text() {
        let (svc, _) = service(DeploymentMode::Development);
        let err = svc.ingest_body(b"not json at all").await.unwrap_err();
        assert_eq!(err, CorpusError::InvalidInput);
    }

    #[tokio::test]
    async fn production_short_circuits_before_store_access() {
        let store = Arc::new(InMemoryStore::unavailable());
        let svc = IngestService::new(DeploymentMode::Production, store.clone());

        let err = svc.ingest_body(br#"{"text": "hello"}"#).await.unwrap_err();
        assert_eq!(err, CorpusError::ServiceDisabled);
        let err = svc.ingest_body(b"garbage").await.unwrap_err();
        assert_eq!(err, CorpusError::ServiceDisabled);

        assert_eq!(store.reads(), 0);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn store_errors_pass_through() {
        let svc = IngestService::new(
            DeploymentMode::Development,
            Arc::new(InMemoryStore::unavailable()),
        );
        let err = svc.ingest_text("hello").await.unwrap_err();
        assert_eq!(err.kind(), "resource_unavailable");
    }
}
