//! In-memory [`CorpusStore`] implementation for tests and embedders.
//!
//! Holds the document behind a `std::sync::Mutex`. A store created with
//! [`InMemoryStore::unavailable`] behaves like a missing resource.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{CorpusError, CorpusResult};
use crate::models::{CorpusDocument, Note};
use crate::validate;

use super::{AppendOutcome, CorpusStore};

pub struct InMemoryStore {
    doc: Mutex<Option<CorpusDocument>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(doc: CorpusDocument) -> Self {
        Self {
            doc: Mutex::new(Some(doc)),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// A store whose resource does not exist.
    pub fn unavailable() -> Self {
        Self {
            doc: Mutex::new(None),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of times the resource has been read.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of times the resource has been written.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(CorpusDocument::default())
    }
}

fn missing() -> CorpusError {
    CorpusError::ResourceUnavailable("in-memory document not present".to_string())
}

#[async_trait]
impl CorpusStore for InMemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn get_document(&self) -> CorpusResult<CorpusDocument> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let guard = self.doc.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone().ok_or_else(missing)
    }

    async fn append_note(&self, raw_text: &str) -> CorpusResult<AppendOutcome> {
        let text = validate::prepare_text(raw_text)?;

        let mut guard = self.doc.lock().unwrap_or_else(PoisonError::into_inner);
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut document = guard.clone().ok_or_else(missing)?;

        let note = Note::ingest(text);
        let notes_count = validate::append_note(&mut document, note.clone());

        *guard = Some(document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(AppendOutcome {
            document,
            note,
            notes_count,
        })
    }
}
