//! Storage abstraction for the corpus document.
//!
//! The [`CorpusStore`] trait is the single-resource repository interface:
//! callers ask for the full document or ask for a note to be appended, and
//! never touch the serialized resource themselves. Swapping the backing
//! store (file, in-memory, a future transactional store) does not affect
//! callers.
//!
//! Implementations must be `Send + Sync` to work with async runtimes, and
//! must run the read-modify-write cycle of [`append_note`](CorpusStore::append_note)
//! under mutual exclusion so concurrent appends are never lost.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CorpusResult;
use crate::models::{CorpusDocument, Note};

/// Result of a successful append.
#[derive(Debug, Clone, Serialize)]
pub struct AppendOutcome {
    /// The full document as persisted.
    pub document: CorpusDocument,
    /// The note that was appended.
    pub note: Note,
    /// `content.notes.len()` after the append.
    pub notes_count: usize,
}

/// Abstract owner of the corpus document resource.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get_document`](CorpusStore::get_document) | Read and validate the whole document |
/// | [`append_note`](CorpusStore::append_note) | Append one note (read-modify-write) |
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Human-readable location of the resource, for logs and health output.
    fn describe(&self) -> String;

    /// Read the resource fully and validate it.
    ///
    /// Fails with `ResourceUnavailable` when the resource cannot be read and
    /// `MalformedDocument` when it does not parse.
    async fn get_document(&self) -> CorpusResult<CorpusDocument>;

    /// Append a note carrying the trimmed `raw_text`.
    ///
    /// Blank text fails with `InvalidInput` before any I/O. Read failures
    /// surface exactly as in [`get_document`](CorpusStore::get_document);
    /// write failures surface as `PersistFailure`.
    async fn append_note(&self, raw_text: &str) -> CorpusResult<AppendOutcome>;
}
