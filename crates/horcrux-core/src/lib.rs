//! # Horcrux Core
//!
//! Shared, runtime-free logic for Horcrux: the corpus document model, its
//! validator and normalizer, the remote envelope normalizer, the error
//! taxonomy, and the [`store::CorpusStore`] abstraction.
//!
//! This crate contains no tokio, filesystem I/O, or network code. The
//! file-backed store, HTTP boundary, and retrieval policy live in the
//! `horcrux` crate.

pub mod envelope;
pub mod error;
pub mod models;
pub mod store;
pub mod validate;

pub use error::{CorpusError, CorpusResult};
pub use models::{CorpusDocument, Note, INGEST_SOURCE};
pub use store::{AppendOutcome, CorpusStore};
