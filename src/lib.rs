//! # Horcrux
//!
//! A read/append interface over a single JSON "corpus document" describing
//! a person's professional context, plus a remote-first retrieval policy
//! for rendering it.
//!
//! ## Architecture
//!
//! ```text
//!  POST /api/ingest ─┐                     ┌──────────────┐
//!  horcrux append ───┼─▶ IngestService ──▶ │  FileStore   │──▶ corpus.json
//!                    │   (mode switch)     │ (mutex + tmp │    (2-space JSON)
//!                    │                     │  + rename)   │
//!  GET /horcrux.json ┴─────────────────────┴──────────────┘
//!
//!  horcrux fetch ──▶ RetrievalPolicy ──▶ remote get_horcrux ──(fail)──▶ static resource
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! horcrux show                      # print the document
//! horcrux append "Shipped the v2 API"
//! horcrux fetch                     # remote-first summary
//! horcrux serve                     # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration, env overrides, validation |
//! | [`file_store`] | File-backed `CorpusStore` with atomic writes |
//! | [`ingest`] | Append service (mode switch, input validation) |
//! | [`retrieval`] | Remote-first retrieval with static fallback |
//! | [`get`] | CLI display of the document |
//! | [`server`] | HTTP server (Axum) with CORS |
//!
//! The document model, validator, envelope normalization, error taxonomy,
//! and store trait live in the `horcrux-core` crate and are re-exported
//! here.

pub mod config;
pub mod file_store;
pub mod get;
pub mod ingest;
pub mod retrieval;
pub mod server;

pub use horcrux_core::{
    envelope, models, store, validate, AppendOutcome, CorpusDocument, CorpusError, CorpusResult,
    CorpusStore, Note,
};
