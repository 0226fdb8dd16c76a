//! Error taxonomy for corpus operations.
//!
//! Every failure a store, the append service, or the retrieval policy can
//! produce is one of the [`CorpusError`] variants. Each variant carries a
//! stable machine-readable [`kind`](CorpusError::kind) used by the HTTP
//! boundary, and a human-readable message that interpolates the underlying
//! cause.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorpusError {
    /// Caller-supplied text is missing, blank, or not a string.
    #[error("Missing 'text' (string)")]
    InvalidInput,

    /// The deployment mode forbids the append operation.
    #[error("Ingest disabled in production. Run locally.")]
    ServiceDisabled,

    /// The document resource could not be located or read.
    #[error("Failed to read corpus: {0}")]
    ResourceUnavailable(String),

    /// The document resource was read but is not an acceptable document.
    #[error("Failed to parse corpus: {0}")]
    MalformedDocument(String),

    /// The updated document could not be written back.
    #[error("Failed to write corpus: {0}")]
    PersistFailure(String),

    /// The remote collaborator failed or answered with an unusable response.
    #[error("Remote collaborator unavailable: {0}")]
    RemoteUnavailable(String),
}

impl CorpusError {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CorpusError::InvalidInput => "invalid_input",
            CorpusError::ServiceDisabled => "service_disabled",
            CorpusError::ResourceUnavailable(_) => "resource_unavailable",
            CorpusError::MalformedDocument(_) => "malformed_document",
            CorpusError::PersistFailure(_) => "persist_failure",
            CorpusError::RemoteUnavailable(_) => "remote_unavailable",
        }
    }

    /// Whether the request was refused as asked rather than failed.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CorpusError::InvalidInput | CorpusError::ServiceDisabled)
    }
}

pub type CorpusResult<T> = Result<T, CorpusError>;
