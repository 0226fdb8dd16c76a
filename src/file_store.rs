//! File-backed [`CorpusStore`].
//!
//! The corpus document lives in a single JSON file. Reads load the whole
//! file and validate it. Appends run the full read-modify-write cycle under
//! one in-process async mutex, then persist with a temp-file-and-rename so
//! readers see either the old or the new document, never a truncated one.
//!
//! Multi-instance deployments sharing one file are not covered: the mutex
//! only serializes writers inside this process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use horcrux_core::models::{CorpusDocument, Note};
use horcrux_core::store::{AppendOutcome, CorpusStore};
use horcrux_core::{validate, CorpusError, CorpusResult};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> CorpusResult<CorpusDocument> {
        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            CorpusError::ResourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        validate::parse(&raw)
    }

    /// Write `contents` next to the resource, then rename over it.
    ///
    /// The temp file takes the resource's current permissions so the
    /// rename does not reset them.
    async fn persist(&self, contents: &str) -> CorpusResult<()> {
        let tmp = self.temp_path();
        let permissions = tokio::fs::metadata(&self.path)
            .await
            .ok()
            .map(|m| m.permissions());
        if let Err(e) = write_synced(&tmp, contents, permissions).await {
            discard(&tmp).await;
            return Err(CorpusError::PersistFailure(format!(
                "{}: {}",
                tmp.display(),
                e
            )));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            discard(&tmp).await;
            return Err(CorpusError::PersistFailure(format!(
                "{}: {}",
                self.path.display(),
                e
            )));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "corpus.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
    }
}

async fn write_synced(
    path: &Path,
    contents: &str,
    permissions: Option<std::fs::Permissions>,
) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(contents.as_bytes()).await?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions).await?;
    }
    file.sync_all().await
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file");
        }
    }
}

#[async_trait]
impl CorpusStore for FileStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn get_document(&self) -> CorpusResult<CorpusDocument> {
        self.read().await
    }

    async fn append_note(&self, raw_text: &str) -> CorpusResult<AppendOutcome> {
        let text = validate::prepare_text(raw_text)?;

        let _guard = self.write_lock.lock().await;

        let mut document = self.read().await?;
        let note = Note::ingest(text);
        let notes_count = validate::append_note(&mut document, note.clone());

        let serialized = validate::to_pretty_json(&document)?;
        self.persist(&serialized).await?;

        tracing::info!(
            path = %self.path.display(),
            note_id = %note.id,
            notes_count,
            "appended note"
        );

        Ok(AppendOutcome {
            document,
            note,
            notes_count,
        })
    }
}
