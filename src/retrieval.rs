//! Retrieval policy: remote-first document fetch with static fallback.
//!
//! ```text
//!   remote_base set?
//!        │ yes                      no │
//!        ▼                             │
//!   POST {base}/mcp  tools/call        │
//!   get_horcrux ──── ok ──▶ document   │
//!        │ any failure                 │
//!        ▼                             ▼
//!   static resource (static_url, or the corpus file)
//!        │ ok ──▶ document
//!        └ failure ──▶ error surfaced to the caller
//! ```
//!
//! There is exactly one fallback step, no retries, and no caching: every
//! call to [`RetrievalPolicy::retrieve`] is a fresh attempt. Remote failures
//! are logged and swallowed; only a failure of the static path reaches the
//! caller.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use horcrux_core::envelope::normalize_remote;
use horcrux_core::{validate, CorpusDocument, CorpusError, CorpusResult};
use serde_json::{json, Value};

use crate::config::Config;

/// Name of the remote tool returning the whole document.
pub const GET_TOOL: &str = "get_horcrux";

/// A place a corpus document can be fetched from.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Short description used in logs.
    fn label(&self) -> String;

    async fn fetch(&self) -> CorpusResult<CorpusDocument>;
}

/// The remote tool-calling collaborator.
///
/// Every failure, including an unusable envelope, is reported as
/// [`CorpusError::RemoteUnavailable`].
pub struct RemoteSource {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteSource {
    pub fn new(client: reqwest::Client, base: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/mcp", base.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self) -> Result<Value, String> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": "get",
            "method": "tools/call",
            "params": { "name": GET_TOOL, "arguments": {} }
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("MCP HTTP {}", status.as_u16()));
        }
        resp.json::<Value>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl DocumentSource for RemoteSource {
    fn label(&self) -> String {
        format!("remote {}", self.endpoint)
    }

    async fn fetch(&self) -> CorpusResult<CorpusDocument> {
        let body = self.call().await.map_err(CorpusError::RemoteUnavailable)?;
        normalize_remote(body).map_err(|e| match e {
            CorpusError::RemoteUnavailable(_) => e,
            other => CorpusError::RemoteUnavailable(other.to_string()),
        })
    }
}

/// The static resource: the canonical document served as a plain file.
pub enum StaticSource {
    Url {
        client: reqwest::Client,
        url: String,
    },
    File(PathBuf),
}

#[async_trait]
impl DocumentSource for StaticSource {
    fn label(&self) -> String {
        match self {
            StaticSource::Url { url, .. } => format!("static {}", url),
            StaticSource::File(path) => format!("static {}", path.display()),
        }
    }

    async fn fetch(&self) -> CorpusResult<CorpusDocument> {
        match self {
            StaticSource::Url { client, url } => {
                let resp = client
                    .get(url)
                    .header(reqwest::header::CACHE_CONTROL, "no-store")
                    .send()
                    .await
                    .map_err(|e| CorpusError::ResourceUnavailable(e.to_string()))?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(CorpusError::ResourceUnavailable(format!(
                        "FILE HTTP {}",
                        status.as_u16()
                    )));
                }
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|e| CorpusError::ResourceUnavailable(e.to_string()))?;
                validate::parse(&bytes)
            }
            StaticSource::File(path) => {
                let raw = tokio::fs::read(path).await.map_err(|e| {
                    CorpusError::ResourceUnavailable(format!("{}: {}", path.display(), e))
                })?;
                validate::parse(&raw)
            }
        }
    }
}

/// Where a presentation layer stands while loading the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded(CorpusDocument),
    Failed(String),
}

pub struct RetrievalPolicy {
    primary: Option<Box<dyn DocumentSource>>,
    fallback: Box<dyn DocumentSource>,
}

impl RetrievalPolicy {
    pub fn new(primary: Option<Box<dyn DocumentSource>>, fallback: Box<dyn DocumentSource>) -> Self {
        Self { primary, fallback }
    }

    /// Build the policy from `[retrieval]`, falling back to the corpus file
    /// when no `static_url` is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.retrieval.timeout_secs))
            .build()?;

        let primary = config
            .retrieval
            .remote_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .map(|base| Box::new(RemoteSource::new(client.clone(), base)) as Box<dyn DocumentSource>);

        let fallback: Box<dyn DocumentSource> = match &config.retrieval.static_url {
            Some(url) => Box::new(StaticSource::Url {
                client,
                url: url.clone(),
            }),
            None => Box::new(StaticSource::File(config.corpus.path.clone())),
        };

        Ok(Self::new(primary, fallback))
    }

    pub fn has_remote(&self) -> bool {
        self.primary.is_some()
    }

    /// Fetch the document, preferring the remote collaborator.
    pub async fn retrieve(&self) -> CorpusResult<CorpusDocument> {
        if let Some(primary) = &self.primary {
            match primary.fetch().await {
                Ok(doc) => {
                    tracing::debug!(source = %primary.label(), "loaded corpus");
                    return Ok(doc);
                }
                Err(e) => {
                    tracing::warn!(
                        source = %primary.label(),
                        error = %e,
                        "remote fetch failed, falling back"
                    );
                }
            }
        }

        let doc = self.fallback.fetch().await.map_err(|e| {
            tracing::error!(source = %self.fallback.label(), error = %e, "corpus fetch failed");
            e
        })?;
        tracing::debug!(source = %self.fallback.label(), "loaded corpus");
        Ok(doc)
    }

    /// [`retrieve`](Self::retrieve), folded into a presentation state.
    pub async fn load(&self) -> LoadState {
        match self.retrieve().await {
            Ok(doc) => LoadState::Loaded(doc),
            Err(e) => LoadState::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        result: CorpusResult<CorpusDocument>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DocumentSource for Fixed {
        fn label(&self) -> String {
            "fixed".to_string()
        }

        async fn fetch(&self) -> CorpusResult<CorpusDocument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn doc(name: &str) -> CorpusDocument {
        validate::from_value(json!({"meta": {"name": name}})).unwrap()
    }

    fn fixed(result: CorpusResult<CorpusDocument>) -> (Box<dyn DocumentSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Fixed {
                result,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn remote_success_skips_fallback() {
        let (remote, _) = fixed(Ok(doc("remote")));
        let (fallback, fallback_calls) = fixed(Ok(doc("static")));
        let policy = RetrievalPolicy::new(Some(remote), fallback);

        assert_eq!(policy.retrieve().await.unwrap(), doc("remote"));
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remote_failure_falls_back_once() {
        let (remote, remote_calls) =
            fixed(Err(CorpusError::RemoteUnavailable("MCP HTTP 500".into())));
        let (fallback, fallback_calls) = fixed(Ok(doc("static")));
        let policy = RetrievalPolicy::new(Some(remote), fallback);

        assert_eq!(policy.retrieve().await.unwrap(), doc("static"));
        assert_eq!(remote_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn both_failing_surfaces_static_error() {
        let (remote, _) = fixed(Err(CorpusError::RemoteUnavailable("down".into())));
        let (fallback, _) = fixed(Err(CorpusError::ResourceUnavailable("FILE HTTP 404".into())));
        let policy = RetrievalPolicy::new(Some(remote), fallback);

        assert_eq!(
            policy.load().await,
            LoadState::Failed("Failed to read corpus: FILE HTTP 404".to_string())
        );
    }

    #[tokio::test]
    async fn no_remote_uses_static_only() {
        let (fallback, calls) = fixed(Ok(doc("static")));
        let policy = RetrievalPolicy::new(None, fallback);
        assert!(!policy.has_remote());
        assert_eq!(policy.load().await, LoadState::Loaded(doc("static")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn each_call_is_a_fresh_attempt() {
        let (fallback, calls) = fixed(Ok(doc("static")));
        let policy = RetrievalPolicy::new(None, fallback);
        policy.retrieve().await.unwrap();
        policy.retrieve().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn remote_endpoint_trims_trailing_slashes() {
        let source = RemoteSource::new(reqwest::Client::new(), "https://mcp.example.com///");
        assert_eq!(source.endpoint(), "https://mcp.example.com/mcp");
    }

    #[test]
    fn default_state_is_loading() {
        assert_eq!(LoadState::default(), LoadState::Loading);
    }
}
