//! HTTP boundary for the corpus store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/ingest` | Append a note: `{ "text": "..." }` |
//! | `GET`  | `[server].static_route` | The current document (static resource) |
//! | `GET`  | `/health` | Health check (version and mode) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": "Missing 'text' (string)", "kind": "invalid_input" }
//! ```
//!
//! | Kind | Status |
//! |------|--------|
//! | `invalid_input` | 400 |
//! | `service_disabled` | 501 |
//! | `resource_unavailable`, `malformed_document`, `persist_failure` | 500 |
//! | `remote_unavailable` | 502 |
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser pages on other
//! origins can read the document.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use horcrux_core::store::CorpusStore;
use horcrux_core::{CorpusDocument, CorpusError};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::file_store::FileStore;
use crate::ingest::{IngestResponse, IngestService};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<dyn CorpusStore>,
    ingest: IngestService,
}

/// Starts the HTTP server backed by the file at `[corpus].path`.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store: Arc<dyn CorpusStore> = Arc::new(FileStore::new(&config.corpus.path));
    run_server_with_store(config, store).await
}

/// Starts the HTTP server over a caller-supplied store.
pub async fn run_server_with_store(
    config: &Config,
    store: Arc<dyn CorpusStore>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(config, store.clone());

    tracing::info!(
        bind = %bind_addr,
        mode = %config.mode,
        corpus = %store.describe(),
        "corpus server listening"
    );
    println!("Horcrux server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router without binding a socket.
pub fn router(config: &Config, store: Arc<dyn CorpusStore>) -> Router {
    let config = Arc::new(config.clone());
    let state = AppState {
        ingest: IngestService::new(config.mode, store.clone()),
        store,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ingest", post(handle_ingest))
        .route(&config.server.static_route, get(handle_document))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    /// Human-readable message, with the underlying cause when there is one.
    error: String,
    /// Machine-readable error kind.
    kind: &'static str,
}

struct AppError(CorpusError);

impl From<CorpusError> for AppError {
    fn from(err: CorpusError) -> Self {
        Self(err)
    }
}

fn status_for(err: &CorpusError) -> StatusCode {
    match err {
        CorpusError::InvalidInput => StatusCode::BAD_REQUEST,
        CorpusError::ServiceDisabled => StatusCode::NOT_IMPLEMENTED,
        CorpusError::ResourceUnavailable(_)
        | CorpusError::MalformedDocument(_)
        | CorpusError::PersistFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CorpusError::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if self.0.is_client_error() {
            tracing::debug!(kind = self.0.kind(), "request refused");
        } else {
            tracing::error!(kind = self.0.kind(), error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    mode: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.config.mode.to_string(),
    })
}

// ============ POST /api/ingest ============

/// The body is taken as raw bytes so the mode check runs before any
/// parsing, and malformed JSON is reported as missing `text`.
async fn handle_ingest(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestResponse>, AppError> {
    let res = state.ingest.ingest_body(&body).await?;
    Ok(Json(res))
}

// ============ GET {static_route} ============

async fn handle_document(State(state): State<AppState>) -> Result<Json<CorpusDocument>, AppError> {
    let doc = state.store.get_document().await?;
    Ok(Json(doc))
}
