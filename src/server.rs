//! HTTP API for notes.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/api/health` | Health check (returns version) |
//! | `POST`   | `/api/notes` | Create a note |
//! | `GET`    | `/api/notes` | List notes, most recently updated first |
//! | `GET`    | `/api/notes/{id}` | Fetch one note |
//! | `PUT`    | `/api/notes/{id}` | Partially update a note |
//! | `DELETE` | `/api/notes/{id}` | Delete a note |
//! | `POST`   | `/api/notes/{id}/summarize` | Summarize and cache the summary |
//!
//! # Error Contract
//!
//! ```json
//! { "message": "Note not found", "code": "not_found" }
//! ```
//!
//! Codes: `bad_request` (400), `not_found` (404), `summarizer_unavailable`
//! (500), `summarize_failed` (500), `internal` (500). Internal details are
//! logged, never returned.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser frontend on
//! another port can call the API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::NotesError;
use crate::models::{NewNote, Note, NoteUpdate, SummaryResponse};
use crate::notes;
use crate::store::{NoteStore, SqliteNoteStore};
use crate::summarize::{self, SummaryProvider};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub summarizer: Arc<dyn SummaryProvider>,
}

/// Starts the server against the configured SQLite database.
///
/// Runs migrations, picks the summarizer from `[summarizer]` and the
/// environment, then serves until Ctrl-C.
///
/// This is the entry point used by `notes serve`. Tests and embedders that
/// need their own storage or summarizer use [`run_server_with_store`].
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated, or if
/// binding `[server].bind` fails.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = SqliteNoteStore::open(config).await?;
    let summarizer = summarize::create_provider(&config.summarizer)?;
    run_server_with_store(config, Arc::new(store), Arc::from(summarizer)).await
}

/// Starts the server with caller-supplied storage and summarizer.
///
/// # Arguments
///
/// - `config`: only `[server].bind` is read here.
/// - `store`: backend for all note operations.
/// - `summarizer`: provider used by `POST /api/notes/{id}/summarize`.
///
/// # Returns
///
/// Returns `Ok(())` after a graceful shutdown on Ctrl-C, or an error if
/// binding or serving fails.
pub async fn run_server_with_store(
    config: &Config,
    store: Arc<dyn NoteStore>,
    summarizer: Arc<dyn SummaryProvider>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.server.bind).await?;
    let addr = listener.local_addr()?;

    tracing::info!(
        %addr,
        model = summarizer.model_name(),
        "notes server listening on http://{}",
        addr
    );

    let app = build_router(AppState { store, summarizer });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("notes server stopped");
    Ok(())
}

/// Builds the API router with CORS and request tracing layers.
///
/// Exposed separately from [`run_server_with_store`] so callers can mount
/// the API inside a larger axum application or serve it on their own
/// listener.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handle_health))
        .route("/api/notes", post(handle_create).get(handle_list))
        .route(
            "/api/notes/{id}",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .route("/api/notes/{id}/summarize", post(handle_summarize))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: &'static str,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

/// Maps a service error onto a status code, logging server-side failures.
fn classify(op: &str, err: NotesError) -> AppError {
    match err {
        NotesError::Validation(msg) => bad_request(msg),
        NotesError::NotFound => AppError {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: "Note not found".to_string(),
        },
        NotesError::SummarizerUnavailable(msg) => AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "summarizer_unavailable",
            message: msg,
        },
        NotesError::Summarizer(e) => {
            tracing::error!(op, error = %format!("{:#}", e), "summarization failed");
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "summarize_failed",
                message: "Failed to summarize note".to_string(),
            }
        }
        NotesError::Storage(e) => {
            tracing::error!(op, error = %format!("{:#}", e), "storage failure");
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "internal",
                message: "Server error".to_string(),
            }
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

// ============ GET /api/health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ Notes CRUD ============

async fn handle_create(
    State(state): State<AppState>,
    payload: Result<Json<NewNote>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let input = json_body(payload)?;
    let note = notes::create_note(state.store.as_ref(), input)
        .await
        .map_err(|e| classify("create_note", e))?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<Note>>, AppError> {
    let list = notes::list_notes(state.store.as_ref())
        .await
        .map_err(|e| classify("list_notes", e))?;
    Ok(Json(list))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let note = notes::get_note(state.store.as_ref(), &id)
        .await
        .map_err(|e| classify("get_note", e))?;
    Ok(Json(note))
}

async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NoteUpdate>, JsonRejection>,
) -> Result<Json<Note>, AppError> {
    let input = json_body(payload)?;
    let note = notes::update_note(state.store.as_ref(), &id, input)
        .await
        .map_err(|e| classify("update_note", e))?;
    Ok(Json(note))
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    notes::delete_note(state.store.as_ref(), &id)
        .await
        .map_err(|e| classify("delete_note", e))?;
    Ok(Json(MessageResponse { message: "Deleted" }))
}

// ============ POST /api/notes/{id}/summarize ============

async fn handle_summarize(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = summarize::summarize_note(state.store.as_ref(), state.summarizer.as_ref(), &id)
        .await
        .map_err(|e| classify("summarize_note", e))?;
    Ok(Json(SummaryResponse { summary }))
}
