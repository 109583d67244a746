//! HTTP gateway: JSON note API, feeds and the admin create-note endpoint.
//!
//! Index reads run on the blocking pool; every request re-checks the
//! directory fingerprint, so edits show up without a restart.

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use dato_notes::{
    Note, NoteError, NoteFilter, NoteStore, NoteSummary, SiteConfig, TagCount, render_markdown,
    rss_feed, sitemap,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::auth::{AdminAuth, require_admin};
use super::create_note::handle_create_note;

const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Shared state for the HTTP server: note store + resolved config.
#[derive(Clone)]
pub struct GatewayState {
    /// Cached, read-only note index.
    pub store: Arc<NoteStore>,
    /// Site configuration.
    pub config: Arc<SiteConfig>,
}

impl GatewayState {
    /// Build the store from `config`.
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        Self {
            store: Arc::new(NoteStore::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

/// Response body for the health endpoint.
#[derive(Debug, Serialize)]
pub struct GatewayHealthResponse {
    /// Always `healthy` when the index builds.
    pub status: &'static str,
    /// Notes directory being served.
    pub notes_dir: String,
    /// Indexed notes.
    pub notes: usize,
    /// Files skipped by the latest build.
    pub issues: usize,
}

/// JSON `{error}` response with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(detail: &impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "note request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal error".to_string(),
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        Self::internal(&err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Run a store query on the blocking pool.
async fn with_store<T, F>(state: &GatewayState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&NoteStore) -> Result<T, NoteError> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || query(&store))
        .await
        .map_err(|err| ApiError::internal(&err))?
        .map_err(ApiError::from)
}

async fn handle_health(
    State(state): State<GatewayState>,
) -> Result<Json<GatewayHealthResponse>, ApiError> {
    let index = with_store(&state, NoteStore::snapshot).await?;
    Ok(Json(GatewayHealthResponse {
        status: "healthy",
        notes_dir: state.config.notes_dir.display().to_string(),
        notes: index.len(),
        issues: index.issues().len(),
    }))
}

async fn handle_list_notes(
    State(state): State<GatewayState>,
    Query(filter): Query<NoteFilter>,
) -> Result<Json<Vec<NoteSummary>>, ApiError> {
    let rows = with_store(&state, move |store| store.search_summaries(&filter)).await?;
    Ok(Json(rows))
}

async fn handle_long_form(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<NoteSummary>>, ApiError> {
    let rows = with_store(&state, NoteStore::long_form_note_summaries).await?;
    Ok(Json(rows))
}

async fn handle_note(
    State(state): State<GatewayState>,
    Path(slug): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let lookup = slug.clone();
    with_store(&state, move |store| store.note_by_slug(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("note '{slug}' not found")))
}

async fn handle_note_html(
    State(state): State<GatewayState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ApiError> {
    let index = with_store(&state, NoteStore::snapshot).await?;
    let Some(note) = index.note(&slug).filter(|note| note.has_page) else {
        return Err(ApiError::not_found(format!("note '{slug}' has no page")));
    };
    Ok(Html(render_markdown(&note.content, index.slug_map()).html))
}

async fn handle_tags(State(state): State<GatewayState>) -> Result<Json<Vec<TagCount>>, ApiError> {
    Ok(Json(with_store(&state, NoteStore::tag_counts).await?))
}

async fn handle_slug_map(
    State(state): State<GatewayState>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    Ok(Json(with_store(&state, NoteStore::slug_map).await?))
}

async fn handle_rss(State(state): State<GatewayState>) -> Result<Response, ApiError> {
    let summaries = with_store(&state, NoteStore::long_form_note_summaries).await?;
    let xml = rss_feed(&summaries, &state.config.feed_options());
    Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response())
}

async fn handle_sitemap(State(state): State<GatewayState>) -> Result<Response, ApiError> {
    let summaries = with_store(&state, NoteStore::all_note_summaries).await?;
    let xml = sitemap(&summaries, &state.config.site_url);
    Ok(([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml).into_response())
}

/// Build the gateway router; admin routes sit behind [`AdminAuth`].
pub fn router(config: SiteConfig) -> Router {
    let auth = Arc::new(AdminAuth::from_config(&config));
    let state = GatewayState::new(config);

    let admin = Router::new()
        .route("/api/admin/create-note", post(handle_create_note))
        .route_layer(middleware::from_fn_with_state(auth, require_admin));

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/notes", get(handle_list_notes))
        .route("/api/notes/long-form", get(handle_long_form))
        .route("/api/notes/{slug}", get(handle_note))
        .route("/api/notes/{slug}/html", get(handle_note_html))
        .route("/api/tags", get(handle_tags))
        .route("/api/slug-map", get(handle_slug_map))
        .route("/rss.xml", get(handle_rss))
        .route("/sitemap.xml", get(handle_sitemap))
        .merge(admin)
        .with_state(state)
}

/// Run the HTTP server on `config.bind`.
/// Graceful shutdown on Ctrl+C (SIGINT) and SIGTERM (Unix); in-flight requests complete before exit.
pub async fn run_http(config: SiteConfig) -> Result<()> {
    let bind_addr = config.bind.clone();
    let notes_dir = config.notes_dir.display().to_string();
    let admin_enforced = AdminAuth::from_config(&config).is_enforced();
    let app = router(config);
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        "gateway listening on {} (notes_dir={}, admin_auth={}, Ctrl+C/SIGTERM to stop)",
        bind_addr,
        notes_dir,
        if admin_enforced { "on" } else { "off" }
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => Some(stream),
            Err(err) => {
                tracing::warn!("failed to listen for SIGTERM: {err}");
                None
            }
        };
        let terminate = async {
            match sigterm.as_mut() {
                Some(stream) => {
                    stream.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            () = terminate => {}
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    }
}
