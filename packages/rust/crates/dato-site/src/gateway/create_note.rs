//! POST /api/admin/create-note: payload decoding, note creation, status mapping.

use axum::{
    Json,
    body::to_bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use dato_notes::{AuthoringError, NewNoteRequest, write_note};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::http::GatewayState;

/// Largest accepted request body.
const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

const BODY_KEYS: [&str; 3] = ["body", "content", "markdown"];

/// Create-note failures, each mapped to one status code.
#[derive(Debug, Error)]
pub enum CreateNoteError {
    /// JSON body could not be parsed.
    #[error("Invalid JSON body")]
    InvalidJson,
    /// Form body could not be parsed.
    #[error("Invalid form payload")]
    InvalidForm,
    /// Content type is neither JSON nor a form.
    #[error("Unsupported content type")]
    UnsupportedContentType,
    /// Parsed JSON is not an object.
    #[error("payload must be an object")]
    NotAnObject,
    /// Note normalization or write failed.
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
    /// Background task failed.
    #[error("Internal error")]
    Internal(String),
}

impl CreateNoteError {
    /// HTTP status for this failure.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::InvalidForm | Self::NotAnObject => StatusCode::BAD_REQUEST,
            Self::UnsupportedContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Authoring(AuthoringError::AlreadyExists(_)) => StatusCode::CONFLICT,
            Self::Authoring(AuthoringError::Io { .. } | AuthoringError::FrontMatter(_))
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Authoring(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message; server-side failures stay generic.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Authoring(AuthoringError::AlreadyExists(_)) => {
                "a note with that slug already exists".to_string()
            }
            Self::Authoring(AuthoringError::Io { .. } | AuthoringError::FrontMatter(_))
            | Self::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for CreateNoteError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, detail = ?self, "create-note failed");
        } else {
            tracing::info!(status = status.as_u16(), error = %self, "create-note rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Response body for a created note.
#[derive(Debug, Serialize)]
pub struct CreatedNote {
    /// Always `true`.
    pub ok: bool,
    /// Canonical slug.
    pub slug: String,
    /// Public page path.
    pub path: String,
    /// Written file.
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    Json,
    Form,
    Multipart,
    Unspecified,
    Unsupported,
}

impl PayloadKind {
    fn detect(content_type: &str) -> Self {
        let content_type = content_type.trim().to_lowercase();
        if content_type.is_empty() {
            Self::Unspecified
        } else if content_type.contains("application/json") {
            Self::Json
        } else if content_type.contains("application/x-www-form-urlencoded") {
            Self::Form
        } else if content_type.contains("multipart/form-data") {
            Self::Multipart
        } else {
            Self::Unsupported
        }
    }
}

fn json_record(
    bytes: &[u8],
    parse_error: CreateNoteError,
) -> Result<Map<String, Value>, CreateNoteError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(CreateNoteError::NotAnObject),
        Err(_) => Err(parse_error),
    }
}

/// Body without a content type: only a JSON object is accepted.
fn untyped_record(bytes: &[u8]) -> Result<Map<String, Value>, CreateNoteError> {
    json_record(bytes, CreateNoteError::UnsupportedContentType)
        .map_err(|_| CreateNoteError::UnsupportedContentType)
}

/// Insert a form value; repeated keys collect into an array.
fn push_field(record: &mut Map<String, Value>, key: String, value: String) {
    match record.get_mut(&key) {
        Some(Value::Array(items)) => items.push(Value::String(value)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(value)]);
        }
        None => {
            record.insert(key, Value::String(value));
        }
    }
}

fn form_record(bytes: &[u8]) -> Map<String, Value> {
    let mut record = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        push_field(&mut record, key.into_owned(), value.into_owned());
    }
    record
}

async fn multipart_record(request: Request) -> Result<Map<String, Value>, CreateNoteError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|_| CreateNoteError::InvalidForm)?;
    let mut record = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| CreateNoteError::InvalidForm)?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field.text().await.map_err(|_| CreateNoteError::InvalidForm)?;
        push_field(&mut record, name, value);
    }
    Ok(record)
}

async fn read_record(request: Request) -> Result<Map<String, Value>, CreateNoteError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match PayloadKind::detect(content_type) {
        PayloadKind::Json => {
            let bytes = to_bytes(request.into_body(), MAX_PAYLOAD_BYTES)
                .await
                .map_err(|_| CreateNoteError::InvalidJson)?;
            json_record(&bytes, CreateNoteError::InvalidJson)
        }
        PayloadKind::Unspecified => {
            let bytes = to_bytes(request.into_body(), MAX_PAYLOAD_BYTES)
                .await
                .map_err(|_| CreateNoteError::UnsupportedContentType)?;
            untyped_record(&bytes)
        }
        PayloadKind::Form => {
            let bytes = to_bytes(request.into_body(), MAX_PAYLOAD_BYTES)
                .await
                .map_err(|_| CreateNoteError::InvalidForm)?;
            Ok(form_record(&bytes))
        }
        PayloadKind::Multipart => multipart_record(request).await,
        PayloadKind::Unsupported => Err(CreateNoteError::UnsupportedContentType),
    }
}

fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(Value::Array(items)) => items.iter().find_map(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn tag_values(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(raw)) => vec![raw.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Map a decoded JSON or form record onto a note request.
#[must_use]
pub fn request_from_record(record: &Map<String, Value>) -> NewNoteRequest {
    let body = BODY_KEYS
        .iter()
        .filter_map(|key| text_field(record, key))
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or_default();
    NewNoteRequest {
        title: text_field(record, "title").unwrap_or_default(),
        slug: text_field(record, "slug"),
        body,
        tags: tag_values(record.get("tags")),
        date: text_field(record, "date"),
        note_type: text_field(record, "type"),
        status: text_field(record, "status"),
        excerpt_placeholder: false,
    }
}

async fn create_note(
    state: &GatewayState,
    request: Request,
) -> Result<CreatedNote, CreateNoteError> {
    let record = read_record(request).await?;
    let note = request_from_record(&record).normalize(Utc::now().date_naive())?;
    let notes_dir = state.config.notes_dir.clone();
    let slug = note.slug.clone();
    let file = tokio::task::spawn_blocking(move || write_note(&notes_dir, &note))
        .await
        .map_err(|err| CreateNoteError::Internal(err.to_string()))??;
    tracing::info!(slug = %slug, file = %file.display(), "created note");
    Ok(CreatedNote {
        ok: true,
        path: format!("/notes/{slug}"),
        slug,
        file: file.display().to_string(),
    })
}

/// Handler for `POST /api/admin/create-note`.
pub async fn handle_create_note(State(state): State<GatewayState>, request: Request) -> Response {
    match create_note(&state, request).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => err.into_response(),
    }
}
