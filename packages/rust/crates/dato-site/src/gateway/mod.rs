//! Gateway namespace: HTTP routes, admin guard and note authoring endpoint.

mod auth;
mod create_note;
mod http;

pub use auth::{
    ADMIN_BASIC_COOKIE, ADMIN_TOKEN_COOKIE, ADMIN_TOKEN_HEADER, AdminAuth, require_admin,
};
pub use create_note::{CreateNoteError, CreatedNote, handle_create_note, request_from_record};
pub use http::{ApiError, GatewayHealthResponse, GatewayState, router, run_http};
