//! dato-site - HTTP gateway over the Dato note index.
//!
//! Serves the read-only note API, RSS and sitemap documents, and an admin
//! endpoint that writes new notes into the notes directory.

pub mod gateway;

pub use gateway::{
    AdminAuth, ApiError, CreateNoteError, CreatedNote, GatewayHealthResponse, GatewayState,
    router, run_http,
};
