//! Admin route guard: shared token and basic credentials.
//!
//! Each check only applies when its secret is configured.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dato_notes::SiteConfig;
use percent_encoding::percent_decode_str;
use serde_json::json;
use std::sync::Arc;

/// Header carrying the shared admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
/// Cookie carrying the shared admin token.
pub const ADMIN_TOKEN_COOKIE: &str = "admin_token";
/// Cookie carrying base64 `user:pass` credentials.
pub const ADMIN_BASIC_COOKIE: &str = "admin_basic";

/// Secrets required by admin routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAuth {
    token: Option<String>,
    basic: Option<String>,
}

impl AdminAuth {
    /// Guard from explicit secrets; basic auth needs both user and password.
    #[must_use]
    pub fn new(token: Option<String>, user: Option<String>, pass: Option<String>) -> Self {
        let basic = match (user, pass) {
            (Some(user), Some(pass)) => Some(format!("{user}:{pass}")),
            _ => None,
        };
        Self { token, basic }
    }

    /// Guard from the resolved site configuration.
    #[must_use]
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            config.admin_token.clone(),
            config.admin_user.clone(),
            config.admin_pass.clone(),
        )
    }

    /// Whether any check is active.
    #[must_use]
    pub fn is_enforced(&self) -> bool {
        self.token.is_some() || self.basic.is_some()
    }

    /// Whether `headers` satisfy every configured check.
    #[must_use]
    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        if let Some(expected) = self.token.as_deref() {
            let provided = headers
                .get(ADMIN_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .or_else(|| cookie_value(headers, ADMIN_TOKEN_COOKIE))
                .unwrap_or_default();
            if provided != expected {
                return false;
            }
        }
        if let Some(expected) = self.basic.as_deref() {
            if basic_credentials(headers) != expected {
                return false;
            }
        }
        true
    }
}

/// Percent-decoded value of cookie `name`, if present.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
}

fn decode_basic(encoded: &str) -> String {
    STANDARD
        .decode(encoded.trim())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Decoded `user:pass` from `Authorization: Basic` or the `admin_basic` cookie.
fn basic_credentials(headers: &HeaderMap) -> String {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "));
    if let Some(encoded) = authorization {
        return decode_basic(encoded);
    }
    cookie_value(headers, ADMIN_BASIC_COOKIE)
        .map(|encoded| decode_basic(&encoded))
        .unwrap_or_default()
}

/// Middleware rejecting unauthorized admin requests with `401 {"error":"Unauthorized"}`.
pub async fn require_admin(
    State(auth): State<Arc<AdminAuth>>,
    request: Request,
    next: Next,
) -> Response {
    if auth.authorize(request.headers()) {
        return next.run(request).await;
    }
    tracing::warn!(path = %request.uri().path(), "rejected unauthorized admin request");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}
