use std::sync::Arc;

use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

const BEARER: &str = "bearer";

/// Claims of the verified token, stored in request extensions for the
/// handlers behind the gate.
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub auth::Claims);

/// Middleware that validates access tokens and records the caller's identity.
///
/// Accepts `Authorization: Bearer <token>` (scheme in any case) or the bare
/// token. The rejection reason is logged; clients only see one of two
/// messages.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims = authenticator.validate_token(token).map_err(|e| {
        tracing::warn!(stage = ?e.rejection_stage(), "token rejected");
        unauthorized("Invalid or expired token")
    })?;

    req.extensions_mut().insert(RequestIdentity(claims));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let value = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    let token = strip_bearer(value).trim();
    if token.is_empty() {
        tracing::info!("request without credentials");
        return Err(unauthorized("Unauthorized"));
    }

    Ok(token)
}

/// Drop a leading `Bearer` scheme. The scheme alone, with or without trailing
/// whitespace, leaves nothing.
fn strip_bearer(value: &str) -> &str {
    match value.get(..BEARER.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(BEARER) => {
            let rest = &value[BEARER.len()..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                value
            }
        }
        _ => value,
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
}
