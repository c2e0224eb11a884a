//! Caller identity. Authentication itself is delegated to the upstream identity
//! provider; by the time a request reaches us the gateway has verified the session
//! and forwards the provider's opaque user id.
//!
//! Accepted sources, in order:
//! 1. `X-User-Id: <id>`
//! 2. `Authorization: Bearer <id>`
//!
//! When `GATEWAY_SECRET` is configured, API routes additionally require the
//! gateway to present it in `X-Gateway-Secret`; without it the forwarded id
//! is not trusted.

use std::fmt;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const GATEWAY_SECRET_HEADER: &str = "X-Gateway-Secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the caller from request headers. `None` when no usable id is present.
pub fn resolve_caller_identity(headers: &HeaderMap) -> Option<CallerIdentity> {
    if let Some(value) = headers.get(USER_ID_HEADER) {
        if let Ok(id) = value.to_str() {
            let id = id.trim();
            if !id.is_empty() {
                return Some(CallerIdentity::new(id));
            }
        }
    }

    if let Some(auth) = headers.get("Authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Some(CallerIdentity::new(token));
                }
            }
        }
    }

    None
}

/// Rejects with 401. Handlers that want to decide themselves take `Option<CallerIdentity>`.
#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        resolve_caller_identity(&parts.headers).ok_or(AppError::Unauthorized)
    }
}

/// Rejects requests that do not carry the configured gateway secret.
///
/// No secret configured (local development) means every request passes.
/// Wired with `from_fn_with_state` on the API routes; `/health` stays open.
pub async fn require_gateway_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.gateway_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    let authorized = request
        .headers()
        .get(GATEWAY_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|secret| secrets_match(secret, expected));

    if !authorized {
        warn!(
            "Rejected {} {}: missing or wrong gateway secret",
            request.method(),
            request.uri().path()
        );
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Compares without short-circuiting on the first differing byte.
fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
