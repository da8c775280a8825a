/*
 * Responsibility
 * - the "authenticated context" type handlers see
 * - the gate verifies credentials and stores an AuthCtx in request
 *   extensions; handlers receive it through these extractors and never touch
 *   the raw token
 */

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{Method, request::Parts},
};
use uuid::Uuid;

use crate::error::AppError;

/// Verified identity attached to the current request.
///
/// Built only from a stored identity after a successful token verification;
/// never constructed from unvalidated input. Lives for one request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

/// Request-scoped authentication context.
///
/// Written exactly once by the gate, read-only afterwards. Carries the
/// originating method and path so downstream audit logging can attribute the
/// action without re-reading the request.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub principal: Principal,
    pub method: Method,
    pub path: String,
}

impl AuthCtx {
    pub fn new(principal: Principal, method: Method, path: String) -> Self {
        Self {
            principal,
            method,
            path,
        }
    }
}

impl<S> FromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

// Public handlers can take Option<AuthCtx> to show per-user affordances
// while still serving anonymous callers.
impl<S> OptionalFromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthCtx>().cloned())
    }
}
