//! Bearer-token authentication gate.
//!
//! Runs once per request, before route policy and before any handler code.
//! It extracts `Authorization: Bearer <token>`, verifies the token, resolves
//! the subject to a stored identity, and publishes an `AuthCtx` into the
//! request extensions.
//!
//! The gate never rejects a request. Authentication and authorization are
//! deliberately separate: public endpoints can still read an attached
//! principal when one is available, and the route policy layer makes the
//! accept/reject call for protected paths.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::Utc;

use crate::api::v1::extractors::{AuthCtx, Principal};
use crate::state::AppState;

/// Apply the gate to the top-level router.
///
/// It must wrap every route exactly once. Internal forwards must not pass
/// through it again; the re-entry guard below backstops that invariant.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8's from_fn cannot take a State extractor, so state is passed
    // explicitly via from_fn_with_state.
    router.layer(middleware::from_fn_with_state(state, gate_middleware))
}

async fn gate_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // A context already present means the gate already ran for this request.
    if req.extensions().get::<AuthCtx>().is_some() {
        return next.run(req).await;
    }

    if let Some(token) = bearer_token(&req) {
        match state.tokens.verify(token, Utc::now()) {
            Ok(subject) => match state.identities.find_by_username(&subject).await {
                Ok(Some(identity)) => {
                    let ctx = AuthCtx::new(
                        Principal {
                            user_id: identity.id,
                            username: identity.username,
                            email: identity.email,
                        },
                        req.method().clone(),
                        req.uri().path().to_string(),
                    );
                    tracing::debug!(
                        username = %ctx.principal.username,
                        method = %ctx.method,
                        path = %ctx.path,
                        "authenticated request"
                    );
                    req.extensions_mut().insert(ctx);
                }
                Ok(None) => {
                    // Account deleted after the token was issued. Same outcome
                    // as an invalid token: the request stays anonymous.
                    tracing::warn!(subject = %subject, "token subject no longer resolves");
                }
                Err(err) => {
                    tracing::error!(error = %err, "identity lookup failed during authentication");
                }
            },
            Err(err) => {
                tracing::debug!(error = %err, "access token rejected");
            }
        }
    }

    next.run(req).await
}

/// Extract the raw bearer token, or None when no usable credential was sent.
///
/// A missing header, a non-Bearer scheme, an empty remainder, and the literal
/// `"null"` (a client serializing an absent value as text) all count as
/// absent rather than malformed; either way no principal gets published.
fn bearer_token(req: &Request<Body>) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() || token == "null" {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req_with_auth(value: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/me");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn missing_header_is_absent() {
        assert!(bearer_token(&req_with_auth(None)).is_none());
    }

    #[test]
    fn non_bearer_scheme_is_absent() {
        assert!(bearer_token(&req_with_auth(Some("Basic dXNlcjpwdw=="))).is_none());
    }

    #[test]
    fn literal_null_and_empty_remainder_are_absent() {
        assert!(bearer_token(&req_with_auth(Some("Bearer null"))).is_none());
        assert!(bearer_token(&req_with_auth(Some("Bearer "))).is_none());
        assert!(bearer_token(&req_with_auth(Some("Bearer"))).is_none());
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(
            bearer_token(&req_with_auth(Some("Bearer abc.def.ghi"))),
            Some("abc.def.ghi")
        );
    }
}
