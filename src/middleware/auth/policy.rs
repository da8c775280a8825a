//! Static route policy: which paths require an authenticated principal.
//!
//! The table is built once at startup and never mutated. Enforcement happens
//! in a layer that runs after the authentication gate, so by the time a rule
//! is consulted the gate has already had its one chance to publish a
//! principal.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
}

/// One entry in the policy table. A pattern ending in `/*` matches the path
/// equal to the prefix or any deeper segment under it; anything else must
/// match exactly.
#[derive(Debug, Clone)]
struct Rule {
    pattern: &'static str,
    access: Access,
}

/// Ordered route-to-policy table. Evaluated top to bottom, first match wins;
/// unmatched paths require authentication (fail-closed).
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<Rule>,
}

impl RoutePolicy {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn public(mut self, pattern: &'static str) -> Self {
        self.rules.push(Rule {
            pattern,
            access: Access::Public,
        });
        self
    }

    pub fn authenticated(mut self, pattern: &'static str) -> Self {
        self.rules.push(Rule {
            pattern,
            access: Access::Authenticated,
        });
        self
    }

    /// Decide the access requirement for `path`.
    pub fn decide(&self, path: &str) -> Access {
        for rule in &self.rules {
            if matches(rule.pattern, path) {
                return rule.access;
            }
        }
        Access::Authenticated
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// The table served by this process. Sign-in/up and content reads are
/// anonymous; everything else needs a principal.
pub fn default_policy() -> RoutePolicy {
    RoutePolicy::new()
        .public("/health")
        .public("/auth/*")
        .public("/content/post/*")
        .public("/content/page/*")
        .public("/content/image/*")
        .public("/content/comments/*")
        .public("/content/comment/*")
}

fn matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix("/*") {
        Some(prefix) => {
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
        None => path == pattern,
    }
}

/// Apply policy enforcement to the router. Must sit inside the
/// authentication gate layer (gate outermost).
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match state.policy.decide(req.uri().path()) {
        Access::Public => next.run(req).await,
        Access::Authenticated => {
            if req.extensions().get::<AuthCtx>().is_some() {
                next.run(req).await
            } else {
                // Deliberately undifferentiated: the response must not say
                // why no principal was attached.
                AppError::Unauthorized.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins() {
        let p = RoutePolicy::new()
            .public("/content/post/*")
            .authenticated("/content/*");
        assert_eq!(p.decide("/content/post/1"), Access::Public);
        assert_eq!(p.decide("/content/admin"), Access::Authenticated);
    }

    #[test]
    fn unmatched_paths_fail_closed() {
        let p = default_policy();
        assert_eq!(p.decide("/me"), Access::Authenticated);
        assert_eq!(p.decide("/"), Access::Authenticated);
        assert_eq!(p.decide("/admin/anything"), Access::Authenticated);
    }

    #[test]
    fn exact_rules_do_not_match_prefixes() {
        let p = RoutePolicy::new().public("/health");
        assert_eq!(p.decide("/health"), Access::Public);
        assert_eq!(p.decide("/healthz"), Access::Authenticated);
        assert_eq!(p.decide("/health/deep"), Access::Authenticated);
    }

    #[test]
    fn wildcard_rules_match_whole_segments_only() {
        let p = default_policy();
        assert_eq!(p.decide("/auth/signin"), Access::Public);
        assert_eq!(p.decide("/auth"), Access::Public);
        assert_eq!(p.decide("/authx"), Access::Authenticated);
        assert_eq!(p.decide("/content/post/42"), Access::Public);
        assert_eq!(p.decide("/content/postx"), Access::Authenticated);
    }
}
