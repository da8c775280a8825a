use std::sync::Arc;

use crate::middleware::auth::policy::RoutePolicy;
use crate::services::auth::token_codec::TokenCodec;
use crate::services::identity::IdentityStore;

/// Shared context handed to the Router.
///
/// Everything in here is built once at startup and immutable afterwards;
/// cloning is cheap (Arc all the way down), and request handling never takes
/// a lock through this state.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenCodec>,
    pub identities: Arc<dyn IdentityStore>,
    pub policy: Arc<RoutePolicy>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenCodec>,
        identities: Arc<dyn IdentityStore>,
        policy: Arc<RoutePolicy>,
    ) -> Self {
        Self {
            tokens,
            identities,
            policy,
        }
    }
}
