use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{signin, signup},
    health::health,
    users::me,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signin", post(signin))
        .route("/auth/signup", post(signup))
        .route("/me", get(me))
}
