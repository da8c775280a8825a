/*
 * Responsibility
 * - Config load -> dependency build -> Router assembly
 * - middleware application (gate / policy / CORS / trace)
 * - axum::serve() startup
 */
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::auth::{gate, policy};
use crate::middleware::cors;
use crate::services::auth::token_codec::TokenCodec;
use crate::services::identity::PgIdentityStore;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,blog_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();

    // A missing signing secret or TTL fails here and aborts startup; it is a
    // configuration error, never a request-time one.
    let config = Config::from_env()?;

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    let state = build_state(&config, db);
    let app = cors::apply(build_router(state), &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &Config, db: PgPool) -> AppState {
    AppState::new(
        Arc::new(TokenCodec::new(
            &config.token_secret,
            config.token_ttl_seconds,
        )),
        Arc::new(PgIdentityStore::new(db)),
        Arc::new(policy::default_policy()),
    )
}

/// Assemble the router.
///
/// Layer order matters: the authentication gate must be outermost so it has
/// published (or not) a principal by the time the route policy is consulted,
/// and it is applied exactly once at this top level.
pub fn build_router(state: AppState) -> Router {
    let router = api::v1::routes();
    let router = policy::apply(router, state.clone());
    let router = gate::apply(router, state.clone());

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
