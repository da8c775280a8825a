use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::info;

use crate::api::v1::dto::auth::{JwtResponse, MessageResponse, SigninRequest, SignupRequest};
use crate::error::AppError;
use crate::services::auth::password;
use crate::services::identity::NewIdentity;
use crate::state::AppState;

/// Verify credentials and issue an access token.
///
/// Unknown username and wrong password both map to the same generic 401 so
/// callers cannot probe which usernames exist.
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<JwtResponse>, AppError> {
    let identity = state
        .identities
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !password::verify_password(&req.password, &identity.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = state.tokens.issue(&identity.username, Utc::now())?;
    info!(username = %identity.username, "issued access token");

    Ok(Json(JwtResponse {
        access_token: token,
        token_type: "Bearer",
        username: identity.username,
        firstname: identity.firstname,
        lastname: identity.lastname,
    }))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    if state.identities.username_taken(&req.username).await? {
        return Err(AppError::bad_request(
            "USERNAME_TAKEN",
            "Username is taken. Try another.",
        ));
    }
    if state.identities.email_taken(&req.email).await? {
        return Err(AppError::bad_request(
            "EMAIL_TAKEN",
            "Email is taken. Try another.",
        ));
    }

    let password_hash = password::hash_password(&req.password)?;
    let identity = state
        .identities
        .insert(NewIdentity {
            firstname: req.firstname,
            lastname: req.lastname,
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    info!(username = %identity.username, "registered user");

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: format!("User {} has been created successfully", identity.firstname),
        }),
    ))
}
