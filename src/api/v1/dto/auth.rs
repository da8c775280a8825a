use serde::{Deserialize, Serialize};

/// Login credentials.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

/// New account registration.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Successful sign-in payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    pub access_token: String,
    /// Always "Bearer".
    pub token_type: &'static str,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
