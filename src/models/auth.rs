use crate::models::account::UserSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub passkey: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Body returned by login, signup and token refresh.
///
/// Refresh only carries `access`; the refresh token itself lives in an http-only cookie.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub user: Option<UserSnapshot>,
    #[serde(default)]
    pub message: Option<String>,
}
