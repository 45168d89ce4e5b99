//! Login, signup, logout and profile calls. These, together with the refresh exchange, are
//! the only paths that write the credential store.

use crate::error::{ApiError, ApiResult};
use crate::models::account::{Credential, UserSnapshot};
use crate::models::auth::{LoginRequest, PasswordChangeRequest, SignupRequest, TokenResponse};
use crate::net::http::{CallOptions, HttpSession};
use reqwest::Method;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub const LOGIN_PATH: &str = "/auth/login/";
pub const SIGNUP_PATH: &str = "/auth/signup/";
pub const LOGOUT_PATH: &str = "/auth/logout/";
pub const ME_PATH: &str = "/me/";
pub const PASSWORD_CHANGE_PATH: &str = "/auth/password/change/";
pub const PASSWORD_RESET_PATH: &str = "/auth/password/reset/";

impl HttpSession {
    pub async fn login(&self, req: &LoginRequest) -> ApiResult<Credential> {
        let body = to_body(req)?;
        let resp = self
            .call(Method::POST, LOGIN_PATH, Some(&body), CallOptions::anonymous())
            .await?;
        info!(username = %req.username, "logged in");
        self.start_session(resp.data).await
    }

    pub async fn signup(&self, req: &SignupRequest) -> ApiResult<Credential> {
        let body = to_body(req)?;
        let resp = self
            .call(Method::POST, SIGNUP_PATH, Some(&body), CallOptions::anonymous())
            .await?;
        info!(username = %req.username, "signed up");
        self.start_session(resp.data).await
    }

    /// Best-effort server logout. Local credentials are cleared whatever the outcome.
    pub async fn logout(&self) {
        let opts = CallOptions::default().no_refresh();
        if let Err(e) = self.call(Method::POST, LOGOUT_PATH, None, opts).await {
            debug!(error = %e, "server logout failed, clearing locally anyway");
        }
        self.inner.store.clear();
        info!("logged out");
    }

    /// Fetch the current user and replace the stored snapshot wholesale.
    pub async fn fetch_me(&self) -> ApiResult<UserSnapshot> {
        let resp = match self.get(ME_PATH).await {
            Ok(resp) => resp,
            Err(e) => {
                if !e.is_network() {
                    self.inner.store.set_user(None);
                }
                return Err(e);
            }
        };
        let user: UserSnapshot = serde_json::from_value(resp.data).map_err(|e| ApiError::Decode(format!("user: {e}")))?;
        self.inner.store.set_user(Some(user.clone()));
        Ok(user)
    }

    pub async fn change_password(&self, req: &PasswordChangeRequest) -> ApiResult<String> {
        let resp = self.post(PASSWORD_CHANGE_PATH, &to_body(req)?).await?;
        Ok(message_of(&resp.data, "Password changed successfully"))
    }

    /// Always answers with the same message whether or not the email exists.
    pub async fn request_password_reset(&self, email: &str) -> ApiResult<String> {
        let body = json!({ "email": email });
        let resp = self
            .call(Method::POST, PASSWORD_RESET_PATH, Some(&body), CallOptions::anonymous())
            .await?;
        Ok(message_of(&resp.data, "If an account exists with this email, a password reset link will be sent"))
    }

    async fn start_session(&self, data: Value) -> ApiResult<Credential> {
        // an empty 2xx body carries no tokens; a body of the wrong shape is an error and leaves the store alone
        let tokens = match data {
            Value::Null => TokenResponse::default(),
            data => serde_json::from_value::<TokenResponse>(data).map_err(|e| ApiError::Decode(format!("token response: {e}")))?,
        };
        let needs_profile = tokens.user.is_none() && tokens.access.is_some();
        self.inner.store.begin_session(tokens.access, tokens.user);

        if needs_profile && let Err(e) = self.fetch_me().await {
            warn!(error = %e, "could not load profile after authentication");
        }
        Ok(self.inner.store.snapshot())
    }
}

fn to_body<T: serde::Serialize>(req: &T) -> ApiResult<Value> {
    serde_json::to_value(req).map_err(|e| ApiError::Decode(e.to_string()))
}

fn message_of(data: &Value, fallback: &str) -> String {
    data.get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}
