use crate::input::parser::{
    ACTION_CREATE_PASSKEY, ACTION_HELP, ACTION_LIST_USERS, ACTION_RESET_PASSWORD, ACTION_UPDATE_USER, ACTION_VIEW_USER,
};
use crate::models::command::{ParamValue, Params, ParsedCommand};
use crate::net::{ApiResponse, CallOptions, HttpSession};
use crate::services::ServiceError;
use reqwest::Method;
use serde_json::{Map, Value, json};
use tracing::debug;

const PASSKEYS_PATH: &str = "/admin/passkeys/";
const USERS_PATH: &str = "/admin/users/";

#[derive(Debug, Clone, PartialEq)]
pub enum AdminOutcome {
    /// Nothing was sent; the caller shows the admin command list
    Help,
    Done { action: String, response: ApiResponse },
}

pub struct AdminService {
    http: HttpSession,
}

impl AdminService {
    pub fn new(http: HttpSession) -> Self {
        Self { http }
    }

    pub async fn dispatch(&self, cmd: &ParsedCommand) -> Result<AdminOutcome, ServiceError> {
        debug!(action = %cmd.action, "admin dispatch");

        let response = match cmd.action.as_str() {
            ACTION_HELP => return Ok(AdminOutcome::Help),
            ACTION_CREATE_PASSKEY => self.create_passkey(&cmd.params).await?,
            ACTION_LIST_USERS | ACTION_VIEW_USER => self.list_users(&cmd.params).await?,
            ACTION_UPDATE_USER => {
                let id = require_id(cmd)?;
                let mut fields = cmd.params.clone();
                fields.remove("id");
                self.update_user(id, &fields).await?
            }
            ACTION_RESET_PASSWORD => {
                let id = require_id(cmd)?;
                let password = cmd
                    .param("new_password")
                    .and_then(ParamValue::as_str)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| ServiceError::InvalidInput("new password is required".into()))?;
                self.reset_password(id, password).await?
            }
            other => return Err(ServiceError::Unsupported(other.to_string())),
        };

        Ok(AdminOutcome::Done {
            action: cmd.action.clone(),
            response,
        })
    }

    pub async fn create_passkey(&self, params: &Params) -> Result<ApiResponse, ServiceError> {
        Ok(self.http.post(PASSKEYS_PATH, &to_json(params)).await?)
    }

    /// `GET /admin/users/`, empty filter values are left out of the query.
    pub async fn list_users(&self, params: &Params) -> Result<ApiResponse, ServiceError> {
        let query = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_string()))
            .filter(|(_, v)| !v.is_empty());
        let opts = CallOptions::default().with_query(query);
        Ok(self.http.call(Method::GET, USERS_PATH, None, opts).await?)
    }

    pub async fn update_user(&self, id: &str, fields: &Params) -> Result<ApiResponse, ServiceError> {
        let path = user_path(id, "");
        Ok(self.http.patch(&path, &to_json(fields)).await?)
    }

    pub async fn reset_password(&self, id: &str, new_password: &str) -> Result<ApiResponse, ServiceError> {
        let path = user_path(id, "reset-password/");
        Ok(self.http.post(&path, &json!({ "new_password": new_password })).await?)
    }
}

/// `id` always stays a single path segment.
fn user_path(id: &str, tail: &str) -> String {
    format!("{USERS_PATH}{}/{tail}", urlencoding::encode(id))
}

fn require_id(cmd: &ParsedCommand) -> Result<&str, ServiceError> {
    cmd.param("id")
        .and_then(ParamValue::as_str)
        .filter(|id| !id.is_empty() && !matches!(*id, "." | ".."))
        .ok_or_else(|| ServiceError::InvalidInput("a user id is required".into()))
}

fn to_json(params: &Params) -> Value {
    let map: Map<String, Value> = params
        .iter()
        .map(|(k, v)| {
            let value = match v {
                ParamValue::Text(s) => Value::String(s.clone()),
                ParamValue::Flag(b) => Value::Bool(*b),
            };
            (k.clone(), value)
        })
        .collect();
    Value::Object(map)
}
