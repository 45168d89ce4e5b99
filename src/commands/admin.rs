use crate::banner;
use crate::commands::status::plain;
use crate::commands::{CmdCtx, CommandError, CommandResult};
use crate::input::parser::{ACTION_CREATE_PASSKEY, ACTION_LIST_USERS, ACTION_RESET_PASSWORD, ACTION_UPDATE_USER, ACTION_VIEW_USER};
use crate::models::command::ParsedCommand;
use crate::services::AdminOutcome;
use serde_json::Value;
use std::sync::Arc;

pub async fn admin(ctx: Arc<CmdCtx>, cmd: ParsedCommand) -> CommandResult {
    ctx.require_login()?;
    if !ctx.is_admin() {
        return Err(CommandError::PermissionDenied);
    }

    let outcome = ctx.registry.services.admin.dispatch(&cmd).await?;
    let (action, data) = match outcome {
        AdminOutcome::Help => {
            ctx.output.system(banner::ADMIN_HELP).await;
            return Ok(());
        }
        AdminOutcome::Done { action, response } => (action, response.data),
    };

    for line in render(&action, &data) {
        ctx.output.line(line).await;
    }
    Ok(())
}

fn render(action: &str, data: &Value) -> Vec<String> {
    match action {
        ACTION_LIST_USERS | ACTION_VIEW_USER => {
            let users = match data {
                Value::Array(items) => items.as_slice(),
                Value::Object(map) => map.get("results").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default(),
                _ => &[],
            };
            if users.is_empty() {
                return vec!["No users found.".into()];
            }
            users.iter().map(user_line).collect()
        }
        ACTION_CREATE_PASSKEY => {
            let key = data.get("key").or_else(|| data.get("passkey")).map(plain);
            match key {
                Some(key) => vec![format!("Passkey created: {key}")],
                None => vec!["Passkey created.".into()],
            }
        }
        ACTION_UPDATE_USER => vec![match data.get("username") {
            Some(name) => format!("User {} updated.", plain(name)),
            None => "User updated.".into(),
        }],
        ACTION_RESET_PASSWORD => vec![
            data.get("message")
                .map(plain)
                .unwrap_or_else(|| "Password reset.".into()),
        ],
        _ => vec![plain(data)],
    }
}

fn user_line(user: &Value) -> String {
    let field = |k: &str| user.get(k).map(plain).unwrap_or_else(|| "-".into());
    let active = match user.get("is_active").and_then(Value::as_bool) {
        Some(false) => " (disabled)",
        _ => "",
    };
    format!("#{} {} <{}>{active}", field("id"), field("username"), field("email"))
}
