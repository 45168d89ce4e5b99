use crate::banner;
use crate::commands::{CmdCtx, CommandResult, dialogue};
use crate::models::auth::LoginRequest;
use crate::state::interactive::{AuthMode, Completion};
use std::sync::Arc;
use tracing::debug;

pub async fn login(ctx: Arc<CmdCtx>) -> CommandResult {
    if ctx.is_logged_in() {
        let who = ctx
            .registry
            .store
            .user()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "another user".into());
        ctx.output
            .system(format!("You are already logged in as {who}. Type 'logout' first."))
            .await;
        return Ok(());
    }

    dialogue::start(ctx, AuthMode::Login).await
}

pub(super) async fn complete(ctx: Arc<CmdCtx>, done: &Completion) -> CommandResult {
    let req = LoginRequest {
        username: done.get("username").to_string(),
        password: done.get("password").to_string(),
    };

    match ctx.registry.http.login(&req).await {
        Ok(cred) => {
            let name = cred.user.map(|u| u.username).unwrap_or(req.username);
            ctx.output.system(format!("Welcome back, {name}!")).await;
            Ok(())
        }
        Err(e) if e.is_network() => Err(e.into()),
        Err(e) => {
            // never reveal which half of the credentials was wrong
            debug!(status = ?e.status(), "login rejected");
            ctx.output.system(banner::LOGIN_FAILED).await;
            Ok(())
        }
    }
}
