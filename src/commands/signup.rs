use crate::banner;
use crate::commands::{CmdCtx, CommandResult, dialogue};
use crate::models::auth::SignupRequest;
use crate::state::interactive::{AuthMode, Completion};
use std::sync::Arc;
use tracing::debug;

pub async fn signup(ctx: Arc<CmdCtx>) -> CommandResult {
    if ctx.is_logged_in() {
        ctx.output.system("You are already logged in. Type 'logout' first.").await;
        return Ok(());
    }

    dialogue::start(ctx, AuthMode::Signup).await
}

pub(super) async fn complete(ctx: Arc<CmdCtx>, done: &Completion) -> CommandResult {
    let req = signup_request(done);

    match ctx.registry.http.signup(&req).await {
        Ok(cred) => {
            let name = cred.user.map(|u| u.username).unwrap_or(req.username);
            ctx.output.system(format!("Welcome, {name}! Your account is ready.")).await;
            Ok(())
        }
        Err(e) if e.is_network() => Err(e.into()),
        Err(e) => {
            debug!(status = ?e.status(), error = %e, "signup rejected");
            ctx.output.system(banner::SIGNUP_FAILED).await;
            Ok(())
        }
    }
}

/// The dialogue does not ask for an email; a username that looks like one doubles as it.
fn signup_request(done: &Completion) -> SignupRequest {
    let username = done.get("username").to_string();
    let email = if username.contains('@') { username.clone() } else { String::new() };

    SignupRequest {
        username,
        email,
        password: done.get("password").to_string(),
        passkey: done.get("passkey").to_string(),
    }
}
