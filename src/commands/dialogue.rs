use crate::commands::{CmdCtx, CommandResult, login, signup};
use crate::state::interactive::{self, AuthMode};
use std::sync::Arc;
use tracing::debug;

/// Starts a login or signup dialogue and asks for its first field.
pub(super) async fn start(ctx: Arc<CmdCtx>, mode: AuthMode) -> CommandResult {
    let start = interactive::begin(mode);
    let input_mode = ctx.sess.write().set_flow(start.flow);

    if let Some(prompt) = start.prompt {
        ctx.output.input_mode(input_mode).await;
        ctx.output.prompt(prompt).await;
    }
    Ok(())
}

/// Feeds one line into the running dialogue.
pub(super) async fn advance(ctx: Arc<CmdCtx>, line: &str) -> CommandResult {
    let flow = ctx.sess.write().take_flow();
    let step = interactive::advance(flow, line);
    let input_mode = ctx.sess.write().set_flow(step.flow);
    ctx.output.input_mode(input_mode).await;

    if let Some(err) = step.error {
        debug!(error = err.as_str(), "dialogue step rejected");
    }

    if let Some(done) = step.complete {
        return match done.kind {
            AuthMode::Login => login::complete(ctx, &done).await,
            AuthMode::Signup => signup::complete(ctx, &done).await,
            AuthMode::Idle => Ok(()),
        };
    }

    // an empty line leaves the step unchanged, ask again
    let prompt = step.prompt.or_else(|| ctx.sess.read().flow().prompt());
    if let Some(prompt) = prompt {
        ctx.output.prompt(prompt).await;
    }
    Ok(())
}
