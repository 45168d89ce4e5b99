use crate::banner;
use crate::commands::{CmdCtx, CommandResult};
use std::sync::Arc;
use tracing::debug;

pub async fn fallback(ctx: Arc<CmdCtx>, input: &str) -> CommandResult {
    if !ctx.is_logged_in() {
        ctx.output.system(banner::AUTH_REQUIRED).await;
        return Ok(());
    }

    debug!(len = input.len(), "unrecognized input");
    ctx.output.system(banner::UNKNOWN_COMMAND).await;
    Ok(())
}
