use crate::commands::{CmdCtx, CommandResult};
use std::sync::Arc;

pub async fn logout(ctx: Arc<CmdCtx>) -> CommandResult {
    if !ctx.is_logged_in() {
        ctx.output.system("You must be logged in to log out.").await;
        return Ok(());
    }

    ctx.registry.http.logout().await;

    ctx.output.system("You have been logged out.").await;
    Ok(())
}
