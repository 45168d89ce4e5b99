use crate::commands::{CmdCtx, CommandResult};
use std::sync::Arc;

pub async fn whoami(ctx: Arc<CmdCtx>) -> CommandResult {
    ctx.require_login()?;

    let user = ctx.registry.http.fetch_me().await?;
    let mut roles = Vec::new();
    if user.is_superuser {
        roles.push("superuser");
    }
    if user.is_staff {
        roles.push("staff");
    }

    let mut line = format!("{} (id {})", user.username, user.id);
    if !user.email.is_empty() {
        line.push_str(&format!(" <{}>", user.email));
    }
    if let Some(tenant) = user.tenant_id {
        line.push_str(&format!(", tenant {tenant}"));
    }
    if !roles.is_empty() {
        line.push_str(&format!(" [{}]", roles.join(", ")));
    }

    ctx.output.line(line).await;
    Ok(())
}
