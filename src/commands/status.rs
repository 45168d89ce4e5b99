use crate::commands::{CmdCtx, CommandResult};
use serde_json::Value;
use std::sync::Arc;

pub async fn status(ctx: Arc<CmdCtx>) -> CommandResult {
    ctx.require_login()?;

    let (data, changed) = ctx.registry.services.status.poll().await?;
    if !changed {
        ctx.output.system("(unchanged)").await;
    }

    match data {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                ctx.output.line(format!("{k}: {}", plain(&v))).await;
            }
        }
        Value::Null => ctx.output.line("No status available.").await,
        other => ctx.output.line(plain(&other)).await,
    }
    Ok(())
}

pub(super) fn plain(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
