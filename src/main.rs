use careerdesk::commands::{CmdCtx, handle_line};
use careerdesk::net::output::{OutputHandle, SessionOut};
use careerdesk::net::sink::console::ConsoleSink;
use careerdesk::{Registry, banner, config};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cfg = Arc::new(config::Config::from_env()?);
    tracing::info!(api_base = %cfg.api_base, "careerdesk starting");

    let registry = Arc::new(Registry::new(cfg.clone())?);

    let (output, rx) = OutputHandle::channel(64);
    let out_jh = tokio::spawn(SessionOut::new(rx).run(ConsoleSink::new(tokio::io::stdout())));

    let ctx = Arc::new(CmdCtx::new(output.clone(), registry.clone()));
    output.system(banner::BANNER).await;
    if let Some(user) = registry.store.user() {
        output.system(format!("Signed in as {user}.")).await;
    }
    ctx.prompt().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        handle_line(&line, ctx.clone()).await;
        if ctx.sess.read().is_closing() {
            break;
        }
    }

    // closing every sender lets the output task drain and stop
    drop(ctx);
    drop(output);
    out_jh.await??;

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, prelude::*};

    color_eyre::install().map_err(|e| anyhow::anyhow!("{e}"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,careerdesk=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_timer(tracing_subscriber::fmt::time::uptime()),
        )
        .with(tracing_error::ErrorLayer::default())
        .init();

    Ok(())
}
