use crate::banner;
use crate::error::ApiError;
use crate::input::parser::parse;
use crate::net::output::OutputHandle;
use crate::services::ServiceError;
use crate::state::registry::Registry;
use crate::state::session::Session;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

mod admin;
mod dialogue;
mod fallback;
mod login;
mod logout;
mod signup;
mod status;
mod whoami;

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CommandError {
    /// Text shown to the user. Auth failures stay generic.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Usage(s) => format!("Usage: {s}"),
            CommandError::PermissionDenied => banner::NOT_AUTHORIZED.to_string(),
            CommandError::NotLoggedIn => banner::AUTH_REQUIRED.to_string(),
            CommandError::Service(ServiceError::Api(e)) | CommandError::Api(e) => api_message(e),
            CommandError::Service(e) => e.to_string(),
        }
    }
}

fn api_message(e: &ApiError) -> String {
    match e {
        ApiError::AuthExpired { .. } => banner::SESSION_EXPIRED.to_string(),
        ApiError::Network(_) => banner::SERVER_UNREACHABLE.to_string(),
        ApiError::Http { status: 403, .. } => banner::NOT_AUTHORIZED.to_string(),
        other => other.to_string(),
    }
}

/// Command context passed to command handlers
pub struct CmdCtx {
    /// Output system
    pub output: OutputHandle,
    /// Global service registry
    pub registry: Arc<Registry>,
    /// Chat session
    pub sess: Arc<RwLock<Session>>,
}

impl CmdCtx {
    pub fn new(output: OutputHandle, registry: Arc<Registry>) -> Self {
        Self {
            output,
            registry,
            sess: Arc::new(RwLock::new(Session::new())),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.registry.store.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.registry.store.is_admin()
    }

    pub fn require_login(&self) -> CommandResult {
        if self.is_logged_in() { Ok(()) } else { Err(CommandError::NotLoggedIn) }
    }

    /// Prompt that fits the current state, sent after every handled line.
    pub async fn prompt(&self) {
        let in_dialogue = self.sess.read().in_dialogue();
        if in_dialogue {
            return;
        }
        if self.is_logged_in() {
            self.output.prompt(">").await;
        } else {
            self.output.line(banner::PROMPT_LOGGED_OUT).await;
            self.output.prompt(">").await;
        }
    }
}

/// Routes one line of user input. An active login/signup dialogue always sees the line first.
pub async fn process_input(raw: &str, ctx: Arc<CmdCtx>) -> CommandResult {
    let line = raw.trim_end_matches(['\r', '\n']);

    let in_dialogue = ctx.sess.read().in_dialogue();
    if in_dialogue {
        return dialogue::advance(ctx.clone(), line).await;
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "help" | "commands" => {
            ctx.output.system(banner::HELP).await;
            Ok(())
        }
        "login" => login::login(ctx.clone()).await,
        "signup" | "register" => signup::signup(ctx.clone()).await,
        "logout" => logout::logout(ctx.clone()).await,
        "whoami" | "me" => whoami::whoami(ctx.clone()).await,
        "status" => status::status(ctx.clone()).await,
        "quit" | "exit" => {
            ctx.sess.write().close();
            ctx.output.system("Goodbye!").await;
            Ok(())
        }
        _ => match parse(trimmed) {
            Some(cmd) => admin::admin(ctx.clone(), cmd).await,
            None => fallback::fallback(ctx.clone(), trimmed).await,
        },
    }
}

/// Runs one line and reports failures to the user instead of the caller.
pub async fn handle_line(raw: &str, ctx: Arc<CmdCtx>) {
    if let Err(e) = process_input(raw, ctx.clone()).await {
        debug!(error = %e, "command failed");
        ctx.output.system(e.user_message()).await;
    }
    ctx.prompt().await;
}
