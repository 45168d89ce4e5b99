pub mod banner;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod net;
pub mod services;
pub mod state;

// Convenient re-exports (so call sites can do `careerdesk::Registry`, etc.)
pub use commands::{CmdCtx, process_input};
pub use error::{ApiError, ApiResult};
pub use net::{ApiResponse, CallOptions, HttpSession};
pub use state::{credentials::CredentialStore, registry::Registry, session::Session};
