pub mod auth;
pub mod http;
pub mod output;
pub mod refresh;
pub mod service_token;
pub mod sink;

pub use http::{ApiResponse, CallOptions, HttpSession};

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Hidden(char), // masked with for instance '*'
}
