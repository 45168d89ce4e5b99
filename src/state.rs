pub mod credentials;
pub mod interactive;
pub mod registry;
pub mod session;
