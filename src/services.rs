mod admin;
mod error;
mod status;

pub use admin::{AdminOutcome, AdminService};
pub use status::{STATUS_BAR_PATH, StatusPoller};

pub use error::ServiceError;
