use crate::config::Config;
use crate::error::ApiResult;
use crate::net::HttpSession;
use crate::services::{AdminService, StatusPoller};
use crate::state::credentials::CredentialStore;
use std::sync::Arc;

pub struct Services {
    pub admin: Arc<AdminService>,
    pub status: Arc<StatusPoller>,
}

/// Process-wide handles shared by every chat session.
pub struct Registry {
    pub config: Arc<Config>,
    pub store: Arc<CredentialStore>,
    pub http: HttpSession,
    pub services: Arc<Services>,
}

impl Registry {
    /// Builds the registry, restoring credentials from the session file when one is configured.
    pub fn new(config: Arc<Config>) -> ApiResult<Self> {
        let store = match &config.session_file {
            Some(path) => CredentialStore::restore(path),
            None => CredentialStore::new(),
        };
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: Arc<Config>, store: Arc<CredentialStore>) -> ApiResult<Self> {
        let http = HttpSession::new(&config, store.clone())?;

        let services = Arc::new(Services {
            admin: Arc::new(AdminService::new(http.clone())),
            status: Arc::new(StatusPoller::new(http.clone())),
        });

        Ok(Self {
            config,
            store,
            http,
            services,
        })
    }
}
