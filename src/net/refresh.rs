//! Single-flight access token refresh.
//!
//! At most one `POST /auth/token/refresh/` is outstanding per session. Callers that hit a
//! 401 while it runs await the same shared future and see the same outcome.

use crate::models::auth::TokenResponse;
use crate::net::http::{CallOptions, HttpSession, finish};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::Method;
use tracing::{debug, info, warn};

pub const REFRESH_PATH: &str = "/auth/token/refresh/";

pub(crate) type PendingRefresh = Shared<BoxFuture<'static, bool>>;

impl HttpSession {
    /// Exchange the refresh cookie for a new access token.
    ///
    /// Returns `true` when a new token is installed. On failure the credential store is
    /// cleared, unless the session changed (logout or a new login) while the exchange ran;
    /// in that case the late result is discarded either way.
    pub async fn refresh(&self) -> bool {
        let pending = self.pending_refresh();
        pending.await
    }

    /// True while a refresh exchange is outstanding.
    pub fn refresh_in_flight(&self) -> bool {
        self.inner.refresh.lock().is_some()
    }

    fn pending_refresh(&self) -> PendingRefresh {
        let mut slot = self.inner.refresh.lock();
        if let Some(pending) = slot.as_ref() {
            debug!("joining in-flight token refresh");
            return pending.clone();
        }

        let session = self.clone();
        let pending = async move {
            let ok = session.exchange_refresh().await;
            session.inner.refresh.lock().take();
            ok
        }
        .boxed()
        .shared();

        *slot = Some(pending.clone());
        pending
    }

    async fn exchange_refresh(&self) -> bool {
        let store = &self.inner.store;
        let epoch = store.epoch();
        info!("refreshing access token");

        // sent straight through `send`: the refresh call never enters the 401 protocol
        let opts = CallOptions::anonymous();
        let outcome = match self.send(&Method::POST, REFRESH_PATH, None, &opts, None).await {
            Ok(resp) => finish(resp).await,
            Err(e) => Err(e),
        };

        let token = match outcome {
            Ok(resp) => serde_json::from_value::<TokenResponse>(resp.data)
                .ok()
                .and_then(|t| t.access)
                .filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                None
            }
        };

        match token {
            Some(token) => {
                if store.set_token_if_current(epoch, token) {
                    info!("access token refreshed");
                    true
                } else {
                    debug!("session changed during refresh, discarding new token");
                    false
                }
            }
            None => {
                if store.clear_if_current(epoch) {
                    info!("refresh rejected, credentials cleared");
                }
                false
            }
        }
    }
}
