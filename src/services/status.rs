use crate::error::ApiResult;
use crate::net::{CallOptions, HttpSession};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;

pub const STATUS_BAR_PATH: &str = "/status/bar/";

#[derive(Default)]
struct Cached {
    etag: Option<String>,
    data: Option<Value>,
}

/// Conditional poller for the status bar. A `304` keeps the last payload.
pub struct StatusPoller {
    http: HttpSession,
    cached: Mutex<Cached>,
}

impl StatusPoller {
    pub fn new(http: HttpSession) -> Self {
        Self {
            http,
            cached: Mutex::new(Cached::default()),
        }
    }

    /// Returns the current payload and whether it changed since the last poll.
    pub async fn poll(&self) -> ApiResult<(Value, bool)> {
        let mut cached = self.cached.lock().await;

        let mut opts = CallOptions::default();
        if let Some(etag) = &cached.etag {
            opts = opts.with_etag(etag.clone());
        }

        let resp = self.http.call(Method::GET, STATUS_BAR_PATH, None, opts).await?;
        if resp.not_modified()
            && let Some(data) = &cached.data
        {
            return Ok((data.clone(), false));
        }

        if resp.etag.is_some() {
            cached.etag = resp.etag;
        }
        cached.data = Some(resp.data.clone());
        Ok((resp.data, true))
    }

    pub async fn etag(&self) -> Option<String> {
        self.cached.lock().await.etag.clone()
    }
}
