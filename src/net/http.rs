//! Session-aware HTTP client for the career-tracking api.
//!
//! Every call goes through [`HttpSession::call`], which attaches credentials, honours
//! conditional GETs and recovers from a single 401 by refreshing the access token and
//! retrying once.

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::net::refresh::PendingRefresh;
use crate::net::service_token::{SERVICE_TOKEN_HEADER, ServiceTokenSigner};
use crate::state::credentials::CredentialStore;
use parking_lot::Mutex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ETAG, HeaderMap, HeaderName, HeaderValue, IF_NONE_MATCH};
use reqwest::{Method, StatusCode, Url};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

pub const CSRF_HEADER: &str = "x-csrftoken";

/// Per-call switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Do not attach the bearer token
    pub skip_auth: bool,
    /// Do not run the refresh protocol on 401
    pub skip_auth_refresh: bool,
    /// Send `If-None-Match` with this value
    pub etag: Option<String>,
    /// Url-encoded onto the request url
    pub query: Vec<(String, String)>,
}

impl CallOptions {
    /// Unauthenticated call that must never trigger a refresh (login, signup, refresh itself).
    pub fn anonymous() -> Self {
        Self {
            skip_auth: true,
            skip_auth_refresh: true,
            ..Self::default()
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn no_refresh(mut self) -> Self {
        self.skip_auth_refresh = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed body; `Null` for empty bodies and for 304
    pub data: Value,
    pub etag: Option<String>,
}

impl ApiResponse {
    /// The server confirmed the cached representation is still current.
    pub fn not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED.as_u16()
    }
}

pub(crate) struct Inner {
    pub(crate) http: reqwest::Client,
    base: String,
    jar: Arc<Jar>,
    pub(crate) store: Arc<CredentialStore>,
    signer: Option<ServiceTokenSigner>,
    csrf_cookie: String,
    pub(crate) refresh: Mutex<Option<PendingRefresh>>,
}

#[derive(Clone)]
pub struct HttpSession {
    pub(crate) inner: Arc<Inner>,
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession").field("base", &self.inner.base).finish_non_exhaustive()
    }
}

impl HttpSession {
    pub fn new(cfg: &Config, store: Arc<CredentialStore>) -> ApiResult<Self> {
        let base = cfg.api_base.trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(cfg.timeout())
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base,
                jar,
                store,
                signer: cfg.service_secret.as_deref().map(ServiceTokenSigner::new),
                csrf_cookie: cfg.csrf_cookie.clone(),
                refresh: Mutex::new(None),
            }),
        })
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.inner.store
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base
    }

    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.call(Method::GET, path, None, CallOptions::default()).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> ApiResult<ApiResponse> {
        self.call(Method::POST, path, Some(body), CallOptions::default()).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> ApiResult<ApiResponse> {
        self.call(Method::PATCH, path, Some(body), CallOptions::default()).await
    }

    pub async fn call(&self, method: Method, path: &str, body: Option<&Value>, opts: CallOptions) -> ApiResult<ApiResponse> {
        let seen = (self.inner.store.token(), self.inner.store.epoch());
        let sent = if opts.skip_auth { None } else { seen.0.as_deref() };
        let resp = self.send(&method, path, body, &opts, sent).await?;

        if resp.status() != StatusCode::UNAUTHORIZED || opts.skip_auth_refresh {
            return finish(resp).await;
        }

        let original = parse_body(&resp.text().await?);
        if !self.recover(seen.0.as_deref(), seen.1).await {
            return Err(ApiError::auth_expired(original));
        }

        // exactly one retry, and the retry itself may not refresh again
        let epoch = self.inner.store.epoch();
        let retry_opts = opts.no_refresh();
        let token = if retry_opts.skip_auth { None } else { self.inner.store.token() };
        let resp = self.send(&method, path, body, &retry_opts, token.as_deref()).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            let data = parse_body(&resp.text().await?);
            self.inner.store.clear_if_current(epoch);
            return Err(ApiError::auth_expired(data));
        }
        finish(resp).await
    }

    /// Decide whether a 401 is worth one retry, given the store state seen when the request went out.
    ///
    /// Only a 401 against unchanged credentials starts (or joins) a refresh. If the token was
    /// refreshed, dropped or first issued in the meantime, or the session was replaced, the
    /// request retries with whatever the store holds now and never refreshes a second time.
    async fn recover(&self, seen_token: Option<&str>, seen_epoch: u64) -> bool {
        let current = self.inner.store.token();
        if current.as_deref() != seen_token || self.inner.store.epoch() != seen_epoch {
            debug!(rotated = current.is_some(), "credentials changed while request was in flight");
            return current.is_some();
        }
        self.refresh().await
    }

    pub(crate) async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        opts: &CallOptions,
        token: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let url = self.url(path)?;
        let headers = self.headers(method, &url, body.is_some(), opts, token)?;

        let mut req = self.inner.http.request(method.clone(), url).headers(headers);
        if !opts.query.is_empty() {
            req = req.query(&opts.query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        debug!(%method, path, status = resp.status().as_u16(), "api call");
        Ok(resp)
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        let raw = if path.starts_with('/') {
            format!("{}{}", self.inner.base, path)
        } else {
            format!("{}/{}", self.inner.base, path)
        };
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
    }

    fn headers(&self, method: &Method, url: &Url, has_body: bool, opts: &CallOptions, token: Option<&str>) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ApiError::InvalidHeader("authorization"))?;
            headers.insert(AUTHORIZATION, value);
        }

        if is_state_changing(method) {
            if let Some(csrf) = self.csrf_token(url) {
                let value = HeaderValue::from_str(&csrf).map_err(|_| ApiError::InvalidHeader(CSRF_HEADER))?;
                headers.insert(HeaderName::from_static(CSRF_HEADER), value);
            }
            if let Some(signer) = &self.inner.signer {
                let value = HeaderValue::from_str(&signer.token()).map_err(|_| ApiError::InvalidHeader(SERVICE_TOKEN_HEADER))?;
                headers.insert(HeaderName::from_static(SERVICE_TOKEN_HEADER), value);
            }
        }

        if let Some(etag) = &opts.etag {
            let value = HeaderValue::from_str(etag).map_err(|_| ApiError::InvalidHeader("if-none-match"))?;
            headers.insert(IF_NONE_MATCH, value);
        }

        Ok(headers)
    }

    /// Value of the csrf cookie the server set for this url, if any.
    fn csrf_token(&self, url: &Url) -> Option<String> {
        let cookies = self.inner.jar.cookies(url)?;
        cookie_value(cookies.to_str().ok()?, &self.inner.csrf_cookie)
    }
}

/// Percent-decoded value of `name` in a `Cookie` header.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key != name || value.is_empty() {
            return None;
        }
        let value = value.trim_matches('"');
        Some(urlencoding::decode(value).map_or_else(|_| value.to_string(), |v| v.into_owned()))
    })
}

fn is_state_changing(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Empty bodies become `Null`; bodies that are not JSON are kept as `{"message": text}`.
pub(crate) fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": text }))
}

pub(crate) async fn finish(resp: reqwest::Response) -> ApiResult<ApiResponse> {
    let status = resp.status();
    let etag = resp
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if status == StatusCode::NOT_MODIFIED {
        return Ok(ApiResponse {
            status: status.as_u16(),
            data: Value::Null,
            etag,
        });
    }

    let data = parse_body(&resp.text().await?);
    if !status.is_success() {
        return Err(ApiError::http(status.as_u16(), data));
    }

    Ok(ApiResponse {
        status: status.as_u16(),
        data,
        etag,
    })
}
