use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (connect failure, timeout, broken body stream)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String, data: Value },

    /// A 401 that survived the refresh-and-retry protocol
    #[error("{message}")]
    AuthExpired { message: String, data: Value },

    /// Success response whose payload does not have the expected shape
    #[error("unexpected response payload: {0}")]
    Decode(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

impl ApiError {
    pub(crate) fn http(status: u16, data: Value) -> Self {
        ApiError::Http {
            status,
            message: failure_message(status, &data),
            data,
        }
    }

    pub(crate) fn auth_expired(data: Value) -> Self {
        ApiError::AuthExpired {
            message: failure_message(401, &data),
            data,
        }
    }

    /// HTTP status of the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::AuthExpired { .. } => Some(401),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Parsed response body that came with the failure.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiError::Http { data, .. } | ApiError::AuthExpired { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Network(e) if e.is_timeout())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// `data.error ?? data.message ?? "Request failed with status N"`
pub(crate) fn failure_message(status: u16, data: &Value) -> String {
    ["error", "message"]
        .iter()
        .find_map(|k| data.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to parse file: {0}")]
    Parse(toml::de::Error),

    #[error("missing environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid environment variable {0}: {1}")]
    InvalidEnv(String, String),
}

#[derive(Debug, Error)]
#[error("invalid configuration in {origin}: {source}")]
pub struct ConfigError {
    pub origin: String,
    #[source]
    pub source: ConfigErrorKind,
}
