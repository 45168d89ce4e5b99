use crate::error::{ConfigError, ConfigErrorKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base url every api path is joined onto, e.g. "https://careers.example.com/api"
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-call ceiling, reported as a network error when hit
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Durable mirror of the credential store (optional)
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    /// Shared secret used to sign X-Service-Token (optional)
    #[serde(default)]
    pub service_secret: Option<String>,
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_csrf_cookie() -> String {
    DEFAULT_CSRF_COOKIE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_file: None,
            service_secret: None,
            csrf_cookie: default_csrf_cookie(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let origin = path.as_ref().display().to_string();
        let data = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError {
            origin: origin.clone(),
            source: ConfigErrorKind::Read(e),
        })?;
        toml::from_str(&data).map_err(|e| ConfigError {
            origin,
            source: ConfigErrorKind::Parse(e),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env");

        let timeout_secs = match std::env::var("CAREERDESK_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError {
                origin: "environment".into(),
                source: ConfigErrorKind::InvalidEnv("CAREERDESK_TIMEOUT_SECS".into(), e.to_string()),
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let cfg = Self {
            api_base: std::env::var("CAREERDESK_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            timeout_secs,
            session_file: std::env::var("CAREERDESK_SESSION_FILE").ok().map(PathBuf::from),
            service_secret: std::env::var("CAREERDESK_SERVICE_SECRET").ok().filter(|s| !s.is_empty()),
            csrf_cookie: std::env::var("CAREERDESK_CSRF_COOKIE").unwrap_or_else(|_| DEFAULT_CSRF_COOKIE.to_string()),
        };

        Ok(cfg)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fills_defaults() {
        let cfg: Config = toml::from_str(r#"api_base = "https://example.test/api""#).unwrap();
        assert_eq!(cfg.api_base, "https://example.test/api");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.csrf_cookie, "csrftoken");
        assert!(cfg.session_file.is_none());
    }

    #[test]
    fn load_reports_origin_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("careerdesk.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err.source, ConfigErrorKind::Parse(_)));
        assert!(err.to_string().contains("careerdesk.toml"));
    }
}
