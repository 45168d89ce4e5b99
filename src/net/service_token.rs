//! `X-Service-Token` signing: `<unix-ts>:<hex hmac-sha256(secret, "service-call:<unix-ts>")>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SERVICE_TOKEN_HEADER: &str = "x-service-token";

#[derive(Clone)]
pub struct ServiceTokenSigner {
    secret: String,
}

impl std::fmt::Debug for ServiceTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceTokenSigner").finish_non_exhaustive()
    }
}

impl ServiceTokenSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn token(&self) -> String {
        self.token_at(chrono::Utc::now().timestamp())
    }

    pub fn token_at(&self, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).expect("hmac takes any key size");
        mac.update(format!("service-call:{timestamp}").as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("{timestamp}:{signature}")
    }
}
