use async_trait::async_trait;

/// Checks a bearer token's signature and standard claims against an
/// identity provider.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, raw_token: &str) -> Result<VerifiedToken, TokenVerificationError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: Option<String>,
    pub authorized_party: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenVerificationError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("no signing key matches token: {0}")]
    UnknownKey(String),
    #[error("token rejected: {0}")]
    Rejected(String),
    #[error("signing keys unavailable: {0}")]
    KeySetUnavailable(String),
}
