use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::ports::{TokenVerificationError, TokenVerifier, VerifiedToken};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const LEEWAY_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Rsa,
    EllipticCurve,
    Edwards,
}

impl KeyFamily {
    fn of_params(params: &AlgorithmParameters) -> Option<Self> {
        match params {
            AlgorithmParameters::RSA(_) => Some(Self::Rsa),
            AlgorithmParameters::EllipticCurve(_) => Some(Self::EllipticCurve),
            AlgorithmParameters::OctetKeyPair(_) => Some(Self::Edwards),
            _ => None,
        }
    }

    /// Symmetric algorithms have no family: a public key set must never be
    /// usable as an HMAC secret.
    fn of_algorithm(alg: Algorithm) -> Option<Self> {
        match alg {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Some(Self::Rsa),
            Algorithm::ES256 | Algorithm::ES384 => Some(Self::EllipticCurve),
            Algorithm::EdDSA => Some(Self::Edwards),
            _ => None,
        }
    }
}

#[derive(Clone)]
struct SigningKey {
    kid: Option<String>,
    family: KeyFamily,
    key: DecodingKey,
}

#[derive(Default)]
struct KeyCache {
    keys: Vec<SigningKey>,
    /// Time of the last fetch, successful or not.
    last_attempt: Option<Instant>,
    /// Why the last fetch failed; `None` after a success.
    last_error: Option<String>,
}

impl KeyCache {
    fn candidates(&self, kid: Option<&str>, family: KeyFamily) -> Vec<DecodingKey> {
        self.keys
            .iter()
            .filter(|k| k.family == family)
            .filter(|k| match kid {
                Some(kid) => k.kid.as_deref() == Some(kid),
                None => true,
            })
            .map(|k| k.key.clone())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Option<String>,
    azp: Option<String>,
    client_id: Option<String>,
}

/// Verifies RS/PS/ES/EdDSA-signed JWTs against an identity provider's JWKS.
///
/// Signing keys are cached and shared by all calls. A token naming an unknown
/// `kid` triggers a refetch, at most once per [`MIN_REFRESH_INTERVAL`];
/// [`spawn_refresh`](Self::spawn_refresh) keeps the cache current in the
/// background.
pub struct JwksTokenVerifier {
    client: Client,
    jwks_url: String,
    issuer: String,
    audience: String,
    cache: RwLock<KeyCache>,
    refresh_lock: Mutex<()>,
    min_refresh_interval: Duration,
}

impl JwksTokenVerifier {
    pub fn new(jwks_url: &str, issuer: &str, audience: &str) -> Self {
        Self {
            client: Client::new(),
            jwks_url: jwks_url.to_string(),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            cache: RwLock::new(KeyCache::default()),
            refresh_lock: Mutex::new(()),
            min_refresh_interval: MIN_REFRESH_INTERVAL,
        }
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Fetches the key set and replaces the cache. Returns the number of
    /// usable keys.
    pub async fn refresh(&self) -> Result<usize, TokenVerificationError> {
        let _refreshing = self.refresh_lock.lock().await;
        self.fetch_into_cache().await
    }

    pub fn spawn_refresh(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let verifier: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(verifier) = verifier.upgrade() else {
                    break;
                };
                if let Err(e) = verifier.refresh().await {
                    tracing::warn!(error = %e, "Background JWKS refresh failed");
                }
            }
        })
    }

    async fn refresh_if_stale(&self) -> Result<(), TokenVerificationError> {
        let _refreshing = self.refresh_lock.lock().await;

        // Another caller may have fetched while we waited for the lock. A
        // recent failure is reported again instead of hitting the endpoint.
        let (last_attempt, last_error) = {
            let cache = self.cache.read().await;
            (cache.last_attempt, cache.last_error.clone())
        };
        if let Some(last_attempt) = last_attempt {
            if last_attempt.elapsed() < self.min_refresh_interval {
                return match last_error {
                    Some(error) => Err(TokenVerificationError::KeySetUnavailable(error)),
                    None => Ok(()),
                };
            }
        }

        self.fetch_into_cache().await.map(|_| ())
    }

    /// Keys already cached survive a failed fetch.
    async fn fetch_into_cache(&self) -> Result<usize, TokenVerificationError> {
        let fetched = self.fetch_keys().await;

        let mut cache = self.cache.write().await;
        cache.last_attempt = Some(Instant::now());
        match fetched {
            Ok(keys) => {
                let count = keys.len();
                cache.keys = keys;
                cache.last_error = None;
                tracing::debug!(keys = count, "JWKS cache refreshed");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "JWKS fetch failed");
                cache.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_keys(&self) -> Result<Vec<SigningKey>, TokenVerificationError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| TokenVerificationError::KeySetUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TokenVerificationError::KeySetUnavailable(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| TokenVerificationError::KeySetUnavailable(e.to_string()))?;

        let mut keys = Vec::with_capacity(set.keys.len());
        for jwk in &set.keys {
            let Some(family) = KeyFamily::of_params(&jwk.algorithm) else {
                tracing::debug!(kid = ?jwk.common.key_id, "Skipping non-asymmetric JWK");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => keys.push(SigningKey {
                    kid: jwk.common.key_id.clone(),
                    family,
                    key,
                }),
                Err(e) => {
                    tracing::warn!(kid = ?jwk.common.key_id, error = %e, "Skipping unusable JWK")
                }
            }
        }

        Ok(keys)
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = LEEWAY_SECS;
        validation
    }
}

#[async_trait]
impl TokenVerifier for JwksTokenVerifier {
    async fn verify(&self, raw_token: &str) -> Result<VerifiedToken, TokenVerificationError> {
        let header = jsonwebtoken::decode_header(raw_token)
            .map_err(|e| TokenVerificationError::Malformed(e.to_string()))?;

        let family = KeyFamily::of_algorithm(header.alg).ok_or_else(|| {
            TokenVerificationError::Rejected(format!("algorithm {:?} not allowed", header.alg))
        })?;
        let kid = header.kid.as_deref();

        let mut candidates = self.cache.read().await.candidates(kid, family);
        if candidates.is_empty() {
            self.refresh_if_stale().await?;
            candidates = self.cache.read().await.candidates(kid, family);
        }
        if candidates.is_empty() {
            return Err(TokenVerificationError::UnknownKey(
                kid.unwrap_or("<none>").to_string(),
            ));
        }

        let validation = self.validation(header.alg);
        for key in &candidates {
            match jsonwebtoken::decode::<TokenClaims>(raw_token, key, &validation) {
                Ok(data) => {
                    let claims = data.claims;
                    return Ok(VerifiedToken {
                        subject: claims.sub.filter(|s| !s.is_empty()),
                        authorized_party: claims.azp.filter(|s| !s.is_empty()),
                        client_id: claims.client_id.filter(|s| !s.is_empty()),
                    });
                }
                // Wrong key for this token: try the next candidate.
                Err(e) if is_key_mismatch(e.kind()) => continue,
                Err(e) => return Err(TokenVerificationError::Rejected(e.to_string())),
            }
        }

        Err(TokenVerificationError::Rejected(
            "signature does not match any signing key".to_string(),
        ))
    }
}

fn is_key_mismatch(kind: &JwtErrorKind) -> bool {
    matches!(
        kind,
        JwtErrorKind::InvalidSignature
            | JwtErrorKind::InvalidKeyFormat
            | JwtErrorKind::InvalidEcdsaKey
            | JwtErrorKind::InvalidRsaKey(_)
    )
}
