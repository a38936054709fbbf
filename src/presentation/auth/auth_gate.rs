use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use super::auth_error::AuthError;
use crate::application::Classify;
use crate::application::ports::TokenVerifier;
use crate::domain::AuthClaims;
use crate::infrastructure::auth::{DEFAULT_REFRESH_INTERVAL, JwksTokenVerifier};
use crate::presentation::config::OidcSettings;
use crate::presentation::handlers::error_response;

/// Identity of the caller as established by the gate: `None` when the gate is
/// disabled.
#[derive(Debug, Clone, Default)]
pub struct CallerIdentity(pub Option<AuthClaims>);

/// Bearer-token check in front of the RPC handlers.
///
/// Decided once at startup: without identity-provider settings every call
/// passes through, otherwise every call must carry a verifiable token.
#[derive(Clone)]
pub enum AuthGate {
    Disabled,
    Enforcing {
        verifier: Arc<dyn TokenVerifier>,
        expected_azp: Option<String>,
    },
}

impl AuthGate {
    pub fn enforcing(verifier: Arc<dyn TokenVerifier>, expected_azp: Option<String>) -> Self {
        Self::Enforcing {
            verifier,
            expected_azp: expected_azp.filter(|azp| !azp.is_empty()),
        }
    }

    /// Builds the gate from settings, starting the background key refresh
    /// when enforcing. Must run inside a Tokio runtime.
    pub fn from_settings(settings: &OidcSettings) -> Self {
        let (Some(issuer), Some(jwks_url), Some(audience)) = (
            non_empty(&settings.issuer),
            non_empty(&settings.jwks_url),
            non_empty(&settings.audience),
        ) else {
            tracing::info!("Auth: OIDC not configured; RPC runs without auth");
            return Self::Disabled;
        };

        let verifier = Arc::new(JwksTokenVerifier::new(jwks_url, issuer, audience));
        let interval = settings
            .jwks_refresh_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);
        verifier.spawn_refresh(interval);

        tracing::info!(audience, issuer, "Auth: OIDC gate enabled");
        Self::enforcing(verifier, settings.expected_azp.clone())
    }

    pub fn is_enforcing(&self) -> bool {
        matches!(self, Self::Enforcing { .. })
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<AuthClaims>, AuthError> {
        let Self::Enforcing {
            verifier,
            expected_azp,
        } = self
        else {
            return Ok(None);
        };

        let raw_token = bearer_token(headers)?;
        let verified = verifier.verify(raw_token).await?;

        if let Some(expected) = expected_azp {
            if verified.authorized_party.as_deref() != Some(expected.as_str()) {
                return Err(AuthError::AuthorizedPartyMismatch);
            }
        }

        Ok(Some(AuthClaims {
            subject: verified.subject,
            authorized_party: verified.authorized_party,
            client_id: verified.client_id,
            raw_token: raw_token.to_string(),
        }))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    if value.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MalformedHeader)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

pub async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authenticate(request.headers()).await {
        Ok(claims) => {
            if let Some(claims) = &claims {
                tracing::debug!(
                    subject = claims.subject.as_deref().unwrap_or("-"),
                    "Caller authenticated"
                );
            }
            request.extensions_mut().insert(CallerIdentity(claims));
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected unauthenticated call");
            error_response(e.kind(), e.to_string())
        }
    }
}
