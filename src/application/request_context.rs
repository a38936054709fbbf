use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::AuthClaims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interruption {
    #[error("request cancelled by caller")]
    Cancelled,
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// Per-call state threaded explicitly through every stage of a request.
///
/// Carries the caller's cancellation signal and deadline, the verified
/// identity (when the auth gate is enforcing) and a correlation id for logs.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    claims: Option<AuthClaims>,
    request_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            cancellation: CancellationToken::new(),
            deadline: None,
            claims: None,
            request_id: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_claims(mut self, claims: Option<AuthClaims>) -> Self {
        self.claims = claims;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn claims(&self) -> Option<&AuthClaims> {
        self.claims.as_ref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Time left before the deadline; `None` when the call has no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_interrupted(&self) -> Option<Interruption> {
        if self.cancellation.is_cancelled() {
            return Some(Interruption::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(Interruption::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn check(&self) -> Result<(), Interruption> {
        match self.is_interrupted() {
            Some(interruption) => Err(interruption),
            None => Ok(()),
        }
    }

    /// Races `future` against cancellation and the deadline.
    ///
    /// The future is dropped as soon as either fires, so work already handed to
    /// the network may still complete but its result is discarded.
    pub async fn guard<F: Future>(&self, future: F) -> Result<F::Output, Interruption> {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(Interruption::Cancelled),
            _ = deadline => Err(Interruption::DeadlineExceeded),
            output = future => Ok(output),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
