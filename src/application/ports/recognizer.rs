use std::time::Duration;

use async_trait::async_trait;

use crate::application::error_kind::{Classify, ErrorKind};
use crate::application::request_context::{Interruption, RequestContext};
use crate::domain::{RecognitionRequest, RecognitionResult};

#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(
        &self,
        ctx: &RequestContext,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResult, RecognizerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Interrupted(#[from] Interruption),
    #[error("provider returned {status}: {message} (code={code})")]
    Rejected {
        status: u16,
        code: i64,
        message: String,
    },
    #[error("provider returned unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl Classify for RecognizerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Timeout(_) | Self::Unavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::Interrupted(interruption) => (*interruption).into(),
            Self::Rejected { .. } | Self::UnexpectedStatus { .. } => ErrorKind::UpstreamRejected,
            Self::MalformedResponse(_) => ErrorKind::Internal,
        }
    }
}
