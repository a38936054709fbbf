use async_trait::async_trait;

use crate::application::error_kind::{Classify, ErrorKind};
use crate::application::request_context::{Interruption, RequestContext};
use crate::domain::{EncodedContent, FileContent};

#[async_trait]
pub trait ContentEncoder: Send + Sync {
    async fn to_base64(
        &self,
        ctx: &RequestContext,
        content: &FileContent,
    ) -> Result<EncodedContent, EncoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    #[error(transparent)]
    Interrupted(#[from] Interruption),
    #[error("encoding failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Classify for EncoderError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Interrupted(interruption) => (*interruption).into(),
            Self::Io(_) => ErrorKind::Internal,
        }
    }
}
