use async_trait::async_trait;

use crate::application::error_kind::{Classify, ErrorKind};
use crate::application::request_context::{Interruption, RequestContext};
use crate::domain::{FileContent, FileInfo, ObjectKey};

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn get_info(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
    ) -> Result<FileInfo, DownloaderError>;

    async fn get_file(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
    ) -> Result<FileContent, DownloaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DownloaderError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("storage rejected request: {0}")]
    Rejected(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Interrupted(#[from] Interruption),
}

impl Classify for DownloaderError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::Rejected(_) => ErrorKind::UpstreamRejected,
            Self::Unavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::Interrupted(interruption) => (*interruption).into(),
        }
    }
}
