use std::sync::Arc;

use async_trait::async_trait;

use crate::application::bus::{Message, Query, QueryHandler};
use crate::application::error_kind::{Classify, ErrorKind};
use crate::application::ports::{
    ContentEncoder, Downloader, DownloaderError, EncoderError, Recognizer, RecognizerError,
};
use crate::application::request_context::RequestContext;
use crate::domain::{ObjectKey, RecognitionRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractTextQuery {
    pub object_key: ObjectKey,
}

impl ExtractTextQuery {
    pub fn new(object_key: impl Into<ObjectKey>) -> Self {
        Self {
            object_key: object_key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractTextResult {
    pub text: String,
}

impl Message for ExtractTextQuery {
    type Response = ExtractTextResult;
    type Error = ExtractTextError;
}

impl Query for ExtractTextQuery {}

/// Download, encode, recognize: one object key in, recognized text out.
///
/// Stages run strictly in order and the first failure aborts the rest.
pub struct ExtractTextHandler {
    downloader: Arc<dyn Downloader>,
    encoder: Arc<dyn ContentEncoder>,
    recognizer: Arc<dyn Recognizer>,
}

impl ExtractTextHandler {
    pub fn new(
        downloader: Arc<dyn Downloader>,
        encoder: Arc<dyn ContentEncoder>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Self {
        Self {
            downloader,
            encoder,
            recognizer,
        }
    }
}

#[async_trait]
impl QueryHandler<ExtractTextQuery> for ExtractTextHandler {
    #[tracing::instrument(
        skip(self, ctx, query),
        fields(
            object_key = %query.object_key,
            request_id = ctx.request_id().unwrap_or("-")
        )
    )]
    async fn handle(
        &self,
        ctx: &RequestContext,
        query: ExtractTextQuery,
    ) -> Result<ExtractTextResult, ExtractTextError> {
        let key = query.object_key;

        // The info call is checked before the file is fetched so a missing
        // object never costs a full download.
        let info = self
            .downloader
            .get_info(ctx, &key)
            .await
            .map_err(|source| ExtractTextError::Download {
                object_key: key.to_string(),
                source,
            })?;

        let file = self
            .downloader
            .get_file(ctx, &key)
            .await
            .map_err(|source| ExtractTextError::Download {
                object_key: key.to_string(),
                source,
            })?;

        tracing::debug!(mime_type = %info.mime_type, bytes = file.len(), "Object downloaded");

        let encoded = self
            .encoder
            .to_base64(ctx, &file)
            .await
            .map_err(|source| ExtractTextError::Encode {
                object_key: key.to_string(),
                source,
            })?;
        drop(file);

        let request = RecognitionRequest::new(encoded, info.mime_type);
        let result = self
            .recognizer
            .recognize(ctx, &request)
            .await
            .map_err(|source| ExtractTextError::Recognize {
                object_key: key.to_string(),
                mime_type: request.mime_type.clone(),
                source,
            })?;

        tracing::info!(chars = result.text.len(), "Text extracted");

        Ok(ExtractTextResult { text: result.text })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractTextError {
    #[error("extract text: download {object_key:?}: {source}")]
    Download {
        object_key: String,
        source: DownloaderError,
    },
    #[error("extract text: encode {object_key:?}: {source}")]
    Encode {
        object_key: String,
        source: EncoderError,
    },
    #[error("extract text: recognize {object_key:?} (mime={mime_type}): {source}")]
    Recognize {
        object_key: String,
        mime_type: String,
        source: RecognizerError,
    },
}

impl ExtractTextError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Download { .. } => "download",
            Self::Encode { .. } => "encode",
            Self::Recognize { .. } => "recognize",
        }
    }

    pub fn object_key(&self) -> &str {
        match self {
            Self::Download { object_key, .. }
            | Self::Encode { object_key, .. }
            | Self::Recognize { object_key, .. } => object_key,
        }
    }
}

impl Classify for ExtractTextError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Download { source, .. } => source.kind(),
            Self::Encode { source, .. } => source.kind(),
            Self::Recognize { source, .. } => source.kind(),
        }
    }
}
