#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use doc2text::application::RequestContext;
use doc2text::application::ports::{
    ContentEncoder, Downloader, DownloaderError, EncoderError, Recognizer, RecognizerError,
    TokenVerificationError, TokenVerifier, VerifiedToken,
};
use doc2text::domain::{
    EncodedContent, FileContent, FileInfo, ObjectKey, RecognitionRequest, RecognitionResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloaderFailure {
    None,
    InfoNotFound,
    FileUnavailable,
}

pub struct MockDownloader {
    mime_type: String,
    bytes: Vec<u8>,
    failure: DownloaderFailure,
    pub info_calls: AtomicUsize,
    pub file_calls: AtomicUsize,
}

impl MockDownloader {
    pub fn new(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
            failure: DownloaderFailure::None,
            info_calls: AtomicUsize::new(0),
            file_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: DownloaderFailure) -> Self {
        Self {
            failure,
            ..Self::new("application/pdf", b"%PDF")
        }
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn file_calls(&self) -> usize {
        self.file_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn get_info(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
    ) -> Result<FileInfo, DownloaderError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        if self.failure == DownloaderFailure::InfoNotFound {
            return Err(DownloaderError::NotFound(key.to_string()));
        }
        Ok(FileInfo::new(self.mime_type.clone()))
    }

    async fn get_file(
        &self,
        ctx: &RequestContext,
        _key: &ObjectKey,
    ) -> Result<FileContent, DownloaderError> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        if self.failure == DownloaderFailure::FileUnavailable {
            return Err(DownloaderError::Unavailable("connection reset".to_string()));
        }
        Ok(FileContent::new(self.bytes.clone()))
    }
}

pub struct FailingEncoder;

#[async_trait]
impl ContentEncoder for FailingEncoder {
    async fn to_base64(
        &self,
        _ctx: &RequestContext,
        _content: &FileContent,
    ) -> Result<EncodedContent, EncoderError> {
        Err(EncoderError::Io(std::io::Error::other("sink closed")))
    }
}

/// Answers `DECODED:<base64 content>` and remembers what it was asked.
#[derive(Default)]
pub struct MockRecognizer {
    pub fail_with_status: Option<u16>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<RecognitionRequest>>,
    pub last_subject: Mutex<Option<String>>,
}

impl MockRecognizer {
    pub fn rejecting(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(
        &self,
        ctx: &RequestContext,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResult, RecognizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        *self.last_subject.lock().unwrap() = ctx.claims().and_then(|c| c.subject.clone());

        if let Some(status) = self.fail_with_status {
            return Err(RecognizerError::Rejected {
                status,
                code: 3,
                message: "unsupported document".to_string(),
            });
        }
        Ok(RecognitionResult::new(format!(
            "DECODED:{}",
            request.content.as_str()
        )))
    }
}

/// Accepts `good-token` (subject `user-1`, azp `web-app`) and rejects the rest.
pub struct MockTokenVerifier;

pub const GOOD_TOKEN: &str = "good-token";

#[async_trait]
impl TokenVerifier for MockTokenVerifier {
    async fn verify(&self, raw_token: &str) -> Result<VerifiedToken, TokenVerificationError> {
        if raw_token == GOOD_TOKEN {
            Ok(VerifiedToken {
                subject: Some("user-1".to_string()),
                authorized_party: Some("web-app".to_string()),
                client_id: None,
            })
        } else {
            Err(TokenVerificationError::Rejected("bad signature".to_string()))
        }
    }
}
