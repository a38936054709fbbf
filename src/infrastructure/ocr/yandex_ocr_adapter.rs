use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{Recognizer, RecognizerError};
use crate::application::{Interruption, RequestContext};
use crate::domain::{RecognitionRequest, RecognitionResult};

pub const DEFAULT_ENDPOINT: &str = "https://ocr.api.cloud.yandex.net/ocr/v1/recognizeText";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const FOLDER_ID_HEADER: &str = "x-folder-id";

#[derive(Clone)]
pub enum OcrCredentials {
    ApiKey(String),
    IamToken(String),
}

impl OcrCredentials {
    fn authorization(&self) -> String {
        match self {
            Self::ApiKey(key) => format!("Api-Key {key}"),
            Self::IamToken(token) => format!("Bearer {token}"),
        }
    }
}

#[derive(Clone)]
pub struct YandexOcrOptions {
    pub endpoint: String,
    pub credentials: OcrCredentials,
    pub folder_id: String,
    pub model: Option<String>,
    pub languages: Vec<String>,
    pub timeout: Duration,
}

impl YandexOcrOptions {
    pub fn new(credentials: OcrCredentials, folder_id: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials,
            folder_id: folder_id.into(),
            model: None,
            languages: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct YandexOcrAdapter {
    client: Client,
    endpoint: String,
    credentials: OcrCredentials,
    folder_id: String,
    model: Option<String>,
    languages: Vec<String>,
    timeout: Duration,
}

impl YandexOcrAdapter {
    pub fn new(options: YandexOcrOptions) -> Self {
        Self {
            client: Client::new(),
            endpoint: options.endpoint,
            credentials: options.credentials,
            folder_id: options.folder_id,
            model: options.model.filter(|m| !m.is_empty()),
            languages: options.languages,
            timeout: options.timeout,
        }
    }

    async fn send(
        &self,
        body: &RecognizeTextRequest<'_>,
        timeout: Duration,
    ) -> Result<(StatusCode, Bytes), reqwest::Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .header(AUTHORIZATION, self.credentials.authorization())
            .header(FOLDER_ID_HEADER, &self.folder_id)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.bytes().await?;
        Ok((status, raw))
    }
}

#[async_trait]
impl Recognizer for YandexOcrAdapter {
    #[tracing::instrument(
        skip(self, ctx, request),
        fields(
            mime_type = %request.mime_type,
            content_len = request.content.as_str().len()
        )
    )]
    async fn recognize(
        &self,
        ctx: &RequestContext,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResult, RecognizerError> {
        if request.content.as_str().is_empty() {
            return Err(RecognizerError::InvalidInput("empty content".to_string()));
        }
        if request.mime_type.trim().is_empty() {
            return Err(RecognizerError::InvalidInput("empty MIME type".to_string()));
        }

        // A caller deadline shorter than our own bound wins.
        let (timeout, bounded_by_caller) = match ctx.remaining() {
            Some(remaining) if remaining < self.timeout => (remaining, true),
            _ => (self.timeout, false),
        };

        let body = RecognizeTextRequest {
            mime_type: &request.mime_type,
            language_codes: self.languages.iter().map(String::as_str).collect(),
            model: self.model.as_deref(),
            content: request.content.as_str(),
        };

        let (status, raw) = ctx
            .guard(self.send(&body, timeout))
            .await?
            .map_err(|e| {
                if !e.is_timeout() {
                    RecognizerError::Unavailable(e.to_string())
                } else if bounded_by_caller {
                    RecognizerError::Interrupted(Interruption::DeadlineExceeded)
                } else {
                    RecognizerError::Timeout(timeout)
                }
            })?;

        if !status.is_success() {
            let error = classify_failure(status.as_u16(), &raw);
            tracing::warn!(status = status.as_u16(), error = %error, "OCR provider rejected request");
            return Err(error);
        }

        let text = parse_response(&raw)?;
        tracing::debug!(chars = text.len(), "OCR provider responded");

        Ok(RecognitionResult::new(text))
    }
}

/// Turns a non-2xx provider reply into an error, preferring the structured
/// `{code, message}` body and falling back to the raw status and text.
pub fn classify_failure(status: u16, body: &[u8]) -> RecognizerError {
    match serde_json::from_slice::<ProviderError>(body) {
        Ok(error) if !error.message.is_empty() => RecognizerError::Rejected {
            status,
            code: error.code,
            message: error.message,
        },
        _ => RecognizerError::UnexpectedStatus {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

pub fn parse_response(body: &[u8]) -> Result<String, RecognizerError> {
    let response: RecognizeTextResponse = serde_json::from_slice(body)
        .map_err(|e| RecognizerError::MalformedResponse(e.to_string()))?;
    Ok(response.into_text())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeTextRequest<'a> {
    pub mime_type: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub language_codes: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecognizeTextResponse {
    pub result: Option<RecognizedPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedPayload {
    pub text_annotation: Option<TextAnnotation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    pub full_text: Option<String>,
    pub blocks: Option<Vec<TextBlock>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextBlock {
    pub lines: Option<Vec<TextLine>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextLine {
    pub text: Option<String>,
}

impl RecognizeTextResponse {
    /// The consolidated full text when present, otherwise every non-empty line
    /// of every block in order, each followed by a newline.
    pub fn into_text(self) -> String {
        let Some(annotation) = self.result.and_then(|r| r.text_annotation) else {
            return String::new();
        };

        if let Some(full_text) = annotation.full_text.filter(|t| !t.is_empty()) {
            return full_text;
        }

        let mut text = String::new();
        for block in annotation.blocks.unwrap_or_default() {
            for line in block.lines.unwrap_or_default() {
                match line.text {
                    Some(line) if !line.is_empty() => {
                        text.push_str(&line);
                        text.push('\n');
                    }
                    _ => {}
                }
            }
        }
        text
    }
}
