use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::Recognizer;
use crate::presentation::config::OcrSettings;

use super::yandex_ocr_adapter::{OcrCredentials, YandexOcrAdapter, YandexOcrOptions};

#[derive(Debug, thiserror::Error)]
pub enum RecognizerFactoryError {
    #[error("folder_id is required for the OCR provider")]
    MissingFolderId,
    #[error("either api_key or iam_token is required for the OCR provider")]
    MissingCredentials,
}

pub struct RecognizerFactory;

impl RecognizerFactory {
    pub fn create(settings: &OcrSettings) -> Result<Arc<dyn Recognizer>, RecognizerFactoryError> {
        let folder_id = settings
            .folder_id
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or(RecognizerFactoryError::MissingFolderId)?;

        let credentials = match (non_empty(&settings.api_key), non_empty(&settings.iam_token)) {
            (Some(key), _) => OcrCredentials::ApiKey(key.to_string()),
            (None, Some(token)) => OcrCredentials::IamToken(token.to_string()),
            (None, None) => return Err(RecognizerFactoryError::MissingCredentials),
        };

        let mut options = YandexOcrOptions::new(credentials, folder_id);
        options.endpoint = settings.endpoint.clone();
        options.model = non_empty(&settings.model).map(str::to_string);
        options.languages = settings.languages.clone();
        options.timeout = Duration::from_secs(settings.timeout_secs);

        tracing::info!(
            endpoint = %options.endpoint,
            model = options.model.as_deref().unwrap_or("-"),
            languages = ?options.languages,
            "Loading OCR recognizer"
        );
        Ok(Arc::new(YandexOcrAdapter::new(options)))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
