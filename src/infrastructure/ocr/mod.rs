mod recognizer_factory;
mod yandex_ocr_adapter;

pub use recognizer_factory::{RecognizerFactory, RecognizerFactoryError};
pub use yandex_ocr_adapter::{
    DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, FOLDER_ID_HEADER, OcrCredentials, ProviderError,
    RecognizeTextRequest, RecognizeTextResponse, YandexOcrAdapter, YandexOcrOptions,
    classify_failure, parse_response,
};
