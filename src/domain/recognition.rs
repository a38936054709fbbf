use super::file::EncodedContent;

/// Everything that crosses the recognizer boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub content: EncodedContent,
    pub mime_type: String,
}

impl RecognitionRequest {
    pub fn new(content: EncodedContent, mime_type: impl Into<String>) -> Self {
        Self {
            content,
            mime_type: mime_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub text: String,
}

impl RecognitionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
