use bytes::Bytes;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub mime_type: String,
}

impl FileInfo {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
        }
    }
}

/// Raw object bytes, owned by a single pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub bytes: Bytes,
}

impl FileContent {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedContent {
    base64_text: String,
}

impl EncodedContent {
    pub fn new(base64_text: String) -> Self {
        Self { base64_text }
    }

    pub fn as_str(&self) -> &str {
        &self.base64_text
    }
}
