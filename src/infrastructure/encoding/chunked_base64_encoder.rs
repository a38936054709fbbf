use std::io::Write;

use async_trait::async_trait;
use base64::engine::general_purpose;
use base64::write::EncoderStringWriter;

use crate::application::RequestContext;
use crate::application::ports::{ContentEncoder, EncoderError};
use crate::domain::{EncodedContent, FileContent};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Standard padded base64, produced chunk by chunk.
///
/// The request context is checked before the first chunk and after each one,
/// and the task yields in between, so a cancelled call stops within one chunk.
pub struct ChunkedBase64Encoder {
    chunk_size: usize,
}

impl ChunkedBase64Encoder {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Default for ChunkedBase64Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentEncoder for ChunkedBase64Encoder {
    async fn to_base64(
        &self,
        ctx: &RequestContext,
        content: &FileContent,
    ) -> Result<EncodedContent, EncoderError> {
        ctx.check()?;

        // The writer carries partial 3-byte groups across chunk boundaries.
        let mut writer = EncoderStringWriter::new(&general_purpose::STANDARD);
        for chunk in content.bytes.chunks(self.chunk_size) {
            writer.write_all(chunk)?;
            ctx.check()?;
            tokio::task::yield_now().await;
        }

        Ok(EncodedContent::new(writer.into_inner()))
    }
}
