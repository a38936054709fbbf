mod chunked_base64_encoder;

pub use chunked_base64_encoder::{ChunkedBase64Encoder, DEFAULT_CHUNK_SIZE};
