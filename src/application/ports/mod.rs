mod content_encoder;
mod downloader;
mod recognizer;
mod token_verifier;

pub use content_encoder::{ContentEncoder, EncoderError};
pub use downloader::{Downloader, DownloaderError};
pub use recognizer::{Recognizer, RecognizerError};
pub use token_verifier::{TokenVerificationError, TokenVerifier, VerifiedToken};
