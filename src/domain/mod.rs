mod auth_claims;
mod file;
mod object_key;
mod recognition;

pub use auth_claims::AuthClaims;
pub use file::{DEFAULT_MIME_TYPE, EncodedContent, FileContent, FileInfo};
pub use object_key::ObjectKey;
pub use recognition::{RecognitionRequest, RecognitionResult};
