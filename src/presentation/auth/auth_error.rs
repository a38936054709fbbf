use crate::application::ports::TokenVerificationError;
use crate::application::{Classify, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header not provided")]
    MissingHeader,
    #[error("invalid authorization header format")]
    MalformedHeader,
    #[error("token verification failed: {0}")]
    Verification(#[from] TokenVerificationError),
    #[error("invalid azp")]
    AuthorizedPartyMismatch,
}

impl Classify for AuthError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingHeader | Self::MalformedHeader | Self::Verification(_) => {
                ErrorKind::Unauthenticated
            }
            Self::AuthorizedPartyMismatch => ErrorKind::PermissionDenied,
        }
    }
}
