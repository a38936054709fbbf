use super::request_context::Interruption;

/// Failure categories every stage error is sorted into.
///
/// The RPC layer maps these onto status codes; nothing below it needs to know
/// about transport-level codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Unauthenticated,
    PermissionDenied,
    UpstreamUnavailable,
    UpstreamRejected,
    HandlerNotFound,
    Cancelled,
    DeadlineExceeded,
    Internal,
}

impl ErrorKind {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_ARGUMENT",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::UpstreamUnavailable => "UNAVAILABLE",
            Self::UpstreamRejected => "UNAVAILABLE",
            Self::HandlerNotFound => "INTERNAL",
            Self::Cancelled => "CANCELLED",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl From<Interruption> for ErrorKind {
    fn from(value: Interruption) -> Self {
        match value {
            Interruption::Cancelled => Self::Cancelled,
            Interruption::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}

pub trait Classify {
    fn kind(&self) -> ErrorKind;
}
