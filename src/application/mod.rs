pub mod bus;
pub mod error_kind;
pub mod ports;
pub mod queries;
pub mod request_context;

pub use error_kind::{Classify, ErrorKind};
pub use request_context::{Interruption, RequestContext};
