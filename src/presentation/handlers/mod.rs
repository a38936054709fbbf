mod error_response;
mod health;
mod process;

pub use error_response::{ErrorResponse, error_response, status_for};
pub use health::health_handler;
pub use process::{ProcessRequest, ProcessResponse, process_handler};
