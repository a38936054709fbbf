mod auth_error;
mod auth_gate;

pub use auth_error::AuthError;
pub use auth_gate::{AuthGate, CallerIdentity, auth_middleware};
